use bytes::Bytes;
use uhsapi::{HeaderValues, MessageInterface};

use crate::{
    error::Result,
    http::{
        HttpVersion, Stream,
        header::{HeaderMap, HeaderName, HeaderValue},
        message::MessageParts,
        request::Request,
        response::{Response, StatusCode},
    },
};

/// Builds a [`Response`]. Invalid input is reported by [`ResponseBuilder::build`]
#[derive(Debug)]
pub struct ResponseBuilder {
    inner: Result<Parts>,
}

#[derive(Debug, Default)]
struct Parts {
    version: HttpVersion,
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
    body: Option<Stream>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self {
            inner: Ok(Parts::default()),
        }
    }

    /// Starts a response speaking the same protocol version as the request
    pub fn from_req(req: &Request) -> Self {
        Self::new().version(req.protocol_version())
    }

    pub fn build(self) -> Result<Response> {
        let Parts {
            version,
            status,
            reason,
            headers,
            body,
        } = self.inner?;

        let message = MessageParts::new(version, headers, body.unwrap_or_default());
        Ok(Response::from_parts(message, status, reason))
    }

    pub fn status(self, code: u16) -> Self {
        self.and_then(|mut parts| {
            parts.status = StatusCode::new(code)?;
            Ok(parts)
        })
    }

    /// Overrides the standard reason phrase of the status
    pub fn reason(self, reason: &str) -> Self {
        self.and_then(|mut parts| {
            parts.reason = reason.to_owned();
            Ok(parts)
        })
    }

    pub fn version(self, version: &str) -> Self {
        self.and_then(|mut parts| {
            parts.version = version.parse()?;
            Ok(parts)
        })
    }

    /// Replaces the values of a header
    pub fn set_header<V: HeaderValues>(self, name: &str, value: V) -> Self {
        self.and_then(|mut parts| {
            let name = HeaderName::parse(name)?;
            let value = HeaderValue::parse(&name, value.into_header_values())?;
            parts.headers.replace(name, value);
            Ok(parts)
        })
    }

    /// Adds values to a header, repeated names accumulate
    pub fn header<V: HeaderValues>(self, name: &str, value: V) -> Self {
        self.and_then(|mut parts| {
            let name = HeaderName::parse(name)?;
            let value = HeaderValue::parse(&name, value.into_header_values())?;
            parts.headers.append(name, value);
            Ok(parts)
        })
    }

    pub fn body(self, body: Stream) -> Self {
        self.and_then(|mut parts| {
            parts.body = Some(body);
            Ok(parts)
        })
    }

    /// Uses the bytes as the body and sets `Content-Length` to match
    pub fn bytes(self, bytes: impl Into<Bytes>) -> Self {
        let bytes: Bytes = bytes.into();
        let len = bytes.len() as u64;
        self.body(Stream::from_bytes(bytes))
            .set_header(HeaderName::CONTENT_LENGTH, len)
    }

    fn and_then(self, f: impl FnOnce(Parts) -> Result<Parts>) -> Self {
        Self {
            inner: self.inner.and_then(f),
        }
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uhsapi::ResponseInterface;

    use super::*;
    use crate::error::InvalidArgument;

    #[test]
    fn test_builder() {
        let response = ResponseBuilder::new()
            .status(404)
            .header("Content-Type", "text/plain")
            .bytes("not here")
            .build()
            .unwrap();
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");
        assert_eq!(response.header_line("content-length"), "8");
        assert_eq!(response.body().to_string(), "not here");
        let names: Vec<_> = response.headers().map(|(name, _)| name).collect();
        assert_eq!(names, ["Content-Type", "Content-Length"]);
    }

    #[test]
    fn test_reason_override() {
        let response = ResponseBuilder::new()
            .status(200)
            .reason("All Good")
            .build()
            .unwrap();
        assert_eq!(response.reason_phrase(), "All Good");
    }

    #[test]
    fn test_set_header_replaces() {
        let response = ResponseBuilder::new()
            .header("X-Count", 1)
            .header("x-count", 2)
            .set_header("X-COUNT", 3)
            .build()
            .unwrap();
        assert_eq!(response.header("x-count"), ["3"]);
    }

    #[test]
    fn test_from_req() {
        let request = Request::builder().version("1.0").build().unwrap();
        let response = ResponseBuilder::from_req(&request).build().unwrap();
        assert_eq!(response.protocol_version(), "1.0");
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn test_invalid_input() {
        let err = ResponseBuilder::new().status(42).build().unwrap_err();
        assert_eq!(err.as_invalid_argument(), Some(&InvalidArgument::StatusCode(42)));
        assert!(ResponseBuilder::new().header("Bad Name", "x").build().is_err());
        assert!(ResponseBuilder::new().version("0.9").build().is_err());
    }

    #[test]
    fn test_header_injection_rejected() {
        for bad in ["a\r\nb", "a\nSet-Cookie: x=1", "a\r\n "] {
            let err = ResponseBuilder::new()
                .header("X-Note", bad)
                .build()
                .unwrap_err();
            assert!(
                matches!(err.as_invalid_argument(), Some(InvalidArgument::HeaderValue { .. })),
                "{bad:?} should be rejected"
            );
            assert!(ResponseBuilder::new().set_header("X-Note", bad).build().is_err());
        }
        // The first error is the one reported
        let err = ResponseBuilder::new()
            .header("X-Note", "a\r\nb")
            .status(42)
            .build()
            .unwrap_err();
        assert!(matches!(err.as_invalid_argument(), Some(InvalidArgument::HeaderValue { .. })));
    }
}
