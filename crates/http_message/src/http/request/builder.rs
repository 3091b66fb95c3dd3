use uhsapi::HeaderValues;

use crate::{
    error::{Error, Result},
    http::{
        HttpVersion, Stream,
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
        request::Request,
        uri::Uri,
    },
};

/// Builds a [`Request`] step by step. The first invalid input is kept and returned by
/// [`RequestBuilder::build`]
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Result<Parts>,
}

#[derive(Debug, Default)]
struct Parts {
    method: Method,
    uri: Uri,
    version: HttpVersion,
    headers: HeaderMap,
    body: Option<Stream>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            inner: Ok(Parts::default()),
        }
    }

    pub fn build(self) -> Result<Request> {
        let Parts {
            method,
            uri,
            version,
            headers,
            body,
        } = self.inner?;

        Request::from_parts(method, uri, version, headers, body.unwrap_or_default())
    }

    pub fn method(self, method: &str) -> Self {
        self.and_then(|mut parts| {
            parts.method = Method::parse(method)?;
            Ok(parts)
        })
    }

    /// Takes a [`Uri`] or anything that parses into one
    pub fn uri<U>(self, uri: U) -> Self
    where
        U: TryInto<Uri>,
        Error: From<U::Error>,
    {
        self.and_then(|mut parts| {
            parts.uri = uri.try_into()?;
            Ok(parts)
        })
    }

    pub fn version(self, version: &str) -> Self {
        self.and_then(|mut parts| {
            parts.version = version.parse()?;
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

    fn and_then(self, f: impl FnOnce(Parts) -> Result<Parts>) -> Self {
        Self {
            inner: self.inner.and_then(f),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uhsapi::{MessageInterface, RequestInterface, SameInstance, UriInterface};

    use super::*;
    use crate::error::InvalidArgument;

    #[test]
    fn test_builder() {
        let request = RequestBuilder::new()
            .method("POST")
            .uri("https://api.example.com/v1/items?page=2")
            .version("2")
            .header("Content-Type", "application/json")
            .header("Accept", ["application/json", "text/plain"])
            .header("accept", "*/*")
            .body(Stream::from_bytes("{}"))
            .build()
            .unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri().host(), "api.example.com");
        assert_eq!(request.protocol_version(), "2");
        assert_eq!(request.request_target(), "/v1/items?page=2");
        assert_eq!(
            request.header("ACCEPT"),
            ["application/json", "text/plain", "*/*"]
        );
        assert_eq!(request.body().to_string(), "{}");
    }

    #[test]
    fn test_builder_takes_parsed_uri() {
        let uri = Uri::parse("http://example.com/").unwrap();
        let request = RequestBuilder::new().uri(uri.clone()).build().unwrap();
        assert!(request.uri().same_instance(&uri));
    }

    #[test]
    fn test_first_error_wins() {
        let err = RequestBuilder::new()
            .method("BAD METHOD")
            .uri("ftp://example.com")
            .build()
            .unwrap_err();
        assert_eq!(
            err.as_invalid_argument(),
            Some(&InvalidArgument::Method("BAD METHOD".into()))
        );

        let err = RequestBuilder::new()
            .header("X-Foo", "ok")
            .header("X-Bar", "bad\r\nvalue")
            .build()
            .unwrap_err();
        assert!(matches!(
            err.as_invalid_argument(),
            Some(InvalidArgument::HeaderValue { .. })
        ));

        assert!(RequestBuilder::new().version("3.0").build().is_err());
        assert!(RequestBuilder::new().uri("http://host:0").build().is_err());
        assert!(RequestBuilder::new().header("X-Empty", Vec::<String>::new()).build().is_err());
    }
}
