use std::{fmt::Display, sync::Arc};

mod builder;
pub use builder::ResponseBuilder;
use uhsapi::{ResponseInterface, SameInstance};

use crate::{
    error::{InvalidArgument, Result},
    http::message::{MessageComponent, MessageParts, impl_message},
};

/// A status code within 100-599
/// SPEC: RFC 9110 - 15. Status Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const CONTINUE: Self = Self(100);
    pub const OK: Self = Self(200);
    pub const CREATED: Self = Self(201);
    pub const NO_CONTENT: Self = Self(204);
    pub const MOVED_PERMANENTLY: Self = Self(301);
    pub const FOUND: Self = Self(302);
    pub const NOT_MODIFIED: Self = Self(304);
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    pub const SERVICE_UNAVAILABLE: Self = Self(503);

    pub fn new(code: u16) -> Result<Self, InvalidArgument> {
        if !(100..=599).contains(&code) {
            return Err(InvalidArgument::StatusCode(code));
        }
        Ok(Self(code))
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn is_informational(&self) -> bool {
        self.0 < 200
    }

    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_redirection(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500
    }

    /// The standard reason phrase, `None` for codes without one
    pub const fn canonical_reason(&self) -> Option<&'static str> {
        Some(match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            102 => "Processing",
            103 => "Early Hints",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            207 => "Multi-Status",
            208 => "Already Reported",
            226 => "IM Used",
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            306 => "Switch Proxy",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Content Too Large",
            414 => "URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Range Not Satisfiable",
            417 => "Expectation Failed",
            418 => "I'm a teapot",
            421 => "Misdirected Request",
            422 => "Unprocessable Content",
            423 => "Locked",
            424 => "Failed Dependency",
            425 => "Too Early",
            426 => "Upgrade Required",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            431 => "Request Header Fields Too Large",
            444 => "Connection Closed Without Response",
            451 => "Unavailable For Legal Reasons",
            499 => "Client Closed Request",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            506 => "Variant Also Negotiates",
            507 => "Insufficient Storage",
            508 => "Loop Detected",
            510 => "Not Extended",
            511 => "Network Authentication Required",
            _ => return None,
        })
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidArgument;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// An outgoing HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    inner: Arc<ResponseParts>,
}

#[derive(Debug, Clone, Default)]
struct ResponseParts {
    message: MessageParts,
    status: StatusCode,
    /// Explicit reason phrase, empty to fall back to the standard one
    reason: String,
}

impl Response {
    /// A response with the given status, an empty body and no headers
    pub fn new(code: u16) -> Result<Self> {
        Self::builder().status(code).build()
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub(crate) fn from_parts(message: MessageParts, status: StatusCode, reason: String) -> Self {
        Self {
            inner: Arc::new(ResponseParts {
                message,
                status,
                reason,
            }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status
    }

    fn update(&self, f: impl FnOnce(&mut ResponseParts)) -> Self {
        let mut response = self.clone();
        f(Arc::make_mut(&mut response.inner));
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            inner: Arc::new(ResponseParts::default()),
        }
    }
}

impl SameInstance for Response {
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl MessageComponent for Response {
    fn message(&self) -> &MessageParts {
        &self.inner.message
    }

    fn map_message(&self, f: impl FnOnce(&mut MessageParts)) -> Self {
        self.update(|parts| f(&mut parts.message))
    }
}

impl_message!(Response);

impl ResponseInterface for Response {
    fn status_code(&self) -> u16 {
        self.inner.status.as_u16()
    }

    fn reason_phrase(&self) -> &str {
        if !self.inner.reason.is_empty() {
            return &self.inner.reason;
        }
        self.inner.status.canonical_reason().unwrap_or_default()
    }

    fn with_status(&self, code: u16, reason_phrase: &str) -> Result<Self> {
        let status = StatusCode::new(code)?;
        if self.inner.status == status && self.inner.reason == reason_phrase {
            return Ok(self.clone());
        }
        log::trace!("changing response status to {status}");
        Ok(self.update(|parts| {
            parts.status = status;
            parts.reason = reason_phrase.to_owned();
        }))
    }
}

#[cfg(test)]
mod tests {
    use uhsapi::{MessageInterface, StreamInterface};

    use super::*;
    use crate::{error::Error, http::Stream};

    #[test]
    fn test_default_response() {
        let response = Response::default();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.headers().count(), 0);
        assert_eq!(response.body().size(), Some(0));
    }

    #[test]
    fn test_status_range() {
        for code in [100, 200, 404, 599] {
            assert_eq!(Response::new(code).unwrap().status_code(), code);
        }
        for code in [0, 99, 600, 1000] {
            assert!(matches!(
                Response::new(code),
                Err(Error::InvalidArgument(InvalidArgument::StatusCode(c))) if c == code
            ));
        }
    }

    #[test]
    fn test_reason_phrase() {
        let response = Response::default();
        let not_found = response.with_status(404, "").unwrap();
        assert_eq!(not_found.reason_phrase(), "Not Found");

        let custom = response.with_status(404, "Gone Fishing").unwrap();
        assert_eq!(custom.reason_phrase(), "Gone Fishing");

        // Codes outside the table have no phrase, which is not an error
        let unknown = response.with_status(599, "").unwrap();
        assert_eq!(unknown.reason_phrase(), "");
        assert_eq!(response.with_status(299, "").unwrap().reason_phrase(), "");
        assert_eq!(response.with_status(418, "").unwrap().reason_phrase(), "I'm a teapot");
    }

    #[test]
    fn test_with_status_no_op() {
        let response = Response::new(201).unwrap();
        assert!(response.same_instance(&response.with_status(201, "").unwrap()));
        assert!(!response.same_instance(&response.with_status(201, "Made").unwrap()));
        assert!(!response.same_instance(&response.with_status(202, "").unwrap()));

        let failed = response.with_status(700, "Nope");
        assert!(failed.is_err());
        assert_eq!(response.status_code(), 201);
    }

    #[test]
    fn test_message_operations() {
        let response = Response::default();
        let json = response
            .with_header("Content-Type", "application/json")
            .unwrap()
            .with_added_header("Vary", "Accept")
            .unwrap()
            .with_added_header("vary", ["Origin", "Cookie"])
            .unwrap();
        assert_eq!(json.header_line("VARY"), "Accept, Origin, Cookie");
        let names: Vec<_> = json.headers().map(|(name, _)| name).collect();
        assert_eq!(names, ["Content-Type", "Vary"]);
        assert_eq!(response.headers().count(), 0);

        let body = Stream::from_bytes("{}");
        let with_body = json.with_body(body.clone());
        assert!(with_body.body().same_instance(&body));
        assert!(with_body.same_instance(&with_body.with_body(body)));
        assert!(!json.body().same_instance(with_body.body()));

        assert!(json.same_instance(&json.with_protocol_version("1.1").unwrap()));
        let http2 = json.with_protocol_version("2").unwrap();
        assert_eq!(http2.protocol_version(), "2");
        assert!(json.with_protocol_version("HTTP/1.1").is_err());
    }

    #[test]
    fn test_status_code_classes() {
        assert!(StatusCode::CONTINUE.is_informational());
        assert!(StatusCode::NO_CONTENT.is_success());
        assert!(StatusCode::FOUND.is_redirection());
        assert!(StatusCode::NOT_FOUND.is_client_error());
        assert!(StatusCode::SERVICE_UNAVAILABLE.is_server_error());
        assert_eq!(StatusCode::try_from(600), Err(InvalidArgument::StatusCode(600)));
        assert_eq!(StatusCode::OK.to_string(), "200");
    }
}
