use std::fmt::{Debug, Display};

use uhsapi::ascii::is_token;

use crate::error::InvalidArgument;

/// An HTTP Method
/// SPEC: Defined in RFC9110 9.1
/// ABNF: method = token
///
/// The case is kept exactly as supplied: `get` is a valid, distinct extension method.
/// The empty method is allowed and means "not set".
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Method(Repr);

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

impl Method {
    pub const GET: Self = Self(Repr::Builtin(Builtin::GET));
    pub const POST: Self = Self(Repr::Builtin(Builtin::POST));
    pub const PUT: Self = Self(Repr::Builtin(Builtin::PUT));
    pub const DELETE: Self = Self(Repr::Builtin(Builtin::DELETE));
    pub const PATCH: Self = Self(Repr::Builtin(Builtin::PATCH));
    pub const OPTIONS: Self = Self(Repr::Builtin(Builtin::OPTIONS));
    pub const CONNECT: Self = Self(Repr::Builtin(Builtin::CONNECT));
    pub const TRACE: Self = Self(Repr::Builtin(Builtin::TRACE));
    pub const HEAD: Self = Self(Repr::Builtin(Builtin::HEAD));
    pub const UNSET: Self = Self(Repr::Custom(String::new()));

    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        if let Some(builtin) = Builtin::from_str(s) {
            return Ok(Self(Repr::Builtin(builtin)));
        }
        if !s.is_empty() && !is_token(s) {
            return Err(InvalidArgument::Method(s.to_owned()));
        }
        Ok(Self(Repr::Custom(s.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Builtin(builtin) => builtin.as_str(),
            Repr::Custom(custom) => custom,
        }
    }

    /// Safe Methods are methods which can be cached by
    /// SPEC: [RFC 9110 9.2.1 Safe Methods](https://httpwg.org/specs/rfc9110.html#safe.methods)
    pub fn is_safe(&self) -> bool {
        matches!(&self.0, Repr::Builtin(builtin) if builtin.is_safe())
    }

    /// Idempotent Methods are requests where the side effects are the same if multiple identical
    /// requests are sent
    /// SPEC: [RFC 9110 9.2.2 Idempotent Methods](https://httpwg.org/specs/rfc9110.html#idempotent.methods)
    pub fn is_idempotent(&self) -> bool {
        matches!(&self.0, Repr::Builtin(builtin) if builtin.is_idempotent())
    }
}

impl Default for Method {
    fn default() -> Self {
        Self::GET
    }
}

impl TryFrom<&str> for Method {
    type Error = InvalidArgument;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Builtin(Builtin),
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Builtin {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
    HEAD,
}

impl Builtin {
    fn from_str(value: &str) -> Option<Self> {
        Some(match value {
            "GET" => Self::GET,
            "POST" => Self::POST,
            "PUT" => Self::PUT,
            "DELETE" => Self::DELETE,
            "PATCH" => Self::PATCH,
            "OPTIONS" => Self::OPTIONS,
            "CONNECT" => Self::CONNECT,
            "TRACE" => Self::TRACE,
            "HEAD" => Self::HEAD,
            _ => return None,
        })
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::PATCH => "PATCH",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
            Self::HEAD => "HEAD",
        }
    }

    fn is_safe(self) -> bool {
        matches!(self, Self::GET | Self::HEAD | Self::OPTIONS | Self::TRACE)
    }

    fn is_idempotent(self) -> bool {
        match self {
            Self::PUT | Self::DELETE => true,
            other => other.is_safe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin() {
        assert_eq!(Method::parse("GET").unwrap(), Method::GET);
        assert_eq!(Method::parse("PATCH").unwrap(), Method::PATCH);
        assert!(Method::GET.is_safe());
        assert!(Method::PUT.is_idempotent());
        assert!(!Method::POST.is_idempotent());
    }

    #[test]
    fn test_case_is_preserved() {
        let method = Method::parse("get").unwrap();
        assert_eq!(method.as_str(), "get");
        assert_ne!(method, Method::GET);
        assert!(!method.is_safe());

        let method = Method::parse("PropFind").unwrap();
        assert_eq!(method.to_string(), "PropFind");
    }

    #[test]
    fn test_empty_is_unset() {
        let method = Method::parse("").unwrap();
        assert_eq!(method.as_str(), "");
        assert_ne!(method, Method::GET);
    }

    #[test]
    fn test_reject_non_tokens() {
        for s in ["GE T", "GET\r\n", "(GET)", "POST/", "ПОСТ"] {
            assert_eq!(Method::parse(s), Err(InvalidArgument::Method(s.to_owned())));
        }
    }
}
