use std::fmt::Display;

use crate::io::StreamInterface;

/// Identity of immutable value objects.
///
/// Mutators on the message types never modify the receiver. When a mutator would not change
/// anything observable it hands back the receiver itself, which `same_instance` reports as true.
pub trait SameInstance {
    fn same_instance(&self, other: &Self) -> bool;
}

/// Anything that can be used as the value of a header: a single string or number, or a
/// sequence of strings
pub trait HeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl HeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl HeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl HeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: AsRef<str>> HeaderValues for Vec<S> {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>> HeaderValues for &[S] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> HeaderValues for [S; N] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

macro_rules! numeric_header_values {
    ($($ty: ty),*) => {
        $(
            impl HeaderValues for $ty {
                fn into_header_values(self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

numeric_header_values!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

/// The protocol version, headers and body shared by requests and responses
pub trait MessageInterface: Clone + SameInstance {
    type Error: std::error::Error;
    type Body: StreamInterface;

    /// The version number only, e.g. `1.1`
    fn protocol_version(&self) -> &str;
    fn with_protocol_version(&self, version: &str) -> Result<Self, Self::Error>;

    /// All headers in insertion order, with the names in the case they were supplied in
    fn headers(&self) -> impl Iterator<Item = (&str, &[String])>;
    /// Case-insensitive
    fn has_header(&self, name: &str) -> bool;
    /// Case-insensitive, empty if the header is not present
    fn header(&self, name: &str) -> &[String];
    /// All values of a header joined by a comma, empty if the header is not present
    fn header_line(&self, name: &str) -> String;

    fn with_header<V: HeaderValues>(&self, name: &str, value: V) -> Result<Self, Self::Error>;
    fn with_added_header<V: HeaderValues>(
        &self,
        name: &str,
        value: V,
    ) -> Result<Self, Self::Error>;
    fn without_header(&self, name: &str) -> Result<Self, Self::Error>;

    fn body(&self) -> &Self::Body;
    fn with_body(&self, body: Self::Body) -> Self;
}

/// A URI split into its components
/// SPEC: RFC 3986 - 3. Syntax Components
/// ABNF: URI = scheme ":" hier-part [ "?" query ] [ "#" fragment ]
pub trait UriInterface: Clone + SameInstance + Display + PartialEq {
    type Error: std::error::Error;

    /// Lowercase scheme without the trailing colon, empty if absent
    fn scheme(&self) -> &str;
    /// `[user-info@]host[:port]`, empty if there is no host
    fn authority(&self) -> String;
    fn user_info(&self) -> &str;
    /// Lowercase host, empty if absent
    fn host(&self) -> &str;
    /// The effective port, `None` if not set or if it is the default port of the scheme
    fn port(&self) -> Option<u16>;
    fn path(&self) -> &str;
    fn query(&self) -> &str;
    fn fragment(&self) -> &str;

    fn with_scheme(&self, scheme: &str) -> Result<Self, Self::Error>;
    fn with_user_info(&self, user: &str, password: Option<&str>) -> Result<Self, Self::Error>;
    fn with_host(&self, host: &str) -> Result<Self, Self::Error>;
    fn with_port(&self, port: Option<u32>) -> Result<Self, Self::Error>;
    fn with_path(&self, path: &str) -> Result<Self, Self::Error>;
    fn with_query(&self, query: &str) -> Result<Self, Self::Error>;
    fn with_fragment(&self, fragment: &str) -> Result<Self, Self::Error>;
}

/// An outgoing, client side request
pub trait RequestInterface: MessageInterface {
    type Uri: UriInterface;

    /// The explicitly set request target, or the origin-form derived from the URI
    fn request_target(&self) -> String;
    fn with_request_target(&self, target: &str) -> Result<Self, Self::Error>;

    fn method(&self) -> &str;
    fn with_method(&self, method: &str) -> Result<Self, Self::Error>;

    fn uri(&self) -> &Self::Uri;
    /// Replaces the URI, updating the `Host` header from it unless `preserve_host` is set and
    /// the request already has one
    fn with_uri(&self, uri: Self::Uri, preserve_host: bool) -> Result<Self, Self::Error>;
}

pub trait ResponseInterface: MessageInterface {
    fn status_code(&self) -> u16;
    /// The explicit reason phrase, or the standard one for the status code, or empty
    fn reason_phrase(&self) -> &str;
    fn with_status(&self, code: u16, reason_phrase: &str) -> Result<Self, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values_coercion() {
        assert_eq!("text/html".into_header_values(), vec!["text/html"]);
        assert_eq!(String::from("a").into_header_values(), vec!["a"]);
        assert_eq!(42u64.into_header_values(), vec!["42"]);
        assert_eq!((-7i32).into_header_values(), vec!["-7"]);
        assert_eq!(1.5f64.into_header_values(), vec!["1.5"]);
        assert_eq!(["a", "b"].into_header_values(), vec!["a", "b"]);
        assert_eq!(vec![String::from("x")].into_header_values(), vec!["x"]);
        assert!(Vec::<String>::new().into_header_values().is_empty());
    }
}
