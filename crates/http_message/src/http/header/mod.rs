mod map;
use std::{fmt, ops::Deref};

pub use map::*;
use memchr::memchr2_iter;
use smallvec::SmallVec;
use uhsapi::ascii::{is_field_value_byte, is_ows, is_token, trim_ows};

use crate::error::InvalidArgument;

/// A header name, validated against the token grammar. Keeps the case it was given in
/// SPEC: RFC 9110 - 5.1. Field Names
/// ABNF: field-name = token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderName(String);

impl HeaderName {
    pub const HOST: &'static str = "Host";
    pub const CONTENT_LENGTH: &'static str = "Content-Length";

    pub fn parse(name: &str) -> Result<Self, InvalidArgument> {
        if !is_token(name) {
            return Err(InvalidArgument::HeaderName(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The values of a single header, validated and trimmed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderValue {
    values: SmallVec<[String; 1]>,
}

impl HeaderValue {
    pub fn new() -> Self {
        Self {
            values: SmallVec::new(),
        }
    }

    /// Trims SP and HTAB from both ends of every value, then validates what is left.
    /// At least one value is required
    pub fn parse(name: &HeaderName, values: Vec<String>) -> Result<Self, InvalidArgument> {
        if values.is_empty() {
            return Err(invalid_value(name, "at least one value is required"));
        }
        let mut out = SmallVec::with_capacity(values.len());
        for value in values {
            let trimmed = trim_ows(&value);
            validate_value(name, trimmed)?;
            out.push(if trimmed.len() == value.len() {
                value
            } else {
                trimmed.to_owned()
            });
        }
        Ok(Self { values: out })
    }

    pub fn push(&mut self, value: String) {
        self.values.push(value);
    }

    pub fn extend(&mut self, other: HeaderValue) {
        self.values.extend(other.values);
    }

    /// Values joined by a comma, as they would appear on a single field line
    pub fn to_line(&self) -> String {
        self.values.join(", ")
    }
}

impl Deref for HeaderValue {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

fn invalid_value(name: &HeaderName, reason: &'static str) -> InvalidArgument {
    InvalidArgument::HeaderValue {
        name: name.as_str().to_owned(),
        reason,
    }
}

/// Rejects control bytes, and any CR or LF that is not part of an obsolete line fold.
/// SPEC: RFC 9112 - 5.2. Obsolete Line Folding
/// ABNF: obs-fold = OWS CRLF RWS
fn validate_value(name: &HeaderName, value: &str) -> Result<(), InvalidArgument> {
    let bytes = value.as_bytes();
    if !bytes.iter().copied().all(is_field_value_byte) {
        return Err(invalid_value(name, "contains control characters"));
    }
    for idx in memchr2_iter(b'\r', b'\n', bytes) {
        let folded = match bytes[idx] {
            b'\r' => {
                bytes.get(idx + 1) == Some(&b'\n')
                    && bytes.get(idx + 2).is_some_and(|b| is_ows(*b))
            }
            // The CR before it has already checked the fold
            _ => idx > 0 && bytes[idx - 1] == b'\r',
        };
        if !folded {
            return Err(invalid_value(name, "line break outside of a line fold"));
        }
    }
    Ok(())
}
