use std::{borrow::Cow, string::FromUtf8Error};

use uhsapi::ascii::{is_sub_delim, is_unreserved, starts_with_pct_encoded};

const HEX_CHARS_UPPER: &[u8] = b"0123456789ABCDEF";

/// The URI component a string is going to be placed in, which decides what stays literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Component {
    /// ABNF: userinfo = *( unreserved / pct-encoded / sub-delims / ":" )
    /// The colon separates user from password, so each half is encoded without it
    UserInfo,
    /// ABNF: pchar = unreserved / pct-encoded / sub-delims / ":" / "@"
    Path,
    /// ABNF: query = *( pchar / "/" / "?" )
    Query,
    /// ABNF: fragment = *( pchar / "/" / "?" )
    Fragment,
}

impl Component {
    fn allows(self, c: char) -> bool {
        if !c.is_ascii() {
            // Letters from any script are left as they are
            return c.is_alphabetic();
        }
        let b = c as u8;
        if is_unreserved(b) || is_sub_delim(b) {
            return true;
        }
        match self {
            Self::UserInfo => false,
            Self::Path => matches!(b, b':' | b'@' | b'/'),
            Self::Query | Self::Fragment => matches!(b, b':' | b'@' | b'/' | b'?'),
        }
    }
}

fn push_pct_encoded(out: &mut String, byte: u8) {
    out.push('%');
    out.push(HEX_CHARS_UPPER[(byte >> 4) as usize] as char); // Higher nibble
    out.push(HEX_CHARS_UPPER[(byte & 0xF) as usize] as char); // Lower nibble
}

/// Percent-encodes everything `component` does not allow. Existing `%XX` triplets are kept,
/// so encoding an already encoded string changes nothing
pub(crate) fn encode_component(input: &str, component: Component) -> Cow<'_, str> {
    let needs_encoding = input.char_indices().any(|(idx, c)| {
        if c == '%' {
            !starts_with_pct_encoded(&input.as_bytes()[idx..])
        } else {
            !component.allows(c)
        }
    });
    if !needs_encoding {
        return Cow::Borrowed(input);
    }

    let mut encoded = String::with_capacity(input.len() * 3);
    let mut utf8 = [0u8; 4];
    for (idx, c) in input.char_indices() {
        let literal = if c == '%' {
            starts_with_pct_encoded(&input.as_bytes()[idx..])
        } else {
            component.allows(c)
        };
        if literal {
            encoded.push(c);
        } else {
            for &byte in c.encode_utf8(&mut utf8).as_bytes() {
                push_pct_encoded(&mut encoded, byte);
            }
        }
    }
    Cow::Owned(encoded)
}

/// Encodes every byte that is not unreserved, for keys and values inside a query string
pub fn url_encode(input: &[u8]) -> String {
    let mut encoded = String::with_capacity(input.len() * 3); // Max 3 bytes per char (e.g., %FF)

    for &byte in input {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            push_pct_encoded(&mut encoded, byte);
        }
    }
    encoded
}

#[derive(Debug, thiserror::Error)]
pub enum UrlDecodeError {
    #[error("malformed encoding")]
    MalformedEncoding, // e.g., `%G1`, `%A`
    #[error(transparent)]
    InvalidUtf8(#[from] FromUtf8Error), // e.g., `%FF` if expecting String output
}

pub fn url_decode(input: &[u8]) -> Result<String, UrlDecodeError> {
    let mut decoded = Vec::with_capacity(input.len()); // Can be smaller or equal

    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'%' => {
                // Need 2 more bytes for hex digits
                let hex_slice = input
                    .get(i + 1..i + 3)
                    .ok_or(UrlDecodeError::MalformedEncoding)?;
                decoded.push(parse_hex_byte(hex_slice)?);
                i += 3; // Advance past %HH
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }

    Ok(String::from_utf8(decoded)?)
}

fn parse_hex_byte(hex_slice: &[u8]) -> Result<u8, UrlDecodeError> {
    let high = hex_to_digit(hex_slice[0])?;
    let low = hex_to_digit(hex_slice[1])?;
    Ok((high << 4) | low)
}

fn hex_to_digit(c: u8) -> Result<u8, UrlDecodeError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(UrlDecodeError::MalformedEncoding),
    }
}
