//! Character classes shared by header, method and URI validation.
//!
//! Everything here works on bytes: the grammars involved are all defined over octets, and
//! anything outside ASCII is either forbidden outright or allowed wholesale.

/// `tchar` from the token grammar
/// SPEC: RFC 9110 - 5.6.2. Tokens
/// ABNF: tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
pub const fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Returns true if `s` is a non-empty token (header names, methods)
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_tchar)
}

/// Bytes that may appear anywhere inside a field value, before line folding is considered.
/// HTAB, LF, CR, visible ASCII plus SP, and obs-text up to 0xFE.
pub const fn is_field_value_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | 0x20..=0x7E | 0x80..=0xFE)
}

/// Optional whitespace
/// ABNF: OWS = *( SP / HTAB )
pub const fn is_ows(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// Trims SP and HTAB (and nothing else) from both ends
pub fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '\t')
}

/// Whitespace that is never allowed inside a request target
pub const fn is_target_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// SPEC: RFC 3986 - 2.3. Unreserved Characters
pub const fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// SPEC: RFC 3986 - 2.2. Reserved Characters
pub const fn is_sub_delim(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

/// Returns true if `bytes` starts with a well formed percent triplet (`%` HEXDIG HEXDIG)
pub fn starts_with_pct_encoded(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', h, l, ..] if h.is_ascii_hexdigit() && l.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert!(is_token("Content-Type"));
        assert!(is_token("X-Custom_Header.v1"));
        assert!(is_token("!#$%&'*+-.^_`|~"));
        assert!(!is_token(""));
        assert!(!is_token("Content Type"));
        assert!(!is_token("Host:"));
        assert!(!is_token("naïve"));
        assert!(!is_token("(comment)"));
    }

    #[test]
    fn test_field_value_bytes() {
        assert!(is_field_value_byte(b'\t'));
        assert!(is_field_value_byte(b' '));
        assert!(is_field_value_byte(b'~'));
        assert!(is_field_value_byte(0x80));
        assert!(is_field_value_byte(0xFE));
        assert!(!is_field_value_byte(0xFF));
        assert!(!is_field_value_byte(0x7F));
        assert!(!is_field_value_byte(0x00));
        assert!(!is_field_value_byte(0x0B));
    }

    #[test]
    fn test_trim_ows() {
        assert_eq!(trim_ows(" \t\tvalue with spaces\t \t"), "value with spaces");
        assert_eq!(trim_ows("\u{0B}value\u{0B}"), "\u{0B}value\u{0B}");
        assert_eq!(trim_ows("\r\n value"), "\r\n value");
        assert_eq!(trim_ows(""), "");
    }

    #[test]
    fn test_pct_encoded() {
        assert!(starts_with_pct_encoded(b"%20"));
        assert!(starts_with_pct_encoded(b"%aFrest"));
        assert!(!starts_with_pct_encoded(b"%2"));
        assert!(!starts_with_pct_encoded(b"%GG"));
        assert!(!starts_with_pct_encoded(b"20%"));
    }
}
