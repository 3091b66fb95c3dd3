use uhsapi::{UriInterface, ascii::is_target_whitespace};

use crate::{error::InvalidArgument, http::uri::Uri};

/// The form a request target is written in
/// SPEC: RFC 9112 - 3.2. Request Target
/// ABNF: request-target = origin-form / absolute-form / authority-form / asterisk-form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// SPEC: RFC 9112 - 3.2.1. origin-form
    /// ABNF: origin-form = absolute-path [ "?" query ]
    Origin,
    /// SPEC: RFC 9112 - 3.2.2. absolute-form
    /// ABNF: absolute-form = absolute-URI
    Absolute,
    /// SPEC: RFC 9112 - 3.2.3. authority-form
    /// ABNF: authority-form = uri-host ":" port
    Authority,
    /// SPEC: RFC 9112 - 3.2.4. asterisk-form
    /// ABNF: asterisk-form = "*"
    Asterisk,
}

impl TargetForm {
    /// Classifies a target by its shape. Targets that fit none of the forms are `None`,
    /// they can still be set on a request
    pub fn of(target: &str) -> Option<Self> {
        match target.as_bytes() {
            [] => None,
            b"*" => Some(Self::Asterisk),
            [b'/', ..] => Some(Self::Origin),
            _ if target.contains("://") => Some(Self::Absolute),
            _ => {
                let (host, port) = target.rsplit_once(':')?;
                let valid_port = !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit());
                (!host.is_empty() && !host.contains('/') && valid_port).then_some(Self::Authority)
            }
        }
    }
}

pub(crate) fn validate(target: &str) -> Result<(), InvalidArgument> {
    if target.bytes().any(is_target_whitespace) {
        return Err(InvalidArgument::RequestTarget(target.to_owned()));
    }
    Ok(())
}

/// `path[?query]` of the uri, `/` when both are empty
pub(crate) fn derive(uri: &Uri) -> String {
    let (path, query) = (uri.path(), uri.query());
    if path.is_empty() && query.is_empty() {
        return "/".to_owned();
    }
    let mut target = String::with_capacity(path.len() + query.len() + 1);
    target.push_str(path);
    if !query.is_empty() {
        target.push('?');
        target.push_str(query);
    }
    target
}
