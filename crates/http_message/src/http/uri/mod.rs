use std::{fmt, str::FromStr, sync::Arc};

use memchr::memchr;
use uhsapi::{SameInstance, UriInterface};

mod encode;
pub(crate) use encode::{Component, encode_component};
pub use encode::{UrlDecodeError, url_decode, url_encode};

use crate::error::{Error, InvalidArgument};

/// Schemes a [`Uri`] may carry, with their default ports
const SCHEMES: &[(&str, u16)] = &[("http", 80), ("https", 443)];

fn default_port(scheme: &str) -> Option<u16> {
    SCHEMES
        .iter()
        .find(|(known, _)| *known == scheme)
        .map(|(_, port)| *port)
}

/// An immutable URI, stored as its already encoded components
///
/// Note that [`UriInterface::port`] reports `None` for the default port of the scheme even when
/// that port was set explicitly: `http://example.com:80` and `http://example.com` are
/// indistinguishable through it.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Uri {
    inner: Arc<UriParts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct UriParts {
    scheme: String,
    user_info: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

/// The pieces of a URI string, before any filtering
/// SPEC: RFC 3986 - 3. Syntax Components
#[derive(Debug, Default, PartialEq, Eq)]
struct RawUri<'a> {
    scheme: Option<&'a str>,
    user_info: Option<&'a str>,
    host: Option<&'a str>,
    port: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> RawUri<'a> {
    /// Returns `None` if the string cannot be decomposed at all
    fn split(s: &'a str) -> Option<Self> {
        let mut raw = RawUri::default();
        let mut rest = s;

        if let Some(idx) = memchr(b'#', rest.as_bytes()) {
            raw.fragment = Some(&rest[idx + 1..]);
            rest = &rest[..idx];
        }
        if let Some(idx) = memchr(b'?', rest.as_bytes()) {
            raw.query = Some(&rest[idx + 1..]);
            rest = &rest[..idx];
        }

        // ABNF: scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
        if let Some(idx) = memchr(b':', rest.as_bytes()) {
            let candidate = &rest[..idx];
            let mut bytes = candidate.bytes();
            let is_scheme = bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
                && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'));
            if is_scheme {
                raw.scheme = Some(candidate);
                rest = &rest[idx + 1..];
            }
        }

        // ABNF: hier-part = "//" authority path-abempty / path-absolute / path-rootless / path-empty
        if let Some(after) = rest.strip_prefix("//") {
            let end = memchr(b'/', after.as_bytes()).unwrap_or(after.len());
            let (authority, path) = after.split_at(end);
            let host_port = match authority.rfind('@') {
                Some(idx) => {
                    raw.user_info = Some(&authority[..idx]);
                    &authority[idx + 1..]
                }
                None => authority,
            };
            let (host, port) = split_host_port(host_port)?;
            if host.is_empty() {
                return None;
            }
            raw.host = Some(host);
            raw.port = port;
            raw.path = path;
        } else {
            raw.path = rest;
        }
        Some(raw)
    }
}

/// ABNF: authority = [ userinfo "@" ] host [ ":" port ]
fn split_host_port(s: &str) -> Option<(&str, Option<&str>)> {
    let (host, port) = if s.starts_with('[') {
        // IP-literal, the colons inside belong to the address
        let close = memchr(b']', s.as_bytes())?;
        let (host, rest) = s.split_at(close + 1);
        match rest {
            "" => (host, None),
            _ => (host, Some(rest.strip_prefix(':')?)),
        }
    } else {
        match s.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (s, None),
        }
    };
    match port {
        Some("") | None => Some((host, None)),
        Some(port) if port.bytes().all(|b| b.is_ascii_digit()) => Some((host, Some(port))),
        Some(_) => None,
    }
}

fn filter_scheme(scheme: &str) -> Result<String, InvalidArgument> {
    let scheme = scheme.to_ascii_lowercase();
    let scheme = scheme
        .strip_suffix("://")
        .or_else(|| scheme.strip_suffix(':'))
        .unwrap_or(&scheme);
    if scheme.is_empty() || default_port(scheme).is_some() {
        Ok(scheme.to_owned())
    } else {
        Err(InvalidArgument::Scheme(scheme.to_owned()))
    }
}

fn filter_port(port: u32) -> Result<u16, InvalidArgument> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(InvalidArgument::Port(port.to_string())),
    }
}

fn filter_user_info(user: &str, password: Option<&str>) -> String {
    let mut info = encode_component(user, Component::UserInfo).into_owned();
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        info.push(':');
        info.push_str(&encode_component(password, Component::UserInfo));
    }
    info
}

fn filter_path(path: &str) -> Result<String, InvalidArgument> {
    let reason = if path.contains('?') {
        "must not contain a query string"
    } else if path.contains('#') {
        "must not contain a fragment"
    } else {
        return Ok(encode_component(path, Component::Path).into_owned());
    };
    Err(InvalidArgument::Path {
        path: path.to_owned(),
        reason,
    })
}

fn filter_query(query: &str) -> Result<String, InvalidArgument> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.contains('#') {
        return Err(InvalidArgument::Query(query.to_owned()));
    }
    Ok(encode_component(query, Component::Query).into_owned())
}

fn filter_fragment(fragment: &str) -> String {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    encode_component(fragment, Component::Fragment).into_owned()
}

impl Uri {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let raw = RawUri::split(s).ok_or_else(|| InvalidArgument::Uri(s.to_owned()))?;

        let user_info = match raw.user_info {
            Some(info) => match info.split_once(':') {
                Some((user, password)) => filter_user_info(user, Some(password)),
                None => filter_user_info(info, None),
            },
            None => String::new(),
        };
        let port = match raw.port {
            Some(port) => Some(filter_port(
                port.parse()
                    .map_err(|_| InvalidArgument::Port(port.to_owned()))?,
            )?),
            None => None,
        };

        let parts = UriParts {
            scheme: filter_scheme(raw.scheme.unwrap_or_default())?,
            user_info,
            host: raw.host.unwrap_or_default().to_ascii_lowercase(),
            port,
            path: encode_component(raw.path, Component::Path).into_owned(),
            query: encode_component(raw.query.unwrap_or_default(), Component::Query).into_owned(),
            fragment: encode_component(raw.fragment.unwrap_or_default(), Component::Fragment)
                .into_owned(),
        };
        Ok(Self {
            inner: Arc::new(parts),
        })
    }

    /// Decodes the query as `application/x-www-form-urlencoded` pairs.
    /// Pieces that do not decode are returned as they are
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        fn decode(s: &str) -> String {
            let s = s.replace('+', " ");
            url_decode(s.as_bytes()).unwrap_or(s)
        }

        self.inner
            .query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode(key), decode(value)),
                None => (decode(pair), String::new()),
            })
            .collect()
    }

    /// Replaces the query with the given pairs, encoding everything but unreserved characters
    pub fn with_query_pairs<I, K, V>(&self, pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = pairs
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    url_encode(key.as_ref().as_bytes()),
                    url_encode(value.as_ref().as_bytes())
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        self.with_query(&query)
    }

    fn update(&self, f: impl FnOnce(&mut UriParts)) -> Self {
        let mut uri = self.clone();
        f(Arc::make_mut(&mut uri.inner));
        uri
    }
}

impl SameInstance for Uri {
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl UriInterface for Uri {
    type Error = Error;

    fn scheme(&self) -> &str {
        &self.inner.scheme
    }

    fn authority(&self) -> String {
        let parts = &self.inner;
        if parts.host.is_empty() {
            return String::new();
        }
        let mut authority = String::new();
        if !parts.user_info.is_empty() {
            authority.push_str(&parts.user_info);
            authority.push('@');
        }
        authority.push_str(&parts.host);
        if let Some(port) = self.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    fn user_info(&self) -> &str {
        &self.inner.user_info
    }

    fn host(&self) -> &str {
        &self.inner.host
    }

    fn port(&self) -> Option<u16> {
        let port = self.inner.port?;
        if default_port(&self.inner.scheme) == Some(port) {
            None
        } else {
            Some(port)
        }
    }

    fn path(&self) -> &str {
        &self.inner.path
    }

    fn query(&self) -> &str {
        &self.inner.query
    }

    fn fragment(&self) -> &str {
        &self.inner.fragment
    }

    fn with_scheme(&self, scheme: &str) -> Result<Self, Error> {
        let scheme = filter_scheme(scheme)?;
        if scheme == self.inner.scheme {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.scheme = scheme))
    }

    fn with_user_info(&self, user: &str, password: Option<&str>) -> Result<Self, Error> {
        let info = filter_user_info(user, password);
        if info == self.inner.user_info {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.user_info = info))
    }

    fn with_host(&self, host: &str) -> Result<Self, Error> {
        let host = host.to_ascii_lowercase();
        if host == self.inner.host {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.host = host))
    }

    fn with_port(&self, port: Option<u32>) -> Result<Self, Error> {
        let port = port.map(filter_port).transpose()?;
        if port == self.inner.port {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.port = port))
    }

    fn with_path(&self, path: &str) -> Result<Self, Error> {
        let path = filter_path(path)?;
        if path == self.inner.path {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.path = path))
    }

    fn with_query(&self, query: &str) -> Result<Self, Error> {
        let query = filter_query(query)?;
        if query == self.inner.query {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.query = query))
    }

    fn with_fragment(&self, fragment: &str) -> Result<Self, Error> {
        let fragment = filter_fragment(fragment);
        if fragment == self.inner.fragment {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.fragment = fragment))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = &self.inner;
        if !parts.scheme.is_empty() {
            write!(f, "{}:", parts.scheme)?;
        }
        let authority = self.authority();
        if !authority.is_empty() {
            write!(f, "//{authority}")?;
        }

        let path = parts.path.as_str();
        if !authority.is_empty() && !path.is_empty() && !path.starts_with('/') {
            f.write_str("/")?;
            f.write_str(path)?;
        } else if authority.is_empty() && path.starts_with("//") {
            // Would otherwise be read back as an authority
            f.write_str("/")?;
            f.write_str(path.trim_start_matches('/'))?;
        } else {
            f.write_str(path)?;
        }

        if !parts.query.is_empty() {
            write!(f, "?{}", parts.query)?;
        }
        if !parts.fragment.is_empty() {
            write!(f, "#{}", parts.fragment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Uri").field(&self.to_string()).finish()
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Uri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
