use uhsapi::{HeaderValues, SameInstance};

use crate::{
    error::Result,
    http::{
        HttpVersion, Stream,
        header::{HeaderMap, HeaderName, HeaderValue},
    },
};

/// What every message carries, regardless of being a request or a response
#[derive(Debug, Clone, Default)]
pub(crate) struct MessageParts {
    pub version: HttpVersion,
    pub headers: HeaderMap,
    pub body: Stream,
}

impl MessageParts {
    pub fn new(version: HttpVersion, headers: HeaderMap, body: Stream) -> Self {
        Self {
            version,
            headers,
            body,
        }
    }
}

/// Header mutation prepared against the current headers, `None` when it would change nothing
pub(crate) enum HeaderChange {
    Replace(HeaderName, HeaderValue),
    Append(HeaderName, HeaderValue),
    Remove(HeaderName),
}

impl HeaderChange {
    pub fn replace<V: HeaderValues>(
        headers: &HeaderMap,
        name: &str,
        value: V,
    ) -> Result<Option<Self>> {
        let name = HeaderName::parse(name)?;
        let value = HeaderValue::parse(&name, value.into_header_values())?;
        if headers.holds(&name, &value) {
            return Ok(None);
        }
        Ok(Some(Self::Replace(name, value)))
    }

    pub fn append<V: HeaderValues>(name: &str, value: V) -> Result<Option<Self>> {
        let name = HeaderName::parse(name)?;
        let value = HeaderValue::parse(&name, value.into_header_values())?;
        Ok(Some(Self::Append(name, value)))
    }

    pub fn remove(headers: &HeaderMap, name: &str) -> Result<Option<Self>> {
        let name = HeaderName::parse(name)?;
        if !headers.contains(name.as_str()) {
            return Ok(None);
        }
        Ok(Some(Self::Remove(name)))
    }

    pub fn apply(self, headers: &mut HeaderMap) {
        match self {
            Self::Replace(name, value) => {
                log::trace!("replacing header {name}");
                headers.replace(name, value);
            }
            Self::Append(name, value) => {
                log::trace!("appending to header {name}");
                headers.append(name, value);
            }
            Self::Remove(name) => {
                log::trace!("removing header {name}");
                headers.remove(name.as_str());
            }
        }
    }
}

/// Access to the message part of a value, so that the message operations can be written once.
///
/// `map_message` must return a new instance with its own storage.
pub(crate) trait MessageComponent: Clone + SameInstance {
    fn message(&self) -> &MessageParts;
    fn map_message(&self, f: impl FnOnce(&mut MessageParts)) -> Self;

    fn set_protocol_version(&self, version: &str) -> Result<Self> {
        let version: HttpVersion = version.parse()?;
        if self.message().version == version {
            return Ok(self.clone());
        }
        Ok(self.map_message(|message| message.version = version))
    }

    fn change_headers(&self, change: Option<HeaderChange>) -> Self {
        match change {
            Some(change) => self.map_message(|message| change.apply(&mut message.headers)),
            None => self.clone(),
        }
    }

    fn set_body(&self, body: Stream) -> Self {
        if self.message().body.same_instance(&body) {
            return self.clone();
        }
        self.map_message(|message| message.body = body)
    }
}

/// Implements [`uhsapi::MessageInterface`] for a type implementing `MessageComponent`
macro_rules! impl_message {
    ($ty: ty) => {
        impl uhsapi::MessageInterface for $ty {
            type Error = $crate::error::Error;
            type Body = $crate::http::Stream;

            fn protocol_version(&self) -> &str {
                self.message().version.as_str()
            }

            fn with_protocol_version(&self, version: &str) -> $crate::error::Result<Self> {
                self.set_protocol_version(version)
            }

            fn headers(&self) -> impl Iterator<Item = (&str, &[String])> {
                self.message().headers.iter()
            }

            fn has_header(&self, name: &str) -> bool {
                self.message().headers.contains(name)
            }

            fn header(&self, name: &str) -> &[String] {
                match self.message().headers.get(name) {
                    Some(value) => &value[..],
                    None => &[],
                }
            }

            fn header_line(&self, name: &str) -> String {
                self.message()
                    .headers
                    .get(name)
                    .map(|value| value.to_line())
                    .unwrap_or_default()
            }

            fn with_header<V: uhsapi::HeaderValues>(
                &self,
                name: &str,
                value: V,
            ) -> $crate::error::Result<Self> {
                let headers = &self.message().headers;
                let change = $crate::http::message::HeaderChange::replace(headers, name, value)?;
                Ok(self.change_headers(change))
            }

            fn with_added_header<V: uhsapi::HeaderValues>(
                &self,
                name: &str,
                value: V,
            ) -> $crate::error::Result<Self> {
                let change = $crate::http::message::HeaderChange::append(name, value)?;
                Ok(self.change_headers(change))
            }

            fn without_header(&self, name: &str) -> $crate::error::Result<Self> {
                let headers = &self.message().headers;
                let change = $crate::http::message::HeaderChange::remove(headers, name)?;
                Ok(self.change_headers(change))
            }

            fn body(&self) -> &Self::Body {
                &self.message().body
            }

            fn with_body(&self, body: Self::Body) -> Self {
                self.set_body(body)
            }
        }
    };
}

pub(crate) use impl_message;
