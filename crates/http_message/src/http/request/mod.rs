use std::sync::Arc;

mod builder;
mod server;
mod target;
pub use builder::RequestBuilder;
pub use server::ServerRequest;
pub use target::TargetForm;
use uhsapi::{RequestInterface, SameInstance, UriInterface};

use crate::{
    error::{InvalidArgument, Result},
    http::{
        HttpVersion, Stream,
        header::{HeaderMap, HeaderName, HeaderValue},
        message::{MessageComponent, MessageParts, impl_message},
        method::Method,
        uri::Uri,
    },
};

/// An outgoing HTTP request.
///
/// Requests are immutable, every `with_*` method returns a new request and leaves the
/// receiver as it was. Cloning is cheap and yields the same instance.
#[derive(Debug, Clone)]
pub struct Request {
    inner: Arc<RequestParts>,
}

#[derive(Debug, Clone)]
struct RequestParts {
    message: MessageParts,
    method: Method,
    uri: Uri,
    /// Explicit target, takes precedence over the one derived from the uri
    target: Option<String>,
}

/// The `Host` header value for a uri, `None` if the uri has no host
fn host_header(uri: &Uri) -> Result<Option<(HeaderName, HeaderValue)>, InvalidArgument> {
    if uri.host().is_empty() {
        return Ok(None);
    }
    let mut host = uri.host().to_owned();
    if let Some(port) = uri.port() {
        host.push(':');
        host.push_str(&port.to_string());
    }
    let name = HeaderName::parse(HeaderName::HOST)?;
    let value = HeaderValue::parse(&name, vec![host])?;
    Ok(Some((name, value)))
}

impl Request {
    /// Creates a request with an empty body and the default protocol version
    pub fn new(method: &str, uri: &str) -> Result<Self> {
        Self::builder().method(method).uri(uri).build()
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Assembles a request, synthesizing `Host` from the uri if the headers lack one
    pub(crate) fn from_parts(
        method: Method,
        uri: Uri,
        version: HttpVersion,
        mut headers: HeaderMap,
        body: Stream,
    ) -> Result<Self> {
        if !headers.contains(HeaderName::HOST) {
            if let Some((name, value)) = host_header(&uri)? {
                log::trace!("synthesized host header {:?} from uri", value.to_line());
                headers.replace_first(name, value);
            }
        }
        Ok(Self {
            inner: Arc::new(RequestParts {
                message: MessageParts::new(version, headers, body),
                method,
                uri,
                target: None,
            }),
        })
    }

    /// The form of the current request target, if it fits any
    pub fn target_form(&self) -> Option<TargetForm> {
        TargetForm::of(&self.request_target())
    }

    fn update(&self, f: impl FnOnce(&mut RequestParts)) -> Self {
        let mut request = self.clone();
        f(Arc::make_mut(&mut request.inner));
        request
    }
}

impl SameInstance for Request {
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl MessageComponent for Request {
    fn message(&self) -> &MessageParts {
        &self.inner.message
    }

    fn map_message(&self, f: impl FnOnce(&mut MessageParts)) -> Self {
        self.update(|parts| f(&mut parts.message))
    }
}

impl_message!(Request);

impl RequestInterface for Request {
    type Uri = Uri;

    fn request_target(&self) -> String {
        match &self.inner.target {
            Some(target) => target.clone(),
            None => target::derive(&self.inner.uri),
        }
    }

    fn with_request_target(&self, target: &str) -> Result<Self> {
        target::validate(target)?;
        if self.inner.target.as_deref() == Some(target) {
            return Ok(self.clone());
        }
        log::trace!("overriding request target with {target:?}");
        Ok(self.update(|parts| parts.target = Some(target.to_owned())))
    }

    fn method(&self) -> &str {
        self.inner.method.as_str()
    }

    fn with_method(&self, method: &str) -> Result<Self> {
        let method = Method::parse(method)?;
        if self.inner.method == method {
            return Ok(self.clone());
        }
        Ok(self.update(|parts| parts.method = method))
    }

    fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self> {
        if self.inner.uri == uri {
            return Ok(self.clone());
        }
        let keep_host = preserve_host && self.inner.message.headers.contains(HeaderName::HOST);
        let host = if keep_host { None } else { host_header(&uri)? };
        Ok(self.update(|parts| {
            if let Some((name, value)) = host {
                log::trace!("updating host header to {:?}", value.to_line());
                parts.message.headers.replace_first(name, value);
            }
            parts.uri = uri;
        }))
    }
}
