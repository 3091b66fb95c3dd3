use std::{any::Any, fmt, sync::Arc};

use uhsapi::{
    Attributes, Params, ParsedBody, RequestInterface, SameInstance, ServerRequestInterface,
    UploadedFiles,
};

use crate::{
    error::Result,
    http::{
        message::{MessageComponent, MessageParts, impl_message},
        request::Request,
        upload::UploadedFile,
        uri::Uri,
    },
};

/// An incoming request as seen by the server, together with what the environment knows
/// about it
#[derive(Clone)]
pub struct ServerRequest {
    request: Request,
    server: Arc<ServerParts>,
}

#[derive(Clone, Default)]
struct ServerParts {
    server_params: Params,
    cookie_params: Params,
    query_params: Params,
    uploaded_files: UploadedFiles<UploadedFile>,
    parsed_body: Option<ParsedBody>,
    attributes: Attributes,
}

impl ServerRequest {
    pub fn new(request: Request, server_params: Params) -> Self {
        Self {
            request,
            server: Arc::new(ServerParts {
                server_params,
                ..Default::default()
            }),
        }
    }

    /// The plain request underneath
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Applies a request operation, keeping the instance when the request is unchanged
    fn map_request(&self, request: Request) -> Self {
        if request.same_instance(&self.request) {
            return self.clone();
        }
        Self {
            request,
            server: self.server.clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut ServerParts)) -> Self {
        let mut server = self.server.clone();
        f(Arc::make_mut(&mut server));
        Self {
            request: self.request.clone(),
            server,
        }
    }
}

impl SameInstance for ServerRequest {
    fn same_instance(&self, other: &Self) -> bool {
        self.request.same_instance(&other.request) && Arc::ptr_eq(&self.server, &other.server)
    }
}

impl MessageComponent for ServerRequest {
    fn message(&self) -> &MessageParts {
        self.request.message()
    }

    fn map_message(&self, f: impl FnOnce(&mut MessageParts)) -> Self {
        self.map_request(self.request.map_message(f))
    }
}

impl_message!(ServerRequest);

impl RequestInterface for ServerRequest {
    type Uri = Uri;

    fn request_target(&self) -> String {
        self.request.request_target()
    }

    fn with_request_target(&self, target: &str) -> Result<Self> {
        Ok(self.map_request(self.request.with_request_target(target)?))
    }

    fn method(&self) -> &str {
        self.request.method()
    }

    fn with_method(&self, method: &str) -> Result<Self> {
        Ok(self.map_request(self.request.with_method(method)?))
    }

    fn uri(&self) -> &Uri {
        self.request.uri()
    }

    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self> {
        Ok(self.map_request(self.request.with_uri(uri, preserve_host)?))
    }
}

impl ServerRequestInterface for ServerRequest {
    type UploadedFile = UploadedFile;

    fn server_params(&self) -> &Params {
        &self.server.server_params
    }

    fn cookie_params(&self) -> &Params {
        &self.server.cookie_params
    }

    fn with_cookie_params(&self, cookies: Params) -> Self {
        self.update(|parts| parts.cookie_params = cookies)
    }

    fn query_params(&self) -> &Params {
        &self.server.query_params
    }

    fn with_query_params(&self, query: Params) -> Self {
        self.update(|parts| parts.query_params = query)
    }

    fn uploaded_files(&self) -> &UploadedFiles<UploadedFile> {
        &self.server.uploaded_files
    }

    fn with_uploaded_files(&self, files: UploadedFiles<UploadedFile>) -> Self {
        self.update(|parts| parts.uploaded_files = files)
    }

    fn parsed_body(&self) -> Option<&ParsedBody> {
        self.server.parsed_body.as_ref()
    }

    fn with_parsed_body(&self, body: Option<ParsedBody>) -> Self {
        self.update(|parts| parts.parsed_body = body)
    }

    fn attributes(&self) -> &Attributes {
        &self.server.attributes
    }

    fn attribute<T: Any>(&self, name: &str) -> Option<&T> {
        self.server.attributes.get(name)?.downcast_ref()
    }

    fn with_attribute<T: Any + Send + Sync>(&self, name: &str, value: T) -> Self {
        self.update(|parts| {
            parts.attributes.insert(name.to_owned(), Arc::new(value));
        })
    }

    fn without_attribute(&self, name: &str) -> Self {
        if !self.server.attributes.contains_key(name) {
            return self.clone();
        }
        self.update(|parts| {
            parts.attributes.remove(name);
        })
    }
}

impl fmt::Debug for ServerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequest")
            .field("request", &self.request)
            .field("server_params", &self.server.server_params)
            .field("cookie_params", &self.server.cookie_params)
            .field("query_params", &self.server.query_params)
            .field("uploaded_files", &self.server.uploaded_files)
            .field("parsed_body", &self.server.parsed_body)
            .field("attributes", &self.server.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use uhsapi::{MessageInterface, UploadStatus, UploadedFileTree};

    use super::*;
    use crate::http::Stream;

    fn server_request() -> ServerRequest {
        let mut server = Params::new();
        server.insert("REMOTE_ADDR".into(), "127.0.0.1".into());
        ServerRequest::new(
            Request::new("POST", "http://example.com/form?a=1").unwrap(),
            server,
        )
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_server_params() {
        let request = server_request();
        assert_eq!(
            request.server_params().get("REMOTE_ADDR").map(String::as_str),
            Some("127.0.0.1")
        );
        assert!(request.cookie_params().is_empty());
        assert!(request.query_params().is_empty());
        assert!(request.uploaded_files().is_empty());
        assert!(request.parsed_body().is_none());
        assert!(request.attributes().is_empty());
    }

    #[test]
    fn test_with_params_return_new_instances() {
        let request = server_request();
        let cookies = request.with_cookie_params(params(&[("session", "abc")]));
        assert!(!cookies.same_instance(&request));
        assert_eq!(cookies.cookie_params(), &params(&[("session", "abc")]));
        assert!(request.cookie_params().is_empty());

        let query = request.with_query_params(params(&[("a", "1")]));
        assert_eq!(query.query_params(), &params(&[("a", "1")]));
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn test_uploaded_files() {
        let request = server_request();
        let file = UploadedFile::new(Stream::from_bytes("data"), Some(4), UploadStatus::Ok);
        let mut files = UploadedFiles::new();
        files.insert(
            "photos".to_string(),
            UploadedFileTree::List(vec![UploadedFileTree::File(file)]),
        );
        let next = request.with_uploaded_files(files);
        assert_eq!(next.uploaded_files()["photos"].files().len(), 1);
        assert!(request.uploaded_files().is_empty());
    }

    #[test]
    fn test_parsed_body() {
        let request = server_request();
        let form = request.with_parsed_body(Some(ParsedBody::Form(params(&[("name", "x")]))));
        assert_eq!(
            form.parsed_body().and_then(ParsedBody::as_form),
            Some(&params(&[("name", "x")]))
        );
        let cleared = form.with_parsed_body(None);
        assert!(cleared.parsed_body().is_none());
    }

    #[test]
    fn test_attributes() {
        let request = server_request();
        let next = request.with_attribute("user_id", 42u32);
        assert_eq!(next.attribute::<u32>("user_id"), Some(&42));
        assert_eq!(next.attribute::<String>("user_id"), None);
        assert_eq!(next.attribute::<u32>("missing"), None);
        assert!(request.attribute::<u32>("user_id").is_none());

        assert!(next.same_instance(&next.without_attribute("missing")));
        let removed = next.without_attribute("user_id");
        assert!(!removed.same_instance(&next));
        assert!(removed.attributes().is_empty());
    }

    #[test]
    fn test_request_operations_delegate() {
        let request = server_request().with_cookie_params(params(&[("c", "1")]));
        assert_eq!(request.method(), "POST");
        assert_eq!(request.header_line("Host"), "example.com");
        assert_eq!(request.request_target(), "/form?a=1");

        assert!(request.same_instance(&request.with_method("POST").unwrap()));
        assert!(request.same_instance(&request.with_header("Host", "example.com").unwrap()));
        assert!(request.same_instance(&request.without_header("X-Missing").unwrap()));
        assert!(request.same_instance(&request.with_body(request.body().clone())));

        let changed = request.with_header("X-Foo", "bar").unwrap();
        assert!(!changed.same_instance(&request));
        assert_eq!(changed.header_line("x-foo"), "bar");
        // Server side state carries over
        assert_eq!(changed.cookie_params(), request.cookie_params());

        let target = request.with_request_target("*").unwrap();
        assert_eq!(target.request_target(), "*");
        assert!(request.with_method("BAD METHOD").is_err());
    }

    #[test]
    fn test_clone_is_same_instance() {
        let request = server_request();
        assert!(request.same_instance(&request.clone()));
        assert!(!request.same_instance(&server_request()));
    }
}
