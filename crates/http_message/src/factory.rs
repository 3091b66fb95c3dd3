use std::{path::Path, sync::Arc};

use uhsapi::{Params, ServerRequestInterface, StreamMetadata, UploadStatus};

use crate::{
    error::Result,
    http::{
        FsMover, HttpVersion, RawHandle, Request, Response, ServerRequest, Stream, UploadMover,
        UploadSource, UploadedFile, Uri,
    },
};

/// Creates messages and their parts with shared defaults.
///
/// The factory is the configuration point of the crate: the protocol version given to every
/// request and response it creates, and the mover every uploaded file it creates is handed.
#[derive(Debug, Clone)]
pub struct HttpFactory {
    version: HttpVersion,
    mover: Arc<dyn UploadMover>,
}

impl Default for HttpFactory {
    fn default() -> Self {
        Self {
            version: HttpVersion::default(),
            mover: Arc::new(FsMover),
        }
    }
}

impl HttpFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protocol version of the messages this factory creates, `1.1` by default
    pub fn with_protocol_version(mut self, version: &str) -> Result<Self> {
        self.version = version.parse()?;
        Ok(self)
    }

    pub fn with_mover(mut self, mover: Arc<dyn UploadMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.version
    }

    pub fn create_request(&self, method: &str, uri: Uri) -> Result<Request> {
        Request::builder()
            .method(method)
            .uri(uri)
            .version(self.version.as_str())
            .build()
    }

    /// A server request with its query parameters taken from the uri
    pub fn create_server_request(
        &self,
        method: &str,
        uri: Uri,
        server_params: Params,
    ) -> Result<ServerRequest> {
        let query = uri.query_pairs().into_iter().collect::<Params>();
        let request = self.create_request(method, uri)?;
        Ok(ServerRequest::new(request, server_params).with_query_params(query))
    }

    pub fn create_response(&self, code: u16, reason_phrase: &str) -> Result<Response> {
        Response::builder()
            .status(code)
            .reason(reason_phrase)
            .version(self.version.as_str())
            .build()
    }

    /// An in-memory stream holding `content`
    pub fn create_stream(&self, content: &str) -> Stream {
        Stream::from_bytes(content.to_owned())
    }

    pub fn create_stream_from_file(&self, path: impl AsRef<Path>, mode: &str) -> Result<Stream> {
        Stream::open(path, mode)
    }

    pub fn create_stream_from_handle<H: RawHandle + 'static>(
        &self,
        handle: H,
        metadata: StreamMetadata,
    ) -> Stream {
        Stream::from_handle(handle, metadata)
    }

    pub fn create_uri(&self, uri: &str) -> Result<Uri> {
        Uri::parse(uri)
    }

    pub fn create_uploaded_file(
        &self,
        source: impl Into<UploadSource>,
        size: Option<u64>,
        status: UploadStatus,
        client_filename: Option<&str>,
        client_media_type: Option<&str>,
    ) -> UploadedFile {
        let mut file = UploadedFile::new(source, size, status).with_mover(self.mover.clone());
        if let Some(filename) = client_filename {
            file = file.with_client_filename(filename);
        }
        if let Some(media_type) = client_media_type {
            file = file.with_client_media_type(media_type);
        }
        file
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::PathBuf, sync::Mutex};

    use uhsapi::{
        MessageInterface, RequestInterface, ResponseInterface, ServerRequestInterface,
        StreamInterface, UploadedFileInterface,
    };

    use super::*;

    #[derive(Debug, Default)]
    struct CountingMover(Mutex<usize>);

    impl UploadMover for CountingMover {
        fn move_file(&self, _from: &Path, _to: &Path) -> std::io::Result<()> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_create_request() {
        let factory = HttpFactory::new();
        let request = factory
            .create_request("PUT", factory.create_uri("http://example.com/x").unwrap())
            .unwrap();
        assert_eq!(request.method(), "PUT");
        assert_eq!(request.header_line("Host"), "example.com");
        assert_eq!(request.protocol_version(), "1.1");
    }

    #[test]
    fn test_protocol_version_applies() {
        let factory = HttpFactory::new().with_protocol_version("2").unwrap();
        assert_eq!(factory.protocol_version(), HttpVersion::HTTP_2);
        let uri = Uri::default();
        assert_eq!(factory.create_request("GET", uri).unwrap().protocol_version(), "2");
        assert_eq!(factory.create_response(204, "").unwrap().protocol_version(), "2");
        assert!(HttpFactory::new().with_protocol_version("1.2").is_err());
    }

    #[test]
    fn test_create_server_request() {
        let factory = HttpFactory::new();
        let uri = factory.create_uri("http://example.com/search?q=rust+lang&page=2").unwrap();
        let request = factory.create_server_request("GET", uri, Params::new()).unwrap();
        assert_eq!(request.query_params().get("q").map(String::as_str), Some("rust lang"));
        assert_eq!(request.query_params().get("page").map(String::as_str), Some("2"));
        assert!(request.server_params().is_empty());
    }

    #[test]
    fn test_create_response() {
        let factory = HttpFactory::new();
        let response = factory.create_response(418, "").unwrap();
        assert_eq!(response.reason_phrase(), "I'm a teapot");
        let response = factory.create_response(200, "Fine").unwrap();
        assert_eq!(response.reason_phrase(), "Fine");
        assert!(factory.create_response(99, "").is_err());
    }

    #[test]
    fn test_create_streams() {
        let factory = HttpFactory::new();
        assert_eq!(factory.create_stream("content").to_string(), "content");

        let stream = factory.create_stream_from_handle(
            Cursor::new(b"handle".to_vec()),
            StreamMetadata::new("r", true, "cursor://"),
        );
        assert!(!stream.is_writable());
        assert_eq!(stream.to_string(), "handle");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        let stream = factory.create_stream_from_file(&path, "w+").unwrap();
        stream.write(b"abc").unwrap();
        assert_eq!(stream.to_string(), "abc");
        assert!(factory.create_stream_from_file(&path, "z").is_err());
    }

    #[test]
    fn test_uploaded_files_use_configured_mover() {
        let mover = Arc::new(CountingMover::default());
        let factory = HttpFactory::new().with_mover(mover.clone());
        let file = factory.create_uploaded_file(
            PathBuf::from("/incoming/upload"),
            Some(10),
            UploadStatus::Ok,
            Some("report.pdf"),
            Some("application/pdf"),
        );
        assert_eq!(file.client_filename(), Some("report.pdf"));
        assert_eq!(file.client_media_type(), Some("application/pdf"));

        let dir = tempfile::tempdir().unwrap();
        file.move_to(&dir.path().join("report.pdf")).unwrap();
        assert_eq!(*mover.0.lock().unwrap(), 1);
    }
}
