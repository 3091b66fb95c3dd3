//! Immutable HTTP message value objects: requests, server requests, responses, URIs,
//! body streams and uploaded files, implementing the [`uhsapi`] interfaces.
//!
//! Every `with_*` method returns a new value and leaves the receiver untouched. When the
//! change would not be observable the receiver itself is handed back, which
//! [`SameInstance::same_instance`](uhsapi::SameInstance::same_instance) reports.
//!
//! ```
//! use carbon_http_message::{Request, prelude::*};
//!
//! let request = Request::new("GET", "http://example.com/search?q=rust").unwrap();
//! assert_eq!(request.header_line("host"), "example.com");
//! assert_eq!(request.request_target(), "/search?q=rust");
//!
//! let same = request.with_method("GET").unwrap();
//! assert!(same.same_instance(&request));
//! ```

pub mod error;
pub mod factory;
pub mod http;

pub use error::{Error, IllegalState, InvalidArgument, Result};
pub use factory::HttpFactory;
pub use http::{
    FsMover, HttpVersion, Method, Request, RequestBuilder, Response, ResponseBuilder,
    ServerRequest, StatusCode, Stream, UploadMover, UploadSource, UploadedFile, Uri,
};

/// The interface traits, needed in scope to call the message methods
pub mod prelude {
    pub use uhsapi::{
        MessageInterface, RequestInterface, ResponseInterface, SameInstance,
        ServerRequestInterface, StreamInterface, UploadedFileInterface, UriInterface,
    };
}

static_assertions::assert_impl_all!(Request: Send, Sync, Clone);
static_assertions::assert_impl_all!(ServerRequest: Send, Sync, Clone);
static_assertions::assert_impl_all!(Response: Send, Sync, Clone);
static_assertions::assert_impl_all!(Uri: Send, Sync, Clone);
static_assertions::assert_impl_all!(Stream: Send, Sync, Clone);
static_assertions::assert_impl_all!(UploadedFile: Send, Sync, Clone);
static_assertions::assert_impl_all!(HttpFactory: Send, Sync, Clone);
