pub mod header;
pub(crate) mod message;
pub mod method;
pub mod request;
pub mod response;
pub mod stream;
pub mod upload;
pub mod uri;

mod version;
pub use method::Method;
pub use request::{Request, RequestBuilder, ServerRequest, TargetForm};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use stream::{BoxedHandle, RawHandle, Stream};
pub use upload::{FsMover, UploadMover, UploadSource, UploadedFile};
pub use uri::Uri;
pub use version::HttpVersion;
