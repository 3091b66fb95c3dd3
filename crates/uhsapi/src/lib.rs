//! UHS API (Universal Http Server API)
//! is a project which aims to create a universal facade API for HTTP messages,
//! allowing developers to write components against these traits which will work with any
//! implementation of the message types, such as carbon_http_message.
//!
//! Every type behind these traits is an immutable value: `with_*` methods return a new value and
//! leave the receiver as it was.

pub mod ascii;
pub mod http;
pub mod io;
pub mod server;

pub use http::{
    HeaderValues, MessageInterface, RequestInterface, ResponseInterface, SameInstance,
    UriInterface,
};
pub use io::{StreamInterface, StreamMetadata, UploadStatus, UploadedFileInterface};
pub use server::{
    Attribute, Attributes, Params, ParsedBody, ServerRequestInterface, UploadedFileTree,
    UploadedFiles,
};
