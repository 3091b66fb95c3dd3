use std::{
    any::Any,
    collections::BTreeMap,
    fmt,
    sync::Arc,
};

use crate::{http::RequestInterface, io::UploadedFileInterface};

/// Flat string parameters: server environment, cookies, query string
pub type Params = BTreeMap<String, String>;

/// A type-erased value attached to a request
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Values derived from the request by the application, e.g. route matches
pub type Attributes = BTreeMap<String, Attribute>;

/// The deserialized request body
#[derive(Clone)]
pub enum ParsedBody {
    /// `application/x-www-form-urlencoded` or `multipart/form-data` fields
    Form(Params),
    /// Anything else the application produced from the body
    Custom(Attribute),
}

impl ParsedBody {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    pub fn as_form(&self) -> Option<&Params> {
        match self {
            Self::Form(params) => Some(params),
            Self::Custom(_) => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Form(_) => None,
            Self::Custom(value) => value.downcast_ref(),
        }
    }
}

impl fmt::Debug for ParsedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form(params) => f.debug_tuple("Form").field(params).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Uploaded files keep the shape of the form field names they were sent under,
/// e.g. `avatar`, `photos[]` or `docs[cv]`
#[derive(Debug, Clone)]
pub enum UploadedFileTree<F> {
    File(F),
    List(Vec<UploadedFileTree<F>>),
    Map(BTreeMap<String, UploadedFileTree<F>>),
}

impl<F> UploadedFileTree<F> {
    /// Every file in the tree, depth first
    pub fn files(&self) -> Vec<&F> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a F>) {
        match self {
            Self::File(file) => out.push(file),
            Self::List(list) => list.iter().for_each(|tree| tree.collect(out)),
            Self::Map(map) => map.values().for_each(|tree| tree.collect(out)),
        }
    }
}

pub type UploadedFiles<F> = BTreeMap<String, UploadedFileTree<F>>;

/// An incoming, server side request, with everything the server environment knows about it
pub trait ServerRequestInterface: RequestInterface {
    type UploadedFile: UploadedFileInterface;

    fn server_params(&self) -> &Params;

    fn cookie_params(&self) -> &Params;
    fn with_cookie_params(&self, cookies: Params) -> Self;

    fn query_params(&self) -> &Params;
    fn with_query_params(&self, query: Params) -> Self;

    fn uploaded_files(&self) -> &UploadedFiles<Self::UploadedFile>;
    fn with_uploaded_files(&self, files: UploadedFiles<Self::UploadedFile>) -> Self;

    fn parsed_body(&self) -> Option<&ParsedBody>;
    fn with_parsed_body(&self, body: Option<ParsedBody>) -> Self;

    fn attributes(&self) -> &Attributes;
    fn attribute<T: Any>(&self, name: &str) -> Option<&T>;
    fn with_attribute<T: Any + Send + Sync>(&self, name: &str, value: T) -> Self;
    fn without_attribute(&self, name: &str) -> Self;
}
