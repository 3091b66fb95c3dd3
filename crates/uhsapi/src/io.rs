use std::{fmt, io::SeekFrom, path::Path};

use bytes::Bytes;

use crate::http::SameInstance;

/// Metadata of the handle underneath a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    /// fopen style mode, e.g. `r+b`
    pub mode: String,
    pub seekable: bool,
    /// Where the handle came from: a path, or a pseudo uri like `memory://`
    pub uri: String,
}

impl StreamMetadata {
    pub fn new(mode: impl Into<String>, seekable: bool, uri: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            seekable,
            uri: uri.into(),
        }
    }

    pub fn is_readable(&self) -> bool {
        self.mode.contains(['r', '+'])
    }

    pub fn is_writable(&self) -> bool {
        self.mode.contains(['x', 'w', 'c', 'a', '+'])
    }

    /// Looks up a single entry by its key (`mode`, `seekable`, `uri`)
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "mode" => Some(self.mode.clone()),
            "seekable" => Some(self.seekable.to_string()),
            "uri" => Some(self.uri.clone()),
            _ => None,
        }
    }
}

/// A message body: a read/write/seek view over some handle.
///
/// Once the handle has been detached or closed every check answers false, and every operation
/// that needs the handle fails.
pub trait StreamInterface: Clone + SameInstance {
    type Error: std::error::Error;
    type Handle;

    /// Closes the handle, does nothing if it is already gone
    fn close(&self);
    /// Separates the handle from the stream, leaving the stream unusable
    fn detach(&self) -> Option<Self::Handle>;

    fn size(&self) -> Option<u64>;
    fn tell(&self) -> Result<u64, Self::Error>;
    fn eof(&self) -> bool;

    fn is_seekable(&self) -> bool;
    fn seek(&self, pos: SeekFrom) -> Result<u64, Self::Error>;
    fn rewind(&self) -> Result<(), Self::Error>;

    fn is_writable(&self) -> bool;
    fn write(&self, data: &[u8]) -> Result<usize, Self::Error>;

    fn is_readable(&self) -> bool;
    fn read(&self, len: usize) -> Result<Bytes, Self::Error>;
    /// Everything from the current position to the end
    fn contents(&self) -> Result<Bytes, Self::Error>;
    /// Everything from the start. Never fails: anything that goes wrong yields an empty buffer
    fn to_bytes(&self) -> Bytes;

    fn metadata(&self) -> Option<StreamMetadata>;
}

/// Outcome of a file upload, numbered like the codes servers hand to scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Ok = 0,
    /// Larger than the server wide limit
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    /// Stopped by a server extension
    Extension = 8,
}

impl UploadStatus {
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return None,
        })
    }

    pub const fn code(self) -> i64 {
        self as i64
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "there is no error, the file uploaded with success",
            Self::IniSize => "the uploaded file exceeds the server upload size limit",
            Self::FormSize => "the uploaded file exceeds the size limit given by the form",
            Self::Partial => "the uploaded file was only partially uploaded",
            Self::NoFile => "no file was uploaded",
            Self::NoTmpDir => "missing a temporary folder",
            Self::CantWrite => "failed to write file to disk",
            Self::Extension => "a server extension stopped the file upload",
        })
    }
}

/// A file received through a multipart form
pub trait UploadedFileInterface: Clone {
    type Error: std::error::Error;
    type Stream: StreamInterface;

    fn stream(&self) -> Result<Self::Stream, Self::Error>;
    /// Moves the file to `target`. Can only succeed once
    fn move_to(&self, target: &Path) -> Result<(), Self::Error>;

    fn size(&self) -> Option<u64>;
    fn error(&self) -> UploadStatus;
    fn client_filename(&self) -> Option<&str>;
    fn client_media_type(&self) -> Option<&str>;
}
