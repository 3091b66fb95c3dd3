use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use uhsapi::{StreamInterface, UploadStatus, UploadedFileInterface};

use crate::{
    error::{Error, IllegalState, InvalidArgument, Result},
    http::Stream,
};

/// Size of the chunks a stream upload is copied in
pub const COPY_CHUNK_SIZE: usize = 4096;

/// Moves an uploaded file that is still sitting at a path
pub trait UploadMover: Send + Sync + fmt::Debug {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Renames the file, falling back to a copy when the target is on another device
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl UploadMover for FsMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!("rename across devices, copying {} instead", from.display());
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
            Err(err) => Err(err),
        }
    }
}

/// Where the contents of an upload live
#[derive(Debug, Clone)]
pub enum UploadSource {
    Stream(Stream),
    Path(PathBuf),
}

impl From<Stream> for UploadSource {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_owned())
    }
}

/// A file received through a multipart form.
///
/// Clones refer to the same upload: once one of them is moved, all of them are.
#[derive(Clone)]
pub struct UploadedFile {
    source: UploadSource,
    size: Option<u64>,
    status: UploadStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    mover: Arc<dyn UploadMover>,
    moved: Arc<AtomicBool>,
}

impl UploadedFile {
    pub fn new(source: impl Into<UploadSource>, size: Option<u64>, status: UploadStatus) -> Self {
        Self {
            source: source.into(),
            size,
            status,
            client_filename: None,
            client_media_type: None,
            mover: Arc::new(FsMover),
            moved: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Same as [`UploadedFile::new`], taking the raw numeric status code
    pub fn with_status_code(
        source: impl Into<UploadSource>,
        size: Option<u64>,
        code: i64,
    ) -> Result<Self> {
        let status = UploadStatus::from_code(code).ok_or(InvalidArgument::UploadStatus(code))?;
        Ok(Self::new(source, size, status))
    }

    pub fn with_client_filename(mut self, filename: impl Into<String>) -> Self {
        self.client_filename = Some(filename.into());
        self
    }

    pub fn with_client_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.client_media_type = Some(media_type.into());
        self
    }

    pub fn with_mover(mut self, mover: Arc<dyn UploadMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::Acquire)
    }

    fn ensure_available(&self) -> Result<(), IllegalState> {
        if !self.status.is_ok() {
            return Err(IllegalState::UploadFailed(self.status));
        }
        if self.is_moved() {
            return Err(IllegalState::AlreadyMoved);
        }
        Ok(())
    }
}

/// The directory a move goes into must exist and accept writes
fn check_target_directory(target: &Path) -> Result<(), IllegalState> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let writable =
        fs::metadata(dir).is_ok_and(|meta| meta.is_dir() && !meta.permissions().readonly());
    if !writable {
        return Err(IllegalState::TargetDirectory(dir.to_owned()));
    }
    Ok(())
}

fn copy_stream(stream: &Stream, target: &Path) -> Result<()> {
    if stream.is_seekable() {
        stream.rewind()?;
    }
    let mut file = fs::File::create(target)?;
    loop {
        let chunk = stream.read(COPY_CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        file.write_all(&chunk)?;
    }
    file.flush()?;
    Ok(())
}

impl UploadedFileInterface for UploadedFile {
    type Error = Error;
    type Stream = Stream;

    fn stream(&self) -> Result<Stream> {
        self.ensure_available()?;
        match &self.source {
            UploadSource::Stream(stream) => Ok(stream.clone()),
            UploadSource::Path(path) => Stream::open(path, "r"),
        }
    }

    fn move_to(&self, target: &Path) -> Result<()> {
        if self.is_moved() {
            return Err(IllegalState::AlreadyMoved.into());
        }
        if !self.status.is_ok() {
            return Err(IllegalState::UploadFailed(self.status).into());
        }
        if target.as_os_str().is_empty() {
            return Err(InvalidArgument::TargetPath.into());
        }
        check_target_directory(target)?;

        match &self.source {
            UploadSource::Stream(stream) => copy_stream(stream, target)?,
            UploadSource::Path(path) => self.mover.move_file(path, target)?,
        }
        self.moved.store(true, Ordering::Release);
        log::debug!("moved uploaded file to {}", target.display());
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn error(&self) -> UploadStatus {
        self.status
    }

    fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("source", &self.source)
            .field("size", &self.size)
            .field("status", &self.status)
            .field("client_filename", &self.client_filename)
            .field("client_media_type", &self.client_media_type)
            .field("moved", &self.is_moved())
            .finish()
    }
}
