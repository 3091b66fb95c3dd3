use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use uhsapi::{SameInstance, StreamInterface, StreamMetadata};

use crate::error::{Error, IllegalState, InvalidArgument};

/// Anything a [`Stream`] can sit on top of. Handles that cannot actually seek should be
/// wrapped with `seekable: false` in their metadata
pub trait RawHandle: Read + Write + Seek + Send + fmt::Debug {}

impl<T: Read + Write + Seek + Send + fmt::Debug> RawHandle for T {}

pub type BoxedHandle = Box<dyn RawHandle>;

const MEMORY_URI: &str = "memory://";

/// A message body over a shared handle.
///
/// Clones share the handle and its position, the same way a body is shared between a message
/// and the messages derived from it. Wrapping one OS handle in two separately constructed
/// streams is not coordinated in any way and is up to the caller to avoid.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<StreamState>>,
}

struct StreamState {
    handle: Option<BoxedHandle>,
    metadata: StreamMetadata,
    eof: bool,
}

impl StreamState {
    fn attached(&mut self) -> Result<&mut BoxedHandle, IllegalState> {
        self.handle.as_mut().ok_or(IllegalState::NoResource)
    }
}

/// Translates an fopen style mode into open options
/// `r r+ w w+ a a+ x x+ c c+`, each optionally followed by `b` or `t`
fn open_options(mode: &str) -> Result<OpenOptions, InvalidArgument> {
    let invalid = || InvalidArgument::StreamMode(mode.to_owned());
    let base = mode.trim_end_matches(['b', 't']);
    let (kind, update) = match base.as_bytes() {
        [kind] => (*kind, false),
        [kind, b'+'] => (*kind, true),
        _ => return Err(invalid()),
    };

    let mut options = OpenOptions::new();
    match kind {
        b'r' => options.read(true).write(update),
        b'w' => options.write(true).create(true).truncate(true).read(update),
        b'a' => options.append(true).create(true).read(update),
        b'x' => options.write(true).create_new(true).read(update),
        b'c' => options.write(true).create(true).read(update),
        _ => return Err(invalid()),
    };
    Ok(options)
}

impl Stream {
    pub fn from_handle<H: RawHandle + 'static>(handle: H, metadata: StreamMetadata) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StreamState {
                handle: Some(Box::new(handle)),
                metadata,
                eof: false,
            })),
        }
    }

    pub fn memory() -> Self {
        Self::from_handle(
            Cursor::new(Vec::new()),
            StreamMetadata::new("w+b", true, MEMORY_URI),
        )
    }

    /// An in-memory stream holding `data`, positioned at the start
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        Self::from_handle(
            Cursor::new(data.to_vec()),
            StreamMetadata::new("w+b", true, MEMORY_URI),
        )
    }

    /// Opens a file with an fopen style mode
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let file: File = open_options(mode)?.open(path)?;
        log::trace!("opened stream on {} with mode {mode}", path.display());
        Ok(Self::from_handle(
            file,
            StreamMetadata::new(mode, true, path.to_string_lossy()),
        ))
    }

    /// Looks up a single metadata entry, `None` when detached or for unknown keys
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        let state = self.state();
        state.handle.as_ref()?;
        state.metadata.get(key)
    }

    fn state(&self) -> MutexGuard<'_, StreamState> {
        // A panic halfway through an operation leaves nothing we cannot keep using
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SameInstance for Stream {
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl StreamInterface for Stream {
    type Error = Error;
    type Handle = BoxedHandle;

    fn close(&self) {
        if let Some(handle) = self.state().handle.take() {
            log::debug!("closing stream {:?}", handle);
            drop(handle);
        }
    }

    fn detach(&self) -> Option<BoxedHandle> {
        let handle = self.state().handle.take();
        if handle.is_some() {
            log::debug!("detached stream handle");
        }
        handle
    }

    fn size(&self) -> Option<u64> {
        let mut state = self.state();
        if !state.metadata.seekable {
            return None;
        }
        let handle = state.handle.as_mut()?;
        let pos = handle.stream_position().ok()?;
        let end = handle.seek(SeekFrom::End(0)).ok()?;
        handle.seek(SeekFrom::Start(pos)).ok()?;
        Some(end)
    }

    fn tell(&self) -> Result<u64, Error> {
        Ok(self.state().attached()?.stream_position()?)
    }

    fn eof(&self) -> bool {
        let state = self.state();
        state.handle.is_none() || state.eof
    }

    fn is_seekable(&self) -> bool {
        let state = self.state();
        state.handle.is_some() && state.metadata.seekable
    }

    fn seek(&self, pos: SeekFrom) -> Result<u64, Error> {
        let mut state = self.state();
        let seekable = state.metadata.seekable;
        let handle = state.attached()?;
        if !seekable {
            return Err(IllegalState::NotSeekable.into());
        }
        let offset = handle.seek(pos)?;
        state.eof = false;
        Ok(offset)
    }

    fn rewind(&self) -> Result<(), Error> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn is_writable(&self) -> bool {
        let state = self.state();
        state.handle.is_some() && state.metadata.is_writable()
    }

    fn write(&self, data: &[u8]) -> Result<usize, Error> {
        let mut state = self.state();
        let writable = state.metadata.is_writable();
        let handle = state.attached()?;
        if !writable {
            return Err(IllegalState::NotWritable.into());
        }
        handle.write_all(data)?;
        Ok(data.len())
    }

    fn is_readable(&self) -> bool {
        let state = self.state();
        state.handle.is_some() && state.metadata.is_readable()
    }

    fn read(&self, len: usize) -> Result<Bytes, Error> {
        let mut state = self.state();
        let readable = state.metadata.is_readable();
        let handle = state.attached()?;
        if !readable {
            return Err(IllegalState::NotReadable.into());
        }
        let mut buf = vec![0; len];
        let n = handle.read(&mut buf)?;
        buf.truncate(n);
        state.eof = n < len;
        Ok(Bytes::from(buf))
    }

    fn contents(&self) -> Result<Bytes, Error> {
        let mut state = self.state();
        let readable = state.metadata.is_readable();
        let handle = state.attached()?;
        if !readable {
            return Err(IllegalState::NotReadable.into());
        }
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf)?;
        state.eof = true;
        Ok(Bytes::from(buf))
    }

    fn to_bytes(&self) -> Bytes {
        let mut state = self.state();
        let seekable = state.metadata.seekable;
        let readable = state.metadata.is_readable();
        let Some(handle) = state.handle.as_mut() else {
            return Bytes::new();
        };
        if !readable {
            return Bytes::new();
        }
        if seekable {
            if let Err(err) = handle.seek(SeekFrom::Start(0)) {
                log::warn!("could not rewind stream for conversion: {err}");
                return Bytes::new();
            }
        }
        let mut buf = Vec::new();
        if let Err(err) = handle.read_to_end(&mut buf) {
            log::warn!("could not read stream for conversion: {err}");
            return Bytes::new();
        }
        state.eof = true;
        Bytes::from(buf)
    }

    fn metadata(&self) -> Option<StreamMetadata> {
        let state = self.state();
        state.handle.as_ref().map(|_| state.metadata.clone())
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Stream")
            .field("metadata", &state.metadata)
            .field("attached", &state.handle.is_some())
            .field("eof", &state.eof)
            .finish()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::memory()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn no_resource<T: fmt::Debug>(res: Result<T, Error>) -> bool {
        matches!(res, Err(Error::IllegalState(IllegalState::NoResource)))
    }

    #[derive(Debug)]
    struct Pipe(Cursor<Vec<u8>>);

    impl Read for Pipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Pipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("read only pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for Pipe {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::other("pipes cannot seek"))
        }
    }

    #[test]
    fn test_memory_read_write() {
        let stream = Stream::memory();
        assert!(stream.is_readable());
        assert!(stream.is_writable());
        assert!(stream.is_seekable());
        assert_eq!(stream.write(b"hello world").unwrap(), 11);
        assert_eq!(stream.tell().unwrap(), 11);
        assert_eq!(stream.size(), Some(11));
        // size does not move the position
        assert_eq!(stream.tell().unwrap(), 11);

        stream.rewind().unwrap();
        assert_eq!(&stream.read(5).unwrap()[..], b"hello");
        assert!(!stream.eof());
        assert_eq!(&stream.contents().unwrap()[..], b" world");
        assert!(stream.eof());
        stream.seek(SeekFrom::Start(6)).unwrap();
        assert!(!stream.eof());
        assert_eq!(&stream.read(100).unwrap()[..], b"world");
        assert!(stream.eof());
    }

    #[test]
    fn test_from_bytes_starts_at_zero() {
        let stream = Stream::from_bytes("payload");
        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(stream.to_string(), "payload");
        assert_eq!(&stream.to_bytes()[..], b"payload");
    }

    #[test]
    fn test_to_string_rewinds() {
        let stream = Stream::from_bytes("abcdef");
        stream.read(3).unwrap();
        assert_eq!(stream.to_string(), "abcdef");
    }

    #[test]
    fn test_to_bytes_races_detach() {
        let stream = Stream::from_bytes("0123456789");
        stream.read(4).unwrap();
        let reader = stream.clone();
        let worker = std::thread::spawn(move || {
            (0..100).map(|_| reader.to_bytes()).collect::<Vec<_>>()
        });
        stream.detach();
        for bytes in worker.join().unwrap() {
            assert!(bytes.is_empty() || &bytes[..] == b"0123456789", "{bytes:?}");
        }
        assert!(stream.to_bytes().is_empty());
    }

    #[test]
    fn test_detach() {
        let stream = Stream::from_bytes("data");
        let handle = stream.detach();
        assert!(handle.is_some());
        assert!(stream.detach().is_none());

        assert_eq!(stream.size(), None);
        assert!(stream.eof());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert!(stream.metadata().is_none());
        assert_eq!(stream.metadata_value("mode"), None);
        assert!(no_resource(stream.tell()));
        assert!(no_resource(stream.seek(SeekFrom::Start(0))));
        assert!(no_resource(stream.rewind()));
        assert!(no_resource(stream.write(b"x")));
        assert!(no_resource(stream.read(1)));
        assert!(no_resource(stream.contents()));
        assert_eq!(stream.to_string(), "");
    }

    #[test]
    fn test_close_is_idempotent() {
        let stream = Stream::from_bytes("data");
        stream.close();
        stream.close();
        assert!(stream.detach().is_none());
        assert!(no_resource(stream.read(1)));
    }

    #[test]
    fn test_clones_share_the_handle() {
        let stream = Stream::memory();
        let other = stream.clone();
        assert!(stream.same_instance(&other));
        other.write(b"shared").unwrap();
        assert_eq!(stream.tell().unwrap(), 6);
        other.close();
        assert!(!stream.is_readable());
        assert!(!stream.same_instance(&Stream::memory()));
    }

    #[test]
    fn test_mode_decides_capabilities() {
        let stream = Stream::from_handle(
            Cursor::new(b"read only".to_vec()),
            StreamMetadata::new("r", true, "memory://"),
        );
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(matches!(
            stream.write(b"x"),
            Err(Error::IllegalState(IllegalState::NotWritable))
        ));

        let stream = Stream::from_handle(
            Cursor::new(Vec::new()),
            StreamMetadata::new("w", true, "memory://"),
        );
        assert!(!stream.is_readable());
        assert!(matches!(
            stream.read(1),
            Err(Error::IllegalState(IllegalState::NotReadable))
        ));
        assert!(matches!(
            stream.contents(),
            Err(Error::IllegalState(IllegalState::NotReadable))
        ));
        stream.write(b"hidden").unwrap();
        assert_eq!(stream.to_string(), "");
    }

    #[test]
    fn test_unseekable_handle() {
        let stream = Stream::from_handle(
            Pipe(Cursor::new(b"streamed".to_vec())),
            StreamMetadata::new("r", false, "pipe://"),
        );
        assert!(!stream.is_seekable());
        assert_eq!(stream.size(), None);
        assert!(matches!(
            stream.seek(SeekFrom::Start(0)),
            Err(Error::IllegalState(IllegalState::NotSeekable))
        ));
        assert!(matches!(stream.tell(), Err(Error::Io(_))));
        // Without a rewind it converts what is left
        assert_eq!(&stream.read(3).unwrap()[..], b"str");
        assert_eq!(stream.to_string(), "eamed");
    }

    #[test]
    fn test_metadata() {
        let stream = Stream::memory();
        let metadata = stream.metadata().unwrap();
        assert_eq!(metadata.mode, "w+b");
        assert!(metadata.seekable);
        assert_eq!(metadata.uri, "memory://");
        assert_eq!(stream.metadata_value("seekable").as_deref(), Some("true"));
        assert_eq!(stream.metadata_value("unknown"), None);
    }

    #[test]
    fn test_open_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");

        let stream = Stream::open(&path, "w+b").unwrap();
        stream.write(b"file contents").unwrap();
        assert_eq!(stream.to_string(), "file contents");
        assert_eq!(stream.metadata_value("uri").as_deref(), Some(path.to_str().unwrap()));
        stream.close();

        let stream = Stream::open(&path, "r").unwrap();
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert_eq!(stream.size(), Some(13));
        assert_eq!(stream.to_string(), "file contents");

        let stream = Stream::open(&path, "a").unwrap();
        stream.write(b"!").unwrap();
        stream.close();
        assert_eq!(std::fs::read(&path).unwrap(), b"file contents!");

        assert!(matches!(Stream::open(&path, "x"), Err(Error::Io(_))));
        assert!(matches!(
            Stream::open(dir.path().join("missing"), "r"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_invalid_modes() {
        for mode in ["", "q", "rw", "r++", "+", "wx"] {
            assert_eq!(
                open_options(mode).err(),
                Some(InvalidArgument::StreamMode(mode.to_owned())),
                "mode {mode:?}"
            );
        }
        for mode in ["r", "rb", "r+b", "w+t", "a+", "x+", "c", "c+b"] {
            assert!(open_options(mode).is_ok(), "mode {mode:?}");
        }
    }
}
