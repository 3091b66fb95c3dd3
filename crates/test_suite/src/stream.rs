use std::io::SeekFrom;

use uhsapi::StreamInterface;

use crate::ok;

/// `stream` must be empty, readable, writable and seekable
pub fn assert_stream<S: StreamInterface>(stream: &S) {
    assert!(stream.is_readable());
    assert!(stream.is_writable());
    assert!(stream.is_seekable());
    assert_eq!(stream.size(), Some(0));
    assert!(stream.same_instance(&stream.clone()));

    assert_eq!(ok(stream.write(b"0123456789"), "write"), 10);
    assert_eq!(ok(stream.tell(), "tell"), 10);
    assert_eq!(stream.size(), Some(10));

    ok(stream.seek(SeekFrom::Start(2)), "seek");
    assert_eq!(&ok(stream.read(3), "read")[..], b"234");
    assert!(!stream.eof());
    assert_eq!(&ok(stream.contents(), "contents")[..], b"56789");
    assert!(stream.eof());

    assert_eq!(&stream.to_bytes()[..], b"0123456789", "conversion must start from offset zero");
    ok(stream.rewind(), "rewind");
    assert_eq!(ok(stream.tell(), "tell"), 0);

    let metadata = stream.metadata();
    assert!(metadata.is_some());
}

/// `stream` must be attached. Detaches it and checks that nothing works afterwards
pub fn assert_detached<S: StreamInterface>(stream: &S) {
    assert!(stream.detach().is_some());
    assert!(stream.detach().is_none(), "detach must be idempotent");
    stream.close();

    assert_eq!(stream.size(), None);
    assert!(stream.eof());
    assert!(!stream.is_readable());
    assert!(!stream.is_writable());
    assert!(!stream.is_seekable());
    assert!(stream.metadata().is_none());
    assert!(stream.tell().is_err());
    assert!(stream.seek(SeekFrom::Start(0)).is_err());
    assert!(stream.write(b"x").is_err());
    assert!(stream.read(1).is_err());
    assert!(stream.contents().is_err());
    assert!(stream.to_bytes().is_empty());
}
