use std::{fs, path::Path};

use uhsapi::{StreamInterface, UploadStatus, UploadedFileInterface};

use crate::ok;

/// `file` must be a successful, unmoved upload holding `contents`. It is moved into `dir`
pub fn assert_uploaded_file<F: UploadedFileInterface>(file: &F, contents: &[u8], dir: &Path) {
    assert_eq!(file.error(), UploadStatus::Ok);
    let stream = ok(file.stream(), "stream");
    assert_eq!(&stream.to_bytes()[..], contents);

    assert!(file.move_to(Path::new("")).is_err(), "an empty target must be rejected");
    assert!(
        file.move_to(&dir.join("missing").join("file")).is_err(),
        "a missing directory must be rejected"
    );

    let target = dir.join("uploaded");
    ok(file.move_to(&target), "move_to");
    assert_eq!(ok(fs::read(&target), "read moved file"), contents);

    assert!(file.move_to(&dir.join("again")).is_err(), "a file can only be moved once");
    assert!(file.stream().is_err(), "a moved file has no stream");
    assert!(file.clone().move_to(&dir.join("clone")).is_err());
}

/// `file` must be a successful, unmoved upload whose stream yields `contents` in short reads
/// and cannot seek. Nothing is read before the move
pub fn assert_streamed_upload<F: UploadedFileInterface>(file: &F, contents: &[u8], dir: &Path) {
    let target = dir.join("streamed");
    ok(file.move_to(&target), "move_to");
    let moved = ok(fs::read(&target), "read moved file");
    assert_eq!(moved.len(), contents.len(), "the whole stream must be copied");
    assert_eq!(moved, contents);
}

/// `file` must carry an error status other than `Ok`
pub fn assert_failed_upload<F: UploadedFileInterface>(file: &F, dir: &Path) {
    assert!(!file.error().is_ok());
    assert!(file.stream().is_err());
    assert!(file.move_to(&dir.join("failed")).is_err());
    assert!(!dir.join("failed").exists());
}
