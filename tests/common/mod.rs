#![allow(dead_code)]

use std::io::Write;

use binstream::{FileStream, MappedFileStream, MemoryStream, Stream};
use tempfile::NamedTempFile;

/// Writes `bytes` to a fresh temporary file.
pub fn fixture(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(bytes).expect("failed to write fixture");
    file.flush().expect("failed to flush fixture");
    file
}

/// One stream per backing store over the same bytes.
///
/// The returned temp file must outlive the file-backed streams.
pub fn all_backings(bytes: &[u8]) -> (Vec<(&'static str, Box<dyn Stream>)>, NamedTempFile) {
    let file = fixture(bytes);
    let streams: Vec<(&'static str, Box<dyn Stream>)> = vec![
        ("memory", Box::new(MemoryStream::new(bytes).unwrap()) as Box<dyn Stream>),
        ("buffered", Box::new(FileStream::open(file.path(), false).unwrap())),
        ("mapped", Box::new(MappedFileStream::open(file.path()).unwrap())),
    ];
    (streams, file)
}
