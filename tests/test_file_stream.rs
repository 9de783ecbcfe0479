mod common;

use binstream::{
    CHUNK_SIZE, FileAccess, FileStream, FileStreamOptions, Prefetch, Stream, StreamError,
    StreamType, open_file,
};
use common::fixture;
use std::io::{ErrorKind, SeekFrom};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// --- OPENING ---
#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.bin");

    let err = FileStream::open(&path, false).err().unwrap();
    assert!(matches!(&err, StreamError::Open { path: p, .. } if p == &path));
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
}

#[test]
fn test_open_reports_size() {
    let file = fixture(&pattern(100));
    let stream = FileStream::open(file.path(), false).unwrap();
    assert_eq!(stream.stream_type(), StreamType::File);
    assert_eq!(stream.total_len(), 100);
    assert_eq!(stream.len(), 100);
    assert_eq!(stream.path(), file.path());
    assert!(stream.prefetched().is_none());
}

// --- PREFETCH ---
#[test]
fn test_prefetch_small_file_fails() {
    let file = fixture(&pattern(CHUNK_SIZE - 1));
    let err = FileStream::open(file.path(), true).err().unwrap();
    assert!(matches!(
        err,
        StreamError::ShortPrefetch {
            expected: CHUNK_SIZE,
            actual
        } if actual == CHUNK_SIZE - 1
    ));
}

#[test]
fn test_prefetch_exact_chunk() {
    let data = pattern(CHUNK_SIZE * 2);
    let file = fixture(&data);
    let mut stream = FileStream::open(file.path(), true).unwrap();
    assert_eq!(stream.prefetched().unwrap(), &data[..CHUNK_SIZE]);
    assert_eq!(stream.position(), 0);

    // straddles the prefetched chunk, falls back to the file
    let expected = u32::from_le_bytes(data[CHUNK_SIZE - 2..CHUNK_SIZE + 2].try_into().unwrap());
    assert_eq!(stream.read_u32((CHUNK_SIZE - 2) as u64).unwrap(), expected);
}

#[test]
fn test_prefetch_exact_larger_than_file() {
    let file = fixture(&[1, 2, 3]);
    let options = FileStreamOptions::new().with_prefetch(Prefetch::Exact(usize::MAX));
    let err = FileStream::open_with(file.path(), options).err().unwrap();
    assert!(matches!(
        err,
        StreamError::ShortPrefetch {
            expected: usize::MAX,
            actual: 3
        }
    ));
}

#[test]
fn test_prefetch_up_to_clamps() {
    let data = pattern(10);
    let file = fixture(&data);
    let options = FileStreamOptions::new().with_prefetch(Prefetch::UpTo(CHUNK_SIZE));
    let mut stream = FileStream::open_with(file.path(), options).unwrap();
    assert_eq!(stream.prefetched().unwrap(), &data[..]);
    assert_eq!(stream.read_u16(8).unwrap(), u16::from_le_bytes([data[8], data[9]]));
}

#[test]
fn test_prefetch_custom_exact() {
    let file = fixture(&pattern(64));
    let options = FileStreamOptions::new().with_prefetch(Prefetch::Exact(16));
    let stream = FileStream::open_with(file.path(), options).unwrap();
    assert_eq!(stream.prefetched().map(<[u8]>::len), Some(16));
}

// --- READING ---
#[test]
fn test_sequential_and_positional() {
    let data = pattern(4096);
    let file = fixture(&data);
    let mut stream = FileStream::open(file.path(), false).unwrap();

    let mut buf = vec![0u8; 1000];
    stream.seek(SeekFrom::Start(3000)).unwrap();
    let outcome = stream.read(&mut buf).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(buf, &data[3000..4000]);

    let outcome = stream.read(&mut buf).unwrap();
    assert_eq!(outcome.bytes_read, 96);
    assert!(outcome.is_end_of_stream());
    assert!(stream.is_eof());

    let outcome = stream.read_at(&mut buf, 0).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(buf, &data[..1000]);
    assert!(stream.is_eof());
}

// --- CLOSING ---
#[test]
fn test_close_then_use() {
    let file = fixture(&pattern(8));
    let mut stream = FileStream::open(file.path(), false).unwrap();
    stream.close().unwrap();
    assert!(stream.is_closed());

    let mut buf = [0u8; 4];
    assert!(matches!(stream.read(&mut buf), Err(StreamError::AlreadyClosed)));
    assert!(matches!(stream.read_at(&mut buf, 0), Err(StreamError::AlreadyClosed)));
    assert!(matches!(stream.read_u16(0), Err(StreamError::AlreadyClosed)));
    assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::AlreadyClosed)));
    assert!(matches!(stream.close(), Err(StreamError::AlreadyClosed)));
    assert!(stream.is_eof());
    assert_eq!(stream.len(), 0);
}

#[test]
fn test_empty_reads_after_close() {
    let file = fixture(&pattern(8));
    let mut stream = FileStream::open(file.path(), false).unwrap();
    stream.close().unwrap();

    let mut empty = [0u8; 0];
    assert!(matches!(stream.read(&mut empty), Err(StreamError::AlreadyClosed)));
    assert!(matches!(stream.read_at(&mut empty, 0), Err(StreamError::AlreadyClosed)));
    assert_eq!(stream.position(), 0);
}

// --- OPEN FILE ---
#[test]
fn test_open_file_buffered() {
    let file = fixture(&[0xe8, 0x03, 0xd0, 0x07]);
    let mut stream = open_file(file.path(), FileAccess::default()).unwrap();
    assert_eq!(stream.stream_type(), StreamType::File);
    assert_eq!(stream.read_u32(0).unwrap(), 0x07d003e8);
    stream.close().unwrap();
}

#[test]
fn test_open_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.bin");
    for access in [FileAccess::default(), FileAccess::Mapped] {
        let err = open_file(&path, access).err().unwrap();
        assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
    }
}
