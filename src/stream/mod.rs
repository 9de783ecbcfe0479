//! Stream abstraction over different backing stores.
//!
//! This module provides the [Stream] trait and its implementations:
//! - [MemoryStream]: owned bytes (or any owned byte container) in memory
//! - [FileStream]: explicit buffered and positional file I/O
//! - [MappedFileStream]: a read-only memory mapping of a whole file
//!
//! By using this trait, the same decoding logic works for a small buffer
//! and for a multi-gigabyte mapped file.

use std::fmt;
use std::io::SeekFrom;

pub mod file_stream;
pub mod mapped_file_stream;
pub mod memory_stream;
pub mod stream_error;
pub(crate) mod utils;

pub use file_stream::{CHUNK_SIZE, FileStream, FileStreamOptions, Prefetch};
pub use mapped_file_stream::MappedFileStream;
pub use memory_stream::MemoryStream;
pub use stream_error::{Result, StreamError};

// =#========================================================================#=
// STREAM TYPE
// =#========================================================================$=
/// Kind of backing store a stream reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamType {
    /// Backing store not known.
    #[default]
    Unknown,
    /// On-disk file, buffered or mapped.
    File,
    /// Bytes held in memory.
    Memory,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StreamType::Unknown => write!(f, "unknown"),
            StreamType::File => write!(f, "file"),
            StreamType::Memory => write!(f, "memory"),
        }
    }
}

// =#========================================================================#=
// READ OUTCOME
// =#========================================================================$=
/// Whether a read filled the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// All requested bytes were read.
    Complete,
    /// Fewer bytes than requested were available.
    EndOfStream,
}

/// Number of bytes a read produced and whether the data ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    pub bytes_read: usize,
    pub status: ReadStatus,
}

impl ReadOutcome {
    /// Builds the outcome of a read of `requested` bytes that produced `bytes_read`.
    pub fn new(requested: usize, bytes_read: usize) -> Self {
        let status = if bytes_read < requested {
            ReadStatus::EndOfStream
        } else {
            ReadStatus::Complete
        };
        Self { bytes_read, status }
    }

    /// Outcome of a read into an empty buffer.
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    pub fn is_complete(&self) -> bool {
        self.status == ReadStatus::Complete
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.status == ReadStatus::EndOfStream
    }
}

// =#========================================================================#=
// STREAM (Trait)
// =#========================================================================T=
/// Trait defining the read-only interface every backing store provides.
///
/// Two offsets are tracked per stream:
/// - the *cursor*, where the next [read](Stream::read) starts, moved by
///   `read` and [seek](Stream::seek);
/// - the *position*, a counter of bytes consumed, reported by
///   [position](Stream::position).
///
/// Positional reads ([read_at](Stream::read_at) and the `read_uN` decoders)
/// leave the cursor alone but still advance the position by the number of
/// bytes they read. Callers relying on `position` as "next read offset"
/// must not mix the two kinds of reads.
///
/// Streams are not synchronized; every operation takes `&mut self`.
pub trait Stream {
    /// Kind of backing store.
    fn stream_type(&self) -> StreamType;

    /// Number of bytes remaining between the cursor and the end of data.
    fn len(&self) -> u64;

    /// Whether no bytes remain after the cursor.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes consumed by reads and seeks since construction.
    fn position(&self) -> u64;

    /// Reads up to `buf.len()` bytes from the cursor and advances it.
    ///
    /// # Returns
    /// * `Complete` - if the buffer was filled (always for an empty buffer)
    /// * `EndOfStream` - with the number of bytes read, if data ran out
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome>;

    /// Reads up to `buf.len()` bytes starting at the absolute `offset`.
    ///
    /// The cursor is not used nor moved. The position advances by the
    /// number of bytes read.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome>;

    /// Moves the cursor and returns its new absolute offset.
    ///
    /// The position changes by the distance the cursor actually moved.
    /// On error neither cursor nor position change.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Reads a byte at the absolute `offset`.
    fn read_u8(&mut self, offset: u64) -> Result<u8> {
        let [byte] = utils::read_le_array::<1, _>(self, offset)?;
        Ok(byte)
    }

    /// Reads a 2 byte little-endian unsigned integer at the absolute `offset`.
    fn read_u16(&mut self, offset: u64) -> Result<u16> {
        utils::read_le_array(self, offset).map(u16::from_le_bytes)
    }

    /// Reads a 4 byte little-endian unsigned integer at the absolute `offset`.
    fn read_u32(&mut self, offset: u64) -> Result<u32> {
        utils::read_le_array(self, offset).map(u32::from_le_bytes)
    }

    /// Reads an 8 byte little-endian unsigned integer at the absolute `offset`.
    fn read_u64(&mut self, offset: u64) -> Result<u64> {
        utils::read_le_array(self, offset).map(u64::from_le_bytes)
    }

    /// Check if no byte is available at the cursor.
    fn is_eof(&mut self) -> bool;

    /// Releases the underlying OS resources.
    ///
    /// A no-op for memory streams. On a closed file-backed stream every
    /// read, positional read (including into an empty buffer), seek, decode
    /// and second `close` returns [StreamError::AlreadyClosed].
    fn close(&mut self) -> Result<()>;
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn stream_type(&self) -> StreamType {
        (**self).stream_type()
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        (**self).read(buf)
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        (**self).read_at(buf, offset)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    fn read_u8(&mut self, offset: u64) -> Result<u8> {
        (**self).read_u8(offset)
    }

    fn read_u16(&mut self, offset: u64) -> Result<u16> {
        (**self).read_u16(offset)
    }

    fn read_u32(&mut self, offset: u64) -> Result<u32> {
        (**self).read_u32(offset)
    }

    fn read_u64(&mut self, offset: u64) -> Result<u64> {
        (**self).read_u64(offset)
    }

    fn is_eof(&mut self) -> bool {
        (**self).is_eof()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
