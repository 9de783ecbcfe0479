//! In-memory implementation of [Stream].

use std::fs::File;
use std::io::{Read, SeekFrom};
use std::ops::Deref;
use std::path::Path;

use tracing::trace;

use crate::stream::stream_error::{Result, StreamError};
use crate::stream::utils::{copy_at, resolve_seek, shift_position};
use crate::stream::{ReadOutcome, Stream, StreamType};

// =#========================================================================#=
// MEMORY STREAM
// =#========================================================================$=
/// A stream over bytes held in memory.
///
/// The stream owns its backing container `B`: by default a `Vec<u8>` copied
/// from the caller's buffer, but any owned byte container works, e.g. a
/// memory mapping (see [MappedFileStream](crate::MappedFileStream)).
#[derive(Debug)]
pub struct MemoryStream<B = Vec<u8>> {
    /// The owned bytes being read
    bytes: B,
    /// Offset of the next sequential read
    cursor: u64,
    /// Bytes consumed so far
    pos: u64,
}

impl MemoryStream<Vec<u8>> {
    /// Creates a new memory stream holding a copy of `input`.
    ///
    /// The stream is independent of `input` afterwards.
    ///
    /// # Errors
    /// [StreamError::CopyFailed] if the copy cannot be allocated.
    pub fn new(input: &[u8]) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(input.len())
            .map_err(|source| StreamError::CopyFailed {
                expected: input.len(),
                source,
            })?;
        bytes.extend_from_slice(input);
        Ok(Self::over(bytes))
    }

    /// Creates a new memory stream taking ownership of `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::over(bytes)
    }

    /// Reads the entire file at `path` into a new memory stream.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(Self::over(contents))
    }
}

impl<B: Deref<Target = [u8]>> MemoryStream<B> {
    /// Wraps an owned byte container without copying it.
    pub fn over(bytes: B) -> Self {
        Self {
            bytes,
            cursor: 0,
            pos: 0,
        }
    }

    /// Total number of bytes in the stream, independent of the cursor.
    pub fn total_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Offset of the next sequential read.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// All bytes of the stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Unwraps the backing container.
    pub fn into_inner(self) -> B {
        self.bytes
    }
}

impl<B: Deref<Target = [u8]>> Stream for MemoryStream<B> {
    fn stream_type(&self) -> StreamType {
        StreamType::Memory
    }

    #[inline]
    fn len(&self) -> u64 {
        self.total_len().saturating_sub(self.cursor)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.pos
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::empty());
        }
        let n = copy_at(&self.bytes, buf, self.cursor);
        self.cursor += n as u64;
        self.pos += n as u64;
        Ok(ReadOutcome::new(buf.len(), n))
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::empty());
        }
        let n = copy_at(&self.bytes, buf, offset);
        self.pos += n as u64;
        Ok(ReadOutcome::new(buf.len(), n))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(self.cursor, self.total_len(), pos)
            .ok_or(StreamError::InvalidSeek { target: pos })?;
        trace!(from = self.cursor, to = target, "memory seek");
        self.pos = shift_position(self.pos, self.cursor, target);
        self.cursor = target;
        Ok(target)
    }

    fn is_eof(&mut self) -> bool {
        self.cursor >= self.total_len()
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
