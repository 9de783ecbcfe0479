//! Buffered file implementation of [Stream].
//!
//! This module provides [FileStream], which reads a file through explicit
//! sequential and positional I/O calls. Use it when the file should not be
//! mapped, e.g. on filesystems where mapping is unavailable or unwanted.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::stream::stream_error::{Result, StreamError};
use crate::stream::utils::shift_position;
use crate::stream::{ReadOutcome, Stream, StreamType};

/// Default number of bytes read eagerly when prefetching.
pub const CHUNK_SIZE: usize = 1024;

// =#========================================================================#=
// OPTIONS
// =#========================================================================$=
/// How much of the file head to read eagerly on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prefetch {
    /// No eager read.
    #[default]
    Disabled,
    /// Read exactly this many bytes; opening fails on smaller files.
    Exact(usize),
    /// Read this many bytes, or the whole file if it is smaller.
    UpTo(usize),
}

/// Options for opening a [FileStream].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStreamOptions {
    pub prefetch: Prefetch,
}

impl FileStreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefetch mode.
    pub fn with_prefetch(mut self, prefetch: Prefetch) -> Self {
        self.prefetch = prefetch;
        self
    }
}

// =#========================================================================#=
// FILE STREAM
// =#========================================================================$=
/// A stream reading a file with explicit I/O calls.
///
/// Sequential reads go through the OS file cursor, positional reads use
/// `pread`-style calls that leave it untouched. The size reported by
/// [Stream::len] is based on the size captured at open, while
/// [Stream::is_eof] asks the file itself.
///
/// The file handle is released by [Stream::close] or on drop.
#[derive(Debug)]
pub struct FileStream {
    path: PathBuf,
    /// Open handle, `None` once closed
    file: Option<File>,
    /// File size captured at open
    file_size: u64,
    /// Eagerly read head of the file
    prefetched: Option<Vec<u8>>,
    /// Offset of the OS file cursor
    cursor: u64,
    /// Bytes consumed so far
    pos: u64,
}

impl FileStream {
    /// Opens a file stream, optionally prefetching the first [CHUNK_SIZE] bytes.
    ///
    /// # Arguments
    /// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
    /// * `prefetch` - Whether to read the first [CHUNK_SIZE] bytes eagerly
    ///
    /// # Errors
    /// Returns [StreamError::Open] if the file cannot be opened and
    /// [StreamError::ShortPrefetch] if `prefetch` is set and the file is
    /// shorter than [CHUNK_SIZE]. Use [FileStream::open_with] with
    /// [Prefetch::UpTo] to prefetch small files.
    pub fn open<P: AsRef<Path>>(path: P, prefetch: bool) -> Result<Self> {
        let prefetch = if prefetch {
            Prefetch::Exact(CHUNK_SIZE)
        } else {
            Prefetch::Disabled
        };
        Self::open_with(path, FileStreamOptions::new().with_prefetch(prefetch))
    }

    /// Opens a file stream with the given options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: FileStreamOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let file_size = file.metadata()?.len();

        let clamp = |len: usize| usize::try_from(file_size).map_or(len, |size| len.min(size));
        let prefetched = match options.prefetch {
            Prefetch::Disabled => None,
            Prefetch::Exact(len) => {
                let chunk = prefetch_chunk(&file, clamp(len))?;
                if chunk.len() != len {
                    return Err(StreamError::ShortPrefetch {
                        expected: len,
                        actual: chunk.len(),
                    });
                }
                Some(chunk)
            }
            Prefetch::UpTo(len) => Some(prefetch_chunk(&file, clamp(len))?),
        };

        debug!(
            path = %path.display(),
            file_size,
            prefetched = prefetched.as_ref().map_or(0, Vec::len),
            "opened file stream"
        );
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            file_size,
            prefetched,
            cursor: 0,
            pos: 0,
        })
    }

    /// Path the stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size captured at open.
    pub fn total_len(&self) -> u64 {
        self.file_size
    }

    /// Head of the file read at open, if prefetching was requested.
    pub fn prefetched(&self) -> Option<&[u8]> {
        self.prefetched.as_deref()
    }

    /// Whether [Stream::close] has been called.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn handle(&self) -> Result<&File> {
        self.file.as_ref().ok_or(StreamError::AlreadyClosed)
    }
}

impl Stream for FileStream {
    fn stream_type(&self) -> StreamType {
        StreamType::File
    }

    fn len(&self) -> u64 {
        if self.is_closed() {
            return 0;
        }
        self.file_size.saturating_sub(self.cursor)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        let file = self.file.as_mut().ok_or(StreamError::AlreadyClosed)?;
        if buf.is_empty() {
            return Ok(ReadOutcome::empty());
        }

        let (filled, failure) = read_full(file, buf);
        // the OS cursor moved past whatever was read, even on failure
        self.cursor += filled as u64;
        self.pos += filled as u64;
        if let Some(err) = failure {
            return Err(err.into());
        }
        if filled < buf.len() {
            trace!(path = %self.path.display(), requested = buf.len(), filled, "short read");
        }
        Ok(ReadOutcome::new(buf.len(), filled))
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        let file = self.handle()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::empty());
        }

        let cached = self.prefetched.as_deref().and_then(|chunk| {
            let start = usize::try_from(offset).ok()?;
            chunk.get(start..start.checked_add(buf.len())?)
        });
        let n = match cached {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                bytes.len()
            }
            None => read_full_at(file, buf, offset, self.cursor)?,
        };

        self.pos += n as u64;
        Ok(ReadOutcome::new(buf.len(), n))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let file = self.file.as_mut().ok_or(StreamError::AlreadyClosed)?;
        let target = file.seek(pos)?;
        trace!(from = self.cursor, to = target, "file seek");
        self.pos = shift_position(self.pos, self.cursor, target);
        self.cursor = target;
        Ok(target)
    }

    fn is_eof(&mut self) -> bool {
        let Some(file) = self.file.as_ref() else {
            return true;
        };
        // probe the file instead of trusting `file_size`, it may have changed since open
        let mut probe = [0u8; 1];
        !matches!(read_full_at(file, &mut probe, self.cursor, self.cursor), Ok(1))
    }

    fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or(StreamError::AlreadyClosed)?;
        self.prefetched = None;
        drop(file);
        debug!(path = %self.path.display(), "closed file stream");
        Ok(())
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if self.file.is_some() {
            debug!(path = %self.path.display(), "file stream dropped without close");
        }
    }
}

// =#========================================================================#=
// FILE I/O
// =#========================================================================$=
/// Reads sequentially until `buf` is full, the reader ends or fails.
///
/// # Returns
/// The number of bytes read and the error that stopped the read, if any.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> (usize, Option<io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return (filled, Some(err)),
        }
    }
    (filled, None)
}

fn prefetch_chunk(file: &File, len: usize) -> Result<Vec<u8>> {
    let mut chunk = vec![0u8; len];
    let n = read_full_at(file, &mut chunk, 0, 0)?;
    chunk.truncate(n);
    Ok(chunk)
}

/// Reads at `offset` until `buf` is full or the file ends.
///
/// `cursor` is the offset the OS file cursor must be left at.
fn read_full_at(file: &File, buf: &mut [u8], offset: u64, cursor: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(at) = offset.checked_add(filled as u64).filter(|at| *at <= i64::MAX as u64)
        else {
            break;
        };
        match pread(file, &mut buf[filled..], at, cursor) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64, _cursor: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64, cursor: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    let result = file.seek_read(buf, offset);
    // seek_read moves the OS cursor, put it back for sequential reads
    let mut handle = file;
    handle.seek(SeekFrom::Start(cursor))?;
    result
}

#[cfg(not(any(unix, windows)))]
fn pread(file: &File, buf: &mut [u8], offset: u64, cursor: u64) -> io::Result<usize> {
    let mut handle = file;
    handle.seek(SeekFrom::Start(offset))?;
    let result = handle.read(buf);
    handle.seek(SeekFrom::Start(cursor))?;
    result
}
