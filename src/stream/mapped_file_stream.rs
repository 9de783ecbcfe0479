//! Memory-mapped file implementation of [Stream].
//!
//! [MappedFileStream] maps the whole file read-only and delegates every
//! operation to a [MemoryStream] over the mapping. The mapping is owned by
//! that delegate, so no view into it can outlive it.

use std::fs::File;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::stream::memory_stream::MemoryStream;
use crate::stream::stream_error::{Result, StreamError};
use crate::stream::{ReadOutcome, Stream, StreamType};

// =#========================================================================#=
// MAPPED FILE STREAM
// =#========================================================================$=
/// A stream over a read-only memory mapping of a file.
///
/// Reads are served by the page cache without explicit I/O calls. The file
/// must not be truncated by another process while mapped.
#[derive(Debug)]
pub struct MappedFileStream {
    path: PathBuf,
    /// Stream over the mapping, `None` once closed. Declared before `file`
    /// so the mapping is dropped first.
    view: Option<MemoryStream<Mmap>>,
    /// Handle kept open for the lifetime of the mapping
    file: Option<File>,
    /// Position at the time of closing
    closed_pos: u64,
}

impl MappedFileStream {
    /// Opens and maps the whole file at `path`.
    ///
    /// # Errors
    /// [StreamError::Open] if the file cannot be opened,
    /// [StreamError::Map] if it cannot be mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the mapping is read-only and owned by `view`, which is
        // dropped before `file`. Concurrent truncation of the file by another
        // process is excluded by the type's contract.
        let map = unsafe { Mmap::map(&file) }.map_err(|source| StreamError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), len = map.len(), "mapped file stream");
        Ok(Self {
            path: path.to_path_buf(),
            view: Some(MemoryStream::over(map)),
            file: Some(file),
            closed_pos: 0,
        })
    }

    /// Path the stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapping, `0` once closed.
    pub fn total_len(&self) -> u64 {
        self.view.as_ref().map_or(0, |view| view.total_len())
    }

    /// The mapped bytes, `None` once closed.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.view.as_ref().map(|view| view.as_bytes())
    }

    /// Whether [Stream::close] has been called.
    pub fn is_closed(&self) -> bool {
        self.view.is_none()
    }

    fn view(&mut self) -> Result<&mut MemoryStream<Mmap>> {
        self.view.as_mut().ok_or(StreamError::AlreadyClosed)
    }
}

impl Stream for MappedFileStream {
    fn stream_type(&self) -> StreamType {
        StreamType::File
    }

    fn len(&self) -> u64 {
        self.view.as_ref().map_or(0, |view| view.len())
    }

    fn position(&self) -> u64 {
        self.view
            .as_ref()
            .map_or(self.closed_pos, |view| view.position())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.view()?.read(buf)
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        self.view()?.read_at(buf, offset)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.view()?.seek(pos)
    }

    fn is_eof(&mut self) -> bool {
        self.view.as_mut().is_none_or(|view| view.is_eof())
    }

    fn close(&mut self) -> Result<()> {
        let view = self.view.take().ok_or(StreamError::AlreadyClosed)?;
        self.closed_pos = view.position();
        // unmap before closing the handle
        drop(view);
        drop(self.file.take());
        debug!(path = %self.path.display(), "closed mapped file stream");
        Ok(())
    }
}
