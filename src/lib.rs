//! Binstream is a library for reading fixed-width binary data from
//! memory buffers and files through one uniform interface.
//!
//! Core functionality provided:
//! - [Stream]: the capability every backing store implements. Sequential
//!   reads, positional reads, seeking, little-endian decoding of
//!   `u8`/`u16`/`u32`/`u64` at absolute offsets, end-of-stream detection
//!   and resource release.
//! - Backing stores:
//!   - [MemoryStream]: an owned copy of a byte buffer (or any owned byte container).
//!   - [FileStream]: explicit buffered and positional file I/O, with an
//!     optional eager prefetch of the file head.
//!   - [MappedFileStream]: a read-only memory mapping of the whole file,
//!     served through a [MemoryStream] over the mapping.
//!
//! Limitations:
//! - Read-only
//! - Little-endian unsigned integers only
//! - Not synchronized: every operation takes `&mut self`
//!
//! # Usage patterns
//!
//! Decode from a buffer:
//! ```
//! use binstream::{MemoryStream, Stream};
//!
//! let mut stream = MemoryStream::new(&[0xe8, 0x03, 0xd0, 0x07])?;
//! assert_eq!(stream.read_u16(0)?, 0x03e8);
//! assert_eq!(stream.read_u16(2)?, 0x07d0);
//! assert_eq!(stream.read_u32(0)?, 0x07d003e8);
//! # Ok::<(), binstream::StreamError>(())
//! ```
//!
//! Pick the file backing at runtime and drive it through the trait:
//! ```no_run
//! use binstream::{FileAccess, Stream, open_file};
//!
//! let mut stream = open_file("image.bin", FileAccess::Mapped)?;
//! let magic = stream.read_u32(0)?;
//! println!("magic: {magic:#010x}");
//! let mut header = [0u8; 64];
//! let outcome = stream.read(&mut header)?;
//! if outcome.is_end_of_stream() {
//!     println!("truncated header after {} bytes", outcome.bytes_read);
//! }
//! stream.close()?;
//! # Ok::<(), binstream::StreamError>(())
//! ```

use std::path::Path;

pub mod stream;

pub use stream::{
    CHUNK_SIZE, FileStream, FileStreamOptions, MappedFileStream, MemoryStream, Prefetch,
    ReadOutcome, ReadStatus, Result, Stream, StreamError, StreamType,
};

/// How a file should be accessed by [open_file].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    /// Explicit read calls, see [FileStream].
    Buffered(FileStreamOptions),
    /// Memory mapping, see [MappedFileStream].
    Mapped,
}

impl Default for FileAccess {
    fn default() -> Self {
        FileAccess::Buffered(FileStreamOptions::default())
    }
}

/// Opens `path` with the requested access and returns it as a trait object.
///
/// # Errors
/// Propagates the construction error of the chosen backing store.
pub fn open_file<P: AsRef<Path>>(path: P, access: FileAccess) -> Result<Box<dyn Stream>> {
    let stream: Box<dyn Stream> = match access {
        FileAccess::Buffered(options) => Box::new(FileStream::open_with(path, options)?),
        FileAccess::Mapped => Box::new(MappedFileStream::open(path)?),
    };
    Ok(stream)
}
