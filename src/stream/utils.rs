//! Helpers shared by the stream implementations: little-endian decoding,
//! slice copies at an offset and cursor/position arithmetic.

use std::io::SeekFrom;

use tracing::trace;

use crate::stream::Stream;
use crate::stream::stream_error::{Result, StreamError};

/// Reads exactly `N` bytes at `offset` through [Stream::read_at].
///
/// The bytes come back in file order, ready for `uN::from_le_bytes`.
/// Fails with [StreamError::ShortRead] if fewer than `N` bytes are available;
/// the position still advances by what was read.
pub(crate) fn read_le_array<const N: usize, S: Stream + ?Sized>(
    stream: &mut S,
    offset: u64,
) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    let outcome = stream.read_at(&mut bytes, offset)?;
    if outcome.bytes_read != N {
        trace!(offset, expected = N, actual = outcome.bytes_read, "short decode");
        return Err(StreamError::ShortRead {
            offset,
            expected: N,
            actual: outcome.bytes_read,
        });
    }
    Ok(bytes)
}

/// Copies as much of `src[offset..]` into `buf` as fits.
///
/// # Returns
/// The number of bytes copied, `0` if `offset` is at or beyond the end.
pub(crate) fn copy_at(src: &[u8], buf: &mut [u8], offset: u64) -> usize {
    let Ok(start) = usize::try_from(offset) else {
        return 0;
    };
    if start >= src.len() {
        return 0;
    }
    let n = buf.len().min(src.len() - start);
    buf[..n].copy_from_slice(&src[start..start + n]);
    n
}

/// Resolves a seek target against the current cursor and the data length.
///
/// # Returns
/// * `Some(offset)` - the new absolute cursor
/// * `None` - if the target is before the start or overflows
pub(crate) fn resolve_seek(cursor: u64, len: u64, pos: SeekFrom) -> Option<u64> {
    match pos {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::Current(delta) => cursor.checked_add_signed(delta),
        SeekFrom::End(delta) => len.checked_add_signed(delta),
    }
}

/// Moves the position counter by the distance the cursor moved from `old` to `new`.
pub(crate) fn shift_position(position: u64, old: u64, new: u64) -> u64 {
    if new >= old {
        position.saturating_add(new - old)
    } else {
        position.saturating_sub(old - new)
    }
}
