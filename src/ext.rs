//! # Extension Traits
//!
//! Convenience methods on top of [`FuseFileStream`].
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`read_vec`](FuseFileStreamExt::read_vec) | Read into a freshly allocated, right-sized buffer |

use crate::{FuseFileStream, StreamError};

/// Extension methods for any [`FuseFileStream`].
///
/// # Example
///
/// ```rust
/// use fuse_file_stream::{FuseFileStream, FuseFileStreamExt, StreamError};
///
/// fn header<S: FuseFileStream>(stream: &S) -> Result<Vec<u8>, StreamError> {
///     stream.read_vec(16, 0)
/// }
/// ```
pub trait FuseFileStreamExt: FuseFileStream {
    /// Read up to `size` bytes at `offset`, returning only the bytes read.
    ///
    /// The allocation is capped at what the file can still provide, so a
    /// large `size` near the end of a small file stays cheap.
    ///
    /// # Errors
    ///
    /// Same as [`FuseFileStream::read`].
    fn read_vec(&self, size: usize, offset: i64) -> Result<Vec<u8>, StreamError> {
        let remaining = u64::try_from(offset)
            .map(|o| self.file_length().saturating_sub(o))
            .unwrap_or(0);
        let size = usize::try_from(remaining).map_or(size, |r| size.min(r));
        let mut buf = vec![0u8; size];
        let n = self.read(&mut buf, size, offset)?;
        buf.truncate(n);
        Ok(buf)
    }
}

impl<S: FuseFileStream + ?Sized> FuseFileStreamExt for S {}
