//! The per-handle contract a FUSE bridge drives.
//!
//! A bridge keeps one [`FuseFileStream`] per open file handle and forwards the
//! kernel's `read`, `write`, `flush`, `ftruncate` and `release` requests to it.
//!
//! # Example
//!
//! ```rust
//! use fuse_file_stream::{FuseFileStream, StreamError};
//!
//! // Serve one kernel read request, mapping failures to an errno.
//! fn serve_read<S: FuseFileStream>(stream: &S, offset: i64, size: u32) -> Result<Vec<u8>, i32> {
//!     let mut buf = vec![0u8; size as usize];
//!     let n = stream
//!         .read(&mut buf, size as usize, offset)
//!         .map_err(|e: StreamError| e.errno())?;
//!     buf.truncate(n);
//!     Ok(buf)
//! }
//! ```

use crate::StreamError;

/// Handle-level operations of an open FUSE file.
///
/// # Lifecycle
///
/// A stream is *open* from construction until [`close`](FuseFileStream::close)
/// succeeds or fails; it is *closed* afterwards and stays closed.
///
/// # Thread Safety
///
/// FUSE dispatches requests on parallel worker threads, so streams must be
/// `Send + Sync` and synchronize internally.
pub trait FuseFileStream: Send + Sync {
    /// Read up to `size` bytes at `offset` into the front of `buf`.
    ///
    /// Returns the number of bytes read. A short read is not an error.
    ///
    /// # Errors
    ///
    /// - [`StreamError::InvalidArgument`] if `offset` is negative or `size`
    ///   exceeds `buf.len()`
    /// - [`StreamError::Closed`] after `close`
    /// - [`StreamError::Io`] for backend failures
    fn read(&self, buf: &mut [u8], size: usize, offset: i64) -> Result<usize, StreamError>;

    /// Write `size` bytes from `buf` at `offset`.
    ///
    /// # Errors
    ///
    /// - [`StreamError::ReadOnly`] if the stream does not support writing
    fn write(&self, buf: &[u8], size: usize, offset: i64) -> Result<(), StreamError>;

    /// Length of the file in bytes.
    fn file_length(&self) -> u64;

    /// Flush buffered writes to the backend.
    ///
    /// # Errors
    ///
    /// - [`StreamError::Io`] for backend failures
    fn flush(&self) -> Result<(), StreamError>;

    /// Truncate or extend the file to `size` bytes.
    ///
    /// # Errors
    ///
    /// - [`StreamError::ReadOnly`] if the stream does not support truncation
    fn truncate(&self, size: u64) -> Result<(), StreamError>;

    /// Release the backend stream.
    ///
    /// # Errors
    ///
    /// - [`StreamError::Closed`] if already closed
    /// - [`StreamError::Io`] if releasing failed; the stream is closed anyway
    fn close(&self) -> Result<(), StreamError>;
}
