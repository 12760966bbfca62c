//! Storage backend seams: the client that opens files and the
//! single-cursor reader it hands out.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::FileStatus;

/// A sequential, single-cursor reader over one backend file.
///
/// The reader has exactly one position. Callers that need positional reads
/// must serialize `seek` + `read` themselves; [`ReadOnlyFileHandle`] does.
///
/// [`ReadOnlyFileHandle`]: crate::ReadOnlyFileHandle
pub trait SequentialReader: Send {
    /// Move the cursor to `offset` bytes from the start of the file.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Fill `buf` from the current cursor, advancing it.
    ///
    /// Returns the number of bytes read. `0` signals end of stream. A
    /// non-empty result may be shorter than `buf`.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the backend stream.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure while releasing.
    fn close(&mut self) -> io::Result<()>;
}

impl<T: SequentialReader + ?Sized> SequentialReader for Box<T> {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        (**self).seek(offset)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Client for the storage backend.
///
/// # Thread Safety
///
/// Clients are shared across FUSE worker threads, so they must be
/// `Send + Sync`. Each opened reader is exclusively owned by one handle.
pub trait StorageClient: Send + Sync {
    /// Reader type produced by [`open_file`](StorageClient::open_file).
    type Reader: SequentialReader;

    /// Open a sequential reader for `path`, positioned at offset 0.
    ///
    /// # Errors
    ///
    /// Any backend failure, including the file vanishing since its status was
    /// fetched.
    fn open_file(&self, path: &Path) -> io::Result<Self::Reader>;

    /// Fetch the current status of `path`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Backend failures other than "not found".
    fn status(&self, path: &Path) -> io::Result<Option<FileStatus>>;
}

/// Adapts any `std::io` reader with seek support to [`SequentialReader`].
///
/// `close` drops nothing by itself; the inner reader is released when the
/// adapter is dropped.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

impl<R: Read + Seek + Send> IoReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek + Send> SequentialReader for IoReader<R> {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
