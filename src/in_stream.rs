//! Read-only FUSE file handle over a single-cursor backend stream.
//!
//! FUSE issues independent positional reads, possibly out of order and from
//! several worker threads at once. The backend only offers seek-then-read on
//! one shared cursor. [`ReadOnlyFileHandle`] bridges the two by holding the
//! cursor behind a mutex for the whole seek + fill sequence of each read.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    CompletionWaiter, FileStatus, FuseFileStream, OpenFlags, SequentialReader, StorageClient,
    StreamError,
};

/// A read-only handle on one backend file.
///
/// Built by [`create`](ReadOnlyFileHandle::create), which validates the open
/// request first: once a handle exists, its file existed, was complete and
/// was not opened for truncation.
///
/// The file length is captured at open time and never refreshed. Reads stop
/// at it even if the backend file has since grown.
///
/// # Example
///
/// ```rust
/// use fuse_file_stream::{
///     FileStatus, FuseFileStream, IoReader, OpenFlags, ReadOnlyFileHandle, StorageClient,
/// };
/// use std::io::{self, Cursor};
/// use std::path::Path;
///
/// struct Fixed;
///
/// impl StorageClient for Fixed {
///     type Reader = IoReader<Cursor<&'static [u8]>>;
///
///     fn open_file(&self, _: &Path) -> io::Result<Self::Reader> {
///         Ok(IoReader::new(Cursor::new(&b"hello world"[..])))
///     }
///
///     fn status(&self, _: &Path) -> io::Result<Option<FileStatus>> {
///         Ok(Some(FileStatus::completed(11)))
///     }
/// }
///
/// let path = Path::new("/greeting");
/// let status = Fixed.status(path).unwrap();
/// let always = |_: &Path| true;
/// let handle =
///     ReadOnlyFileHandle::create(&Fixed, path, OpenFlags::READ_ONLY, status, &always).unwrap();
///
/// let mut buf = [0u8; 16];
/// assert_eq!(handle.read(&mut buf, 16, 6).unwrap(), 5);
/// assert_eq!(&buf[..5], b"world");
/// handle.close().unwrap();
/// ```
#[derive(Debug)]
pub struct ReadOnlyFileHandle<R: SequentialReader> {
    /// `None` once closed.
    reader: Mutex<Option<R>>,
    length: u64,
    path: PathBuf,
}

impl<R: SequentialReader> ReadOnlyFileHandle<R> {
    /// Validate an open request and open the backend stream.
    ///
    /// Checks run in order and stop at the first failure:
    ///
    /// 1. `path` must not be empty
    /// 2. `flags` must not request truncation
    /// 3. `status` must be present
    /// 4. an incomplete file must complete within `waiter`'s policy
    /// 5. the backend stream must open
    ///
    /// The handle's length is taken from `status`; the backend is not asked
    /// again, even after waiting for completion.
    ///
    /// # Errors
    ///
    /// - [`StreamError::InvalidArgument`] for an empty path
    /// - [`StreamError::TruncateRequested`] if `flags` contain `O_TRUNC`
    /// - [`StreamError::NotFound`] if `status` is `None`
    /// - [`StreamError::Incomplete`] if the waiter gives up
    /// - [`StreamError::Io`] if the backend fails to open the file
    pub fn create<C, W>(
        client: &C,
        path: &Path,
        flags: OpenFlags,
        status: Option<FileStatus>,
        waiter: &W,
    ) -> Result<Self, StreamError>
    where
        C: StorageClient<Reader = R> + ?Sized,
        W: CompletionWaiter + ?Sized,
    {
        if path.as_os_str().is_empty() {
            return Err(StreamError::InvalidArgument {
                operation: "open",
                reason: "path must not be empty".to_string(),
            });
        }
        if flags.contains_truncate() {
            log::warn!(
                "rejecting read-only open of {} with flags 0x{:x}",
                path.display(),
                flags.bits()
            );
            return Err(StreamError::TruncateRequested {
                path: path.to_path_buf(),
                flags: flags.bits(),
            });
        }
        let Some(status) = status else {
            return Err(StreamError::NotFound {
                path: path.to_path_buf(),
            });
        };
        // Cannot read a file another writer is still producing.
        if !status.completed {
            log::debug!("waiting for {} to complete", path.display());
            if !waiter.wait_for_completion(path) {
                return Err(StreamError::Incomplete {
                    path: path.to_path_buf(),
                });
            }
        }

        let reader = client.open_file(path).map_err(|source| StreamError::Io {
            operation: "open",
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "opened read-only stream for {} ({} bytes)",
            path.display(),
            status.length
        );
        Ok(Self {
            reader: Mutex::new(Some(reader)),
            length: status.length,
            path: path.to_path_buf(),
        })
    }

    /// The path this handle was opened for.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once [`close`](FuseFileStream::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    // A panic mid-read leaves the cursor somewhere arbitrary, which is fine:
    // every read seeks first.
    fn lock(&self) -> MutexGuard<'_, Option<R>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn io_error(&self, operation: &'static str, source: std::io::Error) -> StreamError {
        StreamError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }

    fn closed(&self, operation: &'static str) -> StreamError {
        StreamError::Closed {
            operation,
            path: self.path.clone(),
        }
    }
}

impl<R: SequentialReader> FuseFileStream for ReadOnlyFileHandle<R> {
    fn read(&self, buf: &mut [u8], size: usize, offset: i64) -> Result<usize, StreamError> {
        if offset < 0 || size > buf.len() {
            return Err(StreamError::buffer_state(buf.len(), offset, size));
        }
        if size == 0 {
            return Ok(0);
        }
        let offset = offset as u64;
        if offset >= self.length {
            return Ok(0);
        }
        // Bytes appended after open are never served.
        let size = usize::try_from(self.length - offset).map_or(size, |left| size.min(left));

        let mut guard = self.lock();
        let reader = guard.as_mut().ok_or_else(|| self.closed("read"))?;
        reader
            .seek(offset)
            .map_err(|source| self.io_error("seek", source))?;

        let buf = &mut buf[..size];
        let mut total = 0;
        while total < size {
            let n = reader
                .read(&mut buf[total..])
                .map_err(|source| self.io_error("read", source))?;
            if n == 0 {
                break;
            }
            total += n;
        }
        log::trace!(
            "read {total}/{size} bytes at {offset} from {}",
            self.path.display()
        );
        Ok(total)
    }

    fn write(&self, _buf: &[u8], _size: usize, _offset: i64) -> Result<(), StreamError> {
        Err(StreamError::ReadOnly {
            operation: "write to",
            path: self.path.clone(),
        })
    }

    fn file_length(&self) -> u64 {
        self.length
    }

    fn flush(&self) -> Result<(), StreamError> {
        Ok(())
    }

    fn truncate(&self, _size: u64) -> Result<(), StreamError> {
        Err(StreamError::ReadOnly {
            operation: "truncate",
            path: self.path.clone(),
        })
    }

    fn close(&self) -> Result<(), StreamError> {
        let mut reader = self.lock().take().ok_or_else(|| self.closed("close"))?;
        reader
            .close()
            .map_err(|source| self.io_error("close", source))
    }
}

impl<R: SequentialReader> Drop for ReadOnlyFileHandle<R> {
    fn drop(&mut self) {
        let reader = self
            .reader
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut reader) = reader {
            log::debug!("closing unreleased stream for {}", self.path.display());
            if let Err(e) = reader.close() {
                log::error!("can't close stream for {}: {e}", self.path.display());
            }
        }
    }
}
