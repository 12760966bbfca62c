//! # fuse-file-stream
//!
//! A read-only FUSE file handle over a storage backend that only offers a
//! **sequential, seek-then-read stream**.
//!
//! FUSE asks for `read(buf, size, offset)` on parallel worker threads, in any
//! order. Distributed storage clients usually hand out a single-cursor stream
//! instead. [`ReadOnlyFileHandle`] reconciles the two: it validates the open
//! request up front, then serializes every seek + fill sequence on its one
//! backend stream.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use fuse_file_stream::{
//!     FuseFileStream, LocalStorage, OpenFlags, PollingWaiter, ReadOnlyFileHandle,
//!     StorageClient, WaitPolicy,
//! };
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # std::fs::write(dir.path().join("log.txt"), b"line one\nline two\n")?;
//! let storage = LocalStorage::new(dir.path());
//! let path = Path::new("/log.txt");
//!
//! // The bridge has usually fetched the status already for getattr.
//! let status = storage.status(path)?;
//! let waiter = PollingWaiter::new(&storage, WaitPolicy::default());
//! let handle = ReadOnlyFileHandle::create(&storage, path, OpenFlags::READ_ONLY, status, &waiter)?;
//!
//! let mut buf = [0u8; 64];
//! let n = handle.read(&mut buf, 64, 9)?;
//! assert_eq!(&buf[..n], b"line two\n");
//! handle.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ReadOnlyFileHandle`] | The read-only handle: validation, serialized reads, close |
//! | [`FuseFileStream`] | Handle contract shared with sibling (writable) variants |
//! | [`StorageClient`] | Backend seam: opens readers, reports [`FileStatus`] |
//! | [`SequentialReader`] | Single-cursor backend stream |
//! | [`CompletionWaiter`] | Blocks until an in-progress file completes |
//! | [`StreamError`] | Typed failures, classified by [`ErrorKind`] |
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, StreamError>`. Callers match on
//! [`StreamError::kind`] for severity and reply to the kernel with
//! [`StreamError::errno`]:
//!
//! ```rust
//! use fuse_file_stream::{ErrorKind, StreamError};
//! use std::path::PathBuf;
//!
//! let err = StreamError::Incomplete { path: PathBuf::from("/job/output") };
//! assert_eq!(err.kind(), ErrorKind::Unsupported);
//! assert_eq!(err.errno(), libc::EPERM);
//! ```
//!
//! A short read is never an error: near end of file, or when the backend
//! delivers less than asked, `read` returns the smaller count.
//!
//! ---
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger. Rejected opens log at `warn`, opens at `debug`, reads
//! at `trace`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`OpenFlags`], [`FileStatus`], [`WaitPolicy`] |

// Private modules
mod error;
mod ext;
mod in_stream;
mod local;
mod traits;
mod types;

// Public re-exports - error types
pub use error::{ErrorKind, StreamError};

// Public re-exports - core types
pub use types::{FileStatus, OpenFlags, WaitPolicy};

// Public re-exports - collaborator traits
pub use traits::{
    CompletionWaiter, FuseFileStream, IoReader, PollingWaiter, SequentialReader, StorageClient,
};

// Public re-exports - handles and backends
pub use in_stream::ReadOnlyFileHandle;
pub use local::LocalStorage;

// Public re-exports - infrastructure
pub use ext::FuseFileStreamExt;
