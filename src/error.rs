//! Error types for read-only FUSE file streams.

use std::path::PathBuf;

/// Broad failure class of a [`StreamError`].
///
/// A FUSE bridge matches on this to decide how loudly to report a failure:
/// contract violations are caller bugs, unsupported operations are semantic
/// rejections for this handle, and backend failures are I/O faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller broke a precondition (bad argument, closed handle).
    ContractViolation,
    /// The handle cannot honor the request (truncate, write, missing or incomplete file).
    Unsupported,
    /// The storage backend failed while opening, seeking, reading or closing.
    Backend,
}

/// Stream error type with contextual variants.
///
/// Every variant carries enough context (path, operation) to produce a useful
/// diagnostic on its own. A short read is never an error.
///
/// # Examples
///
/// ```rust
/// use fuse_file_stream::{ErrorKind, StreamError};
/// use std::path::PathBuf;
///
/// let err = StreamError::NotFound { path: PathBuf::from("/missing") };
/// assert_eq!(err.kind(), ErrorKind::Unsupported);
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    // Contract violations
    /// An argument did not satisfy the operation's preconditions.
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        /// The operation that rejected the argument.
        operation: &'static str,
        /// Why the argument was rejected.
        reason: String,
    },

    /// The handle was already closed.
    #[error("{operation}: stream already closed: {path}")]
    Closed {
        /// The operation attempted on the closed handle.
        operation: &'static str,
        /// The path the handle was opened for.
        path: PathBuf,
    },

    // Unsupported operations
    /// The open flags asked for truncation, which a read-only stream cannot do.
    #[error("Failed to create read-only stream for path {path}: flags 0x{flags:x} contains truncate")]
    TruncateRequested {
        /// The path being opened.
        path: PathBuf,
        /// The raw open flags.
        flags: i32,
    },

    /// The file does not exist.
    #[error("Failed to create read-only stream for {path}: file does not exist")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The file is still being written and did not complete in time.
    #[error("Failed to create read-only stream for {path}: incomplete file")]
    Incomplete {
        /// The incomplete file.
        path: PathBuf,
    },

    /// A mutating operation was attempted on a read-only stream.
    #[error("Cannot {operation} read-only stream of path {path}")]
    ReadOnly {
        /// The rejected operation.
        operation: &'static str,
        /// The path the handle was opened for.
        path: PathBuf,
    },

    // Backend failures
    /// I/O error reported by the storage backend.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The backend operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StreamError {
    /// Builds the contract violation raised when `read` arguments do not fit
    /// the destination buffer.
    pub(crate) fn buffer_state(capacity: usize, offset: i64, size: usize) -> Self {
        StreamError::InvalidArgument {
            operation: "read",
            reason: format!("Buffer length: {capacity}, offset: {offset}, len: {size}"),
        }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::InvalidArgument { .. } | StreamError::Closed { .. } => {
                ErrorKind::ContractViolation
            }
            StreamError::TruncateRequested { .. }
            | StreamError::NotFound { .. }
            | StreamError::Incomplete { .. }
            | StreamError::ReadOnly { .. } => ErrorKind::Unsupported,
            StreamError::Io { .. } => ErrorKind::Backend,
        }
    }

    /// Returns the errno a FUSE reply should carry for this error.
    ///
    /// Unsupported operations surface to the user as "operation not permitted".
    pub fn errno(&self) -> i32 {
        match self.kind() {
            ErrorKind::ContractViolation => libc::EINVAL,
            ErrorKind::Unsupported => libc::EPERM,
            ErrorKind::Backend => libc::EIO,
        }
    }
}
