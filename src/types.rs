//! Core types for read-only FUSE file streams.

use std::time::Duration;

/// Raw FUSE open/create flags, as passed by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags(pub i32);

impl OpenFlags {
    /// Plain read-only open.
    pub const READ_ONLY: Self = Self(libc::O_RDONLY);

    /// Get the raw flag bits.
    #[inline]
    pub const fn bits(&self) -> i32 {
        self.0
    }

    /// Returns `true` if the flags ask for the file to be truncated on open.
    #[inline]
    pub const fn contains_truncate(&self) -> bool {
        (self.0 & libc::O_TRUNC) != 0
    }
}

impl From<i32> for OpenFlags {
    fn from(bits: i32) -> Self {
        Self(bits)
    }
}

/// Status of a file as fetched from the storage backend.
///
/// A file that does not exist has no status; callers pass `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileStatus {
    /// Length in bytes.
    pub length: u64,
    /// `false` while another writer is still producing the file.
    pub completed: bool,
}

impl FileStatus {
    /// Status of a fully written file.
    #[inline]
    pub const fn completed(length: u64) -> Self {
        Self {
            length,
            completed: true,
        }
    }

    /// Status of a file that is still being written.
    #[inline]
    pub const fn in_progress(length: u64) -> Self {
        Self {
            length,
            completed: false,
        }
    }
}

/// How long [`PollingWaiter`](crate::PollingWaiter) waits for an incomplete
/// file, and how often it re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitPolicy {
    /// Give up after this long.
    pub timeout: Duration,
    /// Delay between status checks.
    pub interval: Duration,
}

impl WaitPolicy {
    /// Default wait bound for a file to complete.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default delay between status checks.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    /// Replace the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the poll interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}
