//! # Stream Traits
//!
//! The seams between a read-only FUSE handle and its collaborators.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`StorageClient`] | Opens backend files and reports their status |
//! | [`SequentialReader`] | One backend stream with a single seek cursor |
//! | [`CompletionWaiter`] | Blocks until a file is no longer being written |
//! | [`FuseFileStream`] | The handle contract the FUSE bridge drives |
//!
//! ## Thread Safety
//!
//! Clients, waiters and streams are shared across FUSE worker threads and
//! require `Send + Sync`. A [`SequentialReader`] is only `Send`: it is owned by
//! exactly one handle, which serializes access to it.

mod file_stream;
mod storage;
mod waiter;

pub use file_stream::FuseFileStream;
pub use storage::{IoReader, SequentialReader, StorageClient};
pub use waiter::{CompletionWaiter, PollingWaiter};
