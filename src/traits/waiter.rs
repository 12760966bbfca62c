//! Waiting for files that are still being written elsewhere.

use std::path::Path;
use std::thread;
use std::time::Instant;

use crate::{StorageClient, WaitPolicy};

/// Blocks until a file is no longer being written.
///
/// Implementations own their timeout policy. A return of `false` means the
/// waiter gave up; the file must then be treated as incomplete.
///
/// Any `Fn(&Path) -> bool` closure is a waiter:
///
/// ```rust
/// use fuse_file_stream::CompletionWaiter;
/// use std::path::Path;
///
/// let never = |_: &Path| false;
/// assert!(!never.wait_for_completion(Path::new("/f")));
/// ```
pub trait CompletionWaiter: Send + Sync {
    /// Wait for `path` to complete. Returns `true` once it has.
    fn wait_for_completion(&self, path: &Path) -> bool;
}

impl<F> CompletionWaiter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn wait_for_completion(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Polls [`StorageClient::status`] until the file completes or the
/// [`WaitPolicy`] timeout expires.
///
/// A status error or a file that disappears while waiting ends the wait early.
#[derive(Debug)]
pub struct PollingWaiter<'a, C> {
    client: &'a C,
    policy: WaitPolicy,
}

impl<'a, C: StorageClient> PollingWaiter<'a, C> {
    /// Create a waiter over `client` with the given policy.
    pub fn new(client: &'a C, policy: WaitPolicy) -> Self {
        Self { client, policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }
}

impl<C: StorageClient> CompletionWaiter for PollingWaiter<'_, C> {
    fn wait_for_completion(&self, path: &Path) -> bool {
        // A timeout too large to represent means no deadline.
        let deadline = Instant::now().checked_add(self.policy.timeout);
        loop {
            match self.client.status(path) {
                Ok(Some(status)) if status.completed => return true,
                Ok(Some(_)) => {}
                Ok(None) => {
                    log::warn!("{} disappeared while waiting for it to complete", path.display());
                    return false;
                }
                Err(e) => {
                    log::warn!("status of {} failed while waiting: {e}", path.display());
                    return false;
                }
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        log::debug!(
                            "gave up waiting for {} after {:?}",
                            path.display(),
                            self.policy.timeout
                        );
                        return false;
                    }
                    self.policy.interval.min(deadline - now)
                }
                None => self.policy.interval,
            };
            thread::sleep(pause);
        }
    }
}
