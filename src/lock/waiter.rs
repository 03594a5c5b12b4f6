//! Waiting for a held lock to be released.
//!
//! A contender that opted into `reuse_data` does not want the lock itself,
//! it wants whatever the current holder publishes when it lets go. The
//! waiter subscribes to the key's channel and resolves with the first
//! release notification, or with `LockTimeout` once the deadline passes.
//!
//! Every waiter owns its subscription. It is dropped on every exit path
//! (notification, timeout, error), which unsubscribes.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

use super::notification::ReleaseNotification;
use crate::config::millis;
use crate::error::LockerError;
use crate::store::{KvStore, StoreError, Subscription};

#[derive(Debug)]
pub struct ReleaseWaiter {
    key: String,
    subscription: Subscription,
}

impl ReleaseWaiter {
    /// Subscribe to `key`'s release channel.
    ///
    /// Subscribing before the claim attempt that may fail closes the window
    /// in which a release could be published unobserved.
    pub async fn subscribe<S>(store: &S, key: &str) -> Result<Self, LockerError>
    where
        S: KvStore + ?Sized,
    {
        let subscription = store.subscribe(key).await?;
        debug!(key, "subscribed to lock release");
        Ok(Self {
            key: key.to_string(),
            subscription,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolve with the next release notification for this key, or fail with
    /// `LockTimeout` at `deadline`. `max_wait` is only reported in the error.
    pub async fn wait(
        mut self,
        deadline: Instant,
        max_wait: Duration,
    ) -> Result<ReleaseNotification, LockerError> {
        let outcome = time::timeout_at(deadline, self.next_release()).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    key = %self.key,
                    max_wait_ms = millis(max_wait),
                    "waited for lock to be released, aborted"
                );
                Err(LockerError::LockTimeout {
                    key: self.key,
                    max_wait,
                })
            }
        }
    }

    async fn next_release(&mut self) -> Result<ReleaseNotification, LockerError> {
        while let Some(message) = self.subscription.next_message().await {
            if message.channel != self.key {
                continue;
            }
            let notification = ReleaseNotification::decode(&message.payload)?;
            debug!(key = %self.key, "received lock release");
            return Ok(notification);
        }
        Err(StoreError::SubscriptionClosed(self.key.clone()).into())
    }
}

/// Subscribe to `key` and wait up to `max_wait` for its release.
pub async fn wait_for_release<S>(
    store: &S,
    key: &str,
    max_wait: Duration,
) -> Result<ReleaseNotification, LockerError>
where
    S: KvStore + ?Sized,
{
    let deadline = Instant::now() + max_wait;
    ReleaseWaiter::subscribe(store, key)
        .await?
        .wait(deadline, max_wait)
        .await
}
