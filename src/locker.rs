//! Locker: the public lock/unlock entry point.
//!
//! `Locker<S>` holds a store and the resolved configuration. It is built once
//! and shared by reference (or behind an `Arc`); it keeps no claim state of
//! its own, so any number of lockers in any number of processes can contend
//! for the same keys.
//!
//! ## Example
//!
//! ```
//! use sourced_locker::{InMemoryStore, LockRequest, Locker, UnlockRequest};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let locker = Locker::new(InMemoryStore::new());
//!
//! let locked = locker.lock(LockRequest::new("orders:42")).await.unwrap();
//! let token = locked.token().unwrap();
//!
//! // ... critical section ...
//!
//! locker.unlock(UnlockRequest::new("orders:42", token)).await.unwrap();
//! # });
//! ```
//!
//! ## Acquisition flow
//!
//! ```text
//! Idle ─► Attempting ─┬─► Acquired                    claim created
//!                     ├─► Failed (MaxAttemptsReached)  max_attempts > 1, budget spent
//!                     ├─► Failed (LockFailed)          single shot, no reuse_data
//!                     └─► Waiting ─┬─► DataReceived    release observed
//!                                  └─► TimedOut        max_wait elapsed
//! ```

use tokio::time::Instant;
use tracing::debug;

use crate::config::LockerConfig;
use crate::error::LockerError;
use crate::lock::{
    acquire_with_retry, release, try_acquire, LockOptions, LockRequest, LockResponse,
    ReleaseWaiter, Token, UnlockRequest, UnlockResponse,
};
use crate::store::KvStore;

pub struct Locker<S> {
    store: S,
    config: LockerConfig,
}

impl<S: KvStore> Locker<S> {
    /// Create a locker with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: LockerConfig::default(),
        }
    }

    /// Create a locker with the given configuration.
    pub fn with_config(store: S, config: LockerConfig) -> Result<Self, LockerError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LockerConfig {
        &self.config
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Acquire the lock named by `request.key`.
    ///
    /// Resolves with `LockResponse::Locked` when a claim was created, or with
    /// `LockResponse::Released` when the caller chose `reuse_data` and the
    /// current holder released before `max_wait`.
    pub async fn lock(&self, request: LockRequest) -> Result<LockResponse, LockerError> {
        let options = request.resolve(&self.config)?;
        let key = self.config.namespaced(&request.key);
        let token = Token::generate();

        if options.max_attempts > 1 {
            acquire_with_retry(
                &self.store,
                &key,
                &token,
                options.expires_after,
                options.max_wait,
                options.max_attempts,
            )
            .await?;
            return Ok(LockResponse::Locked { token });
        }

        if options.reuse_data {
            return self.lock_or_wait(&key, token, options).await;
        }

        if try_acquire(&self.store, &key, &token, options.expires_after).await? {
            Ok(LockResponse::Locked { token })
        } else {
            Err(LockerError::LockFailed { key })
        }
    }

    async fn lock_or_wait(
        &self,
        key: &str,
        token: Token,
        options: LockOptions,
    ) -> Result<LockResponse, LockerError> {
        let deadline = Instant::now() + options.max_wait;
        let waiter = ReleaseWaiter::subscribe(&self.store, key).await?;

        if try_acquire(&self.store, key, &token, options.expires_after).await? {
            drop(waiter);
            return Ok(LockResponse::Locked { token });
        }

        debug!(key, "waiting for lock holder to release");
        let notification = waiter.wait(deadline, options.max_wait).await?;
        Ok(notification.into())
    }

    /// Release the lock named by `request.key` if `request.token` still owns it,
    /// broadcasting `request.message` to every waiter.
    pub async fn unlock(&self, request: UnlockRequest) -> Result<UnlockResponse, LockerError> {
        request.validate()?;
        let key = self.config.namespaced(&request.key);

        release(&self.store, &key, &request.token, request.message).await?;
        Ok(UnlockResponse::default())
    }
}
