//! Key-value store boundary - the atomic primitives the locker consumes.
//!
//! The locker never keeps claim state of its own. Every decision is a
//! round-trip to a store that offers four operations:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         KvStore                              │
//! │  set_if_absent(key, value, ttl)   -> bool   (claim)          │
//! │  compare_and_delete(key, value)   -> 0 | 1  (release)        │
//! │  publish(channel, payload)                  (fan-out)        │
//! │  subscribe(channel)               -> Subscription            │
//! └──────────────────────────────────────────────────────────────┘
//!          │                                  │
//!          ▼                                  ▼
//! ┌─────────────────┐              ┌─────────────────────┐
//! │  InMemoryStore  │              │     RedisStore      │
//! │   (included)    │              │  (feature "redis")  │
//! └─────────────────┘              └─────────────────────┘
//! ```

mod error;
mod in_memory;
#[cfg(feature = "redis")]
mod redis;
mod subscription;

pub use error::StoreError;
pub use in_memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
pub use subscription::{ChannelMessage, Subscription};

use std::time::Duration;

use async_trait::async_trait;

/// Trait for the external store backing the locker.
///
/// Implementations must make `set_if_absent` and `compare_and_delete` atomic
/// per key. Mutual exclusion is delegated entirely to these two calls.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Set `key` to `value` with the given time-to-live, only if `key` does not exist.
    ///
    /// Returns `Ok(true)` if the key was created, `Ok(false)` if it already existed.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Delete `key` only if its current value equals `expected`, as one indivisible operation.
    ///
    /// Returns the raw store reply: `1` when deleted, `0` when absent or mismatched.
    /// Anything else is outside the contract and is reported as-is.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<i64, StoreError>;

    /// Publish `payload` to everyone currently subscribed to `channel`.
    async fn publish(&self, channel: &str, payload: String) -> Result<(), StoreError>;

    /// Subscribe to `channel`. Dropping the returned subscription unsubscribes.
    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError>;
}
