//! Distributed mutual-exclusion locks over an atomic key-value store.
//!
//! A lock is a key in the store holding a random token with a time-to-live.
//! Acquiring is a single "set if absent"; releasing is a single
//! "delete if the value still equals my token", followed by a broadcast on the
//! key's channel so contenders waiting with `reuse_data` receive whatever the
//! holder attached. All mutual exclusion comes from the store's atomicity.

mod config;
mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod lock;
mod locker;
pub mod store;

pub use config::{
    LockerConfig, DEFAULT_LOCKS_EXPIRE_AFTER_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_WAIT_MS,
};
pub use error::LockerError;
pub use lock::{
    LockRequest, LockResponse, LockState, ReleaseNotification, Token, UnlockRequest,
    UnlockResponse,
};
pub use locker::Locker;
#[cfg(feature = "redis")]
pub use store::RedisStore;
pub use store::{InMemoryStore, KvStore, StoreError};
