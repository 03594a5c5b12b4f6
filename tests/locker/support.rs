//! Shared fixtures: lockers over an in-memory store, and faulty stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use sourced_locker::store::Subscription;
use sourced_locker::{InMemoryStore, KvStore, Locker, LockerConfig, StoreError};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A key no other test uses.
pub fn unique_key() -> String {
    format!("test:{}", sourced_locker::Token::generate())
}

/// A locker (shareable across tasks) and a handle on its store.
pub fn locker() -> (Arc<Locker<InMemoryStore>>, InMemoryStore) {
    init_tracing();
    let store = InMemoryStore::new();
    (Arc::new(Locker::new(store.clone())), store)
}

pub fn locker_with(config: LockerConfig) -> (Arc<Locker<InMemoryStore>>, InMemoryStore) {
    init_tracing();
    let store = InMemoryStore::new();
    let locker = Locker::with_config(store.clone(), config).unwrap();
    (Arc::new(locker), store)
}

pub const HOLD: Duration = Duration::from_secs(10);

/// A store whose every round-trip fails, counting the attempts.
#[derive(Default)]
pub struct DownStore {
    pub calls: AtomicUsize,
}

impl DownStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl KvStore for DownStore {
    async fn set_if_absent(&self, _: &str, _: &str, _: Duration) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn compare_and_delete(&self, _: &str, _: &str) -> Result<i64, StoreError> {
        self.fail()
    }

    async fn publish(&self, _: &str, _: String) -> Result<(), StoreError> {
        self.fail()
    }

    async fn subscribe(&self, _: &str) -> Result<Subscription, StoreError> {
        self.fail()
    }
}

/// An in-memory store that drops every publish and can misreport deletes.
#[derive(Default)]
pub struct LossyStore {
    pub inner: InMemoryStore,
    pub delete_reply: Option<i64>,
}

#[async_trait]
impl KvStore for LossyStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<i64, StoreError> {
        match self.delete_reply {
            Some(reply) => Ok(reply),
            None => self.inner.compare_and_delete(key, expected).await,
        }
    }

    async fn publish(&self, _: &str, _: String) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("publish dropped".into()))
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(channel).await
    }
}
