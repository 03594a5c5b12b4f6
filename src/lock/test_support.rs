//! Store double for engine tests: an `InMemoryStore` with switchable faults.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::store::{InMemoryStore, KvStore, StoreError, Subscription};

#[derive(Default)]
pub(crate) struct ScriptedStore {
    pub inner: InMemoryStore,
    pub claim_calls: AtomicUsize,
    pub publish_calls: AtomicUsize,
    fail_claims: bool,
    fail_publish: bool,
    delete_reply: Option<i64>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_claims(mut self) -> Self {
        self.fail_claims = true;
        self
    }

    pub fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn delete_reply(mut self, reply: i64) -> Self {
        self.delete_reply = Some(reply);
        self
    }

    pub fn claims(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for ScriptedStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_claims {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<i64, StoreError> {
        match self.delete_reply {
            Some(reply) => Ok(reply),
            None => self.inner.compare_and_delete(key, expected).await,
        }
    }

    async fn publish(&self, channel: &str, payload: String) -> Result<(), StoreError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_publish {
            return Err(StoreError::Unavailable("publish dropped".into()));
        }
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(channel).await
    }
}
