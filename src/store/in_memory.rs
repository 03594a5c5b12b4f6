//! In-memory store for testing and single-process scenarios.
//!
//! Provides the same atomic primitives a networked store would, useful for:
//! - Unit and integration testing without an external server
//! - Single-process applications that still want token-checked locks
//! - Development and prototyping

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::{ready, Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;

use super::{ChannelMessage, KvStore, StoreError, Subscription};

/// Buffered messages per channel before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 64;

struct Claim {
    value: String,
    expires_at: Instant,
}

impl Claim {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<ChannelMessage>>>>;

/// In-memory store backed by a claims map and one broadcast channel per key.
///
/// Features:
/// - Thread-safe (clones share the same state)
/// - Claims expire lazily: an expired claim is treated as absent on the next
///   access, and every new claim sweeps the expired ones out of the map
/// - Publishing fans out to every subscriber present at publish time
/// - Messages published with no subscribers are dropped, never buffered
/// - A channel is removed as soon as its last subscription is dropped
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use sourced_locker::store::{InMemoryStore, KvStore};
///
/// # tokio_test_block_on(async {
/// let store = InMemoryStore::new();
/// assert!(store.set_if_absent("k", "t1", Duration::from_secs(5)).await.unwrap());
/// assert!(!store.set_if_absent("k", "t2", Duration::from_secs(5)).await.unwrap());
/// assert_eq!(store.compare_and_delete("k", "t1").await.unwrap(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    claims: Arc<Mutex<HashMap<String, Claim>>>,
    channels: Channels,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` currently holds a live claim.
    pub fn is_claimed(&self, key: &str) -> bool {
        let now = Instant::now();
        self.claims
            .lock()
            .map(|claims| claims.get(key).is_some_and(|claim| claim.is_live(now)))
            .unwrap_or(false)
    }

    /// Number of live subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .map(|channels| {
                channels
                    .get(channel)
                    .map_or(0, |sender| sender.receiver_count())
            })
            .unwrap_or(0)
    }

    /// Number of claims held in the map, expired ones not yet swept included.
    pub fn claim_count(&self) -> usize {
        self.claims.lock().map(|claims| claims.len()).unwrap_or(0)
    }

    /// Number of channels with at least one subscription.
    pub fn channel_count(&self) -> usize {
        self.channels
            .lock()
            .map(|channels| channels.len())
            .unwrap_or(0)
    }

    /// Remove every claim (useful for test cleanup).
    pub fn clear(&self) {
        if let Ok(mut claims) = self.claims.lock() {
            claims.clear();
        }
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| StoreError::Poisoned("claims map"))?;

        if claims.get(key).is_some_and(|claim| claim.is_live(now)) {
            return Ok(false);
        }
        claims.retain(|_, claim| claim.is_live(now));

        claims.insert(
            key.to_string(),
            Claim {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| StoreError::Poisoned("claims map"))?;

        match claims.get(key) {
            Some(claim) if !claim.is_live(now) => {
                claims.remove(key);
                Ok(0)
            }
            Some(claim) if claim.value == expected => {
                claims.remove(key);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn publish(&self, channel: &str, payload: String) -> Result<(), StoreError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| StoreError::Poisoned("channels map"))?;

        if let Some(sender) = channels.get(channel) {
            // no receivers left: nobody is listening, so the message is lost
            if sender.send(ChannelMessage::new(channel, payload)).is_err() {
                channels.remove(channel);
            }
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| StoreError::Poisoned("channels map"))?;

        let receiver = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let messages = ChannelStream {
            messages: Some(BroadcastStream::new(receiver)),
            channel: channel.to_string(),
            channels: Arc::clone(&self.channels),
        };
        Ok(Subscription::new(channel, messages))
    }
}

/// Receiving end of one subscription.
///
/// Dropping it removes the channel from the store once no other subscription
/// is left on it.
struct ChannelStream {
    messages: Option<BroadcastStream<ChannelMessage>>,
    channel: String,
    channels: Channels,
}

impl Stream for ChannelStream {
    type Item = ChannelMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(messages) = self.messages.as_mut() else {
            return Poll::Ready(None);
        };
        loop {
            match ready!(messages.poll_next_unpin(cx)) {
                Some(Ok(message)) => return Poll::Ready(Some(message)),
                // lagged: the skipped messages are gone, keep receiving
                Some(Err(_)) => continue,
                None => return Poll::Ready(None),
            }
        }
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        let Ok(mut channels) = self.channels.lock() else {
            return;
        };
        // release the receiver under the lock so the count below is exact
        self.messages.take();
        let abandoned = channels
            .get(&self.channel)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if abandoned {
            channels.remove(&self.channel);
        }
    }
}
