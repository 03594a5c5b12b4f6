//! Redis-backed store (requires the `redis` feature).
//!
//! - claim: `SET key token PX ttl NX`
//! - release: one Lua script, so the compare and the delete cannot interleave
//!   with another caller's claim
//! - notifications: `PUBLISH` on a shared multiplexed connection, and one
//!   dedicated pub/sub connection per subscription

use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::{Client, Script};
use async_trait::async_trait;
use futures::StreamExt;

use super::{ChannelMessage, KvStore, StoreError, Subscription};
use crate::config::millis;

/// Deletes KEYS[1] only when its value equals ARGV[1]. Replies 1 or 0.
const COMPARE_AND_DELETE: &str = r#"
    if redis.call('get', KEYS[1]) == ARGV[1] then
        return redis.call('del', KEYS[1])
    end
    return 0
"#;

/// Store backed by a Redis server.
///
/// ## Example
///
/// ```ignore
/// let store = RedisStore::open("redis://127.0.0.1/").await?;
/// let locker = Locker::new(store);
/// ```
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: MultiplexedConnection,
    compare_and_delete: Script,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `"redis://127.0.0.1/"`).
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        Self::from_client(client).await
    }

    /// Build a store from an already configured client.
    pub async fn from_client(client: Client) -> Result<Self, StoreError> {
        let connection = client.get_multiplexed_async_connection().await?;
        tracing::debug!(addr = ?client.get_connection_info().addr, "connected to redis");
        Ok(Self {
            client,
            connection,
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let reply: Option<String> = ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis(ttl))
            .arg("NX")
            .query_async(&mut connection)
            .await?;
        Ok(reply.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<i64, StoreError> {
        let mut connection = self.connection.clone();
        let deleted: i64 = self
            .compare_and_delete
            .key(key)
            .arg(expected)
            .invoke_async(&mut connection)
            .await?;
        Ok(deleted)
    }

    async fn publish(&self, channel: &str, payload: String) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _receivers: i64 = ::redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        // the stream owns the connection; dropping it closes the subscription
        let messages = pubsub.into_on_message().filter_map(|msg| {
            let message = msg
                .get_payload::<String>()
                .ok()
                .map(|payload| ChannelMessage::new(msg.get_channel_name(), payload));
            futures::future::ready(message)
        });
        Ok(Subscription::new(channel, messages))
    }
}
