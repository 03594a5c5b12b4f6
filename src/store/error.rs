/// Error type for store round-trips.
///
/// These are transport or infrastructure failures. The locker never retries
/// them, since the true state of a claim is unknown when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the command.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A guard around in-process store state was poisoned.
    #[error("store state poisoned during {0}")]
    Poisoned(&'static str),
    /// The notification stream for a channel ended while it was still needed.
    #[error("subscription to channel \"{0}\" closed")]
    SubscriptionClosed(String),
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}
