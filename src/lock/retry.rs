use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

use super::acquire::try_acquire;
use super::token::Token;
use crate::error::LockerError;
use crate::store::KvStore;

/// Repeat claim attempts at an even cadence inside `max_wait`.
///
/// The budget is split into `max_attempts` slots of `max_wait / max_attempts`.
/// Each slot starts with one claim attempt; a contended attempt sleeps until
/// the slot ends. Exhausting every slot therefore takes about `max_wait` and
/// yields `MaxAttemptsReached`. A store error ends the loop immediately:
/// only contention is retried.
pub async fn acquire_with_retry<S>(
    store: &S,
    key: &str,
    token: &Token,
    ttl: Duration,
    max_wait: Duration,
    max_attempts: u32,
) -> Result<(), LockerError>
where
    S: KvStore + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let interval = max_wait / max_attempts;
    let start = Instant::now();

    for attempt in 1..=max_attempts {
        if try_acquire(store, key, token, ttl).await? {
            debug!(key, attempt, "acquired lock");
            return Ok(());
        }
        time::sleep_until(start + interval * attempt).await;
    }

    debug!(key, max_attempts, "reached max attempts");
    Err(LockerError::MaxAttemptsReached {
        key: key.to_string(),
        max_attempts,
    })
}
