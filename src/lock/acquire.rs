use std::time::Duration;

use tracing::debug;

use super::token::Token;
use crate::config::millis;
use crate::error::LockerError;
use crate::store::KvStore;

/// One atomic "claim if absent" round-trip.
///
/// `Ok(true)` means a claim for `key` now holds `token` and starts expiring
/// after `ttl`. `Ok(false)` means the key was already claimed. Store errors
/// are returned untouched; the claim's state is unknown when one occurs.
pub async fn try_acquire<S>(
    store: &S,
    key: &str,
    token: &Token,
    ttl: Duration,
) -> Result<bool, LockerError>
where
    S: KvStore + ?Sized,
{
    let acquired = store.set_if_absent(key, token.as_str(), ttl).await?;
    if acquired {
        debug!(key, ttl_ms = millis(ttl), "created lock");
    } else {
        debug!(key, "lock is taken already");
    }
    Ok(acquired)
}
