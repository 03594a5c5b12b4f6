use serde_json::Value;
use tracing::{debug, error, warn};

use super::notification::ReleaseNotification;
use crate::error::LockerError;
use crate::store::KvStore;

/// Replies `compare_and_delete` is allowed to give.
const RELEASE_REPLIES: &[i64] = &[0, 1];

/// Atomically delete `key` if it is still claimed with `token`, then tell
/// any waiters.
///
/// - `1` from the store: the claim is gone. A `released` notification carrying
///   `message` is published fire-and-forget; a failed publish is logged and
///   does not fail the release.
/// - `0`: nothing matched (expired, already released, or wrong token) and
///   `InvalidUnlockToken` is returned. Nothing is deleted or published.
/// - anything else: `UnexpectedResult`.
pub async fn release<S>(
    store: &S,
    key: &str,
    token: &str,
    message: Option<Value>,
) -> Result<(), LockerError>
where
    S: KvStore + ?Sized,
{
    let payload = ReleaseNotification::released(message).encode()?;

    match store.compare_and_delete(key, token).await? {
        1 => {
            debug!(key, "released lock");
            if let Err(err) = store.publish(key, payload).await {
                warn!(key, error = %err, "failed to publish lock release");
            }
            Ok(())
        }
        0 => Err(LockerError::InvalidUnlockToken {
            key: key.to_string(),
            token: token.to_string(),
        }),
        received => {
            error!(
                key,
                token,
                received,
                "unexpected result when running compare-and-delete"
            );
            Err(LockerError::UnexpectedResult {
                expected: RELEASE_REPLIES,
                received,
            })
        }
    }
}
