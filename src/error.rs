use std::time::Duration;

use crate::store::StoreError;

/// Error type for lock and unlock operations.
///
/// Every failure of `Locker::lock` / `Locker::unlock` is delivered through
/// this type. Contention outcomes (`LockFailed`, `MaxAttemptsReached`,
/// `LockTimeout`) are kept apart from store failures so callers can tell
/// "someone else holds it" from "the store could not answer".
#[derive(Debug, thiserror::Error)]
pub enum LockerError {
    /// A required field was missing or had the wrong type.
    #[error("invalid parameter \"{name}\"! expected: \"{expected}\", actual: \"{actual}\"")]
    InvalidParameters {
        name: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// A single claim attempt found the resource already held.
    #[error("failed to acquire lock for \"{key}\"")]
    LockFailed { key: String },

    /// Every retry attempt found the resource held.
    #[error("reached max attempts ({max_attempts}) to acquire lock for \"{key}\"")]
    MaxAttemptsReached { key: String, max_attempts: u32 },

    /// No release notification arrived before the deadline.
    #[error("failed to acquire lock for \"{key}\" within {}ms", .max_wait.as_millis())]
    LockTimeout { key: String, max_wait: Duration },

    /// The token does not match the current claim, or there is no claim.
    #[error("token \"{token}\" is not valid to unlock key \"{key}\"")]
    InvalidUnlockToken { key: String, token: String },

    /// The store's atomic primitive replied outside its documented contract.
    #[error("expected store result to be one of {expected:?}! received \"{received}\" instead")]
    UnexpectedResult {
        expected: &'static [i64],
        received: i64,
    },

    /// A release notification could not be encoded.
    #[error("failed to encode release notification: {0}")]
    Encode(#[source] serde_json::Error),

    /// A message on a lock channel was not a release notification.
    #[error("malformed release notification: {0}")]
    MalformedNotification(#[source] serde_json::Error),

    /// Transport or store failure, propagated verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LockerError {
    pub(crate) fn invalid(
        name: &'static str,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        LockerError::InvalidParameters {
            name,
            expected,
            actual: actual.into(),
        }
    }

    /// Whether this error means the resource is held by someone else
    /// (as opposed to a bad request or an infrastructure failure).
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            LockerError::LockFailed { .. }
                | LockerError::MaxAttemptsReached { .. }
                | LockerError::LockTimeout { .. }
        )
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            LockerError::InvalidParameters { .. } => 400,
            LockerError::LockFailed { .. } => 409,
            LockerError::MaxAttemptsReached { .. } => 409,
            LockerError::LockTimeout { .. } => 408,
            LockerError::InvalidUnlockToken { .. } => 403,
            LockerError::UnexpectedResult { .. } => 500,
            LockerError::Encode(_) => 400,
            LockerError::MalformedNotification(_) => 502,
            LockerError::Store(_) => 503,
        }
    }
}
