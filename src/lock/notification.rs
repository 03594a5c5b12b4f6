//! Wire envelope broadcast on a key's channel when its claim is released.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LockerError;

/// Lifecycle states reported to callers and carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Unlocked,
    Released,
}

/// `{ "state": "released", "message": ... }`
///
/// The message is whatever the releasing caller attached; the locker treats
/// it as opaque JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReleaseNotification {
    pub state: LockState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ReleaseNotification {
    pub fn released(message: Option<Value>) -> Self {
        Self {
            state: LockState::Released,
            message,
        }
    }

    pub fn encode(&self) -> Result<String, LockerError> {
        serde_json::to_string(self).map_err(LockerError::Encode)
    }

    pub fn decode(payload: &str) -> Result<Self, LockerError> {
        serde_json::from_str(payload).map_err(LockerError::MalformedNotification)
    }

    /// Deserialize the attached message into `T`. `None` when there was no message.
    pub fn decode_message<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.message
            .clone()
            .map(serde_json::from_value)
            .transpose()
    }
}
