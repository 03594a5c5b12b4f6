//! Caller-facing request and response types.
//!
//! Requests are built either with the typed builders or from loosely typed
//! JSON (`from_value`), which is where wrong-typed fields get reported as
//! `InvalidParameters`. Absent options fall back to the `LockerConfig` the
//! locker was built with.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::notification::{LockState, ReleaseNotification};
use super::token::Token;
use crate::config::LockerConfig;
use crate::error::LockerError;

/// Parameters for one `lock` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockRequest {
    pub key: String,
    pub expires_after: Option<Duration>,
    pub max_wait: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub reuse_data: Option<bool>,
}

/// A `LockRequest` with every option resolved against the config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LockOptions {
    pub expires_after: Duration,
    pub max_wait: Duration,
    pub max_attempts: u32,
    pub reuse_data: bool,
}

impl LockRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn expires_after(mut self, ttl: Duration) -> Self {
        self.expires_after = Some(ttl);
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn reuse_data(mut self, reuse_data: bool) -> Self {
        self.reuse_data = Some(reuse_data);
        self
    }

    /// Build a request from a JSON object such as
    /// `{ "key": "orders", "maxWait": 1000, "reuseData": true }`.
    pub fn from_value(value: &Value) -> Result<Self, LockerError> {
        let fields = object(value)?;
        Ok(Self {
            key: required_string(fields, "key")?,
            expires_after: optional_millis(fields, "expiresAfter")?,
            max_wait: optional_millis(fields, "maxWait")?,
            max_attempts: optional_u32(fields, "maxAttempts")?,
            reuse_data: optional_bool(fields, "reuseData")?,
        })
    }

    pub(crate) fn resolve(&self, config: &LockerConfig) -> Result<LockOptions, LockerError> {
        require_non_empty(".key", &self.key)?;

        let options = LockOptions {
            expires_after: self
                .expires_after
                .unwrap_or_else(|| config.default_expires_after()),
            max_wait: self.max_wait.unwrap_or_else(|| config.default_max_wait()),
            max_attempts: self.max_attempts.unwrap_or(config.max_attempts),
            reuse_data: self.reuse_data.unwrap_or(config.reuse_data),
        };

        if options.expires_after.is_zero() {
            return Err(LockerError::invalid(
                ".expiresAfter",
                "positive number",
                "0",
            ));
        }
        if options.max_attempts == 0 {
            return Err(LockerError::invalid(".maxAttempts", "positive number", "0"));
        }
        Ok(options)
    }
}

/// Parameters for one `unlock` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnlockRequest {
    pub key: String,
    pub token: String,
    /// Broadcast to waiters alongside the release.
    pub message: Option<Value>,
}

impl UnlockRequest {
    pub fn new(key: impl Into<String>, token: impl AsRef<str>) -> Self {
        Self {
            key: key.into(),
            token: token.as_ref().to_string(),
            message: None,
        }
    }

    pub fn message(mut self, message: Value) -> Self {
        self.message = Some(message);
        self
    }

    /// Attach any serializable value as the release message.
    pub fn with_message<T: Serialize>(mut self, message: &T) -> Result<Self, LockerError> {
        self.message = Some(serde_json::to_value(message).map_err(LockerError::Encode)?);
        Ok(self)
    }

    /// Build a request from a JSON object such as
    /// `{ "key": "orders", "token": "...", "message": { ... } }`.
    pub fn from_value(value: &Value) -> Result<Self, LockerError> {
        let fields = object(value)?;
        Ok(Self {
            key: required_string(fields, "key")?,
            token: required_string(fields, "token")?,
            message: fields.get("message").filter(|m| !m.is_null()).cloned(),
        })
    }

    pub(crate) fn validate(&self) -> Result<(), LockerError> {
        require_non_empty(".key", &self.key)?;
        require_non_empty(".token", &self.token)
    }
}

/// Outcome of a successful `lock` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LockResponse {
    /// The caller now owns the claim.
    Locked { token: Token },
    /// The caller waited and observed the holder's release instead.
    Released {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<Value>,
    },
}

impl LockResponse {
    pub fn state(&self) -> LockState {
        match self {
            LockResponse::Locked { .. } => LockState::Locked,
            LockResponse::Released { .. } => LockState::Released,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LockResponse::Locked { .. })
    }

    /// The ownership token, when the claim was acquired.
    pub fn token(&self) -> Option<&Token> {
        match self {
            LockResponse::Locked { token } => Some(token),
            LockResponse::Released { .. } => None,
        }
    }

    /// The release message, when the call resolved through a notification.
    pub fn message(&self) -> Option<&Value> {
        match self {
            LockResponse::Locked { .. } => None,
            LockResponse::Released { message } => message.as_ref(),
        }
    }

    pub fn decode_message<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.message()
            .cloned()
            .map(serde_json::from_value)
            .transpose()
    }
}

impl From<ReleaseNotification> for LockResponse {
    fn from(notification: ReleaseNotification) -> Self {
        LockResponse::Released {
            message: notification.message,
        }
    }
}

/// `{ "state": "unlocked" }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub state: LockState,
}

impl Default for UnlockResponse {
    fn default() -> Self {
        Self {
            state: LockState::Unlocked,
        }
    }
}

// ============================================================================
// JSON field helpers
// ============================================================================

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn object(value: &Value) -> Result<&Map<String, Value>, LockerError> {
    value
        .as_object()
        .ok_or_else(|| LockerError::invalid("params", "object", type_name(Some(value))))
}

fn field_name(field: &str) -> &'static str {
    match field {
        "key" => ".key",
        "token" => ".token",
        "expiresAfter" => ".expiresAfter",
        "maxWait" => ".maxWait",
        "maxAttempts" => ".maxAttempts",
        "reuseData" => ".reuseData",
        _ => "params",
    }
}

fn required_string(fields: &Map<String, Value>, field: &str) -> Result<String, LockerError> {
    match fields.get(field) {
        Some(Value::String(s)) if s.is_empty() => Err(LockerError::invalid(
            field_name(field),
            "string",
            "empty string",
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(LockerError::invalid(
            field_name(field),
            "string",
            type_name(other),
        )),
    }
}

fn present<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    fields.get(field).filter(|value| !value.is_null())
}

fn optional_u64(fields: &Map<String, Value>, field: &str) -> Result<Option<u64>, LockerError> {
    match present(fields, field) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            LockerError::invalid(field_name(field), "non-negative integer", n.to_string())
        }),
        Some(other) => Err(LockerError::invalid(
            field_name(field),
            "number",
            type_name(Some(other)),
        )),
    }
}

fn optional_millis(
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Option<Duration>, LockerError> {
    Ok(optional_u64(fields, field)?.map(Duration::from_millis))
}

fn optional_u32(fields: &Map<String, Value>, field: &str) -> Result<Option<u32>, LockerError> {
    optional_u64(fields, field)?
        .map(|n| {
            u32::try_from(n)
                .map_err(|_| LockerError::invalid(field_name(field), "u32", n.to_string()))
        })
        .transpose()
}

fn optional_bool(fields: &Map<String, Value>, field: &str) -> Result<Option<bool>, LockerError> {
    match present(fields, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(LockerError::invalid(
            field_name(field),
            "boolean",
            type_name(Some(other)),
        )),
    }
}

fn require_non_empty(name: &'static str, value: &str) -> Result<(), LockerError> {
    if value.is_empty() {
        return Err(LockerError::invalid(name, "string", "empty string"));
    }
    Ok(())
}
