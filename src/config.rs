//! Locker configuration, resolved once when a `Locker` is built.
//!
//! Keys follow the factory options callers already use (`locksExpireAfter`,
//! `maxWait`, `maxAttempts`, `reuseData`, `keyPrefix`); durations are in
//! milliseconds. Every value can be overridden per call on `LockRequest`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LockerError;

pub const DEFAULT_LOCKS_EXPIRE_AFTER_MS: u64 = 5000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 5000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Process-wide defaults for lock requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LockerConfig {
    /// Claim time-to-live in the store.
    #[serde(rename = "locksExpireAfter")]
    pub locks_expire_after_ms: u64,
    /// How long a caller is willing to wait, across retries or for a release.
    #[serde(rename = "maxWait")]
    pub max_wait_ms: u64,
    /// Claim attempts spread across `max_wait`. `1` means a single shot.
    pub max_attempts: u32,
    /// Wait for the holder's release notification instead of failing.
    pub reuse_data: bool,
    /// Namespace applied to every key and its notification channel.
    pub key_prefix: String,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            locks_expire_after_ms: DEFAULT_LOCKS_EXPIRE_AFTER_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            reuse_data: false,
            key_prefix: String::new(),
        }
    }
}

impl LockerConfig {
    /// Parse a JSON object of options. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, LockerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LockerError::invalid("config", "options object", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn locks_expire_after(mut self, ttl: Duration) -> Self {
        self.locks_expire_after_ms = millis(ttl);
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait_ms = millis(max_wait);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn reuse_data(mut self, reuse_data: bool) -> Self {
        self.reuse_data = reuse_data;
        self
    }

    /// Set the key namespace. A trailing `:` is added when missing.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Reject values no request could be served with.
    pub fn validate(&self) -> Result<(), LockerError> {
        if self.locks_expire_after_ms == 0 {
            return Err(LockerError::invalid(
                ".locksExpireAfter",
                "positive number",
                "0",
            ));
        }
        if self.max_attempts == 0 {
            return Err(LockerError::invalid(".maxAttempts", "positive number", "0"));
        }
        Ok(())
    }

    pub fn default_expires_after(&self) -> Duration {
        Duration::from_millis(self.locks_expire_after_ms)
    }

    pub fn default_max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    /// The store key (and channel) for a caller-supplied key.
    pub fn namespaced(&self, key: &str) -> String {
        match self.key_prefix.as_str() {
            "" => key.to_string(),
            prefix if prefix.ends_with(':') => format!("{prefix}{key}"),
            prefix => format!("{prefix}:{key}"),
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
