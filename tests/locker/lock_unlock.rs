//! Acquire/release lifecycle.

use std::time::Duration;

use serde_json::json;
use sourced_locker::{LockRequest, LockResponse, LockState, LockerError, UnlockRequest};

use crate::support::{locker, unique_key};

#[tokio::test]
async fn lock_with_valid_key() {
    let (locker, store) = locker();
    let key = unique_key();

    let response = locker.lock(LockRequest::new(&key)).await.unwrap();

    assert_eq!(response.state(), LockState::Locked);
    assert!(response.token().is_some());
    assert!(store.is_claimed(&key));
}

#[tokio::test]
async fn lock_with_invalid_key() {
    let (locker, _) = locker();

    let err = LockRequest::from_value(&json!({ "key": 1234 })).unwrap_err();
    assert!(matches!(err, LockerError::InvalidParameters { name: ".key", .. }));

    let err = locker.lock(LockRequest::new("")).await.unwrap_err();
    assert!(matches!(err, LockerError::InvalidParameters { name: ".key", .. }));
}

#[tokio::test]
async fn unlock_frees_the_key_for_the_next_caller() {
    let (locker, store) = locker();
    let key = unique_key();

    let response = locker.lock(LockRequest::new(&key)).await.unwrap();
    let token = response.token().unwrap();

    let unlocked = locker
        .unlock(UnlockRequest::new(&key, token))
        .await
        .unwrap();
    assert_eq!(unlocked.state, LockState::Unlocked);
    assert!(!store.is_claimed(&key));

    let again = locker.lock(LockRequest::new(&key)).await.unwrap();
    assert!(again.is_locked());
}

#[tokio::test]
async fn claim_expires_without_release() {
    let (locker, _) = locker();
    let key = unique_key();

    locker
        .lock(LockRequest::new(&key).expires_after(Duration::from_millis(50)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = locker.lock(LockRequest::new(&key)).await.unwrap();
    assert!(matches!(response, LockResponse::Locked { .. }));
}

#[tokio::test]
async fn tokens_differ_between_acquisitions() {
    let (locker, _) = locker();
    let key = unique_key();

    let first = locker.lock(LockRequest::new(&key)).await.unwrap();
    let first_token = first.token().unwrap().clone();
    locker
        .unlock(UnlockRequest::new(&key, &first_token))
        .await
        .unwrap();

    let second = locker.lock(LockRequest::new(&key)).await.unwrap();
    assert_ne!(second.token().unwrap(), &first_token);

    // the stale token cannot release the new claim
    let err = locker
        .unlock(UnlockRequest::new(&key, &first_token))
        .await
        .unwrap_err();
    assert!(matches!(err, LockerError::InvalidUnlockToken { .. }));
}
