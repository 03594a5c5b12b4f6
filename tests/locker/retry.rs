//! Acquisition with `max_attempts > 1`.

use std::time::{Duration, Instant};

use sourced_locker::{LockRequest, Locker, LockerConfig, LockerError, UnlockRequest};

use crate::support::{locker, locker_with, unique_key, DownStore, HOLD};

#[tokio::test]
async fn cannot_double_acquire_with_max_attempts() {
    let (locker, _) = locker();
    let key = unique_key();

    locker
        .lock(LockRequest::new(&key).expires_after(HOLD))
        .await
        .unwrap();

    let start = Instant::now();
    let err = locker
        .lock(
            LockRequest::new(&key)
                .max_wait(Duration::from_millis(300))
                .max_attempts(3),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LockerError::MaxAttemptsReached {
            max_attempts: 3,
            ..
        }
    ));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "gave up after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1000), "gave up after {elapsed:?}");
}

#[tokio::test]
async fn retry_wins_once_holder_releases() {
    let (locker, _) = locker();
    let key = unique_key();

    let held = locker.lock(LockRequest::new(&key)).await.unwrap();
    let token = held.token().unwrap().clone();

    let releaser = locker.clone();
    let release_key = key.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        releaser
            .unlock(UnlockRequest::new(release_key, &token))
            .await
            .unwrap();
    });

    let response = locker
        .lock(
            LockRequest::new(&key)
                .max_wait(Duration::from_millis(1000))
                .max_attempts(10),
        )
        .await
        .unwrap();
    assert!(response.is_locked());
}

#[tokio::test]
async fn retry_settings_come_from_config() {
    let config = LockerConfig::default()
        .max_wait(Duration::from_millis(100))
        .max_attempts(4);
    let (locker, _) = locker_with(config);
    let key = unique_key();

    locker.lock(LockRequest::new(&key)).await.unwrap();

    let err = locker.lock(LockRequest::new(&key)).await.unwrap_err();
    assert!(matches!(
        err,
        LockerError::MaxAttemptsReached {
            max_attempts: 4,
            ..
        }
    ));
}

#[tokio::test]
async fn store_failure_aborts_retries_immediately() {
    let store = DownStore::default();
    let locker = Locker::new(store);

    let start = Instant::now();
    let err = locker
        .lock(
            LockRequest::new("k")
                .max_wait(Duration::from_secs(5))
                .max_attempts(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LockerError::Store(_)));
    assert_eq!(locker.store().calls(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}
