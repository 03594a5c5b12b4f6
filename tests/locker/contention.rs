//! Concurrent single-shot acquisition.

use std::sync::Arc;

use sourced_locker::{InMemoryStore, LockRequest, Locker, LockerError};

use crate::support::{init_tracing, locker, unique_key, DownStore, HOLD};

#[tokio::test]
async fn cannot_double_acquire_within_expiry() {
    let (locker, _) = locker();
    let key = unique_key();

    locker
        .lock(LockRequest::new(&key).expires_after(HOLD))
        .await
        .unwrap();

    let err = locker.lock(LockRequest::new(&key)).await.unwrap_err();
    assert!(matches!(err, LockerError::LockFailed { .. }));
    assert!(err.is_contention());
}

#[tokio::test]
async fn two_concurrent_attempts_yield_one_winner() {
    let (locker, _) = locker();
    let key = unique_key();

    let (a, b) = tokio::join!(
        locker.lock(LockRequest::new(&key)),
        locker.lock(LockRequest::new(&key)),
    );

    let acquired = [&a, &b].iter().filter(|r| r.is_ok()).count();
    let failed = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(LockerError::LockFailed { .. })))
        .count();
    assert_eq!(acquired, 1);
    assert_eq!(failed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_lockers_sharing_a_store_yield_one_winner() {
    init_tracing();
    let store = InMemoryStore::new();
    let key = unique_key();

    // one locker per contender, as separate processes would have
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let locker = Arc::new(Locker::new(store.clone()));
            let key = key.clone();
            tokio::spawn(async move { locker.lock(LockRequest::new(key)).await })
        })
        .collect();

    let mut acquired = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(response) => {
                assert!(response.is_locked());
                acquired += 1;
            }
            Err(err) => assert!(matches!(err, LockerError::LockFailed { .. })),
        }
    }
    assert_eq!(acquired, 1);
}

#[tokio::test]
async fn locks_on_different_keys_are_independent() {
    let (locker, _) = locker();

    let a = locker.lock(LockRequest::new(unique_key())).await.unwrap();
    let b = locker.lock(LockRequest::new(unique_key())).await.unwrap();

    assert!(a.is_locked());
    assert!(b.is_locked());
}

#[tokio::test]
async fn store_failure_is_not_reported_as_contention() {
    let locker = Locker::new(DownStore::default());

    let err = locker.lock(LockRequest::new("k")).await.unwrap_err();

    assert!(matches!(err, LockerError::Store(_)));
    assert!(!err.is_contention());
}
