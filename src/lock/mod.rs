//! Lock engines - the acquisition and release protocol.
//!
//! ```text
//! lock:    caller ─► try_acquire ──► Locked { token }
//!                        │ contended
//!                        ├─► acquire_with_retry   (max_attempts > 1)
//!                        └─► ReleaseWaiter        (reuse_data)
//!
//! unlock:  caller ─► release ─► compare_and_delete ─► publish ─► every waiter
//! ```
//!
//! The engines are free functions over any `KvStore`; `Locker` composes them.

mod acquire;
mod notification;
mod release;
mod request;
mod retry;
#[cfg(test)]
mod test_support;
mod token;
mod waiter;

pub use acquire::try_acquire;
pub use notification::{LockState, ReleaseNotification};
pub use release::release;
pub(crate) use request::LockOptions;
pub use request::{LockRequest, LockResponse, UnlockRequest, UnlockResponse};
pub use retry::acquire_with_retry;
pub use token::Token;
pub use waiter::{wait_for_release, ReleaseWaiter};
