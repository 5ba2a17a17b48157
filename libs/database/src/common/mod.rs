//! Pieces shared by every connector

pub mod error;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use retry::{BackoffPolicy, with_backoff};
