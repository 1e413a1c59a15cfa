#![forbid(unsafe_code)]
//! In-memory CRUD store for the demo platform.
//!
//! There is no database and no persistence: one ordered map per entity,
//! behind async mutexes, seeded with the demo fixture set. Every call
//! passes a chaos gate that can inject artificial latency and failures
//! for demo realism.

mod chaos;
mod retry;
mod seed;
mod store;

pub use chaos::{ChaosPolicy, FailureSequence};
pub use retry::{BackoffPolicy, RetryPolicy};
pub use seed::seed_demo;
pub use store::{EquityStore, StoreError};

pub const CRATE_NAME: &str = "nocap-store";
