//! gridveto-state — embedded cluster state for the constraint filter.
//!
//! Backed by [redb](https://docs.rs/redb), holds the three kinds of record
//! the filter's collaborators read: host attribute catalogs, job specs (with
//! their placement constraints) and the active tasks of each job.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Task keys are composite (`{job_key}:{task_id}`) so a job's tasks can be
//! found with a prefix scan.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across scheduling threads.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
