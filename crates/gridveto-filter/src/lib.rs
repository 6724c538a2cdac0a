//! gridveto-filter — decides whether a host satisfies a job's placement constraints.
//!
//! The filter does not rank hosts or plan placements. For one candidate
//! host it produces a set of [`Veto`]s; an empty set means the host is
//! eligible. A scheduler runs it over every candidate and drops the vetoed
//! ones before scoring what remains.
//!
//! # Components
//!
//! - **`value`** — value constraints (attribute must / must not match)
//! - **`limit`** — limit constraints (max co-located tasks per attribute value)
//! - **`filter`** — per-host orchestrator dispatching each constraint
//! - **`source`** — collaborator traits for active tasks and host attributes
//! - **`store`** — collaborators backed by `gridveto_state::StateStore`
//! - **`eligibility`** — runs the filter over a set of hosts

pub mod eligibility;
pub mod error;
pub mod filter;
pub mod limit;
pub mod source;
pub mod store;
pub mod value;
pub mod veto;

#[cfg(test)]
pub(crate) mod testing;

pub use eligibility::{HostVerdict, filter_hosts};
pub use error::{FilterError, FilterResult};
pub use filter::ConstraintFilter;
pub use source::{ActiveTasksSupplier, AttributeLoader, Memoized, TaskSnapshot};
pub use store::{StoreAttributes, StoreTasks};
pub use veto::{MISSING_LIMIT, UNSATISFIED_LIMIT, UNSATISFIED_VALUE, Veto};
