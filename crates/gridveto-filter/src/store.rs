//! Collaborators backed by the gridveto state store.
//!
//! Bridges `gridveto_state::StateStore` to the filter's
//! [`AttributeLoader`] and [`ActiveTasksSupplier`] traits.

use std::sync::Arc;

use gridveto_state::{Attribute, StateStore};
use tracing::debug;

use crate::error::FilterResult;
use crate::source::{ActiveTasksSupplier, AttributeLoader, TaskSnapshot};

/// Loads host attributes from the store. Unknown hosts resolve to `None`.
#[derive(Clone, Copy)]
pub struct StoreAttributes<'a> {
    store: &'a StateStore,
}

impl<'a> StoreAttributes<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }
}

impl AttributeLoader for StoreAttributes<'_> {
    fn load(&self, host: &str, name: &str) -> FilterResult<Option<Attribute>> {
        Ok(self.store.get_attribute(host, name)?)
    }
}

/// Reads one job's active tasks from the store on every call.
#[derive(Clone, Copy)]
pub struct StoreTasks<'a> {
    store: &'a StateStore,
    job_key: &'a str,
}

impl<'a> StoreTasks<'a> {
    pub fn new(store: &'a StateStore, job_key: &'a str) -> Self {
        Self { store, job_key }
    }
}

impl ActiveTasksSupplier for StoreTasks<'_> {
    fn active_tasks(&self) -> FilterResult<TaskSnapshot> {
        let tasks = self.store.list_tasks_for_job(self.job_key)?;
        debug!(job = self.job_key, tasks = tasks.len(), "active tasks loaded");
        Ok(Arc::from(tasks))
    }
}
