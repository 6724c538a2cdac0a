//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gridveto_state::{ActiveTask, Attribute, AttributeCatalog};

use crate::error::FilterResult;
use crate::source::{ActiveTasksSupplier, AttributeLoader, TaskSnapshot};

pub(crate) const JOB: &str = "prod/api";

pub(crate) fn task(id: &str, host: &str) -> ActiveTask {
    ActiveTask {
        id: id.to_string(),
        job_key: JOB.to_string(),
        host: host.to_string(),
    }
}

pub(crate) fn catalog(attributes: &[(&str, &[&str])]) -> AttributeCatalog {
    AttributeCatalog::from_attributes(
        attributes
            .iter()
            .map(|(name, values)| Attribute::new(*name, values.iter().copied())),
    )
    .unwrap()
}

/// Hosts with attributes plus the job's active tasks.
#[derive(Default)]
pub(crate) struct FakeCluster {
    hosts: HashMap<String, AttributeCatalog>,
    tasks: Vec<ActiveTask>,
    task_fetches: AtomicUsize,
}

impl FakeCluster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_host(mut self, id: &str, attributes: &[(&str, &[&str])]) -> Self {
        self.hosts.insert(id.to_string(), catalog(attributes));
        self
    }

    pub(crate) fn with_catalog(mut self, id: &str, attributes: AttributeCatalog) -> Self {
        self.hosts.insert(id.to_string(), attributes);
        self
    }

    pub(crate) fn with_task(mut self, id: &str, host: &str) -> Self {
        self.tasks.push(task(id, host));
        self
    }

    pub(crate) fn task_fetches(&self) -> usize {
        self.task_fetches.load(Ordering::SeqCst)
    }
}

impl ActiveTasksSupplier for FakeCluster {
    fn active_tasks(&self) -> FilterResult<TaskSnapshot> {
        self.task_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::from(self.tasks.clone()))
    }
}

impl AttributeLoader for FakeCluster {
    fn load(&self, host: &str, name: &str) -> FilterResult<Option<Attribute>> {
        Ok(self
            .hosts
            .get(host)
            .and_then(|attributes| attributes.get(name).cloned()))
    }
}
