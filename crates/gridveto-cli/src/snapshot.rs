//! Cluster snapshots: hosts, jobs and active tasks in one TOML file.
//!
//! ```toml
//! [[hosts]]
//! id = "host-a"
//! attributes = { rack = ["r1"], zone = ["east"] }
//!
//! [[jobs]]
//! key = "prod/api"
//! constraints = [
//!     { name = "zone", type = "value", values = ["east"] },
//!     { name = "rack", type = "limit", limit = 1 },
//! ]
//!
//! [[tasks]]
//! id = "0"
//! job_key = "prod/api"
//! host = "host-a"
//! ```

use std::path::Path;

use anyhow::Context;
use gridveto_state::{ActiveTask, HostRecord, JobSpec, StateStore};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub hosts: Vec<HostRecord>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
    #[serde(default)]
    pub tasks: Vec<ActiveTask>,
}

impl ClusterSnapshot {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: ClusterSnapshot = toml::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    /// Load a snapshot file into a fresh in-memory store.
    pub fn load_in_memory(path: &Path) -> anyhow::Result<StateStore> {
        let store = StateStore::open_in_memory()?;
        Self::from_file(path)?.apply(&store)?;
        Ok(store)
    }

    /// Write every record into `store` in one transaction, replacing records
    /// with the same key. An invalid record leaves the store untouched.
    pub fn apply(&self, store: &StateStore) -> anyhow::Result<()> {
        store
            .put_batch(&self.hosts, &self.jobs, &self.tasks)
            .context("importing snapshot")?;
        info!(
            hosts = self.hosts.len(),
            jobs = self.jobs.len(),
            tasks = self.tasks.len(),
            "snapshot applied"
        );
        Ok(())
    }
}
