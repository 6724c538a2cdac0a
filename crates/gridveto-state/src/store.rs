//! StateStore — redb-backed cluster state for gridveto.
//!
//! Provides typed CRUD over hosts, jobs and active tasks. All values are
//! JSON-serialized into redb's `&[u8]` value columns. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Encoded key and value, ready to insert.
type Row = (String, Vec<u8>);

fn encode<T: Serialize>(record: &T) -> StateResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(map_err!(Serialize))
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(HOSTS).map_err(map_err!(Table))?;
        txn.open_table(JOBS).map_err(map_err!(Table))?;
        txn.open_table(TASKS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn put<T: Serialize>(&self, table: Table, key: &str, record: &T) -> StateResult<()> {
        let value = encode(record)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, table: Table, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let record = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Every record whose key starts with `prefix` (all records for `""`).
    fn scan<T: DeserializeOwned>(&self, table: Table, prefix: &str) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(prefix) {
                let record = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                results.push(record);
            }
        }
        Ok(results)
    }

    fn remove(&self, table: Table, keys: &[String]) -> StateResult<u32> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let mut removed = 0;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            for key in keys {
                if table.remove(key.as_str()).map_err(map_err!(Write))?.is_some() {
                    removed += 1;
                }
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(removed)
    }

    // ── Batches ────────────────────────────────────────────────────

    /// Write hosts, jobs and tasks in a single transaction.
    ///
    /// Every record is validated before anything is written; on any error
    /// the store is left unchanged.
    pub fn put_batch(
        &self,
        hosts: &[HostRecord],
        jobs: &[JobSpec],
        tasks: &[ActiveTask],
    ) -> StateResult<()> {
        jobs.iter().try_for_each(JobSpec::validate)?;
        tasks.iter().try_for_each(ActiveTask::validate)?;

        let hosts = hosts
            .iter()
            .map(|h| -> StateResult<Row> { Ok((h.id.clone(), encode(h)?)) })
            .collect::<StateResult<Vec<_>>>()?;
        let jobs = jobs
            .iter()
            .map(|j| -> StateResult<Row> { Ok((j.key.clone(), encode(j)?)) })
            .collect::<StateResult<Vec<_>>>()?;
        let tasks = tasks
            .iter()
            .map(|t| -> StateResult<Row> { Ok((t.table_key(), encode(t)?)) })
            .collect::<StateResult<Vec<_>>>()?;

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        for (definition, rows) in [(HOSTS, &hosts), (JOBS, &jobs), (TASKS, &tasks)] {
            let mut table = txn.open_table(definition).map_err(map_err!(Table))?;
            for (key, value) in rows {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            hosts = hosts.len(),
            jobs = jobs.len(),
            tasks = tasks.len(),
            "batch stored"
        );
        Ok(())
    }

    // ── Hosts ──────────────────────────────────────────────────────

    /// Insert or replace a host and its attribute catalog.
    pub fn put_host(&self, host: &HostRecord) -> StateResult<()> {
        self.put(HOSTS, &host.id, host)?;
        debug!(host = %host.id, attributes = host.attributes.len(), "host stored");
        Ok(())
    }

    pub fn get_host(&self, host_id: &str) -> StateResult<Option<HostRecord>> {
        self.get(HOSTS, host_id)
    }

    /// List all hosts, ordered by id.
    pub fn list_hosts(&self) -> StateResult<Vec<HostRecord>> {
        self.scan(HOSTS, "")
    }

    /// Delete a host by id. Returns true if it existed.
    pub fn delete_host(&self, host_id: &str) -> StateResult<bool> {
        let existed = self.remove(HOSTS, &[host_id.to_string()])? > 0;
        debug!(host = host_id, existed, "host deleted");
        Ok(existed)
    }

    /// A single named attribute of a host.
    ///
    /// Returns `None` both when the host is unknown and when it does not
    /// advertise the attribute.
    pub fn get_attribute(&self, host_id: &str, name: &str) -> StateResult<Option<Attribute>> {
        Ok(self
            .get_host(host_id)?
            .and_then(|host| host.attributes.get(name).cloned()))
    }

    // ── Jobs ───────────────────────────────────────────────────────

    /// Insert or update a job spec. Constraints are validated first.
    pub fn put_job(&self, job: &JobSpec) -> StateResult<()> {
        job.validate()?;
        self.put(JOBS, &job.key, job)?;
        debug!(job = %job.key, constraints = job.constraints.len(), "job stored");
        Ok(())
    }

    pub fn get_job(&self, job_key: &str) -> StateResult<Option<JobSpec>> {
        self.get(JOBS, job_key)
    }

    pub fn list_jobs(&self) -> StateResult<Vec<JobSpec>> {
        self.scan(JOBS, "")
    }

    /// Delete a job by key. Returns true if it existed.
    pub fn delete_job(&self, job_key: &str) -> StateResult<bool> {
        let existed = self.remove(JOBS, &[job_key.to_string()])? > 0;
        debug!(job = job_key, existed, "job deleted");
        Ok(existed)
    }

    // ── Tasks ──────────────────────────────────────────────────────

    /// Record a task as active.
    ///
    /// Job key and id may not contain the key separator.
    pub fn put_task(&self, task: &ActiveTask) -> StateResult<()> {
        task.validate()?;
        self.put(TASKS, &task.table_key(), task)
    }

    /// All active tasks of a job.
    pub fn list_tasks_for_job(&self, job_key: &str) -> StateResult<Vec<ActiveTask>> {
        let prefix = format!("{job_key}{TASK_KEY_SEPARATOR}");
        self.scan(TASKS, &prefix)
    }

    /// Delete a task by its composite key. Returns true if it existed.
    pub fn delete_task(&self, key: &str) -> StateResult<bool> {
        Ok(self.remove(TASKS, &[key.to_string()])? > 0)
    }

    /// Delete all tasks of a job. Returns number deleted.
    pub fn delete_tasks_for_job(&self, job_key: &str) -> StateResult<u32> {
        let keys: Vec<String> = self
            .list_tasks_for_job(job_key)?
            .iter()
            .map(ActiveTask::table_key)
            .collect();
        self.remove(TASKS, &keys)
    }
}
