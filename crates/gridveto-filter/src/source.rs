//! Collaborators the filter reads cluster state through.
//!
//! Both are read-only views over state the caller owns. Implementations may
//! perform I/O and must tolerate concurrent reads; the filter takes no locks.

use std::sync::{Arc, OnceLock};

use gridveto_state::{ActiveTask, Attribute};

use crate::error::FilterResult;

/// Shared, immutable view of a job's active tasks.
pub type TaskSnapshot = Arc<[ActiveTask]>;

/// Supplies the active tasks of the job being placed.
pub trait ActiveTasksSupplier {
    fn active_tasks(&self) -> FilterResult<TaskSnapshot>;
}

/// Loads a single named attribute of a host.
///
/// `Ok(None)` means the host is unknown or does not advertise the
/// attribute. `Err` is reserved for failures of the lookup itself.
pub trait AttributeLoader {
    fn load(&self, host: &str, name: &str) -> FilterResult<Option<Attribute>>;
}

impl<F> ActiveTasksSupplier for F
where
    F: Fn() -> FilterResult<TaskSnapshot>,
{
    fn active_tasks(&self) -> FilterResult<TaskSnapshot> {
        self()
    }
}

impl<F> AttributeLoader for F
where
    F: Fn(&str, &str) -> FilterResult<Option<Attribute>>,
{
    fn load(&self, host: &str, name: &str) -> FilterResult<Option<Attribute>> {
        self(host, name)
    }
}

/// Fetches from the wrapped supplier at most once.
///
/// The filter itself re-fetches for every limit constraint. Wrap the
/// supplier in this for the duration of one placement attempt so that
/// every host and constraint sees the same snapshot.
pub struct Memoized<'a, S: ?Sized> {
    inner: &'a S,
    snapshot: OnceLock<TaskSnapshot>,
}

impl<'a, S: ActiveTasksSupplier + ?Sized> Memoized<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self {
            inner,
            snapshot: OnceLock::new(),
        }
    }
}

impl<S: ActiveTasksSupplier + ?Sized> ActiveTasksSupplier for Memoized<'_, S> {
    fn active_tasks(&self) -> FilterResult<TaskSnapshot> {
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(Arc::clone(snapshot));
        }
        // Failed fetches are not cached; the next call retries.
        let fetched = self.inner.active_tasks()?;
        Ok(Arc::clone(self.snapshot.get_or_init(|| fetched)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::testing::{FakeCluster, task};

    #[test]
    fn closures_are_collaborators() {
        let snapshot: TaskSnapshot = Arc::from(vec![task("0", "host-a")]);
        let supplier = || -> FilterResult<TaskSnapshot> { Ok(Arc::clone(&snapshot)) };
        let loader = |host: &str, name: &str| -> FilterResult<Option<Attribute>> {
            Ok((host == "host-a").then(|| Attribute::new(name, ["r1"])))
        };

        assert_eq!(supplier.active_tasks().unwrap().len(), 1);
        assert!(loader.load("host-a", "rack").unwrap().is_some());
        assert!(loader.load("host-b", "rack").unwrap().is_none());
    }

    #[test]
    fn memoized_fetches_once() {
        let cluster = FakeCluster::new().with_task("0", "host-a");
        let memoized = Memoized::new(&cluster);

        let first = memoized.active_tasks().unwrap();
        let second = memoized.active_tasks().unwrap();

        assert_eq!(cluster.task_fetches(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn memoized_does_not_cache_failures() {
        let failing = || -> FilterResult<TaskSnapshot> {
            Err(FilterError::Collaborator("store unavailable".to_string()))
        };
        let memoized = Memoized::new(&failing);

        assert!(memoized.active_tasks().is_err());
        assert!(memoized.active_tasks().is_err());
    }
}
