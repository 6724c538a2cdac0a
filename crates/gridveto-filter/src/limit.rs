//! Limit constraints: cap how many of a job's active tasks may share an
//! attribute value with the candidate host (anti-affinity / spread).

use gridveto_state::{ActiveTask, Attribute};
use tracing::debug;

use crate::error::FilterResult;
use crate::source::AttributeLoader;

/// Whether placing one more task of `job_key` on a host with `attribute`
/// keeps the job within `limit`.
///
/// An active task counts when its host's attribute of the same name shares
/// at least one value with `attribute`. The candidate placement is the
/// `count + 1`-th task, so the constraint holds iff `count < limit`; a
/// limit of zero never holds.
///
/// Every active task is loaded, so the traced `count` is exact. Tasks whose
/// host attribute cannot be resolved do not count; an error from `loader`
/// for any task aborts the evaluation.
pub fn matches<L>(
    attribute: &Attribute,
    job_key: &str,
    limit: u32,
    active_tasks: &[ActiveTask],
    loader: &L,
) -> FilterResult<bool>
where
    L: AttributeLoader + ?Sized,
{
    let limit = limit as usize;
    let mut count = 0usize;

    for task in active_tasks {
        match loader.load(&task.host, &attribute.name)? {
            Some(other) if other.overlaps(&attribute.values) => count += 1,
            Some(_) => {}
            None => {
                debug!(task = %task.id, host = %task.host, "task host attribute unresolved");
            }
        }
    }

    let satisfied = count < limit;
    debug!(
        job = job_key,
        attribute = %attribute.name,
        count,
        limit,
        satisfied,
        "limit constraint evaluated"
    );
    Ok(satisfied)
}
