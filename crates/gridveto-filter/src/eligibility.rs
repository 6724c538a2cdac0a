//! Eligibility sweep — runs the constraint filter over candidate hosts.
//!
//! This is the scheduler-facing entry point: every host gets a verdict,
//! and the hosts with no vetoes are the ones a placement may use. Hosts are
//! not scored or reordered here.

use std::collections::BTreeSet;

use gridveto_state::{Constraint, HostId, HostRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::FilterResult;
use crate::filter::ConstraintFilter;
use crate::source::{ActiveTasksSupplier, AttributeLoader, Memoized};
use crate::veto::Veto;

/// The filter's decision for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVerdict {
    pub host: HostId,
    pub vetoes: BTreeSet<Veto>,
}

impl HostVerdict {
    pub fn is_eligible(&self) -> bool {
        self.vetoes.is_empty()
    }
}

/// Evaluate `constraints` of `job_key` against every host, in input order.
///
/// The active tasks are fetched at most once for the whole sweep, so every
/// host is judged against the same snapshot. The first collaborator error
/// or unrecognized constraint aborts the sweep.
pub fn filter_hosts<S, L>(
    job_key: &str,
    constraints: &[Constraint],
    hosts: &[HostRecord],
    active_tasks: &S,
    attribute_loader: &L,
) -> FilterResult<Vec<HostVerdict>>
where
    S: ActiveTasksSupplier + ?Sized,
    L: AttributeLoader + ?Sized,
{
    let tasks = Memoized::new(active_tasks);

    let verdicts = hosts
        .iter()
        .map(|host| {
            let filter =
                ConstraintFilter::new(job_key, &tasks, attribute_loader, &host.attributes)?;
            let vetoes = filter.evaluate(constraints)?;
            debug!(host = %host.id, vetoes = vetoes.len(), "host filtered");
            Ok(HostVerdict {
                host: host.id.clone(),
                vetoes,
            })
        })
        .collect::<FilterResult<Vec<_>>>()?;

    info!(
        job = job_key,
        hosts = verdicts.len(),
        eligible = verdicts.iter().filter(|v| v.is_eligible()).count(),
        "eligibility sweep complete"
    );
    Ok(verdicts)
}
