//! Constraint filter — evaluates a job's constraints against one host.

use std::collections::BTreeSet;

use gridveto_state::{AttributeCatalog, Constraint, ConstraintBody};
use tracing::{debug, warn};

use crate::error::{FilterError, FilterResult};
use crate::source::{ActiveTasksSupplier, AttributeLoader};
use crate::veto::Veto;
use crate::{limit, value};

/// Filter that determines whether a candidate host satisfies a job's constraints.
///
/// Holds only borrowed, read-only views: the job key, the job's active task
/// supplier, an attribute loader for other hosts, and the candidate host's
/// own attributes. Evaluation has no side effects beyond calling the
/// collaborators and is safe to repeat.
pub struct ConstraintFilter<'a, S: ?Sized, L: ?Sized> {
    job_key: &'a str,
    active_tasks: &'a S,
    attribute_loader: &'a L,
    host_attributes: &'a AttributeCatalog,
}

impl<'a, S, L> ConstraintFilter<'a, S, L>
where
    S: ActiveTasksSupplier + ?Sized,
    L: AttributeLoader + ?Sized,
{
    /// Create a filter for placing a task of `job_key` on the host described
    /// by `host_attributes`.
    pub fn new(
        job_key: &'a str,
        active_tasks: &'a S,
        attribute_loader: &'a L,
        host_attributes: &'a AttributeCatalog,
    ) -> FilterResult<Self> {
        if job_key.trim().is_empty() {
            return Err(FilterError::BlankJobKey);
        }
        Ok(Self {
            job_key,
            active_tasks,
            attribute_loader,
            host_attributes,
        })
    }

    /// Evaluate every constraint and collect the vetoes.
    ///
    /// An empty set means the host is eligible. Any error aborts the whole
    /// evaluation; it does not mean the host is ineligible.
    pub fn evaluate(&self, constraints: &[Constraint]) -> FilterResult<BTreeSet<Veto>> {
        let mut vetoes = BTreeSet::new();
        for constraint in constraints {
            if let Some(veto) = self.apply(constraint)? {
                vetoes.insert(veto);
            }
        }
        debug!(
            job = self.job_key,
            constraints = constraints.len(),
            vetoes = vetoes.len(),
            "constraints evaluated"
        );
        Ok(vetoes)
    }

    /// Evaluate a single constraint.
    pub fn apply(&self, constraint: &Constraint) -> FilterResult<Option<Veto>> {
        let attribute = self.host_attributes.get(&constraint.name);

        match &constraint.body {
            ConstraintBody::Value(spec) => Ok((!value::matches(attribute, spec))
                .then(|| Veto::unsatisfied_value(&constraint.name))),

            ConstraintBody::Limit(spec) => {
                let Some(attribute) = attribute else {
                    return Ok(Some(Veto::missing_limit(&constraint.name)));
                };
                let tasks = self.active_tasks.active_tasks()?;
                let satisfied = limit::matches(
                    attribute,
                    self.job_key,
                    spec.limit,
                    &tasks,
                    self.attribute_loader,
                )?;
                Ok((!satisfied).then(|| Veto::unsatisfied_limit(&constraint.name)))
            }

            ConstraintBody::Unrecognized => {
                warn!(
                    job = self.job_key,
                    constraint = %constraint.name,
                    "failed to recognize the constraint type"
                );
                Err(FilterError::UnrecognizedConstraint(constraint.name.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCluster, JOB, catalog};

    /// host-a and host-b share rack r1; the job has one task on host-a.
    fn cluster() -> FakeCluster {
        FakeCluster::new()
            .with_host("host-a", &[("rack", &["r1"]), ("zone", &["east"])])
            .with_host("host-b", &[("rack", &["r1"]), ("zone", &["west"])])
            .with_host("host-c", &[("rack", &["r2"]), ("zone", &["east"])])
            .with_task("0", "host-a")
    }

    #[test]
    fn rejects_blank_job_key() {
        let cluster = cluster();
        let host = catalog(&[]);

        let result = ConstraintFilter::new("  ", &cluster, &cluster, &host);
        assert!(matches!(result, Err(FilterError::BlankJobKey)));
    }

    #[test]
    fn empty_constraint_list_has_no_vetoes() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r1"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        assert!(filter.evaluate(&[]).unwrap().is_empty());
        assert_eq!(cluster.task_fetches(), 0);
    }

    #[test]
    fn unsatisfied_value_with_satisfied_limit_yields_one_veto() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r2"]), ("zone", &["west"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        let vetoes = filter
            .evaluate(&[
                Constraint::value("zone", false, ["east"]),
                Constraint::limit("rack", 1),
            ])
            .unwrap();

        assert_eq!(vetoes.len(), 1);
        assert!(vetoes.contains(&Veto::new("Constraint not satisfied: zone")));
    }

    #[test]
    fn exceeded_limit_is_vetoed() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r1"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        let veto = filter.apply(&Constraint::limit("rack", 1)).unwrap();
        assert_eq!(veto, Some(Veto::new("Constraint not satisfied: rack")));

        assert_eq!(filter.apply(&Constraint::limit("rack", 2)).unwrap(), None);
    }

    #[test]
    fn limit_on_missing_attribute_is_vetoed_for_any_limit() {
        let cluster = cluster();
        let host = catalog(&[("zone", &["east"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        for limit in [0, 1, 100, u32::MAX] {
            let veto = filter.apply(&Constraint::limit("rack", limit)).unwrap();
            assert_eq!(veto, Some(Veto::new("Limit constraint not present: rack")));
        }
        // The supplier is not consulted for a host that cannot be evaluated.
        assert_eq!(cluster.task_fetches(), 0);
    }

    #[test]
    fn negated_value_on_missing_attribute_passes() {
        let cluster = cluster();
        let host = catalog(&[("zone", &["east"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        assert_eq!(
            filter.apply(&Constraint::value("dedicated", true, ["db"])).unwrap(),
            None
        );
        assert_eq!(
            filter.apply(&Constraint::value("dedicated", false, ["db"])).unwrap(),
            Some(Veto::unsatisfied_value("dedicated"))
        );
    }

    #[test]
    fn each_limit_constraint_fetches_active_tasks() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r2"]), ("zone", &["west"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        filter
            .evaluate(&[
                Constraint::limit("rack", 1),
                Constraint::limit("zone", 1),
                Constraint::value("zone", false, ["west"]),
            ])
            .unwrap();

        assert_eq!(cluster.task_fetches(), 2);
    }

    #[test]
    fn unrecognized_constraint_aborts_evaluation() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r1"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();
        let unknown = Constraint {
            name: "rack".to_string(),
            body: ConstraintBody::Unrecognized,
        };

        let result = filter.evaluate(&[Constraint::value("zone", false, ["east"]), unknown]);
        assert!(matches!(
            result,
            Err(FilterError::UnrecognizedConstraint(name)) if name == "rack"
        ));
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r1"]), ("zone", &["west"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();
        let constraints = [
            Constraint::value("zone", false, ["east"]),
            Constraint::limit("rack", 1),
            Constraint::limit("gpu", 1),
        ];

        let first = filter.evaluate(&constraints).unwrap();
        let second = filter.evaluate(&constraints).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn identical_reasons_collapse() {
        let cluster = cluster();
        let host = catalog(&[("rack", &["r1"])]);
        let filter = ConstraintFilter::new(JOB, &cluster, &cluster, &host).unwrap();

        // A failed value and a failed limit on the same name share a reason.
        let vetoes = filter
            .evaluate(&[
                Constraint::value("rack", false, ["r9"]),
                Constraint::limit("rack", 1),
            ])
            .unwrap();

        assert_eq!(vetoes.len(), 1);
    }
}
