//! End-to-end constraint filtering over an in-memory state store.

use gridveto_filter::{
    ConstraintFilter, FilterError, StoreAttributes, StoreTasks, Veto, filter_hosts,
};
use gridveto_state::{
    ActiveTask, Attribute, AttributeCatalog, Constraint, ConstraintBody, HostRecord, JobSpec,
    StateStore,
};

const JOB: &str = "prod/api";

fn host(id: &str, rack: &str, zone: &str) -> HostRecord {
    HostRecord {
        id: id.to_string(),
        attributes: AttributeCatalog::from_attributes([
            Attribute::new("rack", [rack]),
            Attribute::new("zone", [zone]),
        ])
        .unwrap(),
    }
}

fn task(id: &str, host: &str) -> ActiveTask {
    ActiveTask {
        id: id.to_string(),
        job_key: JOB.to_string(),
        host: host.to_string(),
    }
}

/// Four hosts over three racks; two tasks of the job already on rack r1.
fn seeded_store() -> StateStore {
    let store = StateStore::open_in_memory().unwrap();
    for record in [
        host("host-a", "r1", "east"),
        host("host-b", "r1", "east"),
        host("host-c", "r2", "east"),
        host("host-d", "r3", "west"),
    ] {
        store.put_host(&record).unwrap();
    }
    store.put_task(&task("0", "host-a")).unwrap();
    store.put_task(&task("1", "host-b")).unwrap();
    // A task on a host that has since left the cluster.
    store.put_task(&task("2", "host-gone")).unwrap();
    store
        .put_job(&JobSpec {
            key: JOB.to_string(),
            constraints: vec![
                Constraint::value("zone", false, ["east"]),
                Constraint::limit("rack", 2),
            ],
        })
        .unwrap();
    store
}

#[test]
fn sweep_over_stored_cluster() {
    let store = seeded_store();
    let job = store.get_job(JOB).unwrap().unwrap();
    let hosts = store.list_hosts().unwrap();

    let verdicts = filter_hosts(
        JOB,
        &job.constraints,
        &hosts,
        &StoreTasks::new(&store, JOB),
        &StoreAttributes::new(&store),
    )
    .unwrap();

    let eligible: Vec<&str> = verdicts
        .iter()
        .filter(|v| v.is_eligible())
        .map(|v| v.host.as_str())
        .collect();
    // r1 already holds two tasks; host-d is in the wrong zone.
    assert_eq!(eligible, vec!["host-c"]);

    let host_d = verdicts.iter().find(|v| v.host == "host-d").unwrap();
    assert_eq!(
        host_d.vetoes.iter().map(Veto::reason).collect::<Vec<_>>(),
        vec!["Constraint not satisfied: zone"]
    );
}

#[test]
fn finished_task_frees_capacity() {
    let store = seeded_store();
    let candidate = store.get_host("host-a").unwrap().unwrap();
    let tasks = StoreTasks::new(&store, JOB);
    let loader = StoreAttributes::new(&store);
    let limit = [Constraint::limit("rack", 2)];

    let filter = ConstraintFilter::new(JOB, &tasks, &loader, &candidate.attributes).unwrap();
    assert_eq!(filter.evaluate(&limit).unwrap().len(), 1);

    assert!(store.delete_task("prod/api:1").unwrap());
    // The filter holds no cached state; the next evaluation sees the change.
    assert!(filter.evaluate(&limit).unwrap().is_empty());
}

#[test]
fn unrecognized_kind_from_newer_writer_is_fatal() {
    let store = seeded_store();
    let candidate = store.get_host("host-c").unwrap().unwrap();
    let tasks = StoreTasks::new(&store, JOB);
    let loader = StoreAttributes::new(&store);
    let constraint: Constraint =
        serde_json::from_str(r#"{"name":"rack","type":"spread","buckets":4}"#).unwrap();
    assert_eq!(constraint.body, ConstraintBody::Unrecognized);

    let filter = ConstraintFilter::new(JOB, &tasks, &loader, &candidate.attributes).unwrap();
    let result = filter.evaluate(&[constraint]);

    assert!(matches!(result, Err(FilterError::UnrecognizedConstraint(_))));
}
