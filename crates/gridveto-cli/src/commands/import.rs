use std::path::Path;

use gridveto_state::StateStore;

use crate::snapshot::ClusterSnapshot;

pub fn import(store: &StateStore, snapshot_path: &Path) -> anyhow::Result<()> {
    let snapshot = ClusterSnapshot::from_file(snapshot_path)?;
    snapshot.apply(store)?;

    println!(
        "✓ Imported {} hosts, {} jobs, {} tasks",
        snapshot.hosts.len(),
        snapshot.jobs.len(),
        snapshot.tasks.len()
    );
    Ok(())
}
