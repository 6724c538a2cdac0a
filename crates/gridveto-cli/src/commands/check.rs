use anyhow::anyhow;
use gridveto_filter::{HostVerdict, StoreAttributes, StoreTasks, filter_hosts};
use gridveto_state::StateStore;

/// Evaluate a stored job's constraints against one or all stored hosts.
///
/// Vetoed hosts are reported, not treated as failures.
pub fn check(
    store: &StateStore,
    job_key: &str,
    host: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let job = store
        .get_job(job_key)?
        .ok_or_else(|| anyhow!("job not found: {job_key}"))?;

    let hosts = match host {
        Some(id) => vec![
            store
                .get_host(id)?
                .ok_or_else(|| anyhow!("host not found: {id}"))?,
        ],
        None => store.list_hosts()?,
    };

    let verdicts = filter_hosts(
        &job.key,
        &job.constraints,
        &hosts,
        &StoreTasks::new(store, &job.key),
        &StoreAttributes::new(store),
    )?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        }
        _ => {
            print!("{}", format_verdicts(&verdicts));
        }
    }

    Ok(())
}

pub fn format_verdicts(verdicts: &[HostVerdict]) -> String {
    let mut out = String::new();
    for verdict in verdicts {
        if verdict.is_eligible() {
            out.push_str(&format!("✓ {}\n", verdict.host));
        } else {
            out.push_str(&format!("✗ {}\n", verdict.host));
            for veto in &verdict.vetoes {
                out.push_str(&format!("    {veto}\n"));
            }
        }
    }
    let eligible = verdicts.iter().filter(|v| v.is_eligible()).count();
    out.push_str(&format!("{eligible}/{} hosts eligible\n", verdicts.len()));
    out
}
