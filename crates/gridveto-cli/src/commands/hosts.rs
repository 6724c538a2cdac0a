use gridveto_state::{HostRecord, StateStore};

pub fn hosts(store: &StateStore) -> anyhow::Result<()> {
    let hosts = store.list_hosts()?;
    if hosts.is_empty() {
        println!("No hosts stored.");
        return Ok(());
    }
    for host in &hosts {
        println!("{}", format_host(host));
    }
    Ok(())
}

fn format_host(host: &HostRecord) -> String {
    let attributes: Vec<String> = host
        .attributes
        .iter()
        .map(|a| {
            let values: Vec<&str> = a.values.iter().map(String::as_str).collect();
            format!("{}={}", a.name, values.join(","))
        })
        .collect();
    format!("{:<20} {}", host.id, attributes.join(" "))
}
