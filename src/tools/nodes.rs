//! `list_nodes` and `test_all_nodes`

use crate::handlers::AppState;
use crate::nodes::{eligible_nodes, probe_table, rank};
use crate::tools::params::TestAllParams;
use crate::tools::{probe_options, profile};
use crate::tools::report::{ToolReport, availability_line, ranked_table};
use std::fmt::Write;

/// List eligible nodes with their last recorded delay, then the groups and,
/// when configured, the nodes each profile declares
pub async fn list(state: &AppState) -> ToolReport {
    let table = match state.client().proxies().await {
        Ok(table) => table,
        Err(e) => {
            return ToolReport::failure(format!("Error: cannot fetch proxies from daemon: {}", e));
        }
    };

    let nodes = eligible_nodes(&table);
    let mut out = format!(
        "{} eligible nodes ({} table entries)\n\n",
        nodes.len(),
        table.len()
    );
    let _ = writeln!(
        out,
        "  {:>3}  {:<40} {:<12} {:>10}",
        "#", "Node", "Type", "Last delay"
    );
    for (index, (name, entry)) in nodes.iter().enumerate() {
        let last = entry
            .last_delay()
            .map(|d| format!("{}ms", d))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:>3}. {:<40} {:<12} {:>10}",
            index + 1,
            name,
            entry.kind,
            last
        );
    }

    let groups: Vec<_> = table.entries().filter(|(_, e)| e.is_group()).collect();
    let _ = writeln!(out, "\nGroups ({}):", groups.len());
    for (name, entry) in groups {
        let _ = writeln!(
            out,
            "  {:<24} {:<12} -> {} ({} members)",
            name,
            entry.kind,
            entry.now.as_deref().unwrap_or("-"),
            entry.all.len()
        );
    }

    if let Some(store) = state.profiles() {
        out.push('\n');
        out.push_str(&profile::list_section(store).await);
    }

    ToolReport::success(out)
}

/// Probe every eligible node in the table and report them ranked
pub async fn test_all(state: &AppState, params: TestAllParams) -> ToolReport {
    let options = match probe_options(state, params.timeout_ms, params.url) {
        Ok(options) => options,
        Err(report) => return report,
    };

    let client = state.client();
    let probes = match probe_table(client.as_ref(), client.as_ref(), &options).await {
        Ok(probes) => probes,
        Err(e) => {
            return ToolReport::failure(format!("Error: cannot fetch proxies from daemon: {}", e));
        }
    };
    state
        .metrics()
        .record_probes(probes.iter().map(|p| &p.outcome));

    if probes.is_empty() {
        return ToolReport::success("No eligible proxy nodes in the daemon's table.");
    }

    let ranked = rank(probes);
    let mut out = format!(
        "Tested {} nodes (timeout {}ms, url {})\n\n",
        ranked.len(),
        options.timeout_ms,
        options.url
    );
    out.push_str(&ranked_table(&ranked, None));
    out.push('\n');
    out.push_str(&availability_line(&ranked));

    ToolReport::success(out)
}
