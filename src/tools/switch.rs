//! `switch_node`: set one group's selection to a named node

use crate::handlers::AppState;
use crate::metrics::Outcome;
use crate::nodes::{DelayProber, ProbeOptions, ProbeOutcome, eligible_members};
use crate::tools::params::SwitchNodeParams;
use crate::tools::report::{ToolReport, member_hint};

pub async fn run(state: &AppState, params: SwitchNodeParams) -> ToolReport {
    // Subscription names may carry surrounding spaces; only blank is rejected
    let node = params.node.as_str();
    if node.trim().is_empty() {
        return ToolReport::failure("Invalid arguments: node must not be empty");
    }
    let group = params
        .group
        .filter(|g| !g.trim().is_empty())
        .unwrap_or_else(|| state.config().probe.default_group().to_string());

    let client = state.client();
    if let Err(e) = client.select(&group, node).await {
        state.metrics().record_switch(Outcome::Failure);
        tracing::warn!(
            group = %group,
            node = %node,
            status = e.upstream_status(),
            error = %e,
            "Switch rejected"
        );
        let hint = match client.proxy(&group).await {
            Ok(entry) => match client.proxies().await {
                Ok(table) => member_hint(
                    &group,
                    eligible_members(&entry, &table)
                        .into_iter()
                        .map(|(name, _)| name),
                ),
                Err(_) => member_hint(&group, entry.all.iter().map(String::as_str)),
            },
            Err(lookup) if lookup.is_not_found() => {
                format!("(group [{}] does not exist)", group)
            }
            Err(lookup) => format!("(could not list members of [{}]: {})", group, lookup),
        };
        return ToolReport::failure(format!(
            "Error switching [{}] -> {}: {}\n\n{}",
            group, node, e, hint
        ));
    }
    state.metrics().record_switch(Outcome::Success);

    let options = ProbeOptions::from(&state.config().probe);
    let outcome = client.probe(node, &options).await;
    state.metrics().record_probe(&outcome);

    let mut out = format!("Switched [{}] -> {}", group, node);
    match outcome {
        ProbeOutcome::Reachable { latency_ms } => {
            out.push_str(&format!("\n  Delay: {}ms", latency_ms));
        }
        ProbeOutcome::Unreachable => {
            out.push_str("\n  Warning: node may not be reachable");
        }
    }
    ToolReport::success(out)
}
