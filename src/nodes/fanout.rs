//! Fan-out coordinator
//!
//! Probes a node set concurrently on the current task and waits for every
//! probe to settle. Output order always matches input order, whatever order
//! the daemon answers in.

use crate::daemon::{DaemonClient, ProxyEntry};
use crate::error::AppResult;
use crate::nodes::classify::eligible_nodes;
use crate::nodes::probe::{DelayProber, ProbeOptions, ProbeOutcome};
use futures::future::join_all;

/// (name, type, outcome) for one probed node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeProbe {
    pub name: String,
    pub kind: String,
    pub outcome: ProbeOutcome,
}

impl NodeProbe {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, outcome: ProbeOutcome) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            outcome,
        }
    }
}

/// Probe every node, one probe each, all in flight at once
///
/// There is no concurrency cap and no cancellation; the batch takes as long
/// as its slowest probe. A probe cannot fail (see [`DelayProber`]), so the
/// result always has exactly one entry per input node.
pub async fn probe_all<P>(
    prober: &P,
    nodes: &[(&str, &ProxyEntry)],
    options: &ProbeOptions,
) -> Vec<NodeProbe>
where
    P: DelayProber + ?Sized,
{
    tracing::debug!(
        nodes = nodes.len(),
        timeout_ms = options.timeout_ms,
        url = %options.url,
        "Probing nodes"
    );

    let probes = nodes.iter().map(|(name, entry)| async move {
        let outcome = prober.probe(name, options).await;
        NodeProbe::new(*name, entry.kind.clone(), outcome)
    });
    let results = join_all(probes).await;

    let reachable = results.iter().filter(|p| p.outcome.is_reachable()).count();
    tracing::info!(
        probed = results.len(),
        reachable,
        unreachable = results.len() - reachable,
        "Probe batch settled"
    );

    results
}

/// Fetch the node table and probe every eligible node in it
///
/// # Errors
/// Fails only if the table itself cannot be read; probe failures surface as
/// unreachable outcomes.
pub async fn probe_table<P>(
    client: &DaemonClient,
    prober: &P,
    options: &ProbeOptions,
) -> AppResult<Vec<NodeProbe>>
where
    P: DelayProber + ?Sized,
{
    let table = client.proxies().await?;
    let nodes = eligible_nodes(&table);
    Ok(probe_all(prober, &nodes, options).await)
}
