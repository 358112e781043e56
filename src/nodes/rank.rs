//! Ranker
//!
//! Orders probe results: reachable before unreachable, reachable by
//! ascending latency. The sort is stable, so equal latencies keep the
//! fan-out order and unreachable nodes keep their relative order.

use crate::nodes::fanout::NodeProbe;
use crate::nodes::probe::ProbeOutcome;
use std::cmp::Ordering;

/// Total preorder over outcomes used for ranking
pub fn compare_outcomes(a: &ProbeOutcome, b: &ProbeOutcome) -> Ordering {
    match (a, b) {
        (
            ProbeOutcome::Reachable { latency_ms: left },
            ProbeOutcome::Reachable { latency_ms: right },
        ) => left.cmp(right),
        (ProbeOutcome::Reachable { .. }, ProbeOutcome::Unreachable) => Ordering::Less,
        (ProbeOutcome::Unreachable, ProbeOutcome::Reachable { .. }) => Ordering::Greater,
        (ProbeOutcome::Unreachable, ProbeOutcome::Unreachable) => Ordering::Equal,
    }
}

/// Rank probe results best-first
pub fn rank(mut probes: Vec<NodeProbe>) -> Vec<NodeProbe> {
    probes.sort_by(|a, b| compare_outcomes(&a.outcome, &b.outcome));
    probes
}

/// Top-ranked reachable node of an already ranked list
pub fn best(ranked: &[NodeProbe]) -> Option<&NodeProbe> {
    ranked.first().filter(|p| p.outcome.is_reachable())
}

/// Number of reachable nodes
pub fn available_count(probes: &[NodeProbe]) -> usize {
    probes.iter().filter(|p| p.outcome.is_reachable()).count()
}
