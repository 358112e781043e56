//! Node classification, latency probing, ranking and best-node selection
//!
//! Data flows leaves-first: the classifier filters the daemon's table, the
//! fan-out coordinator probes every eligible node concurrently, the ranker
//! orders the outcomes and the selector switches a group to the winner.

pub mod classify;
pub mod fanout;
pub mod probe;
pub mod rank;
pub mod selector;

pub use classify::{
    INFO_KEYWORDS, ROUTING_GROUP_KINDS, eligible_members, eligible_nodes, is_eligible, is_info_node,
    is_real_proxy,
};
pub use fanout::{NodeProbe, probe_all, probe_table};
pub use probe::{DelayProber, LatencyGrade, ProbeOptions, ProbeOutcome};
pub use rank::{available_count, best, compare_outcomes, rank};
pub use selector::{BestNodeSelector, ReadBack, SelectionOutcome, SelectionPhase, SelectionReport};
