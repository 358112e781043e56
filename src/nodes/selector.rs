//! Best-node selection
//!
//! Probe-then-switch for one group:
//! `Idle -> GroupLookup -> Probing -> Ranked -> Switching -> Done`, with
//! `Failed` reachable from `GroupLookup` and `Switching`.
//!
//! Not transactional. Another actor may change the group between ranking
//! and switching; the read-back after the switch reports what the daemon
//! actually holds.

use crate::daemon::DaemonClient;
use crate::error::{AppError, AppResult};
use crate::nodes::classify::eligible_members;
use crate::nodes::fanout::{NodeProbe, probe_all};
use crate::nodes::probe::{DelayProber, ProbeOptions};
use crate::nodes::rank::{available_count, best, rank};
use std::fmt;
use std::sync::Arc;

/// Phases of a selection run, recorded in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    GroupLookup,
    Probing,
    Ranked,
    Switching,
    Done,
    Failed,
}

impl fmt::Display for SelectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::GroupLookup => "group_lookup",
            Self::Probing => "probing",
            Self::Ranked => "ranked",
            Self::Switching => "switching",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the daemon reported for the group after a successful switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadBack {
    /// The group's selection is the chosen node
    Confirmed,
    /// Someone else changed it in between, or the daemon ignored the switch
    Mismatch { actual: Option<String> },
    /// The group could not be re-read
    Unavailable { reason: String },
}

/// How a selection run ended
#[derive(Debug)]
pub enum SelectionOutcome {
    Switched {
        node: String,
        latency_ms: u32,
        /// The node already was the group's selection before the switch
        already_selected: bool,
        read_back: ReadBack,
    },
    /// Probing found no reachable node; no switch was attempted
    NoneAvailable,
    /// The daemon rejected the switch; nothing was retried
    SwitchFailed {
        node: String,
        latency_ms: u32,
        error: AppError,
    },
}

/// Full result of a selection run, including probe results for reporting
#[derive(Debug)]
pub struct SelectionReport {
    pub group: String,
    /// Group selection before the run
    pub previous: Option<String>,
    /// Ranked probe results, best first
    pub ranked: Vec<NodeProbe>,
    pub outcome: SelectionOutcome,
}

impl SelectionReport {
    /// Whether the run ended in `Failed`
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SelectionOutcome::SwitchFailed { .. })
    }
}

/// Switches a group to its lowest-latency reachable member
pub struct BestNodeSelector {
    client: Arc<DaemonClient>,
    prober: Arc<dyn DelayProber>,
}

impl BestNodeSelector {
    /// Selector that probes through the same daemon client it switches with
    pub fn new(client: Arc<DaemonClient>) -> Self {
        let prober: Arc<dyn DelayProber> = client.clone();
        Self { client, prober }
    }

    /// Selector with a separate prober
    pub fn with_prober(client: Arc<DaemonClient>, prober: Arc<dyn DelayProber>) -> Self {
        Self { client, prober }
    }

    /// Probe every eligible member of `group` and switch to the best one
    ///
    /// # Errors
    /// Returns `AppError::GroupLookup` if the group cannot be read or is not
    /// a group, and the raw daemon error if the node table cannot be read.
    /// In both cases no probe was issued. A rejected switch is not an error
    /// here: it is reported as [`SelectionOutcome::SwitchFailed`] together
    /// with the probe results.
    pub async fn select_best(
        &self,
        group: &str,
        options: &ProbeOptions,
    ) -> AppResult<SelectionReport> {
        let mut phase = SelectionPhase::Idle;
        tracing::debug!(group = %group, phase = %phase, "Starting best-node selection");

        phase = SelectionPhase::GroupLookup;
        tracing::debug!(group = %group, phase = %phase, "Reading group and node table");
        let (group_entry, table) = tokio::join!(self.client.proxy(group), self.client.proxies());
        let group_entry = match group_entry {
            Ok(entry) if entry.is_group() => entry,
            Ok(_) => {
                return Err(self.lookup_failed(group, "not a group with members".to_string()));
            }
            Err(e) if e.is_not_found() => {
                return Err(self.lookup_failed(group, format!("no such group ({})", e)));
            }
            Err(e) => return Err(self.lookup_failed(group, e.to_string())),
        };
        let table = table.inspect_err(|e| {
            tracing::warn!(
                group = %group,
                phase = %SelectionPhase::Failed,
                error = %e,
                "Cannot read node table"
            );
        })?;

        phase = SelectionPhase::Probing;
        let members = eligible_members(&group_entry, &table);
        tracing::info!(
            group = %group,
            phase = %phase,
            members = group_entry.all.len(),
            eligible = members.len(),
            "Probing group members"
        );
        let probes = probe_all(self.prober.as_ref(), &members, options).await;

        phase = SelectionPhase::Ranked;
        let ranked = rank(probes);
        tracing::debug!(
            group = %group,
            phase = %phase,
            available = available_count(&ranked),
            probed = ranked.len(),
            "Probe results ranked"
        );
        let previous = group_entry.now.clone();

        let Some(winner) = best(&ranked).cloned() else {
            phase = SelectionPhase::Done;
            tracing::info!(group = %group, phase = %phase, "No available nodes, not switching");
            return Ok(SelectionReport {
                group: group.to_string(),
                previous,
                ranked,
                outcome: SelectionOutcome::NoneAvailable,
            });
        };
        // best() only returns reachable probes
        let latency_ms = winner.outcome.latency_ms().unwrap_or_default();

        phase = SelectionPhase::Switching;
        tracing::debug!(
            group = %group,
            phase = %phase,
            node = %winner.name,
            latency_ms,
            "Switching to best node"
        );
        if let Err(error) = self.client.select(group, &winner.name).await {
            tracing::warn!(
                group = %group,
                phase = %SelectionPhase::Failed,
                node = %winner.name,
                error = %error,
                "Switch rejected by daemon"
            );
            return Ok(SelectionReport {
                group: group.to_string(),
                previous,
                ranked,
                outcome: SelectionOutcome::SwitchFailed {
                    node: winner.name,
                    latency_ms,
                    error,
                },
            });
        }

        let read_back = self.read_back(group, &winner.name).await;
        phase = SelectionPhase::Done;
        tracing::info!(
            group = %group,
            phase = %phase,
            node = %winner.name,
            latency_ms,
            read_back = ?read_back,
            "Best-node selection finished"
        );

        let already_selected = previous.as_deref() == Some(winner.name.as_str());
        Ok(SelectionReport {
            group: group.to_string(),
            previous,
            ranked,
            outcome: SelectionOutcome::Switched {
                node: winner.name,
                latency_ms,
                already_selected,
                read_back,
            },
        })
    }

    async fn read_back(&self, group: &str, expected: &str) -> ReadBack {
        match self.client.proxy(group).await {
            Ok(entry) if entry.now.as_deref() == Some(expected) => ReadBack::Confirmed,
            Ok(entry) => {
                tracing::warn!(
                    group = %group,
                    expected = %expected,
                    actual = ?entry.now,
                    "Group selection differs from the node just selected"
                );
                ReadBack::Mismatch { actual: entry.now }
            }
            Err(e) => ReadBack::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    fn lookup_failed(&self, group: &str, reason: String) -> AppError {
        tracing::warn!(
            group = %group,
            phase = %SelectionPhase::Failed,
            reason = %reason,
            "Group lookup failed"
        );
        AppError::GroupLookup {
            group: group.to_string(),
            reason,
        }
    }
}
