//! Prometheus metrics collection for Clashpilot
//!
//! Tracks tool invocations, probe outcomes and group switches. Metrics are
//! exposed via the `/metrics` endpoint of the optional side listener.
//!
//! Label values come from closed enums; node and group names are never used
//! as labels.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::nodes::ProbeOutcome;

/// Tool names for type-safe metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    Status,
    ListNodes,
    TestAll,
    SwitchNode,
    SelectBest,
    SwitchProfile,
}

impl ToolName {
    /// Convert to the tool's public name (also its metrics label)
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Status => "proxy_status",
            ToolName::ListNodes => "list_nodes",
            ToolName::TestAll => "test_all_nodes",
            ToolName::SwitchNode => "switch_node",
            ToolName::SelectBest => "select_best_node",
            ToolName::SwitchProfile => "switch_profile",
        }
    }
}

/// Success/failure label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }

    pub fn from_error_flag(is_error: bool) -> Self {
        if is_error {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }
}

/// Metrics collector for Clashpilot
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    tool_calls: IntCounterVec,
    probes: IntCounterVec,
    probe_latency: HistogramVec,
    switches: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 5 tools x 2 outcomes
        let tool_calls = IntCounterVec::new(
            Opts::new(
                "clashpilot_tool_calls_total",
                "Total tool invocations by tool and outcome",
            ),
            &["tool", "outcome"],
        )?;

        let probes = IntCounterVec::new(
            Opts::new(
                "clashpilot_probes_total",
                "Total delay probes by outcome (reachable, unreachable)",
            ),
            &["outcome"],
        )?;

        let probe_latency = HistogramVec::new(
            HistogramOpts::new(
                "clashpilot_probe_latency_ms",
                "Latency reported by successful delay probes in milliseconds",
            )
            .buckets(vec![
                25.0, 50.0, 100.0, 200.0, 300.0, 500.0, 800.0, 1200.0, 2000.0, 5000.0,
            ]),
            &["grade"],
        )?;

        let switches = IntCounterVec::new(
            Opts::new(
                "clashpilot_switches_total",
                "Total group selection switches by outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(tool_calls.clone()))?;
        registry.register(Box::new(probes.clone()))?;
        registry.register(Box::new(probe_latency.clone()))?;
        registry.register(Box::new(switches.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            tool_calls,
            probes,
            probe_latency,
            switches,
        })
    }

    /// Record one finished tool invocation
    pub fn record_tool_call(&self, tool: ToolName, outcome: Outcome) {
        self.tool_calls
            .with_label_values(&[tool.as_str(), outcome.as_str()])
            .inc();
    }

    /// Record one probe outcome
    pub fn record_probe(&self, outcome: &ProbeOutcome) {
        match outcome.latency_ms() {
            Some(latency_ms) => {
                self.probes.with_label_values(&["reachable"]).inc();
                let grade = crate::nodes::LatencyGrade::from_latency(latency_ms);
                self.probe_latency
                    .with_label_values(&[grade.as_str()])
                    .observe(f64::from(latency_ms));
            }
            None => {
                self.probes.with_label_values(&["unreachable"]).inc();
            }
        }
    }

    /// Record a batch of probe outcomes
    pub fn record_probes<'a>(&self, outcomes: impl IntoIterator<Item = &'a ProbeOutcome>) {
        for outcome in outcomes {
            self.record_probe(outcome);
        }
    }

    /// Record one switch attempt
    pub fn record_switch(&self, outcome: Outcome) {
        self.switches.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Number of recorded tool calls for a tool/outcome pair
    pub fn tool_call_count(&self, tool: ToolName, outcome: Outcome) -> u64 {
        self.tool_calls
            .with_label_values(&[tool.as_str(), outcome.as_str()])
            .get()
    }

    /// Number of recorded probes, reachable or not
    pub fn probe_count(&self, reachable: bool) -> u64 {
        let label = if reachable { "reachable" } else { "unreachable" };
        self.probes.with_label_values(&[label]).get()
    }

    /// Gather all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
