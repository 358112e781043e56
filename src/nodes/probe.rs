//! Delay prober
//!
//! One probe asks the daemon to measure latency through one node. Probing
//! never fails: any error collapses into [`ProbeOutcome::Unreachable`] so a
//! single bad node cannot abort a batch.

use crate::config::ProbeConfig;
use crate::daemon::DaemonClient;
use async_trait::async_trait;
use std::fmt;

/// Result of a single probe
///
/// An explicit variant instead of a numeric sentinel keeps unreachable nodes
/// out of latency arithmetic and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    Reachable { latency_ms: u32 },
    Unreachable,
}

impl ProbeOutcome {
    /// Latency in milliseconds, if the node answered
    pub fn latency_ms(&self) -> Option<u32> {
        match self {
            Self::Reachable { latency_ms } => Some(*latency_ms),
            Self::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }

    /// Coarse grade for reports; `None` when unreachable
    pub fn grade(&self) -> Option<LatencyGrade> {
        self.latency_ms().map(LatencyGrade::from_latency)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable { latency_ms } => write!(f, "{}ms", latency_ms),
            Self::Unreachable => f.write_str("timeout"),
        }
    }
}

/// Latency bands used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyGrade {
    /// Under 300 ms
    Fast,
    /// 300 ms up to 800 ms
    Moderate,
    /// 800 ms and above
    Slow,
}

impl LatencyGrade {
    pub fn from_latency(latency_ms: u32) -> Self {
        match latency_ms {
            0..300 => Self::Fast,
            300..800 => Self::Moderate,
            _ => Self::Slow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Moderate => "moderate",
            Self::Slow => "slow",
        }
    }
}

/// Probe timeout and target URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub timeout_ms: u64,
    pub url: String,
}

impl ProbeOptions {
    pub fn new(timeout_ms: u64, url: impl Into<String>) -> Self {
        Self {
            timeout_ms,
            url: url.into(),
        }
    }

    /// Defaults from config, overridden by whatever the caller supplied
    pub fn resolve(config: &ProbeConfig, timeout_ms: Option<u64>, url: Option<String>) -> Self {
        Self {
            timeout_ms: timeout_ms.unwrap_or_else(|| config.timeout_ms()),
            url: url.unwrap_or_else(|| config.url().to_string()),
        }
    }
}

impl From<&ProbeConfig> for ProbeOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self::new(config.timeout_ms(), config.url())
    }
}

/// Something that can measure latency through a named node
///
/// Implementations must resolve every call to an outcome; errors are
/// absorbed, not propagated.
#[async_trait]
pub trait DelayProber: Send + Sync {
    async fn probe(&self, node: &str, options: &ProbeOptions) -> ProbeOutcome;
}

#[async_trait]
impl DelayProber for DaemonClient {
    async fn probe(&self, node: &str, options: &ProbeOptions) -> ProbeOutcome {
        match self.delay(node, options.timeout_ms, &options.url).await {
            Ok(latency_ms) => {
                tracing::debug!(node = %node, latency_ms, "Probe succeeded");
                ProbeOutcome::Reachable { latency_ms }
            }
            Err(e) => {
                tracing::debug!(node = %node, error = %e, "Probe failed, node unreachable");
                ProbeOutcome::Unreachable
            }
        }
    }
}
