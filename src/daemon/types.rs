//! Snapshot types returned by the daemon control API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /version`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub meta: bool,
}

impl DaemonVersion {
    /// `mihomo v1.18.1` for Meta cores, the bare version otherwise
    pub fn core_label(&self) -> String {
        if self.meta {
            format!("mihomo {}", self.version)
        } else {
            self.version.clone()
        }
    }
}

/// `GET /configs` (only the fields the status report shows)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DaemonConfigs {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(rename = "mixed-port", default)]
    pub mixed_port: Option<u16>,
    #[serde(default)]
    pub tun: Option<TunInfo>,
}

/// Tunnel interface state
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TunInfo {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub device: String,
}

/// One latency record from the daemon's own history
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelayRecord {
    #[serde(default)]
    pub time: String,
    /// The daemon records failed checks as 0
    #[serde(default)]
    pub delay: u32,
}

/// One entry of the daemon's node/group table
///
/// Groups carry `now` and `all`; leaf nodes leave them empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub now: Option<String>,
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub history: Vec<DelayRecord>,
}

impl ProxyEntry {
    /// Whether this entry lists members, i.e. behaves as a group
    pub fn is_group(&self) -> bool {
        !self.all.is_empty()
    }

    /// Most recent successful latency the daemon recorded, if any
    pub fn last_delay(&self) -> Option<u32> {
        self.history
            .last()
            .map(|record| record.delay)
            .filter(|delay| *delay > 0)
    }
}

/// `GET /proxies`
///
/// Keyed by name in a `BTreeMap` so every enumeration of the table is
/// deterministic.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyTable {
    #[serde(default)]
    pub proxies: BTreeMap<String, ProxyEntry>,
}

impl ProxyTable {
    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&ProxyEntry> {
        self.proxies.get(name)
    }

    /// Number of entries (nodes, groups and placeholders)
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether the daemon reported no entries at all
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Iterate entries in name order, keyed by their table name
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ProxyEntry)> {
        self.proxies.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}
