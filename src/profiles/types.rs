//! Profile index and subscription file types
//!
//! `profiles.yaml` lists every profile the GUI knows about; `current` holds
//! the uid of the active one. Only remote (subscription) profiles are
//! exposed here.

use crate::nodes::is_info_node;
use serde::Deserialize;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `profiles.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileIndex {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub items: Vec<ProfileItem>,
}

/// One entry of the index; local merge/script items share this shape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileItem {
    #[serde(default)]
    pub uid: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub extra: Option<TrafficUsage>,
}

/// Subscription traffic counters, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TrafficUsage {
    #[serde(default)]
    pub upload: u64,
    #[serde(default)]
    pub download: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub expire: u64,
}

impl TrafficUsage {
    pub fn used_bytes(&self) -> u64 {
        self.upload.saturating_add(self.download)
    }

    /// `used/total GB`, used with one decimal
    pub fn summary(&self) -> String {
        format!(
            "{:.1}/{:.0} GB",
            self.used_bytes() as f64 / GIB,
            self.total as f64 / GIB
        )
    }
}

/// A remote profile resolved against the index's `current`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub uid: String,
    pub name: String,
    pub file: Option<String>,
    pub active: bool,
    pub usage: Option<TrafficUsage>,
}

impl Profile {
    /// First eight characters of the uid
    pub fn short_uid(&self) -> String {
        self.uid.chars().take(8).collect()
    }

    /// Case-insensitive substring match on name or uid
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.uid.to_lowercase().contains(&query)
    }
}

impl ProfileIndex {
    /// Remote profiles in index order
    pub fn remote_profiles(&self) -> Vec<Profile> {
        let current = self.current.as_deref().unwrap_or_default();
        self.items
            .iter()
            .filter(|item| item.kind.as_deref() == Some("remote") && !item.uid.is_empty())
            .map(|item| Profile {
                uid: item.uid.clone(),
                name: item.name.clone().unwrap_or_else(|| item.uid.clone()),
                file: item.file.clone().filter(|f| !f.is_empty()),
                active: item.uid == current,
                usage: item.extra,
            })
            .collect()
    }
}

/// First profile matching `query`, in index order
pub fn find_profile<'a>(profiles: &'a [Profile], query: &str) -> Option<&'a Profile> {
    profiles.iter().find(|p| p.matches(query))
}

/// One node declared in a subscription file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileNode {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: String,
    #[serde(default)]
    pub server: Option<String>,
}

fn unknown_kind() -> String {
    "unknown".to_string()
}

/// The part of a subscription file this crate reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFile {
    #[serde(default)]
    pub proxies: Vec<ProfileNode>,
}

impl ProfileFile {
    /// Declared nodes minus subscription info placeholders
    pub fn real_nodes(self) -> Vec<ProfileNode> {
        self.proxies
            .into_iter()
            .filter(|node| !is_info_node(&node.name))
            .collect()
    }
}
