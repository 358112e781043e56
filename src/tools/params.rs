//! Tool argument types
//!
//! Optional fields fall back to the `[probe]` config section.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TestAllParams {
    /// Per-probe timeout in milliseconds (default from config, 5000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// URL the daemon fetches through each node (default: a 204 endpoint)
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SwitchNodeParams {
    /// Exact node name to select
    pub node: String,
    /// Group to switch (default from config, "Proxies")
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SelectBestParams {
    /// Group to switch (default from config, "Proxies")
    #[serde(default)]
    pub group: Option<String>,
    /// Per-probe timeout in milliseconds (default from config, 5000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// URL the daemon fetches through each node (default: a 204 endpoint)
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SwitchProfileParams {
    /// Profile name or uid; a case-insensitive substring is enough
    pub profile: String,
}
