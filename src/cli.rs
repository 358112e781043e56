//! Command-line interface for clashpilot
//!
//! Without a subcommand the binary serves the tools over stdio. The other
//! subcommands run one operation against the daemon and print its report.

use clap::{Parser, Subcommand};

/// Proxy node selection tools for clash/mihomo
#[derive(Parser)]
#[command(name = "clashpilot")]
#[command(version)]
#[command(about = "Proxy node selection tools for clash/mihomo")]
#[command(
    long_about = "clashpilot talks to a clash/mihomo daemon's control API to report status, \
    measure node latency and switch selector groups. By default it serves these operations \
    as tools over stdio."
)]
pub struct Cli {
    /// Path to configuration file (built-in defaults if omitted)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the tools over stdio (default)
    Serve,
    /// Show daemon status and key group selections
    Status,
    /// List eligible nodes and routing groups
    Nodes,
    /// Measure the delay of every eligible node
    Test {
        /// Per-probe timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// URL the daemon fetches through each node
        #[arg(long)]
        url: Option<String>,
    },
    /// Switch a group to a named node
    Switch {
        /// Exact node name
        node: String,
        /// Group to switch
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Switch a group to its fastest reachable node
    Best {
        /// Group to switch
        group: Option<String>,
        /// Per-probe timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// URL the daemon fetches through each node
        #[arg(long)]
        url: Option<String>,
    },
    /// Switch to another subscription profile (name or uid, partial match)
    SwitchProfile {
        /// Profile name or uid
        profile: String,
    },
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# clashpilot Configuration
# ========================
#
# Every setting is optional; the values below are the defaults.

# ─────────────────────────────────────────────────────────────────────────────
# DAEMON CONTROL API
# ─────────────────────────────────────────────────────────────────────────────

[daemon]
# Base URL of the clash/mihomo external controller
# (overridden by the CLASH_API_URL environment variable)
api_url = "http://127.0.0.1:9097"

# Bearer secret, empty when the controller has none
# (overridden by the CLASH_API_SECRET environment variable)
secret = ""

# Timeout for control API requests other than delay probes, in seconds
request_timeout_seconds = 10

# ─────────────────────────────────────────────────────────────────────────────
# DELAY PROBES
# ─────────────────────────────────────────────────────────────────────────────

[probe]
# How long the daemon waits for each node, in milliseconds (max 60000)
timeout_ms = 5000

# URL fetched through each node to measure its delay
url = "https://www.gstatic.com/generate_204"

# Group switched when a caller names none
default_group = "Proxies"

# ─────────────────────────────────────────────────────────────────────────────
# STATUS REPORT
# ─────────────────────────────────────────────────────────────────────────────

[status]
# Groups whose current selection is shown (missing groups are skipped)
key_groups = ["Proxies", "GLOBAL", "Telegram", "Netflix"]

# ─────────────────────────────────────────────────────────────────────────────
# PROFILES
# ─────────────────────────────────────────────────────────────────────────────

[profiles]
# Clash Verge data directory holding profiles.yaml and profiles/.
# Enables the profile summary in status/nodes and switch-profile.
# dir = "/home/me/.local/share/io.github.clash-verge-rev.clash-verge-rev"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[metrics]
# Serve /health and /metrics on this address while the tool server runs
# listen = "127.0.0.1:9464"

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# Logs go to stderr; RUST_LOG takes precedence when set
log_level = "info"
"#
}
