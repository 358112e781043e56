//! clashpilot - proxy node selection tools for clash/mihomo
//!
//! This library talks to a proxy daemon's control API, measures the latency
//! of its nodes concurrently and switches selector groups to the fastest
//! reachable node. The operations are exposed as tools over stdio and as
//! command-line subcommands.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod nodes;
pub mod profiles;
pub mod telemetry;
pub mod tools;
