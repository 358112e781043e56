//! Proxy daemon control API
//!
//! Typed client for the daemon's HTTP control API and the snapshot types it
//! returns. The daemon is the sole source of truth; nothing here is cached.

pub mod client;
pub mod types;

pub use client::DaemonClient;
pub use types::{DaemonConfigs, DaemonVersion, DelayRecord, ProxyEntry, ProxyTable, TunInfo};
