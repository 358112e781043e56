//! `proxy_status`: daemon version, mode, port, tunnel, profiles and key
//! selections

use crate::handlers::AppState;
use crate::tools::profile;
use crate::tools::report::ToolReport;
use std::fmt::Write;

pub async fn run(state: &AppState) -> ToolReport {
    let client = state.client();
    let (version, configs, table) =
        tokio::join!(client.version(), client.configs(), client.proxies());

    let (version, configs, table) = match (version, configs, table) {
        (Ok(v), Ok(c), Ok(t)) => (v, c, t),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            tracing::warn!(error = %e, "Status snapshot failed");
            return ToolReport::failure(format!("Error: cannot read daemon status: {}", e));
        }
    };

    let mut out = String::from("Daemon status\n");
    let _ = writeln!(out, "  Core:    {}", version.core_label());
    let _ = writeln!(out, "  Mode:    {}", configs.mode.as_deref().unwrap_or("?"));
    let _ = writeln!(
        out,
        "  Port:    {}",
        configs
            .mixed_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string())
    );
    let tun = configs.tun.unwrap_or_default();
    let _ = writeln!(
        out,
        "  TUN:     {} ({})",
        if tun.enable { "ON" } else { "OFF" },
        tun.device
    );

    if let Some(store) = state.profiles() {
        out.push('\n');
        out.push_str(&profile::status_section(store).await);
    }

    out.push_str("\n  Current selections:\n");
    let mut shown = 0;
    for group in &state.config().status.key_groups {
        if let Some(entry) = table.get(group) {
            shown += 1;
            let _ = writeln!(
                out,
                "    {:<15} -> {}",
                group,
                entry.now.as_deref().unwrap_or("-")
            );
        }
    }
    if shown == 0 {
        out.push_str("    (none of the configured key groups exist)\n");
    }

    ToolReport::success(out)
}
