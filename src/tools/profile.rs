//! `switch_profile` and the profile sections of the status and list reports

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::nodes::eligible_nodes;
use crate::profiles::{Profile, ProfileNode, ProfileStore, find_profile};
use crate::tools::params::SwitchProfileParams;
use crate::tools::report::ToolReport;
use futures::future::join_all;
use std::fmt::Write;

/// Load a profile's subscription file into the daemon and mark it current
pub async fn switch(state: &AppState, params: SwitchProfileParams) -> ToolReport {
    let query = params.profile.trim();
    if query.is_empty() {
        return ToolReport::failure("Invalid arguments: profile must not be empty");
    }
    let Some(store) = state.profiles() else {
        return ToolReport::failure(
            "Error: profile switching needs profiles.dir in the config file",
        );
    };

    let profiles = match store.profiles().await {
        Ok(profiles) => profiles,
        Err(e) => return ToolReport::failure(format!("Error: cannot read profiles: {}", e)),
    };
    let Some(target) = find_profile(&profiles, query) else {
        let mut out = format!(
            "Error: {}. Available profiles:",
            AppError::ProfileNotFound {
                query: query.to_string()
            }
        );
        for profile in &profiles {
            let _ = write!(out, "\n  - {} ({})", profile.name, profile.uid);
        }
        if profiles.is_empty() {
            out.push_str("\n  (none)");
        }
        return ToolReport::failure(out);
    };

    if target.active {
        return ToolReport::success(format!("Profile [{}] is already active.", target.name));
    }
    let Some(file) = target.file.as_deref() else {
        return ToolReport::failure(format!(
            "Error: profile [{}] has no subscription file",
            target.name
        ));
    };

    let path = store.profile_path(file).display().to_string();
    tracing::info!(profile = %target.name, uid = %target.uid, path = %path, "Switching profile");

    let client = state.client();
    if let Err(e) = client.reload_config(&path).await {
        tracing::warn!(
            profile = %target.name,
            status = e.upstream_status(),
            error = %e,
            "Daemon rejected profile"
        );
        return ToolReport::failure(format!(
            "Error switching to profile [{}]: {}",
            target.name, e
        ));
    }

    let mut out = format!(
        "Switched to profile [{}] (uid: {})\n  Daemon config reloaded from {}",
        target.name, target.uid, path
    );
    if let Err(e) = store.set_current(&target.uid).await {
        tracing::warn!(error = %e, "Profile index not updated");
        let _ = write!(out, "\n  Warning: profile index not updated: {}", e);
    }

    let (version, table) = tokio::join!(client.version(), client.proxies());
    match version {
        Ok(version) => {
            let _ = write!(out, "\n  Core: {} running", version.core_label());
        }
        Err(e) => {
            let _ = write!(out, "\n  Warning: daemon did not answer after reload: {}", e);
        }
    }
    match table {
        Ok(table) => {
            let _ = write!(out, "\n  {} proxy nodes loaded", eligible_nodes(&table).len());
        }
        Err(e) => {
            let _ = write!(out, "\n  Warning: cannot count loaded nodes: {}", e);
        }
    }
    out.push_str(
        "\n\n  Note: the Clash Verge window may keep showing the old profile until it is selected there.",
    );

    ToolReport::success(out)
}

type ProfileNodes = (Profile, AppResult<Vec<ProfileNode>>);

async fn load_with_nodes(store: &ProfileStore) -> AppResult<Vec<ProfileNodes>> {
    let profiles = store.profiles().await?;
    let nodes = join_all(profiles.iter().map(|profile| store.nodes(profile))).await;
    Ok(profiles.into_iter().zip(nodes).collect())
}

/// One line per profile: active marker, name, node count and short uid
pub(crate) async fn status_section(store: &ProfileStore) -> String {
    let mut out = String::from("  Profiles:\n");
    let profiles = match load_with_nodes(store).await {
        Ok(profiles) => profiles,
        Err(e) => {
            let _ = writeln!(out, "    (unavailable: {})", e);
            return out;
        }
    };
    if profiles.is_empty() {
        out.push_str("    (no remote profiles)\n");
    }
    for (profile, nodes) in &profiles {
        let marker = if profile.active { "★" } else { " " };
        let count = match nodes {
            Ok(nodes) => format!("{} nodes", nodes.len()),
            Err(_) => "? nodes".to_string(),
        };
        let _ = writeln!(
            out,
            "   {} {:<15} {:<10} [{}]",
            marker,
            profile.name,
            count,
            profile.short_uid()
        );
    }
    out
}

/// Every profile with its traffic use and declared nodes
pub(crate) async fn list_section(store: &ProfileStore) -> String {
    let profiles = match load_with_nodes(store).await {
        Ok(profiles) => profiles,
        Err(e) => return format!("Profiles: unavailable ({})\n", e),
    };

    let total: usize = profiles
        .iter()
        .map(|(_, nodes)| nodes.as_ref().map_or(0, Vec::len))
        .sum();
    let mut out = format!(
        "Profiles ({}, {} nodes declared):\n",
        profiles.len(),
        total
    );
    for (profile, nodes) in &profiles {
        let _ = write!(out, "\n  [{}] {}", profile.short_uid(), profile.name);
        if profile.active {
            out.push_str(" ★ ACTIVE");
        }
        if let Some(usage) = profile.usage {
            let _ = write!(out, "  [{}]", usage.summary());
        }
        out.push('\n');

        match nodes {
            Ok(nodes) => {
                for (index, node) in nodes.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "    {:>3}. {:<40} {:<12} {}",
                        index + 1,
                        node.name,
                        node.kind,
                        node.server.as_deref().unwrap_or("")
                    );
                }
            }
            Err(e) => {
                let _ = writeln!(out, "    (cannot read nodes: {})", e);
            }
        }
    }
    out
}
