//! clashpilot binary
//!
//! Serves the proxy tools over stdio, or runs a single operation from the
//! command line.

use clap::Parser;
use clashpilot::cli::{Cli, Command, generate_config_template};
use clashpilot::config::Config;
use clashpilot::handlers::{self, AppState};
use clashpilot::metrics::ToolName;
use clashpilot::telemetry;
use clashpilot::tools::{self, ToolReport, best, nodes, params, profile, status, switch};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Template generation needs no config or daemon
    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref().map(Path::new))?;
    telemetry::init(&config.observability.log_level);
    for var in config.env_overrides() {
        tracing::debug!(variable = %var, "Daemon setting overridden from environment");
    }

    let listen = config.metrics.listen;
    let state = AppState::new(Arc::new(config))?;
    tracing::debug!(daemon = %state.client().base_url(), "Daemon client ready");

    let report = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if let Some(addr) = listen {
                let side = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handlers::serve(side, addr).await {
                        tracing::error!(error = %e, "Observability listener stopped");
                    }
                });
            }
            tools::serve_stdio(state).await?;
            return Ok(());
        }
        Command::Status => {
            tools::guarded(&state, ToolName::Status, |state| async move {
                status::run(&state).await
            })
            .await
        }
        Command::Nodes => {
            tools::guarded(&state, ToolName::ListNodes, |state| async move {
                nodes::list(&state).await
            })
            .await
        }
        Command::Test { timeout_ms, url } => {
            let params = params::TestAllParams { timeout_ms, url };
            tools::guarded(&state, ToolName::TestAll, |state| async move {
                nodes::test_all(&state, params).await
            })
            .await
        }
        Command::Switch { node, group } => {
            let params = params::SwitchNodeParams { node, group };
            tools::guarded(&state, ToolName::SwitchNode, |state| async move {
                switch::run(&state, params).await
            })
            .await
        }
        Command::Best {
            group,
            timeout_ms,
            url,
        } => {
            let params = params::SelectBestParams {
                group,
                timeout_ms,
                url,
            };
            tools::guarded(&state, ToolName::SelectBest, |state| async move {
                best::run(&state, params).await
            })
            .await
        }
        Command::SwitchProfile { profile: query } => {
            let params = params::SwitchProfileParams { profile: query };
            tools::guarded(&state, ToolName::SwitchProfile, |state| async move {
                profile::switch(&state, params).await
            })
            .await
        }
        Command::Config { .. } => return Ok(()),
    };

    exit_with(report)
}

fn exit_with(report: ToolReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", report.text().trim_end());
    if report.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
