//! Tool server over stdio
//!
//! Each tool runs its operation inside a spawned task. Whatever happens in
//! there, the caller gets a [`ToolReport`] back: daemon failures are already
//! error reports, and a task that dies is turned into a generic one.

pub mod best;
pub mod nodes;
pub mod params;
pub mod profile;
pub mod report;
pub mod status;
pub mod switch;

pub use report::ToolReport;

use crate::config::{validate_probe_timeout, validate_probe_url};
use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::metrics::{Outcome, ToolName};
use crate::nodes::ProbeOptions;
use params::{SelectBestParams, SwitchNodeParams, SwitchProfileParams, TestAllParams};
use rmcp::{
    ErrorData, ServerHandler, ServiceExt,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

/// Probe options from optional overrides, validated, with config defaults
///
/// An invalid override comes back as the error report to return.
pub(crate) fn probe_options(
    state: &AppState,
    timeout_ms: Option<u64>,
    url: Option<String>,
) -> Result<ProbeOptions, ToolReport> {
    if let Some(timeout_ms) = timeout_ms {
        validate_probe_timeout(timeout_ms)
            .map_err(|e| ToolReport::failure(format!("Invalid arguments: {}", e)))?;
    }
    if let Some(url) = url.as_deref() {
        validate_probe_url(url)
            .map_err(|e| ToolReport::failure(format!("Invalid arguments: {}", e)))?;
    }
    Ok(ProbeOptions::resolve(&state.config().probe, timeout_ms, url))
}

/// Run one operation in its own task and record its outcome
pub async fn guarded<F, Fut>(state: &AppState, tool: ToolName, op: F) -> ToolReport
where
    F: FnOnce(AppState) -> Fut,
    Fut: Future<Output = ToolReport> + Send + 'static,
{
    let invocation_id = Uuid::new_v4();
    let span = tracing::info_span!("tool", tool = tool.as_str(), invocation_id = %invocation_id);

    let task = tokio::spawn(op(state.clone()).instrument(span.clone()));
    let report = match task.await {
        Ok(report) => report,
        Err(e) => {
            span.in_scope(|| {
                tracing::error!(
                    error = %e,
                    panicked = e.is_panic(),
                    "Tool task did not complete"
                );
            });
            ToolReport::failure(format!(
                "Error: unexpected internal error in {} (invocation {})",
                tool.as_str(),
                invocation_id
            ))
        }
    };

    state
        .metrics()
        .record_tool_call(tool, Outcome::from_error_flag(report.is_error()));
    report
}

/// Tool server exposing the proxy operations
#[derive(Clone)]
pub struct ProxyTools {
    state: AppState,
    tool_router: ToolRouter<ProxyTools>,
}

#[tool_router]
impl ProxyTools {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Show proxy daemon status: core version, mode, mixed port, TUN state, subscription profiles and the current selection of key groups."
    )]
    async fn proxy_status(&self) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::Status, |state| async move {
            status::run(&state).await
        })
        .await;
        Ok(report.into_call_result())
    }

    #[tool(
        description = "List real proxy nodes (groups and info entries excluded) with their last recorded delay, followed by the routing groups."
    )]
    async fn list_nodes(&self) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::ListNodes, |state| async move {
            nodes::list(&state).await
        })
        .await;
        Ok(report.into_call_result())
    }

    #[tool(
        description = "Measure the delay of every real proxy node concurrently and list them fastest first. Unreachable nodes are listed last as timeout."
    )]
    async fn test_all_nodes(
        &self,
        Parameters(params): Parameters<TestAllParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::TestAll, |state| async move {
            nodes::test_all(&state, params).await
        })
        .await;
        Ok(report.into_call_result())
    }

    #[tool(
        description = "Switch a selector group to the named node, then measure the node's delay once."
    )]
    async fn switch_node(
        &self,
        Parameters(params): Parameters<SwitchNodeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::SwitchNode, |state| async move {
            switch::run(&state, params).await
        })
        .await;
        Ok(report.into_call_result())
    }

    #[tool(
        description = "Measure the delay of every real node in a group and switch the group to the fastest reachable one. Nothing is switched if no node is reachable."
    )]
    async fn select_best_node(
        &self,
        Parameters(params): Parameters<SelectBestParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::SelectBest, |state| async move {
            best::run(&state, params).await
        })
        .await;
        Ok(report.into_call_result())
    }

    #[tool(
        description = "Switch to another Clash Verge subscription profile (name or uid, partial match): the daemon reloads the profile's file and the profile index is updated. Needs profiles.dir in the config."
    )]
    async fn switch_profile(
        &self,
        Parameters(params): Parameters<SwitchProfileParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = guarded(&self.state, ToolName::SwitchProfile, |state| async move {
            profile::switch(&state, params).await
        })
        .await;
        Ok(report.into_call_result())
    }
}

#[tool_handler]
impl ServerHandler for ProxyTools {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.server_info.name = "clashpilot".to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(
            "Controls a clash/mihomo proxy daemon. Use proxy_status for an overview, \
             test_all_nodes to measure latency, select_best_node to switch a group to its \
             fastest node, switch_node to pick one by name, and switch_profile to load \
             another subscription profile."
                .to_string(),
        );
        info
    }
}

/// Serve the tools over stdin/stdout until the client disconnects
pub async fn serve_stdio(state: AppState) -> AppResult<()> {
    tracing::info!(
        daemon = %state.client().base_url(),
        "Serving tools over stdio"
    );
    let running = ProxyTools::new(state)
        .serve(stdio())
        .await
        .map_err(|e| AppError::Internal(format!("Tool server failed to start: {}", e)))?;
    running
        .waiting()
        .await
        .map_err(|e| AppError::Internal(format!("Tool server stopped abnormally: {}", e)))?;
    tracing::info!("Tool client disconnected");
    Ok(())
}
