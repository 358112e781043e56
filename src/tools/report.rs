//! Tool reports and the shared text formatting used by them

use crate::nodes::{NodeProbe, available_count, best};
use rmcp::model::{CallToolResult, Content};
use std::fmt::Write;

/// Human-readable result of one operation plus its error flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    text: String,
    is_error: bool,
}

impl ToolReport {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Convert into a tool result; failures become tool errors, not
    /// protocol errors
    pub fn into_call_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

/// Ranked probe table, optionally cut to the first `limit` rows
pub(crate) fn ranked_table(probes: &[NodeProbe], limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:>3}  {:<40} {:<12} {:>8}",
        "#", "Node", "Type", "Delay"
    );
    let shown = limit.unwrap_or(probes.len()).min(probes.len());

    for (index, probe) in probes.iter().take(shown).enumerate() {
        let grade = probe
            .outcome
            .grade()
            .map(|g| format!("  {}", g.as_str()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:>3}. {:<40} {:<12} {:>8}{}",
            index + 1,
            probe.name,
            probe.kind,
            probe.outcome.to_string(),
            grade
        );
    }

    if shown < probes.len() {
        let _ = writeln!(out, "  ... and {} more", probes.len() - shown);
    }
    out
}

/// `k/N nodes available | Best: X (Nms)` for an already ranked list
pub(crate) fn availability_line(ranked: &[NodeProbe]) -> String {
    let mut line = format!("{}/{} nodes available", available_count(ranked), ranked.len());
    if let Some(top) = best(ranked) {
        let _ = write!(line, " | Best: {} ({})", top.name, top.outcome);
    }
    line
}

/// Bulleted member list used as a hint after a failed switch
pub(crate) fn member_hint<'a>(group: &str, members: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = format!("Available nodes in [{}]:", group);
    let mut any = false;
    for member in members {
        any = true;
        let _ = write!(out, "\n  - {}", member);
    }
    if !any {
        out.push_str("\n  (none)");
    }
    out
}
