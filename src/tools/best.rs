//! `select_best_node`: probe a group's members and switch to the fastest

use crate::handlers::AppState;
use crate::metrics::Outcome;
use crate::nodes::{BestNodeSelector, ReadBack, SelectionOutcome, SelectionReport};
use crate::tools::params::SelectBestParams;
use crate::tools::probe_options;
use crate::tools::report::{ToolReport, member_hint, ranked_table};
use std::fmt::Write;

/// Rows of the ranked list shown in the report
const SHOWN_RANKS: usize = 10;

pub async fn run(state: &AppState, params: SelectBestParams) -> ToolReport {
    let options = match probe_options(state, params.timeout_ms, params.url) {
        Ok(options) => options,
        Err(report) => return report,
    };
    let group = params
        .group
        .filter(|g| !g.trim().is_empty())
        .unwrap_or_else(|| state.config().probe.default_group().to_string());

    let selector = BestNodeSelector::new(state.client().clone());
    let report = match selector.select_best(&group, &options).await {
        Ok(report) => report,
        Err(e) => return ToolReport::failure(format!("Error: {}", e)),
    };

    state
        .metrics()
        .record_probes(report.ranked.iter().map(|p| &p.outcome));
    match report.outcome {
        SelectionOutcome::Switched { .. } => state.metrics().record_switch(Outcome::Success),
        SelectionOutcome::SwitchFailed { .. } => state.metrics().record_switch(Outcome::Failure),
        SelectionOutcome::NoneAvailable => {}
    }

    render(&report)
}

fn render(report: &SelectionReport) -> ToolReport {
    let group = &report.group;
    let mut out = format!("Tested {} nodes in [{}]\n\n", report.ranked.len(), group);
    out.push_str(&ranked_table(&report.ranked, Some(SHOWN_RANKS)));
    out.push('\n');

    match &report.outcome {
        SelectionOutcome::NoneAvailable => {
            let _ = write!(out, "No available nodes! [{}] left unchanged.", group);
            ToolReport::success(out)
        }
        SelectionOutcome::Switched {
            node,
            latency_ms,
            already_selected,
            read_back,
        } => {
            let _ = writeln!(out, "Best: {} ({}ms)", node, latency_ms);
            let _ = write!(out, "Switched [{}] -> {} ({}ms)", group, node, latency_ms);
            if *already_selected {
                out.push_str(" (already selected)");
            }
            match read_back {
                ReadBack::Confirmed => {}
                ReadBack::Mismatch { actual } => {
                    let _ = write!(
                        out,
                        "\nWarning: daemon now reports [{}] -> {}",
                        group,
                        actual.as_deref().unwrap_or("nothing")
                    );
                }
                ReadBack::Unavailable { reason } => {
                    let _ = write!(out, "\nWarning: could not verify selection: {}", reason);
                }
            }
            ToolReport::success(out)
        }
        SelectionOutcome::SwitchFailed {
            node,
            latency_ms,
            error,
        } => {
            let _ = writeln!(out, "Best: {} ({}ms)", node, latency_ms);
            let _ = writeln!(out, "Error switching [{}] -> {}: {}\n", group, node, error);
            out.push_str(&member_hint(
                group,
                report.ranked.iter().map(|p| p.name.as_str()),
            ));
            ToolReport::failure(out)
        }
    }
}
