//! One aligned row per run, then the totals.

use super::{display_time, render_columns, totals_line, FormattableRun, RunsFormatter};
use crate::runs::Result;

const HEADERS: [&str; 8] = [
    "submitted-time(UTC)",
    "name",
    "requestor",
    "status",
    "result",
    "test-name",
    "group",
    "tags",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryFormatter;

impl RunsFormatter for SummaryFormatter {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn needs_method_details(&self) -> bool {
        false
    }

    fn format_runs(&self, runs: &[FormattableRun]) -> Result<String> {
        let mut out = String::new();

        let rows: Vec<Vec<String>> = runs
            .iter()
            .filter(|run| !run.lost)
            .map(|run| {
                vec![
                    display_time(&run.queued_time),
                    run.name.clone(),
                    run.requestor.clone(),
                    run.status.clone(),
                    run.result.clone(),
                    run.test_name.clone(),
                    run.group.clone(),
                    run.sorted_tags(),
                ]
            })
            .collect();

        if !rows.is_empty() {
            let mut table: Vec<Vec<String>> = vec![HEADERS.iter().map(|h| h.to_string()).collect()];
            table.extend(rows);
            out.push_str(&render_columns(&table));
            out.push('\n');
        }

        out.push_str(&totals_line(runs));
        Ok(out)
    }
}
