//! A labelled block per run, with its test methods.

use super::{
    display_time, duration_ms, render_columns, totals_line, FormattableRun, RunsFormatter,
};
use crate::runs::Result;

const METHOD_HEADERS: [&str; 7] = [
    "method",
    "type",
    "status",
    "result",
    "start-time(UTC)",
    "end-time(UTC)",
    "duration(ms)",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct DetailsFormatter;

impl RunsFormatter for DetailsFormatter {
    fn name(&self) -> &'static str {
        "details"
    }

    fn needs_method_details(&self) -> bool {
        true
    }

    fn format_runs(&self, runs: &[FormattableRun]) -> Result<String> {
        let mut out = String::new();

        for run in runs.iter().filter(|run| !run.lost) {
            out.push_str(&run_block(run));
            out.push('\n');

            if !run.methods.is_empty() {
                out.push_str(&method_table(run));
                out.push('\n');
            }
        }

        out.push_str(&totals_line(runs));
        Ok(out)
    }
}

fn run_block(run: &FormattableRun) -> String {
    let fields = [
        ("name", run.name.clone()),
        ("status", run.status.clone()),
        ("result", run.result.clone()),
        ("submitted-time(UTC)", display_time(&run.queued_time)),
        ("start-time(UTC)", display_time(&run.start_time)),
        ("end-time(UTC)", display_time(&run.end_time)),
        ("duration(ms)", duration_ms(&run.start_time, &run.end_time)),
        ("test-name", run.test_name.clone()),
        ("requestor", run.requestor.clone()),
        ("bundle", run.bundle.clone()),
        ("group", run.group.clone()),
        ("tags", run.sorted_tags()),
        ("run-log", run.run_log_url()),
    ];
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    fields
        .iter()
        .map(|(label, value)| format!("{:<width$} : {}\n", label, value, width = width))
        .collect()
}

fn method_table(run: &FormattableRun) -> String {
    let mut rows: Vec<Vec<String>> = vec![METHOD_HEADERS.iter().map(|h| h.to_string()).collect()];
    rows.extend(run.methods.iter().map(|method| {
        vec![
            method.name.clone(),
            method.method_type.clone(),
            method.status.clone(),
            method.result.clone(),
            display_time(&method.start_time),
            display_time(&method.end_time),
            duration_ms(&method.start_time, &method.end_time),
        ]
    }));
    render_columns(&rows)
}
