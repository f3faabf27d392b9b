//! Rendering fetched runs as text.
//!
//! Each output format implements [`RunsFormatter`] and is looked up by name
//! with [`formatter_by_name`]. Formatters work on [`FormattableRun`], a
//! display view of the server's run record that already carries the API
//! server URL (for run-log links) and, when asked for, the test methods.

pub mod details;
pub mod raw;
pub mod summary;

use chrono::{DateTime, Utc};

use crate::api::model::{RasRun, TestMethod};
use crate::api::RAS_RUNS_PATH;
use crate::runs::{Result, RunsError};

pub use self::details::DetailsFormatter;
pub use self::raw::RawFormatter;
pub use self::summary::SummaryFormatter;

/// Result value the server records for runs it lost track of.
pub const RESULT_LOST: &str = "Lost";

/// Results counted individually on the totals line, in display order.
const TOTALLED_RESULTS: &[&str] = &["Passed", "Failed", "EnvFail", "Cancelled"];

/// Renders a list of runs.
pub trait RunsFormatter {
    fn name(&self) -> &'static str;

    /// Whether runs must carry their test methods.
    fn needs_method_details(&self) -> bool;

    fn format_runs(&self, runs: &[FormattableRun]) -> Result<String>;
}

/// Every formatter, sorted by name.
pub fn all_formatters() -> Vec<Box<dyn RunsFormatter>> {
    vec![
        Box::new(DetailsFormatter),
        Box::new(RawFormatter),
        Box::new(SummaryFormatter),
    ]
}

/// Look up a formatter, failing with the list of valid names.
pub fn formatter_by_name(name: &str) -> Result<Box<dyn RunsFormatter>> {
    let mut formatters = all_formatters();
    match formatters.iter().position(|f| f.name() == name) {
        Some(index) => Ok(formatters.swap_remove(index)),
        None => Err(RunsError::UnsupportedOutputFormat {
            given: name.to_string(),
            supported: formatter_names(),
        }),
    }
}

/// `'details', 'raw', 'summary'`
pub fn formatter_names() -> String {
    all_formatters()
        .iter()
        .map(|f| format!("'{}'", f.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A run as the formatters see it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattableRun {
    pub run_id: String,
    pub name: String,
    pub status: String,
    pub result: String,
    pub queued_time: String,
    pub start_time: String,
    pub end_time: String,
    pub test_name: String,
    pub requestor: String,
    pub bundle: String,
    pub group: String,
    pub tags: Vec<String>,
    pub api_server_url: String,
    pub methods: Vec<FormattableMethod>,
    pub lost: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattableMethod {
    pub name: String,
    pub method_type: String,
    pub status: String,
    pub result: String,
    pub start_time: String,
    pub end_time: String,
}

impl FormattableRun {
    pub fn from_record(run: &RasRun, api_server_url: &str, with_methods: bool) -> Self {
        let ts = &run.test_structure;
        let methods = if with_methods {
            ts.methods.iter().map(FormattableMethod::from_record).collect()
        } else {
            Vec::new()
        };

        Self {
            run_id: run.run_id.clone(),
            name: ts.run_name.clone(),
            status: ts.status.clone(),
            result: ts.result.clone(),
            queued_time: ts.queued.clone().unwrap_or_default(),
            start_time: ts.start_time.clone().unwrap_or_default(),
            end_time: ts.end_time.clone().unwrap_or_default(),
            test_name: ts.test_name.clone(),
            requestor: ts.requestor.clone(),
            bundle: ts.bundle.clone(),
            group: ts.group.clone(),
            tags: ts.tags.clone(),
            api_server_url: api_server_url.to_string(),
            methods,
            lost: ts.result.eq_ignore_ascii_case(RESULT_LOST),
        }
    }

    /// `<apiServerUrl>/ras/runs/<runId>/runlog`
    pub fn run_log_url(&self) -> String {
        format!("{}{}/{}/runlog", self.api_server_url, RAS_RUNS_PATH, self.run_id)
    }

    pub fn sorted_tags(&self) -> String {
        let mut tags = self.tags.clone();
        tags.sort();
        tags.join(",")
    }
}

impl FormattableMethod {
    fn from_record(method: &TestMethod) -> Self {
        Self {
            name: method.method_name.clone(),
            method_type: method.method_type.clone(),
            status: method.status.clone(),
            result: method.result.clone(),
            start_time: method.start_time.clone().unwrap_or_default(),
            end_time: method.end_time.clone().unwrap_or_default(),
        }
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Render a server timestamp as `YYYY-MM-DD HH:MM:SS`. Values that do not
/// parse are shown unchanged.
pub fn display_time(value: &str) -> String {
    match parse_time(value) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => value.to_string(),
    }
}

/// Whole milliseconds from `start` to `end`, or empty if either is unusable.
pub fn duration_ms(start: &str, end: &str) -> String {
    match (parse_time(start), parse_time(end)) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().to_string(),
        _ => String::new(),
    }
}

/// Lay out rows as columns separated by one space. Every column but the
/// last is padded to its widest cell.
pub(crate) fn render_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{:<width$} ", cell, width = widths[i]));
            }
        }
        out.push('\n');
    }
    out
}

/// `Total:<n>` then ` <Result>:<count>` for each totalled result present.
pub(crate) fn totals_line(runs: &[FormattableRun]) -> String {
    let counted: Vec<&FormattableRun> = runs.iter().filter(|r| !r.lost).collect();
    let mut line = format!("Total:{}", counted.len());

    for result in TOTALLED_RESULTS {
        let count = counted
            .iter()
            .filter(|r| r.result.eq_ignore_ascii_case(result))
            .count();
        if count > 0 {
            line.push_str(&format!(" {}:{}", result, count));
        }
    }

    line.push('\n');
    line
}
