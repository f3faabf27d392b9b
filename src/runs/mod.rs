//! The `runs` operations: query with `get`, stop with `cancel`.

pub mod age;
pub mod cancel;
pub mod fetch;
pub mod get;
pub mod names;
pub mod query;

use thiserror::Error;

use crate::api::TransportError;

/// Lifecycle status a run reaches when it stops.
pub const STATUS_FINISHED: &str = "finished";

/// Result recorded against a run cancelled by the user.
pub const RESULT_CANCELLED: &str = "cancelled";

/// Every lifecycle status before `finished`, in order.
pub const ACTIVE_STATUSES: &[&str] = &[
    "queued",
    "allocated",
    "started",
    "building",
    "provstart",
    "generating",
    "running",
    "rundone",
    "up",
    "ending",
];

pub type Result<T> = std::result::Result<T, RunsError>;

/// Errors raised by `runs` operations.
///
/// Every message starts with a stable code (see [`RunsError::code`]).
#[derive(Debug, Error)]
pub enum RunsError {
    #[error("RAS1001E: Unsupported value '{given}' for the output format. Supported values are: {supported}.")]
    UnsupportedOutputFormat { given: String, supported: String },

    #[error("RAS1002E: Failed to query runs from the server (HTTP status {status}). Reason: '{message}'.")]
    QueryRunsFailed { status: u16, message: String },

    #[error("RAS1003E: Could not parse the response from the server (HTTP status {status}).")]
    ResponseParsing { status: u16 },

    #[error("RAS1004E: Invalid run name '{name}'. A run name is one or more letters followed by one or more digits, for example 'U456'.")]
    InvalidRunName { name: String },

    #[error("RAS1005E: Run '{name}' was not found.")]
    RunNotFound { name: String },

    #[error("RAS1006E: Run name '{name}' matches {count} runs that could be cancelled; refusing to choose between them.")]
    AmbiguousRunName { name: String, count: usize },

    #[error("RAS1007E: The age value '{age}' is not valid. Use '<from>[:<to>]' where each part is a whole number followed by one of {units}.")]
    AgeFormat { age: String, units: &'static str },

    #[error("RAS1008E: The age value '{age}' has unexpected characters after the time unit. Each part is a whole number followed by one of {units}.")]
    AgeTrailingCharacters { age: String, units: &'static str },

    #[error("RAS1009E: The age value '{age}' is not valid. The 'from' part must be further in the past than the 'to' part.")]
    AgeOrdering { age: String },

    #[error("RAS1010E: A run name or an age must be supplied to limit the runs returned.")]
    AgeOrRunNameRequired,

    #[error("RAS1011E: The active and result filters are mutually exclusive. Use one or the other.")]
    ActiveAndResultExclusive,

    #[error("RAS1012E: Unknown result name '{name}'. Valid result names are: {valid}.")]
    InvalidResultName { name: String, valid: String },

    #[error("RAS1013E: Failed to query result names from the server (HTTP status {status}). Reason: '{message}'.")]
    QueryResultNamesFailed { status: u16, message: String },

    #[error("RAS1014E: Invalid group name provided: '{group}'. Group names use Latin-1 letters, digits, '-' and '_' only.")]
    InvalidGroupName { group: String },

    #[error("RAS1015E: Failed to cancel run '{name}' (HTTP status {status}). Reason: '{message}'.")]
    CancelRunFailed { status: u16, name: String, message: String },

    #[error("RAS1016E: Failed to cancel the runs in group '{group}' (HTTP status {status}). Reason: '{message}'.")]
    CancelGroupFailed { status: u16, group: String, message: String },

    #[error("RAS1017E: The cancel request failed (HTTP status {status}) and the response body could not be parsed.")]
    CancelResponseParsing { status: u16 },

    #[error("RAS1018E: {0}")]
    Transport(#[from] TransportError),

    #[error("RAS1019E: Could not write output to the console: {0}")]
    ConsoleWrite(#[from] std::io::Error),
}

impl RunsError {
    /// Stable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            RunsError::UnsupportedOutputFormat { .. } => "RAS1001E",
            RunsError::QueryRunsFailed { .. } => "RAS1002E",
            RunsError::ResponseParsing { .. } => "RAS1003E",
            RunsError::InvalidRunName { .. } => "RAS1004E",
            RunsError::RunNotFound { .. } => "RAS1005E",
            RunsError::AmbiguousRunName { .. } => "RAS1006E",
            RunsError::AgeFormat { .. } => "RAS1007E",
            RunsError::AgeTrailingCharacters { .. } => "RAS1008E",
            RunsError::AgeOrdering { .. } => "RAS1009E",
            RunsError::AgeOrRunNameRequired => "RAS1010E",
            RunsError::ActiveAndResultExclusive => "RAS1011E",
            RunsError::InvalidResultName { .. } => "RAS1012E",
            RunsError::QueryResultNamesFailed { .. } => "RAS1013E",
            RunsError::InvalidGroupName { .. } => "RAS1014E",
            RunsError::CancelRunFailed { .. } => "RAS1015E",
            RunsError::CancelGroupFailed { .. } => "RAS1016E",
            RunsError::CancelResponseParsing { .. } => "RAS1017E",
            RunsError::Transport(_) => "RAS1018E",
            RunsError::ConsoleWrite(_) => "RAS1019E",
        }
    }

    /// HTTP status the server answered with, when the error came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RunsError::QueryRunsFailed { status, .. }
            | RunsError::ResponseParsing { status }
            | RunsError::QueryResultNamesFailed { status, .. }
            | RunsError::CancelRunFailed { status, .. }
            | RunsError::CancelGroupFailed { status, .. }
            | RunsError::CancelResponseParsing { status } => Some(*status),
            RunsError::Transport(TransportError::RateLimited { status })
            | RunsError::Transport(TransportError::BodyRead { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Informational messages written to the console on success.
pub mod messages {
    pub fn run_cancel_accepted(run_name: &str) -> String {
        format!("RAS2001I: The request to cancel run {run_name} has been accepted by the server.\n")
    }

    pub fn group_cancel_accepted(group: &str) -> String {
        format!(
            "RAS2002I: The request to cancel the runs in group '{group}' has been accepted by the server. Cancellation is in progress.\n"
        )
    }

    pub fn group_already_finished(group: &str) -> String {
        format!(
            "RAS2003I: No active runs were found in group '{group}'. There was nothing to cancel.\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_starts_with_code() {
        let errors = vec![
            RunsError::UnsupportedOutputFormat {
                given: "garbage".to_string(),
                supported: "'raw'".to_string(),
            },
            RunsError::QueryRunsFailed { status: 500, message: "boom".to_string() },
            RunsError::ResponseParsing { status: 500 },
            RunsError::InvalidRunName { name: "garbage".to_string() },
            RunsError::RunNotFound { name: "U1".to_string() },
            RunsError::AmbiguousRunName { name: "U1".to_string(), count: 2 },
            RunsError::AgeFormat { age: "1y".to_string(), units: "'d' (days)" },
            RunsError::AgeTrailingCharacters { age: "1dx".to_string(), units: "'d' (days)" },
            RunsError::AgeOrdering { age: "1d:2d".to_string() },
            RunsError::AgeOrRunNameRequired,
            RunsError::ActiveAndResultExclusive,
            RunsError::InvalidResultName { name: "x".to_string(), valid: "'Passed'".to_string() },
            RunsError::QueryResultNamesFailed { status: 503, message: "down".to_string() },
            RunsError::InvalidGroupName { group: "$".to_string() },
            RunsError::CancelRunFailed { status: 400, name: "U1".to_string(), message: "no".to_string() },
            RunsError::CancelGroupFailed { status: 400, group: "g".to_string(), message: "no".to_string() },
            RunsError::CancelResponseParsing { status: 400 },
            RunsError::Transport(TransportError::RateLimited { status: 429 }),
            RunsError::ConsoleWrite(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed")),
        ];

        for err in errors {
            let text = err.to_string();
            assert!(
                text.starts_with(&format!("{}: ", err.code())),
                "'{}' does not start with {}",
                text,
                err.code()
            );
        }
    }

    #[test]
    fn test_http_status_is_exposed() {
        assert_eq!(RunsError::CancelResponseParsing { status: 400 }.http_status(), Some(400));
        assert_eq!(
            RunsError::Transport(TransportError::RateLimited { status: 429 }).http_status(),
            Some(429)
        );
        assert_eq!(RunsError::AgeOrRunNameRequired.http_status(), None);
    }

    #[test]
    fn test_active_statuses_exclude_finished() {
        assert!(!ACTIVE_STATUSES.contains(&STATUS_FINISHED));
    }
}
