//! `runs cancel`: stop a run by name, or every run in a group.
//!
//! A run is cancelled by moving it to status `finished` with result
//! `cancelled`. A run name is resolved to its run id first; a group is
//! addressed directly.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::fetch::{fetch_all_runs, server_message};
use super::names::{validate_group_name, validate_run_name};
use super::query::RunsQuery;
use super::{messages, Result, RunsError, RESULT_CANCELLED, STATUS_FINISHED};
use crate::api::model::{RasRun, UpdateStatusRequest};
use crate::api::{ApiResponse, RasClient};
use crate::config::AmbiguityPolicy;
use crate::console::Console;

fn cancel_request() -> UpdateStatusRequest {
    UpdateStatusRequest {
        status: STATUS_FINISHED.to_string(),
        result: RESULT_CANCELLED.to_string(),
    }
}

/// Cancel by run name, by group, or both (run name first).
///
/// The group name is checked before anything is sent. The first failure
/// stops the operation.
pub async fn cancel_runs(
    client: &RasClient,
    run_name: Option<&str>,
    group: Option<&str>,
    policy: AmbiguityPolicy,
    console: &mut dyn Console,
) -> Result<()> {
    let group = match group.filter(|g| !g.is_empty()) {
        Some(group) => Some(validate_group_name(group)?),
        None => None,
    };

    if let Some(name) = run_name.map(str::trim).filter(|n| !n.is_empty()) {
        cancel_by_run_name(client, name, policy, console).await?;
    }

    if let Some(group) = &group {
        cancel_by_group(client, group, console).await?;
    }

    Ok(())
}

async fn cancel_by_run_name(
    client: &RasClient,
    run_name: &str,
    policy: AmbiguityPolicy,
    console: &mut dyn Console,
) -> Result<()> {
    validate_run_name(run_name)?;

    let matches = fetch_all_runs(client, &RunsQuery::by_run_name(run_name).to_params(Utc::now())).await?;
    let run = choose_run(run_name, &matches, policy)?;
    debug!(run_name, run_id = %run.run_id, "resolved run name");

    let response = client.put_run_status(&run.run_id, &cancel_request()).await?;
    let status = response.status.as_u16();

    if status != 202 {
        return Err(match server_message(&response) {
            Some(message) => RunsError::CancelRunFailed {
                status,
                name: run_name.to_string(),
                message,
            },
            None => parsing_failure(&response),
        });
    }

    info!(run_name, "run cancel accepted");
    console.write_str(&messages::run_cancel_accepted(run_name))?;
    Ok(())
}

async fn cancel_by_group(client: &RasClient, group: &str, console: &mut dyn Console) -> Result<()> {
    let response = client.put_group_status(group, &cancel_request()).await?;
    let status = response.status.as_u16();

    let message = match status {
        202 => messages::group_cancel_accepted(group),
        200 => messages::group_already_finished(group),
        _ => {
            return Err(match server_message(&response) {
                Some(message) => RunsError::CancelGroupFailed {
                    status,
                    group: group.to_string(),
                    message,
                },
                None => parsing_failure(&response),
            })
        }
    };

    info!(group, status, "group cancel answered");
    console.write_str(&message)?;
    Ok(())
}

fn parsing_failure(response: &ApiResponse) -> RunsError {
    debug!(body = %response.body_text(), "unparseable cancel failure body");
    RunsError::CancelResponseParsing {
        status: response.status.as_u16(),
    }
}

/// Pick the run a name refers to.
///
/// Runs that have not finished are preferred. If several remain, `policy`
/// decides between failing and taking the most recently queued.
pub fn choose_run<'a>(run_name: &str, matches: &'a [RasRun], policy: AmbiguityPolicy) -> Result<&'a RasRun> {
    if matches.is_empty() {
        return Err(RunsError::RunNotFound {
            name: run_name.to_string(),
        });
    }

    let unfinished: Vec<&RasRun> = matches
        .iter()
        .filter(|run| !run.test_structure.status.eq_ignore_ascii_case(STATUS_FINISHED))
        .collect();
    let candidates: Vec<&RasRun> = if unfinished.is_empty() {
        matches.iter().collect()
    } else {
        unfinished
    };

    match (candidates.as_slice(), policy) {
        ([only], _) => Ok(*only),
        (_, AmbiguityPolicy::Fail) => Err(RunsError::AmbiguousRunName {
            name: run_name.to_string(),
            count: candidates.len(),
        }),
        (_, AmbiguityPolicy::Newest) => candidates
            .iter()
            .copied()
            .max_by_key(|run| queued_at(run))
            .ok_or_else(|| RunsError::RunNotFound {
                name: run_name.to_string(),
            }),
    }
}

fn queued_at(run: &RasRun) -> Option<DateTime<Utc>> {
    run.test_structure
        .queued
        .as_deref()
        .and_then(|q| DateTime::parse_from_rfc3339(q).ok())
        .map(|q| q.with_timezone(&Utc))
}
