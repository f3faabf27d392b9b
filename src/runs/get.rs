//! `runs get`: query, fetch every page, format, print.

use chrono::{DateTime, Utc};
use tracing::info;

use super::fetch::fetch_all_runs;
use super::query::{build_query, RunsCriteria};
use super::{Result, RunsError};
use crate::api::RasClient;
use crate::console::Console;
use crate::format::{formatter_by_name, FormattableRun};

/// Fetch the runs matching `criteria` and write them to `console` in the
/// named output format.
///
/// `now` anchors the age window.
pub async fn get_runs(
    client: &RasClient,
    criteria: &RunsCriteria,
    format_name: &str,
    now: DateTime<Utc>,
    console: &mut dyn Console,
) -> Result<()> {
    let formatter = formatter_by_name(format_name)?;
    let query = build_query(criteria, client).await?;

    let records = fetch_all_runs(client, &query.to_params(now)).await?;
    info!(runs = records.len(), format = formatter.name(), "runs fetched");

    if records.is_empty() {
        if let Some(name) = &query.run_name {
            return Err(RunsError::RunNotFound { name: name.clone() });
        }
    }

    let runs: Vec<FormattableRun> = records
        .iter()
        .map(|record| {
            FormattableRun::from_record(
                record,
                client.api_server_url(),
                formatter.needs_method_details(),
            )
        })
        .collect();

    let text = formatter.format_runs(&runs)?;
    console.write_str(&text)?;
    Ok(())
}
