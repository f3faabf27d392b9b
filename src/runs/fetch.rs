//! Walking every page of a runs query.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Result, RunsError};
use crate::api::model::{ApiErrorBody, RasRun, RunsPage};
use crate::api::{ApiResponse, RasClient};

/// Decode a successful response body, or report it as unparseable.
pub(crate) fn parse_body<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|err| {
        warn!(status = response.status.as_u16(), error = %err, "unparseable response body");
        RunsError::ResponseParsing {
            status: response.status.as_u16(),
        }
    })
}

/// The server's explanation of a failure, when the body carries one.
pub(crate) fn server_message(response: &ApiResponse) -> Option<String> {
    ApiErrorBody::parse(&response.body).map(|body| body.error_message)
}

/// Fetch every run matching `params`, following `nextCursor` until the
/// server stops handing out new ones.
///
/// `params` are the query's own parameters; the cursor is appended here.
/// Pages are requested strictly one after another and the runs come back
/// in the order the server sent them.
pub async fn fetch_all_runs(client: &RasClient, params: &[(String, String)]) -> Result<Vec<RasRun>> {
    let mut runs = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut page_params = params.to_vec();
        if let Some(cursor) = &cursor {
            page_params.push(("cursor".to_string(), cursor.clone()));
        }

        let response = client.get_runs_page(&page_params).await?;
        let status = response.status.as_u16();

        if !response.status.is_success() {
            return Err(match server_message(&response) {
                Some(message) => RunsError::QueryRunsFailed { status, message },
                None => RunsError::ResponseParsing { status },
            });
        }

        let page: RunsPage = parse_body(&response)?;
        pages += 1;
        debug!(page = pages, runs = page.runs.len(), "fetched runs page");
        runs.extend(page.runs);

        match page.next_cursor.filter(|next| !next.is_empty()) {
            Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            _ => break,
        }
    }

    debug!(pages, total = runs.len(), "finished fetching runs");
    Ok(runs)
}
