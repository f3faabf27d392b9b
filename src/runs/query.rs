//! Turning user criteria into a validated run query.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::age::{resolve_age, AgeRange};
use super::fetch::{parse_body, server_message};
use super::names::{validate_group_name, validate_run_name};
use super::{Result, RunsError, ACTIVE_STATUSES};
use crate::api::model::ResultNames;
use crate::api::RasClient;
use crate::lists::{combine_comma_separated, dedup_preserving_order};

/// Criteria as the user typed them.
///
/// `results` and `tags` may hold repeated values, each possibly a
/// comma-separated list.
#[derive(Debug, Clone, Default)]
pub struct RunsCriteria {
    pub run_name: Option<String>,
    pub age: String,
    pub requestor: Option<String>,
    pub results: Vec<String>,
    pub active_only: bool,
    pub group: Option<String>,
    pub tags: Vec<String>,
}

/// A validated query for `GET /ras/runs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunsQuery {
    pub run_name: Option<String>,
    pub age: AgeRange,
    pub requestor: Option<String>,
    pub results: Vec<String>,
    pub active_only: bool,
    pub group: Option<String>,
    pub tags: Vec<String>,
}

impl RunsQuery {
    /// Every run recorded under `run_name`, whatever its age.
    pub fn by_run_name(run_name: &str) -> Self {
        Self {
            run_name: Some(run_name.to_string()),
            ..Self::default()
        }
    }

    /// Query parameters for the first page; the fetcher adds the cursor.
    pub fn to_params(&self, now: DateTime<Utc>) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(run_name) = &self.run_name {
            push("runname", run_name.clone());
        }
        if let Some(requestor) = &self.requestor {
            push("requestor", requestor.clone());
        }
        if let Some(group) = &self.group {
            push("group", group.clone());
        }
        if let Some(from) = self.age.from_instant(now) {
            push("from", timestamp(from));
        }
        if let Some(to) = self.age.to_instant(now) {
            push("to", timestamp(to));
        }
        if !self.tags.is_empty() {
            push("tags", self.tags.join(","));
        }
        if !self.results.is_empty() {
            push("result", self.results.join(","));
        }
        if self.active_only {
            push("status", ACTIVE_STATUSES.join(","));
        }
        push("includeCursor", "true".to_string());

        params
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate `criteria` and build the query.
///
/// The server's result names are fetched only when a result filter was
/// given; nothing else touches the network.
pub async fn build_query(criteria: &RunsCriteria, client: &RasClient) -> Result<RunsQuery> {
    let results = dedup_preserving_order(combine_comma_separated(&criteria.results));

    if criteria.active_only && !results.is_empty() {
        return Err(RunsError::ActiveAndResultExclusive);
    }

    let group = match non_empty(&criteria.group) {
        Some(group) => Some(validate_group_name(&group)?),
        None => None,
    };

    let run_name = non_empty(&criteria.run_name);
    if let Some(name) = &run_name {
        validate_run_name(name)?;
    }

    let age = resolve_age(&criteria.age, run_name.as_deref())?;

    if !results.is_empty() {
        let valid = fetch_result_names(client).await?;
        validate_result_names(&results, &valid)?;
    }

    let query = RunsQuery {
        run_name,
        age,
        requestor: non_empty(&criteria.requestor),
        results,
        active_only: criteria.active_only,
        group,
        tags: combine_comma_separated(&criteria.tags),
    };
    debug!(?query, "built runs query");
    Ok(query)
}

/// Fetch the result names the server knows about.
pub async fn fetch_result_names(client: &RasClient) -> Result<Vec<String>> {
    let response = client.get_result_names().await?;
    let status = response.status.as_u16();

    if !response.status.is_success() {
        return Err(match server_message(&response) {
            Some(message) => RunsError::QueryResultNamesFailed { status, message },
            None => RunsError::ResponseParsing { status },
        });
    }

    let names: ResultNames = parse_body(&response)?;
    Ok(names.resultnames)
}

/// Every requested result must name one of `valid`, ignoring case.
pub fn validate_result_names(requested: &[String], valid: &[String]) -> Result<()> {
    for name in requested {
        if !valid.iter().any(|v| v.eq_ignore_ascii_case(name)) {
            return Err(RunsError::InvalidResultName {
                name: name.clone(),
                valid: valid
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::api::retry::RetryConfig;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2023-05-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    // Points at a port nothing listens on; these tests must not reach it.
    fn offline_client() -> RasClient {
        let server = ServerConfig {
            api_server_url: "http://127.0.0.1:9".to_string(),
            ..ServerConfig::default()
        };
        RasClient::new(&server, RetryConfig::default()).unwrap()
    }

    #[test]
    fn test_params_for_full_query() {
        let query = RunsQuery {
            run_name: Some("U456".to_string()),
            age: AgeRange { from: 1440, to: 60 },
            requestor: Some("User&123".to_string()),
            results: vec!["Passed".to_string(), "envfail".to_string()],
            active_only: false,
            group: Some("dummyGroup".to_string()),
            tags: vec!["core".to_string(), "anothertag".to_string()],
        };
        let params = query.to_params(now());

        assert_eq!(param(&params, "runname"), Some("U456"));
        assert_eq!(param(&params, "requestor"), Some("User&123"));
        assert_eq!(param(&params, "group"), Some("dummyGroup"));
        assert_eq!(param(&params, "from"), Some("2023-05-09T12:00:00.000Z"));
        assert_eq!(param(&params, "to"), Some("2023-05-10T11:00:00.000Z"));
        assert_eq!(param(&params, "tags"), Some("core,anothertag"));
        assert_eq!(param(&params, "result"), Some("Passed,envfail"));
        assert_eq!(param(&params, "status"), None);
        assert_eq!(param(&params, "includeCursor"), Some("true"));
    }

    #[test]
    fn test_params_omit_unset_values() {
        let params = RunsQuery::by_run_name("U456").to_params(now());

        assert_eq!(param(&params, "runname"), Some("U456"));
        for absent in ["requestor", "group", "from", "to", "tags", "result", "status"] {
            assert_eq!(param(&params, absent), None, "{} should be absent", absent);
        }
    }

    #[test]
    fn test_active_only_never_asks_for_finished_runs() {
        let query = RunsQuery {
            active_only: true,
            ..RunsQuery::by_run_name("U456")
        };
        let params = query.to_params(now());
        let status = param(&params, "status").unwrap();

        assert!(status.contains("running"));
        assert!(!status.split(',').any(|s| s == "finished"));
    }

    #[test]
    fn test_result_validation_ignores_case() {
        let valid: Vec<String> = ["UNKNOWN", "Passed", "Failed", "EnvFail"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert!(validate_result_names(&["passed".to_string(), "EnvFail".to_string()], &valid).is_ok());

        let err = validate_result_names(&["garbage".to_string()], &valid).unwrap_err();
        assert_eq!(err.code(), "RAS1012E");
        assert!(err.to_string().contains("garbage"));
        assert!(err.to_string().contains("'EnvFail'"));
    }

    #[tokio::test]
    async fn test_active_and_result_are_mutually_exclusive() {
        let criteria = RunsCriteria {
            run_name: Some("U456".to_string()),
            results: vec!["Passed".to_string()],
            active_only: true,
            ..RunsCriteria::default()
        };
        let err = build_query(&criteria, &offline_client()).await.unwrap_err();
        assert_eq!(err.code(), "RAS1011E");
    }

    #[tokio::test]
    async fn test_bad_group_fails_before_any_request() {
        let criteria = RunsCriteria {
            run_name: Some("U457".to_string()),
            group: Some(format!("{}NONLATIN1", char::from_u32(300).unwrap())),
            ..RunsCriteria::default()
        };
        let err = build_query(&criteria, &offline_client()).await.unwrap_err();
        assert_eq!(err.code(), "RAS1014E");
    }

    #[tokio::test]
    async fn test_query_without_results_stays_offline() {
        let criteria = RunsCriteria {
            run_name: Some(" U456 ".to_string()),
            requestor: Some(String::new()),
            tags: vec!["core, anothertag".to_string()],
            ..RunsCriteria::default()
        };
        let query = build_query(&criteria, &offline_client()).await.unwrap();

        assert_eq!(query.run_name.as_deref(), Some("U456"));
        assert_eq!(query.requestor, None);
        assert_eq!(query.age, AgeRange::UNBOUNDED);
        assert_eq!(query.tags, vec!["core", "anothertag"]);
    }

    #[tokio::test]
    async fn test_missing_age_and_run_name() {
        let err = build_query(&RunsCriteria::default(), &offline_client())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "RAS1010E");
    }
}
