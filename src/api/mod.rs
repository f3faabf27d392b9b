//! HTTP client for the Result Archive Store REST API.
//!
//! [`RasClient`] owns the reqwest client, stamps the `ClientApiVersion` and
//! `Accept` headers on every request and routes each call through the
//! rate-limit [`retry`] decorator. It hands back the status code and body
//! bytes; interpreting them is left to the callers in [`crate::runs`].

pub mod model;
pub mod retry;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;
use self::model::UpdateStatusRequest;
use self::retry::{RetryConfig, RetryableError};

/// Header carrying the REST API version this client was built against.
pub const CLIENT_API_VERSION_HEADER: &str = "ClientApiVersion";

pub const RAS_RUNS_PATH: &str = "/ras/runs";
pub const RAS_RESULT_NAMES_PATH: &str = "/ras/resultnames";
pub const GROUP_RUNS_PATH: &str = "/runs";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not reach the API server at {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("the API server is rate limiting requests (HTTP status {status})")]
    RateLimited { status: u16 },

    #[error("could not read the response body (HTTP status {status}): {source}")]
    BodyRead {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build the HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransportError::RateLimited { .. })
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Client for one API server.
#[derive(Debug, Clone)]
pub struct RasClient {
    http: Client,
    api_server_url: String,
    client_api_version: String,
    retry: RetryConfig,
}

impl RasClient {
    pub fn new(server: &ServerConfig, retry: RetryConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(concat!("rasctl/", env!("CARGO_PKG_VERSION")))
            .timeout(server.request_timeout())
            .build()
            .map_err(TransportError::ClientBuild)?;

        Ok(Self {
            http,
            api_server_url: server.api_server_url.trim_end_matches('/').to_string(),
            client_api_version: server.client_api_version.clone(),
            retry,
        })
    }

    /// Base URL of the server, without a trailing slash.
    pub fn api_server_url(&self) -> &str {
        &self.api_server_url
    }

    /// `GET /ras/runs` with the given query parameters.
    pub async fn get_runs_page(&self, params: &[(String, String)]) -> Result<ApiResponse, TransportError> {
        self.execute(Method::GET, RAS_RUNS_PATH.to_string(), |req| req.query(params))
            .await
    }

    /// `GET /ras/resultnames`.
    pub async fn get_result_names(&self) -> Result<ApiResponse, TransportError> {
        self.execute(Method::GET, RAS_RESULT_NAMES_PATH.to_string(), |req| req)
            .await
    }

    /// `PUT /ras/runs/{run_id}`.
    pub async fn put_run_status(
        &self,
        run_id: &str,
        update: &UpdateStatusRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.execute(Method::PUT, run_status_path(run_id), |req| req.json(update))
            .await
    }

    /// `PUT /runs/{group_id}`.
    pub async fn put_group_status(
        &self,
        group_id: &str,
        update: &UpdateStatusRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.execute(Method::PUT, group_status_path(group_id), |req| req.json(update))
            .await
    }

    async fn execute<F>(&self, method: Method, path: String, customize: F) -> Result<ApiResponse, TransportError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.api_server_url, path);

        retry::retry(&self.retry, || {
            let request = customize(
                self.http
                    .request(method.clone(), &url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .header(CLIENT_API_VERSION_HEADER, &self.client_api_version),
            );
            let url = url.clone();

            async move {
                let response = request
                    .send()
                    .await
                    .map_err(|source| TransportError::Request { url: url.clone(), source })?;

                let status = response.status();
                debug!(%url, status = status.as_u16(), "received response");

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(TransportError::RateLimited { status: status.as_u16() });
                }

                let body = response.bytes().await.map_err(|source| TransportError::BodyRead {
                    status: status.as_u16(),
                    source,
                })?;

                Ok(ApiResponse {
                    status,
                    body: body.to_vec(),
                })
            }
        })
        .await
    }
}

fn run_status_path(run_id: &str) -> String {
    format!("{}/{}", RAS_RUNS_PATH, urlencoding::encode(run_id))
}

fn group_status_path(group_id: &str) -> String {
    format!("{}/{}", GROUP_RUNS_PATH, urlencoding::encode(group_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limiting_is_retryable() {
        assert!(TransportError::RateLimited { status: 429 }.is_retryable());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let server = ServerConfig {
            api_server_url: "http://ras.example.com/api/".to_string(),
            ..ServerConfig::default()
        };
        let client = RasClient::new(&server, RetryConfig::default()).unwrap();
        assert_eq!(client.api_server_url(), "http://ras.example.com/api");
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(run_status_path("xxx876xxx"), "/ras/runs/xxx876xxx");
        assert_eq!(run_status_path("a/b"), "/ras/runs/a%2Fb");
        assert_eq!(group_status_path("my group"), "/runs/my%20group");
        assert_eq!(group_status_path("caf\u{e9}"), "/runs/caf%C3%A9");
    }
}
