//! In-process stand-in for a Result Archive Store.
//!
//! Every request is recorded and answered by a test-supplied responder, so
//! a test can script the server and then assert on what the client sent.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;

use rasctl::api::retry::RetryConfig;
use rasctl::config::ServerConfig;
use rasctl::RasClient;

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = Arc<dyn Fn(&Recorded) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Responder,
}

pub struct MockRas {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockRas {
    /// Start a server on an ephemeral port.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// A client with near-instant rate-limit retries.
    pub fn client(&self) -> RasClient {
        let server = ServerConfig {
            api_server_url: self.url.clone(),
            ..ServerConfig::default()
        };
        let retry = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_factor: 2.0,
            jitter: false,
        };
        RasClient::new(&server, retry).unwrap()
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: String,
) -> Response {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    };
    let (status, body) = (state.responder)(&recorded);
    state.requests.lock().unwrap().push(recorded);

    let status = StatusCode::from_u16(status).unwrap();
    (status, body).into_response()
}

/// JSON for one run, shaped like the archive returns it.
pub fn run_json(
    run_id: &str,
    run_name: &str,
    requestor: &str,
    status: &str,
    result: &str,
    tags: &[&str],
) -> serde_json::Value {
    serde_json::json!({
        "runId": run_id,
        "testStructure": {
            "runName": run_name,
            "bundle": "myBundleId",
            "testName": "myTestPackage.MyTestName",
            "testShortName": "MyTestName",
            "requestor": requestor,
            "status": status,
            "result": result,
            "group": "dummyGroup",
            "tags": tags,
            "queued": "2023-05-10T06:00:13.043037Z",
            "startTime": "2023-05-10T06:00:36.159003Z",
            "endTime": "2023-05-10T06:02:53.823338Z",
            "methods": [{
                "className": "myTestPackage.MyTestName",
                "methodName": "myTestMethodName",
                "type": "test",
                "status": "Done",
                "result": "Success",
                "startTime": "2023-05-10T06:00:13.254335Z",
                "endTime": "2023-05-10T06:03:11.882739Z"
            }]
        },
        "artifacts": []
    })
}

pub fn page_json(runs: Vec<serde_json::Value>, next_cursor: Option<&str>) -> String {
    let mut page = serde_json::json!({
        "pageSize": 100,
        "amountOfRuns": runs.len(),
        "runs": runs,
    });
    if let Some(cursor) = next_cursor {
        page["nextCursor"] = serde_json::json!(cursor);
    }
    page.to_string()
}

pub fn error_json(code: i64, message: &str) -> String {
    serde_json::json!({ "error_code": code, "error_message": message }).to_string()
}
