//! JSON shapes exchanged with the Result Archive Store.
//!
//! Responses are deserialised leniently: absent fields take their default
//! and unknown fields are ignored, so older and newer servers both parse.

use serde::{Deserialize, Serialize};

/// One page of `GET /ras/runs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunsPage {
    pub next_cursor: Option<String>,
    pub page_size: u32,
    pub amount_of_runs: u32,
    pub runs: Vec<RasRun>,
}

/// A run record as stored in the archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RasRun {
    pub run_id: String,
    pub test_structure: TestStructure,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestStructure {
    pub run_name: String,
    pub bundle: String,
    pub test_name: String,
    pub test_short_name: String,
    pub requestor: String,
    pub status: String,
    pub result: String,
    pub group: String,
    pub tags: Vec<String>,
    pub queued: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub methods: Vec<TestMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestMethod {
    pub class_name: String,
    pub method_name: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub status: String,
    pub result: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artifact {
    pub artifact_path: String,
    pub content_type: String,
}

/// `GET /ras/resultnames`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultNames {
    pub resultnames: Vec<String>,
}

/// Body of the run and group status update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub result: String,
}

/// Structured error body returned by the server on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: i64,
    pub error_message: String,
}

impl ApiErrorBody {
    /// Decode a failure body; `None` when it is not the server's error JSON.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}
