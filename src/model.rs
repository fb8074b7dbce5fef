//! Wire types exchanged with the execution backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BenchError;

/// One variable set: substitution name to value. Values are usually strings
/// but JSON input may carry numbers, objects or arrays.
pub type VariableMap = Map<String, Value>;

/// `variables` field of an execution request: a single mapping or an ordered
/// sequence of mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariablesPayload {
    Map(VariableMap),
    List(Vec<VariableMap>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub curl_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariablesPayload>,
    pub assertions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_python: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    pub assertion: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub returncode: Option<i64>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub assertions: Vec<AssertionOutcome>,
    #[serde(default)]
    pub all_assertions_passed: Option<bool>,
}

/// Response part of a batch row. `code` is filled by array/repeat batches,
/// `status_code` by spreadsheet batches; everything else (headers, body,
/// raw output) is kept verbatim for the detail view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    pub row_index: u64,
    #[serde(default)]
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curl_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<RowResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Vec<AssertionOutcome>>,
    /// `None` means the row had no assertions to evaluate.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub results: Vec<RowResult>,
}

impl BatchResult {
    /// Rows without assertions are counted in neither bucket, so this only
    /// holds when every row evaluated at least one assertion.
    pub fn counts_consistent(&self) -> bool {
        self.success_count + self.failure_count == self.total_rows
    }

    /// Decode a body that must be a batch envelope. Every field defaults, so
    /// a single-result body would otherwise decode as an empty batch.
    pub fn from_value(value: Value) -> Result<Self, BenchError> {
        match ResultKind::of(&value) {
            ResultKind::Batch => Ok(serde_json::from_value(value)?),
            ResultKind::Single => Err(BenchError::UnexpectedShape("batch")),
        }
    }
}

/// Response of `/execute_curl`, which runs once or as an implicit batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    Single(SingleResult),
    Batch(BatchResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Single,
    Batch,
}

impl ResultKind {
    /// Use the explicit `kind` discriminator when present, else a `results`
    /// sequence marks a batch.
    pub fn of(value: &Value) -> ResultKind {
        match value.get("kind").and_then(Value::as_str) {
            Some("batch") => return ResultKind::Batch,
            Some("single") => return ResultKind::Single,
            _ => {}
        }
        if value.get("results").map(Value::is_array).unwrap_or(false) {
            ResultKind::Batch
        } else {
            ResultKind::Single
        }
    }
}

impl ExecuteOutcome {
    pub fn from_value(value: Value) -> Result<Self, BenchError> {
        match ResultKind::of(&value) {
            ResultKind::Batch => Ok(ExecuteOutcome::Batch(serde_json::from_value(value)?)),
            ResultKind::Single => Ok(ExecuteOutcome::Single(serde_json::from_value(value)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: String,
    /// Epoch seconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub is_batch: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub success_count: Option<u64>,
    #[serde(default)]
    pub failure_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryList {
    #[serde(default)]
    pub results: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultDetail {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub preview: Vec<Map<String, Value>>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

/// Check the `{success, error}` envelope every endpoint answers with.
/// `fallback` names the failure when the body carries no `error` text.
pub fn check_envelope(value: Value, fallback: &str) -> Result<Value, BenchError> {
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(value);
    }
    let message = value
        .get("error")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| fallback.to_string());
    Err(BenchError::Backend(message))
}
