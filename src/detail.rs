//! Read-only projection of a stored result for the detail modal.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model::ResultKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    pub request: Value,
    pub response: Value,
    pub assertions: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<Value>,
}

/// Only allow-listed fields are carried over. Keys absent from the source
/// are omitted; explicit `null`s are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailView {
    Batch {
        #[serde(skip_serializing_if = "Option::is_none")]
        batch_id: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        curl_command_template: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        assertions: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        total_rows: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        success_count: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure_count: Option<Value>,
        results: Vec<DetailRow>,
    },
    Single {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        curl_command: Option<Value>,
        request: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        variables: Option<Value>,
        response: Value,
        assertions: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        success: Option<Value>,
    },
}

fn pick(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).cloned()
}

/// Present and non-null, else the default.
fn pick_or(obj: &Map<String, Value>, key: &str, default: Value) -> Value {
    match obj.get(key) {
        Some(v) if !v.is_null() => v.clone(),
        _ => default,
    }
}

impl DetailRow {
    fn project(row: &Value) -> Self {
        let empty = Map::new();
        let obj = row.as_object().unwrap_or(&empty);
        Self {
            row_index: pick(obj, "row_index"),
            variables: pick(obj, "variables"),
            request: pick_or(obj, "request", json!({})),
            response: pick_or(obj, "response", json!({})),
            assertions: pick_or(obj, "assertions", json!([])),
            success: pick(obj, "success"),
        }
    }
}

impl DetailView {
    pub fn project(data: &Value) -> Self {
        let empty = Map::new();
        let obj = data.as_object().unwrap_or(&empty);
        match ResultKind::of(data) {
            ResultKind::Batch => DetailView::Batch {
                batch_id: pick(obj, "batch_id"),
                timestamp: pick(obj, "timestamp"),
                curl_command_template: pick(obj, "curl_command_template"),
                assertions: pick(obj, "assertions"),
                total_rows: pick(obj, "total_rows"),
                success_count: pick(obj, "success_count"),
                failure_count: pick(obj, "failure_count"),
                results: obj
                    .get("results")
                    .and_then(Value::as_array)
                    .map(|rows| rows.iter().map(DetailRow::project).collect())
                    .unwrap_or_default(),
            },
            ResultKind::Single => DetailView::Single {
                id: pick(obj, "id"),
                timestamp: pick(obj, "timestamp"),
                curl_command: pick(obj, "curl_command"),
                request: pick_or(obj, "request", json!({})),
                variables: pick(obj, "variables"),
                response: pick_or(obj, "response", json!({})),
                assertions: pick_or(obj, "assertions", json!([])),
                success: pick(obj, "success"),
            },
        }
    }

    /// Pretty-printed text shown in the modal.
    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
