//! Variable sources and the store the single-execution path reads from.

use serde::Serialize;
use serde_json::Value;

use crate::config::MIN_ITERATIONS;
use crate::model::{VariableMap, VariablesPayload};

/// Currently applied variables: one mapping or a sequence of mappings.
pub type VariableSet = VariablesPayload;

/// Which variable input pane the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveVariableSource {
    #[default]
    Json,
    Kv,
    Excel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KvRow {
    pub key: String,
    pub value: String,
}

impl KvRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Handle for an uploaded spreadsheet, as returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelRef(pub String);

impl ExcelRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Last-writer-wins holder for applied variables.
#[derive(Debug, Clone)]
pub struct VariableStore {
    current: VariableSet,
    excel: Option<ExcelRef>,
    last_writer: Option<ActiveVariableSource>,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            current: VariableSet::Map(VariableMap::new()),
            excel: None,
            last_writer: None,
        }
    }

    pub fn current(&self) -> &VariableSet {
        &self.current
    }

    pub fn excel(&self) -> Option<&ExcelRef> {
        self.excel.as_ref()
    }

    pub fn last_writer(&self) -> Option<ActiveVariableSource> {
        self.last_writer
    }

    /// Parse editor text into the store. Returns the planned execution count
    /// when the text was applied; blank or malformed text leaves the store
    /// untouched.
    pub fn apply_json(&mut self, text: &str) -> Option<usize> {
        if text.trim().is_empty() {
            return None;
        }
        match parse_variables_json(text) {
            Ok(set) => {
                let planned = planned_count(&set);
                self.current = set;
                self.last_writer = Some(ActiveVariableSource::Json);
                Some(planned)
            }
            Err(_) => None,
        }
    }

    pub fn apply_kv(&mut self, rows: &[KvRow]) {
        self.current = VariableSet::Map(kv_rows_to_map(rows));
        self.last_writer = Some(ActiveVariableSource::Kv);
    }

    pub fn apply_excel(&mut self, file: ExcelRef) {
        self.excel = Some(file);
        self.last_writer = Some(ActiveVariableSource::Excel);
    }
}

/// Parse JSON editor text. Only an object or an array of objects is a
/// variable set.
pub fn parse_variables_json(text: &str) -> Result<VariableSet, serde_json::Error> {
    serde_json::from_str(text)
}

/// Build a mapping from KV rows in order: blank keys are skipped, keys are
/// trimmed, a later duplicate overwrites an earlier one.
pub fn kv_rows_to_map(rows: &[KvRow]) -> VariableMap {
    let mut map = VariableMap::new();
    for row in rows {
        let key = row.key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), Value::String(row.value.clone()));
    }
    map
}

pub fn planned_count(set: &VariableSet) -> usize {
    match set {
        VariableSet::List(items) => items.len(),
        VariableSet::Map(_) => 1,
    }
}

/// Normalise the iterations field: leading integer (whitespace and sign
/// allowed, trailing garbage ignored), falling back to and floored at 1.
pub fn clamp_iterations(text: &str) -> u32 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() || negative {
        return MIN_ITERATIONS;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX).max(MIN_ITERATIONS)
}

/// Execution counts predicted before running, per source and overall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedCounts {
    pub json: Option<usize>,
    pub excel: Option<u64>,
    pub total: Option<u64>,
}
