//! View models for execution results and their terminal rendering.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::config::EXCEL_PREVIEW_ROWS;
use crate::model::{AssertionOutcome, BatchResult, RowResult, SingleResult, UploadResponse};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePanel {
    pub stdout: String,
    pub stderr: String,
    pub return_code: String,
    pub status_code: String,
}

impl SinglePanel {
    pub fn from_result(result: &SingleResult) -> Self {
        Self {
            stdout: non_empty_or(&result.stdout, "(no output)"),
            stderr: non_empty_or(&result.stderr, "(no errors)"),
            return_code: result
                .returncode
                .map(|c| c.to_string())
                .unwrap_or_default(),
            status_code: match result.status_code {
                Some(code) if code != 0 => code.to_string(),
                _ => "unknown".to_string(),
            },
        }
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Overall assertion banner. The verdict comes from the backend's
/// `all_assertions_passed`; it is never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionSummary {
    AllPassed,
    SomeFailed,
    NoAssertions,
}

impl AssertionSummary {
    pub fn new(assertions: &[AssertionOutcome], all_passed: Option<bool>) -> Self {
        if assertions.is_empty() {
            AssertionSummary::NoAssertions
        } else if all_passed == Some(true) {
            AssertionSummary::AllPassed
        } else {
            AssertionSummary::SomeFailed
        }
    }
}

impl fmt::Display for AssertionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionSummary::AllPassed => write!(f, "all passed"),
            AssertionSummary::SomeFailed => write!(f, "some failed"),
            AssertionSummary::NoAssertions => write!(f, "no assertions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionLine {
    pub assertion: String,
    pub passed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionBlock {
    pub lines: Vec<AssertionLine>,
    pub summary: AssertionSummary,
}

impl AssertionBlock {
    pub fn new(assertions: &[AssertionOutcome], all_passed: Option<bool>) -> Self {
        Self {
            lines: assertions
                .iter()
                .map(|a| AssertionLine {
                    assertion: a.assertion.clone(),
                    passed: a.success,
                    error: a.error.clone(),
                })
                .collect(),
            summary: AssertionSummary::new(assertions, all_passed),
        }
    }
}

/// Green for a pass, red for a failure, untouched otherwise or when
/// colour is off.
fn paint(text: String, passed: Option<bool>, color: bool) -> String {
    match (color, passed) {
        (true, Some(true)) => text.green().to_string(),
        (true, Some(false)) => text.red().to_string(),
        _ => text,
    }
}

impl AssertionBlock {
    /// Same layout as `Display` with coloured verdicts.
    pub fn styled(&self) -> String {
        self.layout(true)
    }

    fn layout(&self, color: bool) -> String {
        if self.lines.is_empty() {
            return "Assertions: none\n".to_string();
        }
        let mut out = String::from("Assertions:\n");
        for line in &self.lines {
            let verdict = if line.passed { "PASS" } else { "FAIL" };
            let verdict = paint(format!("[{}]", verdict), Some(line.passed), color);
            out.push_str(&format!("  {} {}\n", verdict, line.assertion));
            if let Some(err) = &line.error {
                out.push_str(&format!("         error: {}\n", err));
            }
        }
        let overall = match self.summary {
            AssertionSummary::AllPassed => Some(true),
            AssertionSummary::SomeFailed => Some(false),
            AssertionSummary::NoAssertions => None,
        };
        out.push_str(&format!(
            "Overall: {}\n",
            paint(self.summary.to_string(), overall, color)
        ));
        out
    }
}

impl fmt::Display for AssertionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.layout(false))
    }
}

impl fmt::Display for SinglePanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status code: {}", self.status_code)?;
        writeln!(f, "Return code: {}", self.return_code)?;
        writeln!(f, "--- stdout ---")?;
        writeln!(f, "{}", self.stdout)?;
        writeln!(f, "--- stderr ---")?;
        writeln!(f, "{}", self.stderr)
    }
}

/// Status column of a batch row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCell {
    Code(u16),
    Error,
    Unknown,
}

impl StatusCell {
    /// `response.code`, then `response.status_code`, then the error marker.
    pub fn resolve(row: &RowResult) -> Self {
        let response = row.response.as_ref();
        if let Some(code) = response.and_then(|r| r.code).filter(|c| *c != 0) {
            return StatusCell::Code(code);
        }
        if let Some(code) = response.and_then(|r| r.status_code).filter(|c| *c != 0) {
            return StatusCell::Code(code);
        }
        if row.error.is_some() {
            StatusCell::Error
        } else {
            StatusCell::Unknown
        }
    }
}

impl fmt::Display for StatusCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCell::Code(code) => write!(f, "{}", code),
            StatusCell::Error => write!(f, "error"),
            StatusCell::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionBadge {
    Passed,
    Failed,
    NoAssertion,
}

impl From<Option<bool>> for AssertionBadge {
    fn from(success: Option<bool>) -> Self {
        match success {
            Some(true) => AssertionBadge::Passed,
            Some(false) => AssertionBadge::Failed,
            None => AssertionBadge::NoAssertion,
        }
    }
}

impl fmt::Display for AssertionBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionBadge::Passed => write!(f, "passed"),
            AssertionBadge::Failed => write!(f, "failed"),
            AssertionBadge::NoAssertion => write!(f, "no assertion"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub row_index: u64,
    pub variables: String,
    pub status: StatusCell,
    pub badge: AssertionBadge,
}

impl BatchRow {
    pub fn from_row(row: &RowResult) -> Self {
        Self {
            row_index: row.row_index,
            variables: serde_json::to_string_pretty(&row.variables).unwrap_or_default(),
            status: StatusCell::resolve(row),
            badge: row.success.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTable {
    pub total_rows: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub rows: Vec<BatchRow>,
}

impl BatchTable {
    pub fn from_result(result: &BatchResult) -> Self {
        Self {
            total_rows: result.total_rows,
            success_count: result.success_count,
            failure_count: result.failure_count,
            rows: result.results.iter().map(BatchRow::from_row).collect(),
        }
    }
}

impl BatchTable {
    /// Same layout as `Display` with coloured counts and badges.
    pub fn styled(&self) -> String {
        self.layout(true)
    }

    fn layout(&self, color: bool) -> String {
        let mut out = format!(
            "Total: {}  Passed: {}  Failed: {}\n",
            self.total_rows,
            paint(self.success_count.to_string(), Some(true), color),
            paint(self.failure_count.to_string(), Some(false), color)
        );
        out.push_str(&format!(
            "{:>5}  {:<8}  {:<12}  VARIABLES\n",
            "ROW", "STATUS", "ASSERTIONS"
        ));
        for row in &self.rows {
            // Variables are pretty-printed; keep the table to one line per row.
            let vars = row.variables.split_whitespace().collect::<Vec<_>>().join(" ");
            let passed = match row.badge {
                AssertionBadge::Passed => Some(true),
                AssertionBadge::Failed => Some(false),
                AssertionBadge::NoAssertion => None,
            };
            // Pad before colouring so escape codes do not eat the width.
            let badge = paint(format!("{:<12}", row.badge.to_string()), passed, color);
            out.push_str(&format!(
                "{:>5}  {:<8}  {}  {}\n",
                row.row_index,
                row.status.to_string(),
                badge,
                vars
            ));
        }
        out
    }
}

impl fmt::Display for BatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.layout(false))
    }
}

/// First spreadsheet rows as returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcelPreview {
    pub filename: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: Option<u64>,
}

impl ExcelPreview {
    pub fn from_upload(upload: &UploadResponse) -> Self {
        let rows = upload
            .preview
            .iter()
            .take(EXCEL_PREVIEW_ROWS)
            .map(|record| {
                upload
                    .columns
                    .iter()
                    .map(|column| match record.get(column) {
                        None | Some(Value::Null) => String::new(),
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect();
        Self {
            filename: upload.filename.clone(),
            columns: upload.columns.clone(),
            rows,
            total_rows: upload.total_rows,
        }
    }
}

impl fmt::Display for ExcelPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_rows {
            Some(total) => writeln!(f, "{} ({} rows)", self.filename, total)?,
            None => writeln!(f, "{}", self.filename)?,
        }
        writeln!(f, "{}", self.columns.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join(" | "))?;
        }
        Ok(())
    }
}
