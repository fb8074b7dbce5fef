#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use curlbench::backend::Backend;
use curlbench::controller::Controller;
use curlbench::error::BenchError;
use curlbench::history::HistoryTable;
use curlbench::model::{
    check_envelope, BatchResult, ExecuteOutcome, ExecutionRequest, HistoryEntry, HistoryList,
    ResultDetail, UploadResponse,
};
use curlbench::render::{AssertionBlock, BatchTable, ExcelPreview, SinglePanel};
use curlbench::state::{Control, MainTab};
use curlbench::variables::PlannedCounts;
use curlbench::view::View;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload(String),
    ExecuteCurl(ExecutionRequest),
    ExecuteBatch(ExecutionRequest),
    Clear,
    GetResults,
    GetResult(String),
}

/// In-memory backend answering with canned JSON bodies. Bodies go through
/// the same envelope check as the HTTP client.
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    pub upload_body: Mutex<Value>,
    pub execute_curl_body: Mutex<Value>,
    pub execute_batch_body: Mutex<Value>,
    pub clear_body: Mutex<Value>,
    pub results_body: Mutex<Value>,
    pub result_body: Mutex<Value>,
    /// Per-call latency for `get_results`, consumed front to back.
    pub results_delays: Mutex<VecDeque<Duration>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            upload_body: Mutex::new(json!({
                "success": true,
                "filename": "rows.xlsx",
                "columns": [],
                "preview": [],
                "total_rows": 0
            })),
            execute_curl_body: Mutex::new(single_body()),
            execute_batch_body: Mutex::new(batch_body()),
            clear_body: Mutex::new(json!({"success": true, "removed": 0, "errors": []})),
            results_body: Mutex::new(json!({"success": true, "results": []})),
            result_body: Mutex::new(json!({"success": false, "error": "Result not found"})),
            results_delays: Mutex::new(VecDeque::new()),
        }
    }

    pub fn set(slot: &Mutex<Value>, body: Value) {
        *slot.lock().unwrap() = body;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn body(slot: &Mutex<Value>) -> Result<Value, BenchError> {
        check_envelope(slot.lock().unwrap().clone(), "HTTP 500")
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload_excel(&self, file_name: &str, _bytes: Vec<u8>) -> Result<UploadResponse, BenchError> {
        self.record(Call::Upload(file_name.to_string()));
        Ok(serde_json::from_value(Self::body(&self.upload_body)?)?)
    }

    async fn execute_curl(&self, request: &ExecutionRequest) -> Result<ExecuteOutcome, BenchError> {
        self.record(Call::ExecuteCurl(request.clone()));
        ExecuteOutcome::from_value(Self::body(&self.execute_curl_body)?)
    }

    async fn execute_batch(&self, request: &ExecutionRequest) -> Result<BatchResult, BenchError> {
        self.record(Call::ExecuteBatch(request.clone()));
        BatchResult::from_value(Self::body(&self.execute_batch_body)?)
    }

    async fn clear_results(&self) -> Result<(), BenchError> {
        self.record(Call::Clear);
        Self::body(&self.clear_body).map(|_| ())
    }

    async fn get_results(&self) -> Result<Vec<HistoryEntry>, BenchError> {
        self.record(Call::GetResults);
        let delay = self.results_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let list: HistoryList = serde_json::from_value(Self::body(&self.results_body)?)?;
        Ok(list.results)
    }

    async fn get_result(&self, id: &str) -> Result<Value, BenchError> {
        self.record(Call::GetResult(id.to_string()));
        let detail: ResultDetail = serde_json::from_value(Self::body(&self.result_body)?)?;
        Ok(detail.data)
    }
}

pub fn single_body() -> Value {
    json!({
        "success": true,
        "result_id": "20251017-101500-001",
        "stdout": "{\"ok\":true}",
        "stderr": "",
        "returncode": 0,
        "status_code": 200,
        "assertions": [
            {"assertion": "response.code == 200", "result": true, "success": true}
        ],
        "all_assertions_passed": true
    })
}

pub fn batch_body() -> Value {
    json!({
        "success": true,
        "batch_id": "BATCH20251017-101500-002",
        "total_rows": 2,
        "success_count": 1,
        "failure_count": 1,
        "results": [
            {
                "row_index": 1,
                "variables": {"id": 1},
                "response": {"code": 200, "stdout": "", "stderr": ""},
                "assertions": [{"assertion": "response.code == 200", "success": true}],
                "success": true
            },
            {
                "row_index": 2,
                "variables": {"id": 2},
                "error": "boom",
                "success": false
            }
        ]
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Alert(String),
    Confirm(String),
    Busy(Control, bool),
    Tab(MainTab, bool),
    Planned(PlannedCounts, u32),
    ExcelPreview(ExcelPreview),
    Single(SinglePanel),
    Assertions(AssertionBlock),
    Batch(BatchTable),
    History(HistoryTable),
    Detail(String),
}

pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        }
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Alert(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn last_detail(&self) -> Option<Value> {
        self.events().into_iter().rev().find_map(|e| match e {
            ViewEvent::Detail(text) => serde_json::from_str(&text).ok(),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl View for RecordingView {
    fn alert(&self, message: &str) {
        self.push(ViewEvent::Alert(message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.push(ViewEvent::Confirm(message.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn set_busy(&self, control: Control, busy: bool) {
        self.push(ViewEvent::Busy(control, busy));
    }

    fn switch_tab(&self, tab: MainTab, batch_panel_visible: bool) {
        self.push(ViewEvent::Tab(tab, batch_panel_visible));
    }

    fn show_planned_counts(&self, counts: &PlannedCounts, iterations: u32) {
        self.push(ViewEvent::Planned(counts.clone(), iterations));
    }

    fn show_excel_preview(&self, preview: &ExcelPreview) {
        self.push(ViewEvent::ExcelPreview(preview.clone()));
    }

    fn show_single_result(&self, panel: &SinglePanel) {
        self.push(ViewEvent::Single(panel.clone()));
    }

    fn show_assertions(&self, block: &AssertionBlock) {
        self.push(ViewEvent::Assertions(block.clone()));
    }

    fn show_batch_results(&self, table: &BatchTable) {
        self.push(ViewEvent::Batch(table.clone()));
    }

    fn show_history(&self, table: &HistoryTable) {
        self.push(ViewEvent::History(table.clone()));
    }

    fn show_detail(&self, text: &str) {
        self.push(ViewEvent::Detail(text.to_string()));
    }
}

pub type TestController = Controller<FakeBackend, RecordingView>;

pub fn controller() -> (TestController, Arc<FakeBackend>, Arc<RecordingView>) {
    let backend = Arc::new(FakeBackend::new());
    let view = Arc::new(RecordingView::new());
    let controller = Controller::new(backend.clone(), view.clone(), Duration::from_secs(3));
    (controller, backend, view)
}
