//! Owns the application state and turns user intents into backend calls and
//! view updates.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::config::MIN_ITERATIONS;
use crate::detail::DetailView;
use crate::dispatch::{self, Dispatch};
use crate::error::BenchError;
use crate::history::{self, AutoRefresh};
use crate::model::{BatchResult, ExecuteOutcome, UploadResponse};
use crate::render::{AssertionBlock, BatchTable, ExcelPreview, SinglePanel};
use crate::state::{AppState, Control, MainTab};
use crate::variables::{clamp_iterations, ActiveVariableSource, ExcelRef, KvRow};
use crate::view::View;

/// Everything a user can do. Edits only touch the form; `Apply*`, uploads
/// and executions are what change the variable store or hit the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    EditCurl(String),
    EditJson(String),
    /// JSON editor lost focus.
    ApplyJsonVariables,
    AddKvRow,
    RemoveKvRow(usize),
    EditKvRow { index: usize, key: String, value: String },
    /// A KV field lost focus.
    ApplyKvVariables,
    AddAssertion,
    RemoveAssertion(usize),
    EditAssertion { index: usize, text: String },
    EditIterations(String),
    SelectSource(ActiveVariableSource),
    SelectTab(MainTab),
    UploadExcel { file_name: String, bytes: Vec<u8> },
    Execute,
    ExecuteBatch,
    LoadHistory,
    ClearHistory,
    SetAutoRefresh(bool),
    ShowHistoryDetail(String),
    ShowRowDetail(u64),
}

pub struct Controller<B: Backend, V: View> {
    state: AppState,
    backend: Arc<B>,
    view: Arc<V>,
    auto_refresh: AutoRefresh,
}

impl<B: Backend, V: View> Controller<B, V> {
    pub fn new(backend: Arc<B>, view: Arc<V>, refresh_period: Duration) -> Self {
        Self {
            state: AppState::new(),
            backend,
            view,
            auto_refresh: AutoRefresh::new(refresh_period),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.auto_refresh.is_running()
    }

    /// Apply one intent. Failures have already been alerted when this
    /// returns `Err`; the controller stays usable either way.
    pub async fn handle(&mut self, intent: Intent) -> Result<(), BenchError> {
        match intent {
            Intent::EditCurl(text) => self.state.form.curl_command = text,
            Intent::EditJson(text) => self.state.form.json_text = text,
            Intent::ApplyJsonVariables => self.apply_json(),
            Intent::AddKvRow => self.state.form.add_kv_row(),
            Intent::RemoveKvRow(index) => {
                self.state.form.remove_kv_row(index);
            }
            Intent::EditKvRow { index, key, value } => {
                if let Some(row) = self.state.form.kv_rows.get_mut(index) {
                    *row = KvRow { key, value };
                }
            }
            Intent::ApplyKvVariables => self.state.store.apply_kv(&self.state.form.kv_rows),
            Intent::AddAssertion => self.state.form.assertions.add(),
            Intent::RemoveAssertion(index) => {
                self.state.form.assertions.remove(index);
            }
            Intent::EditAssertion { index, text } => {
                self.state.form.assertions.edit(index, text);
            }
            Intent::EditIterations(text) => self.state.form.iterations = clamp_iterations(&text),
            Intent::SelectSource(source) => self.state.source = source,
            Intent::SelectTab(tab) => {
                self.state.select_tab(tab);
                self.view.switch_tab(self.state.tab, self.state.batch_panel_visible);
            }
            Intent::UploadExcel { file_name, bytes } => return self.upload_excel(&file_name, bytes).await,
            Intent::Execute => return self.execute().await,
            Intent::ExecuteBatch => return self.execute_batch().await,
            Intent::LoadHistory => {
                history::load_history(self.backend.as_ref(), self.view.as_ref()).await?;
            }
            Intent::ClearHistory => {
                history::clear_history(self.backend.as_ref(), self.view.as_ref()).await?;
            }
            Intent::SetAutoRefresh(true) => {
                self.auto_refresh
                    .start(self.backend.clone(), self.view.clone());
            }
            Intent::SetAutoRefresh(false) => {
                self.auto_refresh.stop();
            }
            Intent::ShowHistoryDetail(id) => return self.show_history_detail(&id).await,
            Intent::ShowRowDetail(row_index) => return self.show_row_detail(row_index),
        }
        Ok(())
    }

    fn apply_json(&mut self) {
        if let Some(planned) = self.state.store.apply_json(&self.state.form.json_text) {
            self.state.planned.json = Some(planned);
            self.state.planned.total = Some(planned as u64);
            self.state.form.iterations = u32::try_from(planned)
                .unwrap_or(u32::MAX)
                .max(MIN_ITERATIONS);
            self.view
                .show_planned_counts(&self.state.planned, self.state.form.iterations);
        }
    }

    fn set_busy(&mut self, control: Control, busy: bool) {
        self.state.busy.set(control, busy);
        self.view.set_busy(control, busy);
    }

    async fn upload_excel(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<(), BenchError> {
        self.set_busy(Control::Upload, true);
        let result = self.backend.upload_excel(file_name, bytes).await;
        self.set_busy(Control::Upload, false);

        match result {
            Ok(upload) => {
                self.apply_upload(&upload);
                Ok(())
            }
            Err(e) => {
                warn!("Excel upload failed: {}", e);
                self.view.alert(&e.alert_text("Upload"));
                Err(e)
            }
        }
    }

    fn apply_upload(&mut self, upload: &UploadResponse) {
        info!("Uploaded spreadsheet {}", upload.filename);
        self.state
            .store
            .apply_excel(ExcelRef(upload.filename.clone()));
        self.view.show_excel_preview(&ExcelPreview::from_upload(upload));

        self.state.planned.excel = upload.total_rows;
        if let Some(total) = upload.total_rows.filter(|t| *t > 0) {
            self.state.planned.total = Some(total);
            self.state.form.iterations = u32::try_from(total).unwrap_or(u32::MAX);
        }
        self.view
            .show_planned_counts(&self.state.planned, self.state.form.iterations);
    }

    async fn execute(&mut self) -> Result<(), BenchError> {
        let plan = dispatch::plan_single(&self.state.form, &self.state.store);
        let plan = self.validated(plan)?;

        self.set_busy(Control::Execute, true);
        let result = dispatch::send(self.backend.as_ref(), &plan).await;
        self.set_busy(Control::Execute, false);

        match result {
            Ok(ExecuteOutcome::Single(single)) => {
                self.view
                    .show_single_result(&SinglePanel::from_result(&single));
                self.view.show_assertions(&AssertionBlock::new(
                    &single.assertions,
                    single.all_assertions_passed,
                ));
                Ok(())
            }
            Ok(ExecuteOutcome::Batch(batch)) => {
                self.render_batch(&batch);
                // A batch envelope carries no top-level assertions.
                self.view.show_assertions(&AssertionBlock::new(&[], None));
                Ok(())
            }
            Err(e) => self.fail("Execution", e),
        }
    }

    async fn execute_batch(&mut self) -> Result<(), BenchError> {
        let plan = dispatch::plan_batch(&self.state.form, &self.state.store, self.state.source);
        let plan = self.validated(plan)?;

        self.set_busy(Control::Batch, true);
        let result = dispatch::send(self.backend.as_ref(), &plan).await;
        self.set_busy(Control::Batch, false);

        match result {
            Ok(ExecuteOutcome::Batch(batch)) => {
                self.render_batch(&batch);
                let _ = history::load_history(self.backend.as_ref(), self.view.as_ref()).await;
                Ok(())
            }
            Ok(ExecuteOutcome::Single(_)) => {
                self.fail("Batch execution", BenchError::UnexpectedShape("batch"))
            }
            Err(e) => self.fail("Batch execution", e),
        }
    }

    fn validated(&self, plan: Result<Dispatch, BenchError>) -> Result<Dispatch, BenchError> {
        plan.map_err(|e| {
            self.view.alert(&e.alert_text("Execution"));
            e
        })
    }

    fn fail(&self, operation: &str, e: BenchError) -> Result<(), BenchError> {
        warn!("{} failed: {}", operation, e);
        self.view.alert(&e.alert_text(operation));
        Err(e)
    }

    fn render_batch(&mut self, batch: &BatchResult) {
        if !batch.counts_consistent() {
            warn!(
                "Batch counts disagree: {} passed + {} failed != {} rows",
                batch.success_count, batch.failure_count, batch.total_rows
            );
        }
        self.view.show_batch_results(&BatchTable::from_result(batch));
        self.state.last_batch_rows = batch.results.clone();
        self.state.batch_rendered = true;
        self.state.select_tab(MainTab::Variables);
        self.view
            .switch_tab(self.state.tab, self.state.batch_panel_visible);
    }

    async fn show_history_detail(&mut self, id: &str) -> Result<(), BenchError> {
        match self.backend.get_result(id).await {
            Ok(data) => {
                self.view.show_detail(&DetailView::project(&data).to_pretty());
                Ok(())
            }
            Err(e) => self.fail("Load result detail", e),
        }
    }

    fn show_row_detail(&self, row_index: u64) -> Result<(), BenchError> {
        let row = self
            .state
            .last_batch_rows
            .iter()
            .find(|r| r.row_index == row_index);
        let Some(row) = row else {
            return self.fail("Row detail", BenchError::UnknownRow(row_index));
        };
        let value = serde_json::to_value(row)?;
        self.view.show_detail(&DetailView::project(&value).to_pretty());
        Ok(())
    }
}
