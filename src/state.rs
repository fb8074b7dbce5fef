use serde::Serialize;

use crate::assertions::AssertionFields;
use crate::model::RowResult;
use crate::variables::{ActiveVariableSource, KvRow, PlannedCounts, VariableStore};

/// Everything the user can edit before triggering an execution. This is the
/// live input the batch path re-reads; `VariableStore` only holds what was
/// last applied.
#[derive(Debug, Clone)]
pub struct FormState {
    pub curl_command: String,
    pub json_text: String,
    pub kv_rows: Vec<KvRow>,
    pub assertions: AssertionFields,
    pub iterations: u32,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            curl_command: String::new(),
            json_text: String::new(),
            kv_rows: vec![KvRow::default()],
            assertions: AssertionFields::new(),
            iterations: 1,
        }
    }

    pub fn add_kv_row(&mut self) {
        self.kv_rows.push(KvRow::default());
    }

    /// The list always keeps at least one row.
    pub fn remove_kv_row(&mut self, index: usize) -> bool {
        if self.kv_rows.len() > 1 && index < self.kv_rows.len() {
            self.kv_rows.remove(index);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Execute,
    Batch,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MainTab {
    #[default]
    Command,
    Variables,
    Assertions,
    History,
}

#[derive(Debug, Clone, Default)]
pub struct BusyFlags {
    pub execute: bool,
    pub batch: bool,
    pub upload: bool,
}

impl BusyFlags {
    pub fn get(&self, control: Control) -> bool {
        match control {
            Control::Execute => self.execute,
            Control::Batch => self.batch,
            Control::Upload => self.upload,
        }
    }

    pub fn set(&mut self, control: Control, busy: bool) {
        match control {
            Control::Execute => self.execute = busy,
            Control::Batch => self.batch = busy,
            Control::Upload => self.upload = busy,
        }
    }
}

/// Application state owned by the controller.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub form: FormState,
    pub store: VariableStore,
    pub source: ActiveVariableSource,
    pub planned: PlannedCounts,
    pub busy: BusyFlags,
    pub tab: MainTab,
    pub batch_panel_visible: bool,
    pub batch_rendered: bool,
    /// Rows of the last rendered batch, for row detail.
    pub last_batch_rows: Vec<RowResult>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the main tab. The batch panel is only shown on the variables
    /// tab, and only once a batch has been rendered.
    pub fn select_tab(&mut self, tab: MainTab) {
        self.tab = tab;
        self.batch_panel_visible = tab == MainTab::Variables && self.batch_rendered;
    }
}
