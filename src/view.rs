use crate::history::HistoryTable;
use crate::render::{AssertionBlock, BatchTable, ExcelPreview, SinglePanel};
use crate::state::{Control, MainTab};
use crate::variables::PlannedCounts;

/// Render targets the controller writes to. Implementations must be cheap
/// and non-blocking apart from `confirm`.
pub trait View: Send + Sync + 'static {
    fn alert(&self, message: &str);

    fn confirm(&self, message: &str) -> bool;

    fn set_busy(&self, control: Control, busy: bool);

    fn switch_tab(&self, tab: MainTab, batch_panel_visible: bool);

    fn show_planned_counts(&self, counts: &PlannedCounts, iterations: u32);

    fn show_excel_preview(&self, preview: &ExcelPreview);

    fn show_single_result(&self, panel: &SinglePanel);

    /// Assertion list plus the overall banner; rendered after every execution.
    fn show_assertions(&self, block: &AssertionBlock);

    fn show_batch_results(&self, table: &BatchTable);

    fn show_history(&self, table: &HistoryTable);

    fn show_detail(&self, text: &str);
}
