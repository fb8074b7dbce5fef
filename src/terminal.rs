//! Terminal rendering for the command-line front end.

use std::io::{BufRead, IsTerminal, Write};
use tracing::debug;

use crate::history::HistoryTable;
use crate::render::{AssertionBlock, BatchTable, ExcelPreview, SinglePanel};
use crate::state::{Control, MainTab};
use crate::variables::PlannedCounts;
use crate::view::View;

pub struct TerminalView {
    assume_yes: bool,
    /// Pass/fail colouring, only when stdout is a terminal.
    color: bool,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            color: std::io::stdout().is_terminal(),
        }
    }

    fn print(&self, text: &str) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl View for TerminalView {
    fn alert(&self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", message);
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "YES")
    }

    fn set_busy(&self, control: Control, busy: bool) {
        debug!("{:?} busy: {}", control, busy);
    }

    fn switch_tab(&self, tab: MainTab, batch_panel_visible: bool) {
        debug!("Tab {:?} (batch panel visible: {})", tab, batch_panel_visible);
    }

    fn show_planned_counts(&self, counts: &PlannedCounts, iterations: u32) {
        if let Some(total) = counts.total {
            self.print(&format!("Planned executions: {} (iterations {})\n", total, iterations));
        }
    }

    fn show_excel_preview(&self, preview: &ExcelPreview) {
        self.print(&preview.to_string());
    }

    fn show_single_result(&self, panel: &SinglePanel) {
        self.print(&panel.to_string());
    }

    fn show_assertions(&self, block: &AssertionBlock) {
        if self.color {
            self.print(&block.styled());
        } else {
            self.print(&block.to_string());
        }
    }

    fn show_batch_results(&self, table: &BatchTable) {
        if self.color {
            self.print(&table.styled());
        } else {
            self.print(&table.to_string());
        }
    }

    fn show_history(&self, table: &HistoryTable) {
        if self.color {
            self.print(&table.styled());
        } else {
            self.print(&table.to_string());
        }
    }

    fn show_detail(&self, text: &str) {
        self.print(text);
        self.print("\n");
    }
}
