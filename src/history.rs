use chrono::{DateTime, Local, TimeZone};
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::BenchError;
use crate::model::HistoryEntry;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryOutcome {
    Passed,
    Failed,
    Composite {
        success: u64,
        failure: u64,
        total: u64,
    },
    Unknown,
}

impl HistoryOutcome {
    /// Explicit success wins; batches without one show their counts.
    pub fn of(entry: &HistoryEntry) -> Self {
        match entry.success {
            Some(true) => HistoryOutcome::Passed,
            Some(false) => HistoryOutcome::Failed,
            None => match entry.total_rows {
                Some(total) if total > 0 => HistoryOutcome::Composite {
                    success: entry.success_count.unwrap_or(0),
                    failure: entry.failure_count.unwrap_or(0),
                    total,
                },
                _ => HistoryOutcome::Unknown,
            },
        }
    }
}

impl fmt::Display for HistoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryOutcome::Passed => write!(f, "success"),
            HistoryOutcome::Failed => write!(f, "failure"),
            HistoryOutcome::Composite {
                success,
                failure,
                total,
            } => write!(f, "{}/{}/{}", success, failure, total),
            HistoryOutcome::Unknown => write!(f, "unknown"),
        }
    }
}

impl HistoryOutcome {
    /// Terminal cell: success counts green, failure counts red.
    pub fn styled(&self) -> String {
        match self {
            HistoryOutcome::Passed => "success".green().to_string(),
            HistoryOutcome::Failed => "failure".red().to_string(),
            HistoryOutcome::Composite {
                success,
                failure,
                total,
            } => format!(
                "{}/{}/{}",
                success.to_string().green(),
                failure.to_string().red(),
                total
            ),
            HistoryOutcome::Unknown => "unknown".dimmed().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub time: String,
    pub kind: &'static str,
    pub outcome: HistoryOutcome,
}

impl HistoryRow {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self::from_entry_in(entry, &Local)
    }

    pub fn from_entry_in<Tz>(entry: &HistoryEntry, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            id: entry.id.clone(),
            time: entry
                .timestamp
                .map(|ts| format_timestamp_in(ts, tz))
                .unwrap_or_default(),
            kind: if entry.is_batch { "batch" } else { "single" },
            outcome: HistoryOutcome::of(entry),
        }
    }
}

/// Epoch seconds (fractional) as `YYYY-MM-DD HH:MM:SS` in `tz`.
pub fn format_timestamp_in<Tz>(epoch_secs: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let secs = epoch_secs.trunc() as i64;
    let nanos = ((epoch_secs.fract() * 1e9) as u32).min(999_999_999);
    match DateTime::from_timestamp(secs, nanos) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_secs.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryTable {
    pub rows: Vec<HistoryRow>,
}

impl HistoryTable {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        Self {
            rows: entries.iter().map(HistoryRow::from_entry).collect(),
        }
    }
}

impl HistoryTable {
    /// Same layout as `Display` with coloured outcome cells.
    pub fn styled(&self) -> String {
        self.layout(HistoryOutcome::styled)
    }

    fn layout(&self, outcome: impl Fn(&HistoryOutcome) -> String) -> String {
        let mut out = format!("{:<28}  {:<19}  {:<6}  RESULT\n", "ID", "TIME", "KIND");
        for row in &self.rows {
            out.push_str(&format!(
                "{:<28}  {:<19}  {:<6}  {}\n",
                row.id,
                row.time,
                row.kind,
                outcome(&row.outcome)
            ));
        }
        if self.rows.is_empty() {
            out.push_str("(no history)\n");
        }
        out
    }
}

impl fmt::Display for HistoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.layout(|outcome| outcome.to_string()))
    }
}

/// Fetch the history list and render it. Failures are alerted and returned.
pub async fn load_history<B, V>(backend: &B, view: &V) -> Result<HistoryTable, BenchError>
where
    B: Backend + ?Sized,
    V: View + ?Sized,
{
    match backend.get_results().await {
        Ok(entries) => {
            let table = HistoryTable::from_entries(&entries);
            view.show_history(&table);
            Ok(table)
        }
        Err(e) => {
            warn!("Failed to load history: {}", e);
            view.alert(&e.alert_text("Load history"));
            Err(e)
        }
    }
}

/// Ask for confirmation, clear, then reload. Returns `Ok(false)` when the
/// user declined.
pub async fn clear_history<B, V>(backend: &B, view: &V) -> Result<bool, BenchError>
where
    B: Backend + ?Sized,
    V: View + ?Sized,
{
    if !view.confirm("Clear all history records?") {
        return Ok(false);
    }
    if let Err(e) = backend.clear_results().await {
        warn!("Failed to clear history: {}", e);
        view.alert(&e.alert_text("Clear history"));
        return Err(e);
    }
    info!("History cleared");
    load_history(backend, view).await?;
    Ok(true)
}

/// Periodic history reload. At most one timer runs at a time.
pub struct AutoRefresh {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start reloading every period, first reload one period from now.
    /// Returns `false` when already running.
    pub fn start<B, V>(&mut self, backend: Arc<B>, view: Arc<V>) -> bool
    where
        B: Backend + ?Sized,
        V: View + ?Sized,
    {
        if self.handle.is_some() {
            return false;
        }
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // A slow reload pushes the next one back instead of bunching ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Auto-refreshing history");
                let _ = load_history(backend.as_ref(), view.as_ref()).await;
            }
        }));
        info!("History auto-refresh started ({:?})", period);
        true
    }

    /// Returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                info!("History auto-refresh stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
