use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::error::BenchError;
use crate::variables::{ActiveVariableSource, KvRow};

/// Drive a curl-execution backend: run templated curl commands, batch them
/// over variable sets or spreadsheet rows, and browse the history.
#[derive(Parser, Debug, Clone)]
#[command(name = "curlbench", version)]
pub struct CliArgs {
    /// Base URL of the execution backend
    #[arg(short = 'b', long = "backend", default_value = DEFAULT_BACKEND_URL, global = true)]
    pub backend: String,

    /// Answer "yes" to confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Execute the curl command once
    Run(ExecArgs),
    /// Execute the curl command once per variable set, iteration or spreadsheet row
    Batch(BatchArgs),
    /// Upload a spreadsheet and show its preview
    Upload {
        /// Path to an .xlsx/.xls file
        path: PathBuf,
    },
    /// List past executions
    History {
        /// Keep reloading the list until interrupted
        #[arg(short = 'w', long = "watch")]
        watch: bool,
    },
    /// Show one stored execution in detail
    Show {
        /// History entry id
        id: String,
    },
    /// Delete all stored executions
    Clear,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExecArgs {
    /// curl command template, or @FILE to read it from disk
    #[arg(short = 'c', long = "curl")]
    pub curl: String,

    /// Variables as JSON (object or array of objects), or @FILE
    #[arg(short = 'j', long = "vars-json")]
    pub vars_json: Option<String>,

    /// Variable as KEY=VALUE (repeatable)
    #[arg(short = 'k', long = "kv")]
    pub kv: Vec<String>,

    /// Assertion expression evaluated by the backend (repeatable)
    #[arg(short = 'a', long = "assert")]
    pub assertions: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub exec: ExecArgs,

    /// Variable source to execute with
    #[arg(short = 's', long = "source", value_enum)]
    pub source: Option<SourceArg>,

    /// Spreadsheet to upload and execute row by row
    #[arg(short = 'x', long = "excel")]
    pub excel: Option<PathBuf>,

    /// Iteration count (also caps spreadsheet rows)
    #[arg(short = 'n', long = "iterations", allow_hyphen_values = true)]
    pub iterations: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    Json,
    Kv,
    Excel,
}

impl From<SourceArg> for ActiveVariableSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Json => ActiveVariableSource::Json,
            SourceArg::Kv => ActiveVariableSource::Kv,
            SourceArg::Excel => ActiveVariableSource::Excel,
        }
    }
}

pub struct ClientConfig {
    pub backend_url: url::Url,
    pub assume_yes: bool,
    pub refresh_interval_secs: u64,
}

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

// Endpoint paths
pub const UPLOAD_EXCEL_PATH: &str = "/upload_excel";
pub const EXECUTE_CURL_PATH: &str = "/execute_curl";
pub const EXECUTE_BATCH_PATH: &str = "/execute_batch";
pub const CLEAR_RESULTS_PATH: &str = "/clear_results";
pub const GET_RESULTS_PATH: &str = "/get_results";
pub const GET_RESULT_PATH: &str = "/get_result";

// History constants
pub const HISTORY_REFRESH_INTERVAL_SECS: u64 = 3;

// Form constants
pub const MIN_ITERATIONS: u32 = 1;
pub const EXCEL_PREVIEW_ROWS: usize = 5;

impl ClientConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self, BenchError> {
        let backend_url = url::Url::parse(&args.backend)
            .map_err(|e| BenchError::Config(format!("invalid backend URL {:?}: {}", args.backend, e)))?;

        Ok(ClientConfig {
            backend_url,
            assume_yes: args.assume_yes,
            refresh_interval_secs: HISTORY_REFRESH_INTERVAL_SECS,
        })
    }
}

/// Resolve an argument that is either literal text or `@path`.
pub fn read_arg_or_file(value: &str) -> Result<String, BenchError> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .map_err(|e| BenchError::Config(format!("cannot read {}: {}", path, e))),
        None => Ok(value.to_string()),
    }
}

/// Parse `KEY=VALUE`. A missing `=` yields an empty value.
pub fn parse_kv_arg(raw: &str) -> KvRow {
    match raw.split_once('=') {
        Some((key, value)) => KvRow::new(key, value),
        None => KvRow::new(raw, ""),
    }
}

impl BatchArgs {
    /// Source implied by the flags when `--source` is not given.
    pub fn effective_source(&self) -> ActiveVariableSource {
        if let Some(source) = self.source {
            return source.into();
        }
        if self.excel.is_some() {
            ActiveVariableSource::Excel
        } else if !self.exec.kv.is_empty() && self.exec.vars_json.is_none() {
            ActiveVariableSource::Kv
        } else {
            ActiveVariableSource::Json
        }
    }
}
