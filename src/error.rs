#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("Please enter a curl command")]
    EmptyCurlCommand,

    #[error("Invalid JSON variables: {0}")]
    InvalidVariablesJson(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected response: expected a {0} result")]
    UnexpectedShape(&'static str),

    #[error("No batch row {0}")]
    UnknownRow(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BenchError {
    /// Alert text for a failed operation, e.g. "Execution failed: ..." for
    /// backend-reported errors and "Execution error: ..." for everything the
    /// client raised itself.
    pub fn alert_text(&self, operation: &str) -> String {
        match self {
            BenchError::EmptyCurlCommand
            | BenchError::InvalidVariablesJson(_)
            | BenchError::UnknownRow(_) => self.to_string(),
            BenchError::Backend(msg) => format!("{} failed: {}", operation, msg),
            other => format!("{} error: {}", operation, other),
        }
    }

    /// Local validation errors never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BenchError::EmptyCurlCommand | BenchError::InvalidVariablesJson(_)
        )
    }
}
