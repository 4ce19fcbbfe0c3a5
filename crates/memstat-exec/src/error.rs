use thiserror::Error;

/// Result type local to memstat-exec.
pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("report output: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace parse: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid trace: {0}")]
    Invalid(String),

    #[error(transparent)]
    Core(#[from] memstat_core::Error),
}
