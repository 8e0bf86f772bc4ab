use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilestashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config ({0})")]
    InvalidConfig(String),

    #[error("source_dir does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
}

impl FilestashError {
    /// Process exit code for a failure that escaped a command.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound(_) | Self::InvalidConfig(_) | Self::SourceMissing(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilestashError>;
