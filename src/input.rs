use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::core::{LogBatch, LogRecord};

/// Path argument that selects stdin.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("The file {} does not exist.", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The input file contains invalid JSON.")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Log entry {index} is not an object")]
    MalformedRecord { index: usize },
}

impl InputError {
    /// Short error category reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::NotFound(_) => "File not found",
            InputError::InvalidJson(_) => "Invalid JSON",
            InputError::Io { .. } | InputError::MalformedRecord { .. } => "Analysis failed",
        }
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            error: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Wire shape of an input failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: &'static str,
    pub message: String,
}

/// Decode a JSON document into a batch.
///
/// Returns `Ok(None)` when the document carries no scorable entries: the top
/// level is not an object, or `logs` is missing, not an array, or empty.
pub fn parse_document(text: &str) -> Result<Option<LogBatch>, InputError> {
    let document: Value = serde_json::from_str(text)?;
    let Some(Value::Array(entries)) = document.get("logs") else {
        return Ok(None);
    };
    if entries.is_empty() {
        return Ok(None);
    }

    let mut batch = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(InputError::MalformedRecord { index });
        }
        let record = LogRecord::deserialize(entry).map_err(InputError::InvalidJson)?;
        batch.push(record);
    }
    Ok(Some(batch))
}

pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Number of input arguments that read stdin. Stdin can only be consumed once.
pub fn stdin_inputs(paths: &[PathBuf]) -> usize {
    paths.iter().filter(|p| is_stdin(p)).count()
}

/// Read and decode a document from `path`, or from stdin for `-`.
pub async fn load(path: &Path) -> Result<Option<LogBatch>, InputError> {
    let text = if is_stdin(path) {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        text
    } else {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InputError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(InputError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    };
    parse_document(&text)
}
