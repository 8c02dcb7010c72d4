// ShotSync Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Every failure is terminal for the run that hit it. The CLI turns these
// into a logged error line and a failure exit.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Project file not found: {0:?}")]
    ProjectNotFound(PathBuf),

    #[error("Project document has no '{0}' section")]
    MissingSection(&'static str),

    #[error("Malformed record in '{section}' at index {index}: {reason}")]
    MalformedRecord {
        section: &'static str,
        index: usize,
        reason: String,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup not found: {0:?}")]
    BackupNotFound(PathBuf),

    #[error("Backup {backup:?} does not match the original content (expected {expected}, got {actual})")]
    BackupMismatch {
        backup: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Structural mismatch after write: {segments} voice segments vs {mappings} shot-image mappings")]
    ParityMismatch { segments: usize, mappings: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReconcileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
