//! Error types for bulk cloning.

use crate::pipeline::RunReport;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for listing and cloning operations.
#[derive(Error, Debug)]
pub enum BulkCloneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("GitHub API error: {message}")]
    GitHub { message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to create clone directory {path}: {source}")]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Clone failed for {repo}: {message}")]
    CloneError { repo: String, message: String },

    #[error("Run aborted ({report})")]
    Aborted {
        source: Box<BulkCloneError>,
        report: RunReport,
    },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

impl BulkCloneError {
    /// Process exit code for this error. Every failure in the pipeline is fatal.
    pub fn exit_code(&self) -> u8 {
        2
    }

    /// Tally of what was done before the run stopped, if it got that far.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// A specialized Result type for bulk clone operations.
pub type Result<T> = std::result::Result<T, BulkCloneError>;
