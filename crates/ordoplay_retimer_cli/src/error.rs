// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the command line front-end.

use ordoplay_retimer::RetimeError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that makes the binary exit with a failure
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed
    #[error("{path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A performance file could not be parsed
    #[error("Invalid performance file {path}: {source}")]
    Ron {
        /// File involved
        path: PathBuf,
        /// Parse error with position
        #[source]
        source: ron::error::SpannedError,
    },

    /// The report could not be encoded
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    /// The performance holds an unusable observation
    #[error("Invalid observation #{index}: {reason}")]
    InvalidObservation {
        /// Position in the performance file
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// `--object` named something the scene does not have
    #[error("No object named '{0}' in scene")]
    UnknownObject(String),

    /// The retimer refused or aborted the session
    #[error(transparent)]
    Retime(#[from] RetimeError),
}

impl CliError {
    /// Attach a path to an IO error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
