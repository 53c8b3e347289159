// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for recording and remapping.

use crate::host::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a retiming session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetimeError {
    /// Fewer than two observations were recorded before stopping
    #[error("Not enough samples to remap: recorded {recorded}, need at least 2")]
    InsufficientSamples {
        /// Number of observations recorded
        recorded: usize,
    },

    /// The first mapped time lands before the session start ("too fast")
    #[error("Scrubbed too fast: first mapped frame {first_frame} is before start frame {start}")]
    UnstableStartBoundary {
        /// Rounded first mapped time, minus one
        first_frame: f64,
        /// Start of the playback range captured at session start
        start: f64,
    },

    /// No objects were selected when recording started
    #[error("No objects selected")]
    EmptySelection,

    /// Start pressed while a session is already recording
    #[error("A recording session is already active")]
    AlreadyRecording,

    /// Stop pressed while idle
    #[error("No recording session is active")]
    NotRecording,

    /// Host reported an unusable frame rate
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),
}

/// Result type for retiming operations
pub type Result<T> = std::result::Result<T, RetimeError>;

/// Errors reported by the host for a single object
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HostError {
    /// Object handle no longer resolves
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// Object curves are locked against editing
    #[error("Object is locked: {0}")]
    Locked(String),
}
