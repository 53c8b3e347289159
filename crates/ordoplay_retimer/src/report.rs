// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outcome of a remap pass.

use crate::error::HostError;
use crate::host::ObjectId;
use serde::{Deserialize, Serialize};

/// Stage of the remap pass in which an object failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemapStage {
    /// Querying the object's last key
    Query,
    /// Shifting keys past the recorded span forward, before remapping
    ShiftBefore,
    /// Parking the recorded span out of the way before remapping
    Park,
    /// Remapping recorded frames
    Remap,
    /// Pulling keys past the recorded span back, after remapping
    ShiftAfter,
}

/// A host failure on one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectFailure {
    /// Failing object
    pub object: ObjectId,
    /// Where it failed
    pub stage: RemapStage,
    /// Host error
    pub error: HostError,
}

/// Relocation of the keys that lie past the recorded span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailShift {
    /// Last recorded original frame
    pub after: f64,
    /// Last key across all target objects
    pub through: f64,
    /// Offset applied
    pub delta: f64,
    /// Keys moved
    pub keys_moved: usize,
}

/// Everything a remap pass did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemapReport {
    /// Objects retimed
    pub objects: Vec<ObjectId>,
    /// Dense mapping rows processed
    pub frames_processed: usize,
    /// Keys parked before remapping
    pub keys_parked: usize,
    /// Keys moved to their performed time
    pub keys_moved: usize,
    /// Target times written, in processing order
    pub targets: Vec<f64>,
    /// Tail relocation, if any
    pub tail_shift: Option<TailShift>,
    /// New playback range end, if it had to grow
    pub extended_playback_to: Option<f64>,
    /// Per-object failures
    pub failures: Vec<ObjectFailure>,
}

impl RemapReport {
    /// Create an empty report for a set of objects
    pub fn new(objects: Vec<ObjectId>) -> Self {
        Self {
            objects,
            ..Self::default()
        }
    }

    /// Record a failure
    pub fn fail(&mut self, object: ObjectId, stage: RemapStage, error: HostError) {
        tracing::warn!(?object, ?stage, "Keyframe edit failed: {error}");
        self.failures.push(ObjectFailure { object, stage, error });
    }

    /// Whether an object has already failed in this pass
    pub fn has_failed(&self, object: ObjectId) -> bool {
        self.failures.iter().any(|f| f.object == object)
    }

    /// Objects still eligible for edits
    pub fn healthy_objects(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .copied()
            .filter(|o| !self.has_failed(*o))
            .collect()
    }

    /// Whether every object was retimed without error
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
