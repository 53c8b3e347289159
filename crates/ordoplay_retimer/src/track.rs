// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation tracks (one curve per animated attribute).

use crate::host::{TimeChange, TimeWindow};
use crate::keyframe::{Keyframe, KeyframeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// An animation curve on an object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    #[serde(default)]
    pub id: TrackId,
    /// Animated attribute name (e.g. `translateX`)
    pub attribute: String,
    /// Keyframes, kept sorted by time
    pub keyframes: Vec<Keyframe>,
    /// Whether the curve is locked against edits
    #[serde(default)]
    pub locked: bool,
}

impl Track {
    /// Create a new track
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            attribute: attribute.into(),
            keyframes: Vec::new(),
            locked: false,
        }
    }

    /// Builder: add keyframes
    pub fn with_keyframes(mut self, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        self.keyframes.extend(keyframes);
        self.sort_keyframes();
        self
    }

    /// Add a keyframe
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
        self.sort_keyframes();
    }

    /// Remove a keyframe
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) {
        self.keyframes.retain(|k| k.id != keyframe_id);
    }

    /// Sort keyframes by time
    pub(crate) fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Time of the last keyframe
    pub fn last_key_time(&self) -> Option<f64> {
        self.keyframes.last().map(|k| k.time)
    }

    /// Time of the first keyframe
    pub fn first_key_time(&self) -> Option<f64> {
        self.keyframes.first().map(|k| k.time)
    }

    /// Get keyframes in a time window
    pub fn keyframes_in(&self, window: TimeWindow) -> Vec<&Keyframe> {
        self.keyframes
            .iter()
            .filter(|k| window.contains(k.time))
            .collect()
    }

    /// Move every key in `window` according to `change`.
    ///
    /// A moved key landing exactly on an untouched key replaces it, the way a
    /// host overwrites a key pasted on top of another. Returns the number of
    /// keys moved.
    pub fn change_times(&mut self, window: TimeWindow, change: TimeChange) -> usize {
        let (mut moved, stationary): (Vec<Keyframe>, Vec<Keyframe>) = self
            .keyframes
            .drain(..)
            .partition(|k| window.contains(k.time));

        for kf in &mut moved {
            kf.time = change.apply(kf.time);
        }

        let count = moved.len();
        self.keyframes = stationary
            .into_iter()
            .filter(|k| !moved.iter().any(|m| m.time == k.time))
            .collect();
        self.keyframes.extend(moved);
        self.sort_keyframes();
        count
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == keyframe_id)
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Key times in order
    pub fn key_times(&self) -> Vec<f64> {
        self.keyframes.iter().map(|k| k.time).collect()
    }
}
