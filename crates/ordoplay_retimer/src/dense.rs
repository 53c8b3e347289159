// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dense per-frame retiming table built from sparse recorded samples.
//!
//! The host rarely gets to call the frame hook on every frame while the artist
//! scrubs, especially in heavy scenes. Each gap between two consecutive samples
//! is filled with one entry per integer frame, linearly interpolated.

use crate::error::{Result, RetimeError};
use crate::keyframe::Interpolation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of the dense mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappedFrame {
    /// Original (integer) frame
    pub frame: i64,
    /// Performed time, in frames
    pub time: f64,
}

/// Per-frame mapping from original frame to performed time, ascending in frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenseMapping {
    entries: Vec<MappedFrame>,
}

impl DenseMapping {
    /// Build from aligned sample sequences (original frames, normalized times)
    pub fn build(frames: &[f64], times: &[f64]) -> Result<Self> {
        let recorded = frames.len().min(times.len());
        if recorded < 2 {
            return Err(RetimeError::InsufficientSamples { recorded });
        }

        let filled: Vec<MappedFrame> = frames
            .windows(2)
            .zip(times.windows(2))
            .flat_map(|(k, t)| fill_segment(k[0], t[0], k[1], t[1]))
            .collect();

        let entries = dedup(&filled);
        tracing::debug!(
            samples = recorded,
            filled = filled.len(),
            entries = entries.len(),
            "Built dense mapping"
        );
        Ok(Self { entries })
    }

    /// Wrap already-dense entries
    pub fn from_entries(entries: Vec<MappedFrame>) -> Self {
        Self { entries }
    }

    /// Entries in ascending frame order
    pub fn entries(&self) -> &[MappedFrame] {
        &self.entries
    }

    /// First entry
    pub fn first(&self) -> Option<&MappedFrame> {
        self.entries.first()
    }

    /// Last entry
    pub fn last(&self) -> Option<&MappedFrame> {
        self.entries.last()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in processing order (descending frame)
    pub fn iter_descending(&self) -> impl Iterator<Item = &MappedFrame> {
        self.entries.iter().rev()
    }

    /// Performed time for any integer frame between the first and last entry.
    ///
    /// Frames dropped by [`dedup`] (samples sharing a clock reading) are
    /// interpolated between their surviving neighbours.
    pub fn time_at(&self, frame: i64) -> Option<f64> {
        match self.entries.binary_search_by_key(&frame, |e| e.frame) {
            Ok(i) => Some(self.entries[i].time),
            Err(i) if i == 0 || i == self.entries.len() => None,
            Err(i) => {
                let (a, b) = (self.entries[i - 1], self.entries[i]);
                Some(Interpolation::remap(
                    frame as f64,
                    a.frame as f64,
                    b.frame as f64,
                    a.time,
                    b.time,
                ))
            }
        }
    }

    /// Frame axis
    pub fn frames(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.frame).collect()
    }

    /// Time axis
    pub fn times(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.time).collect()
    }
}

/// Fill one segment between samples `(k1, t1)` and `(k2, t2)`.
///
/// Yields every integer frame in `[floor(k1), floor(k2)]`. Times at `k1` and
/// `k2` come out as exactly `t1` and `t2`.
pub fn fill_segment(k1: f64, t1: f64, k2: f64, t2: f64) -> Vec<MappedFrame> {
    let first = k1.floor() as i64;
    let last = k2.floor() as i64;

    (first..=last)
        .map(|frame| MappedFrame {
            frame,
            time: Interpolation::remap(frame as f64, k1, k2, t1, t2),
        })
        .collect()
}

/// Drop entries whose frame or time was already seen, keeping first occurrences
pub fn dedup(entries: &[MappedFrame]) -> Vec<MappedFrame> {
    let mut frames = HashSet::with_capacity(entries.len());
    let mut times = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if frames.contains(&entry.frame) || times.contains(&time_bits(entry.time)) {
            continue;
        }
        frames.insert(entry.frame);
        times.insert(time_bits(entry.time));
        out.push(*entry);
    }
    out
}

// -0.0 and 0.0 compare equal, so they must hash equal
fn time_bits(time: f64) -> u64 {
    if time == 0.0 {
        0
    } else {
        time.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_covers_integer_frames() {
        let seg = fill_segment(1.0, 0.0, 5.0, 3.9);
        assert_eq!(seg.len(), 5);
        assert_eq!(seg.first().map(|e| e.time), Some(0.0));
        assert_eq!(seg.last().map(|e| e.time), Some(3.9));
        assert!(seg.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_segment_with_equal_frames() {
        let seg = fill_segment(4.0, 2.0, 4.0, 6.0);
        assert_eq!(seg, vec![MappedFrame { frame: 4, time: 2.0 }]);
    }

    #[test]
    fn test_fractional_frames_floor() {
        let seg = fill_segment(2.5, 10.0, 5.5, 16.0);
        assert_eq!(seg.iter().map(|e| e.frame).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        // frame 2 sits before k1, extrapolated along the segment
        assert!((seg[0].time - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_three_samples() {
        let mapping = DenseMapping::build(&[1.0, 5.0, 10.0], &[0.0, 3.9, 10.2]).unwrap();
        assert_eq!(mapping.len(), 10);
        assert_eq!(mapping.frames(), (1..=10).collect::<Vec<_>>());
        let times = mapping.times();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times[4], 3.9);
        assert_eq!(times[9], 10.2);
    }

    #[test]
    fn test_single_sample_is_insufficient() {
        assert_eq!(
            DenseMapping::build(&[3.0], &[1.0]),
            Err(RetimeError::InsufficientSamples { recorded: 1 })
        );
    }

    #[test]
    fn test_dedup_keeps_axes_aligned() {
        let entries = vec![
            MappedFrame { frame: 1, time: 0.0 },
            MappedFrame { frame: 2, time: 1.0 },
            MappedFrame { frame: 2, time: 1.5 },
            MappedFrame { frame: 3, time: 1.0 },
            MappedFrame { frame: 4, time: 2.0 },
        ];
        let out = dedup(&entries);
        assert_eq!(out.iter().map(|e| e.frame).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(out.iter().map(|e| e.time).collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
        assert_eq!(dedup(&out), out);
    }

    #[test]
    fn test_flat_segment_collapses() {
        // Two samples stamped with the same clock reading
        let mapping = DenseMapping::build(&[1.0, 4.0], &[2.0, 2.0]).unwrap();
        assert_eq!(mapping.entries(), &[MappedFrame { frame: 1, time: 2.0 }]);
    }

    #[test]
    fn test_time_at_fills_dropped_frames() {
        let mapping = DenseMapping::build(&[2.0, 4.0, 8.0], &[3.0, 3.0, 12.0]).unwrap();
        assert_eq!(mapping.frames(), vec![2, 5, 6, 7, 8]);

        assert_eq!(mapping.time_at(2), Some(3.0));
        assert_eq!(mapping.time_at(5), Some(5.25));
        let (t3, t4) = (mapping.time_at(3).unwrap(), mapping.time_at(4).unwrap());
        assert!(3.0 < t3 && t3 < t4 && t4 < 5.25);
        assert_eq!(mapping.time_at(1), None);
        assert_eq!(mapping.time_at(9), None);
    }
}
