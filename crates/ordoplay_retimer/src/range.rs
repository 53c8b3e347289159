// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handling of keys past the recorded span.
//!
//! Only keys up to the last recorded frame get remapped. Everything after it
//! keeps its relative spacing but has to follow the new end of the performed
//! section: pushed out of the way before the remap when the performance ran
//! long, pulled back after the remap when it ran short.

use crate::host::{AnimationHost, ObjectId, PlaybackRange, TimeChange, TimeWindow};
use crate::report::{RemapReport, RemapStage, TailShift};

/// When the tail has to move relative to the remap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustPhase {
    /// Performance is longer than the original: make room first
    BeforeRemap,
    /// Performance is shorter: close the gap afterwards
    AfterRemap,
}

/// Tail relocation computed from the recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeAdjuster {
    /// Last recorded original frame
    pub last_dict_key: f64,
    /// Last key across all target objects
    pub last_key: f64,
    /// Performed minus original length of the recorded span
    pub move_val: f64,
}

impl RangeAdjuster {
    /// Compute from the last recorded sample and the last key in the scene
    pub fn new(last_dict_key: f64, last_mapped_time: f64, last_key: f64) -> Self {
        Self {
            last_dict_key,
            last_key,
            move_val: last_mapped_time - last_dict_key,
        }
    }

    /// When the tail needs to move, if at all
    pub fn phase(&self) -> Option<AdjustPhase> {
        if self.move_val > 0.0 {
            Some(AdjustPhase::BeforeRemap)
        } else if self.move_val < 0.0 {
            Some(AdjustPhase::AfterRemap)
        } else {
            None
        }
    }

    /// Keys strictly after the recorded span, up to the last key
    pub fn window(&self) -> TimeWindow {
        TimeWindow::after(self.last_dict_key, self.last_key)
    }

    /// Shift the tail if `phase` is the phase this adjuster runs in
    pub fn run<H>(&self, host: &mut H, phase: AdjustPhase, report: &mut RemapReport)
    where
        H: AnimationHost + ?Sized,
    {
        if self.phase() != Some(phase) {
            return;
        }

        let stage = match phase {
            AdjustPhase::BeforeRemap => RemapStage::ShiftBefore,
            AdjustPhase::AfterRemap => RemapStage::ShiftAfter,
        };
        let keys_moved = shift_keys(host, self.window(), self.move_val, stage, report);

        tracing::debug!(
            after = self.last_dict_key,
            through = self.last_key,
            delta = self.move_val,
            keys_moved,
            ?phase,
            "Shifted keys past the recorded span"
        );
        report.tail_shift = Some(TailShift {
            after: self.last_dict_key,
            through: self.last_key,
            delta: self.move_val,
            keys_moved,
        });
    }
}

/// Offset every key of the report's healthy objects found in `window`
pub fn shift_keys<H>(
    host: &mut H,
    window: TimeWindow,
    delta: f64,
    stage: RemapStage,
    report: &mut RemapReport,
) -> usize
where
    H: AnimationHost + ?Sized,
{
    let mut moved = 0;
    for object in report.healthy_objects() {
        match host.change_key_times(object, window, TimeChange::Relative(delta)) {
            Ok(n) => moved += n,
            Err(e) => report.fail(object, stage, e),
        }
    }
    moved
}

/// Last key across `report.objects`, recording objects the host cannot query
pub fn last_key_time<H>(host: &H, report: &mut RemapReport) -> Option<f64>
where
    H: AnimationHost + ?Sized,
{
    let objects: Vec<ObjectId> = report.objects.clone();
    let mut last: Option<f64> = None;
    for object in objects {
        match host.last_keyframe_time(object) {
            Ok(Some(t)) => last = Some(last.map_or(t, |l| l.max(t))),
            Ok(None) => {}
            Err(e) => report.fail(object, RemapStage::Query, e),
        }
    }
    last
}

/// Grow the playback range so `last_mapped_time` stays visible.
///
/// Returns the new end if the range changed.
pub fn extend_playback_range<H>(host: &mut H, last_mapped_time: f64) -> Option<f64>
where
    H: AnimationHost + ?Sized,
{
    let range = host.playback_range();
    if last_mapped_time <= range.max {
        return None;
    }
    host.set_playback_range(PlaybackRange::new(range.min, last_mapped_time));
    tracing::info!(from = range.max, to = last_mapped_time, "Extended playback range");
    Some(last_mapped_time)
}
