// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rewriting keyframe times through a dense mapping.
//!
//! Keys are moved last frame first, all objects in lockstep, so with snapping
//! on the later original frame wins when two targets round to the same frame.

use crate::dense::DenseMapping;
use crate::error::{Result, RetimeError};
use crate::host::{AnimationHost, TimeChange, TimeWindow};
use crate::range::shift_keys;
use crate::report::{RemapReport, RemapStage};

/// A planned key move: everything in `[frame, frame + 1)` goes to `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMove {
    /// Original integer frame
    pub frame: i64,
    /// Performed time before snapping
    pub time: f64,
    /// Time the keys are moved to
    pub target: f64,
}

/// Applies a [`DenseMapping`] to the keys of a set of objects
#[derive(Debug, Clone, Copy)]
pub struct KeyRemapper {
    /// Start of the playback range captured with the session
    pub start_frame: f64,
    /// Round targets to whole frames
    pub snap_keys: bool,
}

impl KeyRemapper {
    /// Create a remapper
    pub fn new(start_frame: f64, snap_keys: bool) -> Self {
        Self {
            start_frame,
            snap_keys,
        }
    }

    /// Reject mappings whose first target lands before the range start.
    ///
    /// That happens when the scrub outran the frame hook right after the
    /// rewind, so the start of the mapping cannot be trusted.
    pub fn check_start_boundary(&self, mapping: &DenseMapping) -> Result<()> {
        let Some(first) = mapping.first() else {
            return Err(RetimeError::InsufficientSamples { recorded: 0 });
        };

        let first_frame = first.time.round() - 1.0;
        if first_frame < self.start_frame {
            tracing::warn!(
                first_frame,
                start = self.start_frame,
                "Scrubbed too fast, nothing remapped"
            );
            return Err(RetimeError::UnstableStartBoundary {
                first_frame,
                start: self.start_frame,
            });
        }
        Ok(())
    }

    /// Moves in processing order (descending original frame).
    ///
    /// Every integer frame from the first to the last mapped frame gets a
    /// move, including frames the mapping dropped as duplicates, so no key
    /// of the recorded span is left behind.
    ///
    /// With snapping on, a target that does not land strictly below the
    /// previous one is pushed to one frame below it, so the earlier processed
    /// (later original) frame keeps the contested slot.
    pub fn plan(&self, mapping: &DenseMapping) -> Vec<PlannedMove> {
        let (Some(first), Some(last)) = (mapping.first(), mapping.last()) else {
            return Vec::new();
        };
        let mut last_snapped: Option<f64> = None;

        (first.frame..=last.frame)
            .rev()
            .filter_map(|frame| mapping.time_at(frame).map(|time| (frame, time)))
            .map(|(frame, time)| {
                let mut target = time;
                if self.snap_keys {
                    target = target.round();
                    if let Some(previous) = last_snapped {
                        if target >= previous {
                            target = previous - 1.0;
                        }
                    }
                    last_snapped = Some(target);
                }
                PlannedMove {
                    frame,
                    time,
                    target,
                }
            })
            .collect()
    }

    /// Move the keys of every object in `report.objects`.
    ///
    /// Keys of the recorded span are first parked past everything else in the
    /// scene, then moved to their targets frame by frame. A performance that
    /// ran faster than the original sends keys to frames that have not been
    /// processed yet, and parking keeps those from being picked up twice.
    ///
    /// Objects that fail are recorded in the report and skipped for the rest
    /// of the pass; the others keep going.
    pub fn apply<H>(
        &self,
        host: &mut H,
        mapping: &DenseMapping,
        report: &mut RemapReport,
    ) -> Result<()>
    where
        H: AnimationHost + ?Sized,
    {
        self.check_start_boundary(mapping)?;
        let (Some(first), Some(last)) = (mapping.first(), mapping.last()) else {
            return Ok(());
        };

        let plan = self.plan(mapping);
        let offset = parking_offset(host, report, first.frame, last.frame, &plan);
        let span = TimeWindow::half_open(first.frame as f64, (last.frame + 1) as f64);
        let parked = shift_keys(host, span, offset as f64, RemapStage::Park, report);
        report.keys_parked = parked;

        let objects = report.objects.clone();
        for planned in plan {
            let window = TimeWindow::frame(planned.frame + offset);
            for &object in &objects {
                if report.has_failed(object) {
                    continue;
                }
                match host.change_key_times(object, window, TimeChange::Absolute(planned.target)) {
                    Ok(moved) => report.keys_moved += moved,
                    Err(e) => report.fail(object, RemapStage::Remap, e),
                }
            }
            report.targets.push(planned.target);
            report.frames_processed += 1;
        }

        tracing::debug!(
            frames = report.frames_processed,
            parked = report.keys_parked,
            keys = report.keys_moved,
            snap = self.snap_keys,
            "Remapped keys"
        );
        Ok(())
    }
}

/// Whole-frame offset that moves `[first, last + 1)` past every key and target
fn parking_offset<H>(
    host: &H,
    report: &mut RemapReport,
    first: i64,
    last: i64,
    plan: &[PlannedMove],
) -> i64
where
    H: AnimationHost + ?Sized,
{
    let mut end = (last + 1) as f64;
    for planned in plan {
        end = end.max(planned.target);
    }
    for object in report.healthy_objects() {
        match host.last_keyframe_time(object) {
            Ok(Some(t)) => end = end.max(t),
            Ok(None) => {}
            Err(e) => report.fail(object, RemapStage::Park, e),
        }
    }
    (end - first as f64).ceil() as i64 + 1
}
