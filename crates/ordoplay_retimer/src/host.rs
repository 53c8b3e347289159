// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capabilities the retimer consumes from the animation host.
//!
//! The retimer never owns scene data. Everything it needs (playback control,
//! selection, key queries and key time edits, the per-frame hook) goes through
//! [`AnimationHost`], so the same algorithm runs against a live host binding or
//! the in-memory [`SceneHost`](crate::scene::SceneHost).

use crate::error::HostError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Handle to an animatable object in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback range of the host timeline, in frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRange {
    /// First frame
    pub min: f64,
    /// Last frame
    pub max: f64,
}

impl PlaybackRange {
    /// Create a new range
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for PlaybackRange {
    fn default() -> Self {
        Self::new(1.0, 120.0)
    }
}

/// A window on the timeline selecting keys by time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    /// Lower bound
    pub start: Bound<f64>,
    /// Upper bound
    pub end: Bound<f64>,
}

impl TimeWindow {
    /// `[start, end)`
    pub fn half_open(start: f64, end: f64) -> Self {
        Self {
            start: Bound::Included(start),
            end: Bound::Excluded(end),
        }
    }

    /// `(start, end]`, everything strictly after `start` up to and including `end`
    pub fn after(start: f64, end: f64) -> Self {
        Self {
            start: Bound::Excluded(start),
            end: Bound::Included(end),
        }
    }

    /// The one-frame window `[frame, frame + 1)`
    pub fn frame(frame: i64) -> Self {
        let start = frame as f64;
        Self::half_open(start, start + 1.0)
    }

    /// Check whether a time falls inside the window
    pub fn contains(&self, time: f64) -> bool {
        let above = match self.start {
            Bound::Included(s) => time >= s,
            Bound::Excluded(s) => time > s,
            Bound::Unbounded => true,
        };
        let below = match self.end {
            Bound::Included(e) => time <= e,
            Bound::Excluded(e) => time < e,
            Bound::Unbounded => true,
        };
        above && below
    }
}

/// How keys found in a window are moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeChange {
    /// Move every key in the window to this time
    Absolute(f64),
    /// Offset every key in the window by this delta
    Relative(f64),
}

impl TimeChange {
    /// Apply the change to a single key time
    pub fn apply(&self, time: f64) -> f64 {
        match self {
            TimeChange::Absolute(target) => *target,
            TimeChange::Relative(delta) => time + delta,
        }
    }
}

/// Callback fired by the host with the new frame whenever playback time changes
pub type FrameHook = Box<dyn FnMut(f64) + Send>;

/// Host animation application
pub trait AnimationHost {
    /// Current playback frame
    fn current_frame(&self) -> f64;

    /// Move the playback head. Fires the armed frame hook if the frame changed.
    fn set_current_frame(&mut self, frame: f64);

    /// Playback range
    fn playback_range(&self) -> PlaybackRange;

    /// Replace the playback range
    fn set_playback_range(&mut self, range: PlaybackRange);

    /// Pause playback
    fn pause(&mut self);

    /// Resume playback
    fn resume(&mut self);

    /// Currently selected animatable objects
    fn selection(&self) -> Vec<ObjectId>;

    /// Host frame rate in frames per second
    fn frames_per_second(&self) -> f64;

    /// Install the per-frame hook, replacing any previous one
    fn arm_frame_hook(&mut self, hook: FrameHook);

    /// Remove the per-frame hook
    fn disarm_frame_hook(&mut self);

    /// Time of the last key across all of an object's curves
    fn last_keyframe_time(&self, object: ObjectId) -> Result<Option<f64>, HostError>;

    /// Move every key of `object` found in `window`. Returns the number of keys moved.
    fn change_key_times(
        &mut self,
        object: ObjectId,
        window: TimeWindow,
        change: TimeChange,
    ) -> Result<usize, HostError>;
}

/// Wall-clock source used to timestamp observations, in seconds
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary fixed origin
    fn now(&self) -> f64;
}

/// Monotonic clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock driven by hand, for replaying recorded performances and tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Create a clock at zero seconds
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time
    pub fn set(&self, seconds: f64) {
        *self.seconds.lock() = seconds;
    }

    /// Advance by a delta
    pub fn advance(&self, seconds: f64) {
        *self.seconds.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.seconds.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_window_is_half_open() {
        let window = TimeWindow::frame(5);
        assert!(window.contains(5.0));
        assert!(window.contains(5.999));
        assert!(!window.contains(6.0));
        assert!(!window.contains(4.999));
    }

    #[test]
    fn test_after_window_excludes_start() {
        let window = TimeWindow::after(10.0, 20.0);
        assert!(!window.contains(10.0));
        assert!(window.contains(10.5));
        assert!(window.contains(20.0));
        assert!(!window.contains(20.5));
    }

    #[test]
    fn test_time_change_apply() {
        assert_eq!(TimeChange::Absolute(3.0).apply(10.0), 3.0);
        assert_eq!(TimeChange::Relative(-2.5).apply(10.0), 7.5);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.set(1.5);
        other.advance(0.25);
        assert_eq!(clock.now(), 1.75);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.now();
        assert!(first >= 0.0);
        assert!(second > first);
    }
}
