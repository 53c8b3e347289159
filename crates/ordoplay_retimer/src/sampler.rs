// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording of (frame, wall-clock) observations during a performed scrub.

use crate::host::{Clock, FrameHook};
use parking_lot::Mutex;
use std::sync::Arc;

/// What a single observation did to the recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEvent {
    /// Playback returned to the range start; recording restarted
    Reset,
    /// Frame was past the watermark and got recorded
    Recorded,
    /// Backwards or repeated frame, dropped
    Ignored,
}

/// Raw observations taken out of a [`Sampler`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    /// Original frames, strictly increasing
    pub frames: Vec<f64>,
    /// Wall-clock seconds at which each frame was visited
    pub times: Vec<f64>,
    /// Wall-clock seconds at which recording (re)started
    pub recording_start: f64,
}

impl Samples {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Forward-only recorder of timeline visits.
///
/// `frames` and `times` are always the same length.
#[derive(Debug, Clone)]
pub struct Sampler {
    start: f64,
    watermark: f64,
    frames: Vec<f64>,
    times: Vec<f64>,
    recording_start: f64,
}

impl Sampler {
    /// Create a sampler for a range starting at `start`
    pub fn new(start: f64, now: f64) -> Self {
        Self {
            start,
            watermark: start,
            frames: Vec::new(),
            times: Vec::new(),
            recording_start: now,
        }
    }

    /// Clear observations and restart the recording clock
    pub fn reset(&mut self, now: f64) {
        self.frames.clear();
        self.times.clear();
        self.watermark = self.start;
        self.recording_start = now;
    }

    /// Feed the frame the playback head just moved to
    pub fn observe(&mut self, frame: f64, now: f64) -> SampleEvent {
        if frame == self.start {
            self.reset(now);
            tracing::debug!(frame, "Playback back at range start, recording reset");
            return SampleEvent::Reset;
        }

        if frame > self.watermark {
            self.watermark = frame;
            self.frames.push(frame);
            self.times.push(now);
            return SampleEvent::Recorded;
        }

        SampleEvent::Ignored
    }

    /// Range start this sampler resets on
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Highest frame recorded so far
    pub fn watermark(&self) -> f64 {
        self.watermark
    }

    /// Wall-clock time recording started
    pub fn recording_start(&self) -> f64 {
        self.recording_start
    }

    /// Recorded frames
    pub fn frames(&self) -> &[f64] {
        &self.frames
    }

    /// Recorded wall-clock times
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Take the observations out, leaving the sampler empty
    pub fn take_samples(&mut self) -> Samples {
        let samples = Samples {
            frames: std::mem::take(&mut self.frames),
            times: std::mem::take(&mut self.times),
            recording_start: self.recording_start,
        };
        self.watermark = self.start;
        samples
    }
}

/// Sampler shared between the session and the host frame hook
pub type SharedSampler = Arc<Mutex<Sampler>>;

/// Build the host callback that feeds `sampler`, timestamped by `clock`
pub fn frame_hook(sampler: SharedSampler, clock: Arc<dyn Clock>) -> FrameHook {
    Box::new(move |frame| {
        let now = clock.now();
        sampler.lock().observe(frame, now);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualClock;

    #[test]
    fn test_records_forward_motion_only() {
        let mut sampler = Sampler::new(1.0, 0.0);
        assert_eq!(sampler.observe(3.0, 0.1), SampleEvent::Recorded);
        assert_eq!(sampler.observe(2.0, 0.2), SampleEvent::Ignored);
        assert_eq!(sampler.observe(3.0, 0.3), SampleEvent::Ignored);
        assert_eq!(sampler.observe(7.0, 0.4), SampleEvent::Recorded);

        assert_eq!(sampler.frames(), &[3.0, 7.0]);
        assert_eq!(sampler.times(), &[0.1, 0.4]);
        assert_eq!(sampler.watermark(), 7.0);
    }

    #[test]
    fn test_rewind_to_start_resets() {
        let mut sampler = Sampler::new(1.0, 0.0);
        sampler.observe(5.0, 0.5);
        sampler.observe(9.0, 0.9);

        assert_eq!(sampler.observe(1.0, 2.0), SampleEvent::Reset);
        assert!(sampler.is_empty());
        assert_eq!(sampler.times().len(), 0);
        assert_eq!(sampler.watermark(), 1.0);
        assert_eq!(sampler.recording_start(), 2.0);

        // Frames below the old watermark record again after a reset
        assert_eq!(sampler.observe(2.0, 2.1), SampleEvent::Recorded);
    }

    #[test]
    fn test_frames_before_start_ignored() {
        let mut sampler = Sampler::new(10.0, 0.0);
        assert_eq!(sampler.observe(4.0, 0.1), SampleEvent::Ignored);
        assert!(sampler.is_empty());
    }

    #[test]
    fn test_take_samples_empties() {
        let mut sampler = Sampler::new(1.0, 0.25);
        sampler.observe(2.0, 0.5);
        let samples = sampler.take_samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.recording_start, 0.25);
        assert!(sampler.is_empty());
        assert_eq!(sampler.watermark(), 1.0);
    }

    #[test]
    fn test_frame_hook_uses_clock() {
        let clock = ManualClock::new();
        let shared: SharedSampler = Arc::new(Mutex::new(Sampler::new(1.0, 0.0)));
        let mut hook = frame_hook(Arc::clone(&shared), Arc::new(clock.clone()));

        clock.set(0.5);
        hook(4.0);
        clock.set(1.25);
        hook(6.0);

        let sampler = shared.lock();
        assert_eq!(sampler.frames(), &[4.0, 6.0]);
        assert_eq!(sampler.times(), &[0.5, 1.25]);
    }
}
