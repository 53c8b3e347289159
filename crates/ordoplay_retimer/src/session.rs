// SPDX-License-Identifier: MIT OR Apache-2.0
//! Start/stop recording sessions and the remap pipeline behind Stop.
//!
//! This module handles:
//! - Selection capture
//! - Arming and disarming the host frame hook
//! - Running normalize, dense fill, tail adjustment and remap on Stop

use crate::config::RetimeSettings;
use crate::dense::DenseMapping;
use crate::error::{Result, RetimeError};
use crate::host::{AnimationHost, Clock, ObjectId, PlaybackRange};
use crate::normalize::normalize_times;
use crate::range::{extend_playback_range, last_key_time, AdjustPhase, RangeAdjuster};
use crate::remap::KeyRemapper;
use crate::report::RemapReport;
use crate::sampler::{frame_hook, Sampler, SharedSampler};
use parking_lot::Mutex;
use std::sync::Arc;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not recording
    #[default]
    Idle,
    /// Frame hook armed, samples being collected
    Recording,
}

impl SessionState {
    /// Label for the start/stop control
    pub fn button_label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Start",
            SessionState::Recording => "Stop",
        }
    }
}

/// Everything captured when recording starts
#[derive(Debug)]
pub struct RecordingSession {
    /// Objects that will be retimed
    pub selection: Vec<ObjectId>,
    /// Playback range at start
    pub range: PlaybackRange,
    /// Frame rate used to normalize timestamps
    pub frame_rate: f64,
    /// Snap remapped keys to whole frames
    pub snap_keys: bool,
    sampler: SharedSampler,
}

impl RecordingSession {
    /// Number of observations so far
    pub fn sample_count(&self) -> usize {
        self.sampler.lock().len()
    }
}

/// Drives the Idle/Recording cycle against a host
pub struct Retimer<H: AnimationHost> {
    host: H,
    clock: Arc<dyn Clock>,
    settings: RetimeSettings,
    captured_selection: Option<Vec<ObjectId>>,
    session: Option<RecordingSession>,
}

impl<H: AnimationHost> Retimer<H> {
    /// Create a retimer for a host
    pub fn new(host: H, clock: Arc<dyn Clock>, settings: RetimeSettings) -> Self {
        Self {
            host,
            clock,
            settings,
            captured_selection: None,
            session: None,
        }
    }

    /// Get the host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Get the host mutably (scrubbing goes through here)
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unwrap the host. An active session is abandoned and its hook disarmed.
    pub fn into_host(mut self) -> H {
        if self.session.take().is_some() {
            self.host.disarm_frame_hook();
        }
        self.host
    }

    /// Current settings
    pub fn settings(&self) -> &RetimeSettings {
        &self.settings
    }

    /// Toggle key snapping for the next session
    pub fn set_snap_keys(&mut self, snap: bool) {
        self.settings.snap_keys = snap;
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    /// Whether a session is recording
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Active session, if any
    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Remember the host's current selection as the objects to retime.
    ///
    /// Returns the number of objects captured.
    pub fn capture_selection(&mut self) -> usize {
        let selection = self.host.selection();
        let count = selection.len();
        tracing::info!(count, "Captured selection");
        self.captured_selection = Some(selection);
        count
    }

    /// Forget the captured selection; the next start uses the live one
    pub fn clear_captured_selection(&mut self) {
        self.captured_selection = None;
    }

    /// Captured selection, if any
    pub fn captured_selection(&self) -> Option<&[ObjectId]> {
        self.captured_selection.as_deref()
    }

    /// Start recording
    pub fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(RetimeError::AlreadyRecording);
        }

        let selection = match &self.captured_selection {
            Some(captured) if !captured.is_empty() => captured.clone(),
            _ => self.host.selection(),
        };
        if selection.is_empty() {
            return Err(RetimeError::EmptySelection);
        }

        let frame_rate = self.settings.frame_rate(self.host.frames_per_second());
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(RetimeError::InvalidFrameRate(frame_rate));
        }

        let range = self.host.playback_range();
        let sampler: SharedSampler =
            Arc::new(Mutex::new(Sampler::new(range.min, self.clock.now())));

        self.host.arm_frame_hook(frame_hook(Arc::clone(&sampler), Arc::clone(&self.clock)));
        self.host.pause();

        tracing::info!(
            objects = selection.len(),
            start = range.min,
            end = range.max,
            frame_rate,
            snap = self.settings.snap_keys,
            "Started recording"
        );

        self.session = Some(RecordingSession {
            selection,
            range,
            frame_rate,
            snap_keys: self.settings.snap_keys,
            sampler,
        });

        // The sampler reads the jump back to the range start as a reset
        self.host.set_current_frame(range.min);
        Ok(())
    }

    /// Stop recording and retime the captured objects
    pub fn stop(&mut self) -> Result<RemapReport> {
        let session = self.session.take().ok_or(RetimeError::NotRecording)?;

        // No more callbacks may touch the sampler past this point
        self.host.disarm_frame_hook();
        let samples = session.sampler.lock().take_samples();

        tracing::info!(samples = samples.len(), "Stopped recording");
        if samples.len() < 2 {
            tracing::warn!(samples = samples.len(), "No recorded keys, nothing remapped");
            return Err(RetimeError::InsufficientSamples {
                recorded: samples.len(),
            });
        }

        let times = normalize_times(&samples.times, samples.recording_start, session.frame_rate)?;
        let mapping = DenseMapping::build(&samples.frames, &times)?;
        let remapper = KeyRemapper::new(session.range.min, session.snap_keys);
        remapper.check_start_boundary(&mapping)?;

        let mut report = RemapReport::new(session.selection);

        // Trailing frames that took no time fall out of the mapping; their
        // keys follow the tail instead of being remapped
        let last_sample = samples.frames[samples.frames.len() - 1];
        let last_dict_key = match mapping.last() {
            Some(last) if (last.frame as f64) < last_sample.floor() => last.frame as f64,
            _ => last_sample,
        };
        let last_mapped = times[times.len() - 1];
        let last_key = last_key_time(&self.host, &mut report).unwrap_or(last_dict_key);
        let adjuster = RangeAdjuster::new(last_dict_key, last_mapped, last_key);

        if self.settings.extend_playback_range {
            report.extended_playback_to = extend_playback_range(&mut self.host, last_mapped);
        }

        adjuster.run(&mut self.host, AdjustPhase::BeforeRemap, &mut report);
        remapper.apply(&mut self.host, &mapping, &mut report)?;
        adjuster.run(&mut self.host, AdjustPhase::AfterRemap, &mut report);

        if report.is_clean() {
            tracing::info!(
                frames = report.frames_processed,
                keys = report.keys_moved,
                "Retimed animation"
            );
        } else {
            tracing::warn!(
                failed = report.failures.len(),
                "Retimed animation with failures"
            );
        }
        Ok(report)
    }

    /// The single start/stop control: start when idle, stop when recording
    pub fn toggle(&mut self) -> Result<Option<RemapReport>> {
        match self.state() {
            SessionState::Idle => self.start().map(|()| None),
            SessionState::Recording => self.stop().map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualClock;
    use crate::keyframe::Keyframe;
    use crate::scene::{AnimatedObject, Scene, SceneHost};
    use crate::track::Track;

    fn scene_with(times: &[f64]) -> (Scene, ObjectId) {
        let mut scene = Scene::default();
        scene.playback = PlaybackRange::new(1.0, 48.0);
        scene.current_frame = 10.0;
        scene.frame_rate = 24.0;
        let id = scene.add_object(AnimatedObject::new("ball").with_track(
            Track::new("translateX").with_keyframes(times.iter().map(|&t| Keyframe::float(t, 0.0))),
        ));
        scene.select([id]);
        (scene, id)
    }

    fn retimer(scene: Scene) -> (Retimer<SceneHost>, ManualClock) {
        let clock = ManualClock::new();
        let retimer = Retimer::new(
            SceneHost::new(scene),
            Arc::new(clock.clone()),
            RetimeSettings::default(),
        );
        (retimer, clock)
    }

    fn scrub(retimer: &mut Retimer<SceneHost>, clock: &ManualClock, path: &[(f64, f64)]) {
        for &(frame, seconds) in path {
            clock.set(seconds);
            retimer.host_mut().set_current_frame(frame);
        }
    }

    #[test]
    fn test_start_arms_and_rewinds() {
        let (scene, _) = scene_with(&[1.0, 10.0]);
        let (mut retimer, _clock) = retimer(scene);

        retimer.start().unwrap();
        assert!(retimer.is_recording());
        assert!(retimer.host().is_hook_armed());
        assert!(!retimer.host().is_playing());
        assert_eq!(retimer.host().current_frame(), 1.0);
        assert_eq!(retimer.state().button_label(), "Stop");
        assert_eq!(retimer.start(), Err(RetimeError::AlreadyRecording));
    }

    #[test]
    fn test_stop_when_idle() {
        let (scene, _) = scene_with(&[1.0]);
        let (mut retimer, _clock) = retimer(scene);
        assert_eq!(retimer.stop().err(), Some(RetimeError::NotRecording));
    }

    #[test]
    fn test_empty_selection() {
        let (mut scene, _) = scene_with(&[1.0]);
        scene.select([]);
        let (mut retimer, _clock) = retimer(scene);
        assert_eq!(retimer.start(), Err(RetimeError::EmptySelection));
        assert!(!retimer.host().is_hook_armed());
    }

    #[test]
    fn test_single_sample_aborts_without_writes() {
        let (scene, id) = scene_with(&[1.0, 5.0, 10.0]);
        let (mut retimer, clock) = retimer(scene);

        retimer.start().unwrap();
        scrub(&mut retimer, &clock, &[(5.0, 1.0)]);
        assert_eq!(retimer.session().map(RecordingSession::sample_count), Some(1));

        assert_eq!(
            retimer.stop().err(),
            Some(RetimeError::InsufficientSamples { recorded: 1 })
        );
        assert!(!retimer.host().is_hook_armed());
        assert_eq!(retimer.host().key_edits(), 0);
        let track = &retimer.host().scene().object(id).unwrap().tracks[0];
        assert_eq!(track.key_times(), vec![1.0, 5.0, 10.0]);
    }

    #[test]
    fn test_double_speed_performance() {
        // Keys every 4 frames up to 24, scrubbed at 48 frames per second
        let (scene, id) = scene_with(&[1.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0]);
        let (mut retimer, clock) = retimer(scene);
        retimer.set_snap_keys(false);

        clock.set(100.0);
        retimer.start().unwrap();
        let path: Vec<(f64, f64)> = (4..=24)
            .step_by(4)
            .map(|f| (f as f64, 100.0 + f as f64 / 48.0))
            .collect();
        scrub(&mut retimer, &clock, &path);

        let report = retimer.stop().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.frames_processed, 21);
        assert!(report.targets.windows(2).all(|w| w[0] > w[1]));

        let track = &retimer.host().scene().object(id).unwrap().tracks[0];
        let expected = [1.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        assert_eq!(track.keyframe_count(), expected.len());
        for (actual, expected) in track.key_times().iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
        }
        assert!(!retimer.is_recording());
    }

    #[test]
    fn test_slower_performance_extends_range_and_tail() {
        // Recorded up to frame 10 at half speed; the key at 30 follows
        let (scene, id) = scene_with(&[1.0, 5.0, 10.0, 30.0]);
        let (mut retimer, clock) = retimer(scene);

        retimer.start().unwrap();
        scrub(&mut retimer, &clock, &[(5.0, 0.5), (10.0, 1.0)]);
        let report = retimer.stop().unwrap();

        // 10 frames performed over 24: move_val = 14
        assert_eq!(report.tail_shift.map(|s| s.delta), Some(14.0));
        let track = &retimer.host().scene().object(id).unwrap().tracks[0];
        assert_eq!(track.key_times(), vec![1.0, 12.0, 24.0, 44.0]);
        assert_eq!(report.extended_playback_to, None);
    }

    #[test]
    fn test_rewind_mid_session_restarts_recording() {
        let (scene, id) = scene_with(&[1.0, 4.0, 8.0]);
        let (mut retimer, clock) = retimer(scene);

        retimer.start().unwrap();
        scrub(&mut retimer, &clock, &[(6.0, 0.1), (8.0, 0.2), (1.0, 10.0)]);
        assert_eq!(retimer.session().map(RecordingSession::sample_count), Some(0));

        // Played back at half speed after the rewind
        scrub(&mut retimer, &clock, &[(4.0, 10.25), (8.0, 10.0 + 8.0 / 12.0)]);
        let report = retimer.stop().unwrap();

        assert_eq!(report.extended_playback_to, None);
        let track = &retimer.host().scene().object(id).unwrap().tracks[0];
        assert_eq!(track.key_times(), vec![1.0, 6.0, 16.0]);
    }

    #[test]
    fn test_too_fast_leaves_scene_untouched() {
        let (scene, id) = scene_with(&[1.0, 4.0, 8.0, 30.0]);
        let (mut retimer, clock) = retimer(scene);

        retimer.start().unwrap();
        // First sample lands after 0.25 frames of wall time
        scrub(&mut retimer, &clock, &[(4.0, 0.25 / 24.0), (8.0, 3.0)]);

        assert!(matches!(
            retimer.stop(),
            Err(RetimeError::UnstableStartBoundary { .. })
        ));
        assert_eq!(retimer.host().key_edits(), 0);
        assert_eq!(retimer.host().playback_range(), PlaybackRange::new(1.0, 48.0));
        let track = &retimer.host().scene().object(id).unwrap().tracks[0];
        assert_eq!(track.key_times(), vec![1.0, 4.0, 8.0, 30.0]);
    }

    #[test]
    fn test_captured_selection_survives_selection_change() {
        let (mut scene, id) = scene_with(&[1.0]);
        let other = scene.add_object(AnimatedObject::new("other"));
        let (mut retimer, _clock) = retimer(scene);

        assert_eq!(retimer.capture_selection(), 1);
        retimer.host_mut().scene_mut().select([other]);
        retimer.start().unwrap();
        assert_eq!(retimer.session().map(|s| s.selection.clone()), Some(vec![id]));
    }

    #[test]
    fn test_toggle_cycles_states() {
        let (scene, _) = scene_with(&[1.0, 8.0]);
        let (mut retimer, clock) = retimer(scene);

        assert_eq!(retimer.toggle(), Ok(None));
        scrub(&mut retimer, &clock, &[(4.0, 0.2), (8.0, 0.4)]);
        assert!(matches!(retimer.toggle(), Ok(Some(_))));
        assert_eq!(retimer.state(), SessionState::Idle);
    }
}
