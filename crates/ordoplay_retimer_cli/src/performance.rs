// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recorded performances and their replay through a [`Retimer`].
//!
//! A performance file is a RON list of `(frame, seconds)` pairs, with seconds
//! counted from the moment Start was pressed:
//!
//! ```ron
//! [(5.0, 0.5), (10.0, 1.0)]
//! ```

use crate::error::CliError;
use ordoplay_retimer::{
    AnimationHost, ManualClock, RemapReport, RetimeSettings, Retimer, Scene, SceneHost,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One frame change seen during the scrub
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Observation {
    /// Frame the timeline moved to
    pub frame: f64,
    /// Seconds since Start
    pub seconds: f64,
}

impl From<(f64, f64)> for Observation {
    fn from((frame, seconds): (f64, f64)) -> Self {
        Self { frame, seconds }
    }
}

impl From<Observation> for (f64, f64) {
    fn from(observation: Observation) -> Self {
        (observation.frame, observation.seconds)
    }
}

/// A scripted scrub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Performance {
    /// Observations in the order they happened
    pub observations: Vec<Observation>,
}

impl Performance {
    /// Parse a performance from RON text
    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Load and validate a performance file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let performance = Self::parse(&content).map_err(|source| CliError::Ron {
            path: path.to_path_buf(),
            source,
        })?;
        performance.validate()?;
        Ok(performance)
    }

    /// Reject non-finite values and clocks that run backwards
    pub fn validate(&self) -> Result<(), CliError> {
        let mut previous = 0.0;
        for (index, observation) in self.observations.iter().enumerate() {
            if !observation.frame.is_finite() || !observation.seconds.is_finite() {
                return Err(CliError::InvalidObservation {
                    index,
                    reason: "frame and seconds must be finite".to_string(),
                });
            }
            if observation.seconds < previous {
                return Err(CliError::InvalidObservation {
                    index,
                    reason: format!("time {} is before {}", observation.seconds, previous),
                });
            }
            previous = observation.seconds;
        }
        Ok(())
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Run Start, the scripted scrub and Stop against `scene`.
///
/// The scene is only handed back when the remap ran; an aborted session
/// leaves the caller with nothing to write.
pub fn replay(
    scene: Scene,
    performance: &Performance,
    settings: RetimeSettings,
) -> Result<(Scene, RemapReport), CliError> {
    let clock = ManualClock::new();
    let mut retimer = Retimer::new(SceneHost::new(scene), Arc::new(clock.clone()), settings);

    retimer.start()?;
    for observation in &performance.observations {
        clock.set(observation.seconds);
        retimer.host_mut().set_current_frame(observation.frame);
    }
    let report = retimer.stop()?;

    tracing::debug!(
        observations = performance.len(),
        failures = report.failures.len(),
        "Replayed performance"
    );
    Ok((retimer.into_host().into_scene(), report))
}
