// SPDX-License-Identifier: MIT OR Apache-2.0
//! Performance-driven keyframe retiming for `OrdoPlay`.
//!
//! The artist selects animated objects, presses Start and scrubs the timeline
//! at the pace the animation should play. Every frame change is recorded with
//! its wall-clock time. On Stop the keys of the selected objects are moved so
//! the animation replays the scrub.
//!
//! ## Architecture
//!
//! The retimer is built on:
//! - A forward-only sampler fed by the host frame hook
//! - Timestamp normalization to frames
//! - A dense per-frame mapping filled in by linear interpolation
//! - A key remapper with optional snapping
//! - Range adjustment for keys past the recorded span
//! - A session controller tying it together against an [`AnimationHost`]

pub mod config;
pub mod dense;
pub mod error;
pub mod host;
pub mod keyframe;
pub mod normalize;
pub mod range;
pub mod remap;
pub mod report;
pub mod sampler;
pub mod scene;
pub mod session;
pub mod track;

pub use config::{RetimeSettings, SETTINGS_FILE_NAME};
pub use dense::{DenseMapping, MappedFrame};
pub use error::{HostError, Result, RetimeError};
pub use host::{
    AnimationHost, Clock, FrameHook, ManualClock, ObjectId, PlaybackRange, SystemClock,
    TimeChange, TimeWindow,
};
pub use keyframe::{Interpolation, Keyframe, KeyframeId, KeyframeValue, TangentMode};
pub use normalize::normalize_times;
pub use range::{AdjustPhase, RangeAdjuster};
pub use remap::{KeyRemapper, PlannedMove};
pub use report::{ObjectFailure, RemapReport, RemapStage, TailShift};
pub use sampler::{SampleEvent, Sampler, Samples, SharedSampler};
pub use scene::{AnimatedObject, Scene, SceneHost};
pub use session::{RecordingSession, Retimer, SessionState};
pub use track::{Track, TrackId};
