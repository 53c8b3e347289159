// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory animation scene and the reference host built on it.

use crate::error::HostError;
use crate::host::{AnimationHost, FrameHook, ObjectId, PlaybackRange, TimeChange, TimeWindow};
use crate::track::Track;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current scene file format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// An animated object (transform node) with its curves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedObject {
    /// Object handle
    #[serde(default)]
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Animation curves
    pub tracks: Vec<Track>,
    /// Whether the whole object is locked against key edits
    #[serde(default)]
    pub locked: bool,
}

impl AnimatedObject {
    /// Create a new object without animation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            tracks: Vec::new(),
            locked: false,
        }
    }

    /// Builder: add a track
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Last key time across all tracks
    pub fn last_key_time(&self) -> Option<f64> {
        self.tracks
            .iter()
            .filter_map(Track::last_key_time)
            .reduce(f64::max)
    }

    /// Total number of keys
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(Track::keyframe_count).sum()
    }
}

/// A scene: animated objects plus timeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Scene name
    pub name: String,
    /// Objects keyed by handle, in insertion order
    objects: IndexMap<ObjectId, AnimatedObject>,
    /// Playback range
    pub playback: PlaybackRange,
    /// Current frame
    pub current_frame: f64,
    /// Frame rate
    pub frame_rate: f64,
    /// Selected objects
    #[serde(default)]
    pub selection: Vec<ObjectId>,
}

fn default_version() -> u32 {
    SCENE_FORMAT_VERSION
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            name: name.into(),
            objects: IndexMap::new(),
            playback: PlaybackRange::default(),
            current_frame: 1.0,
            frame_rate: 24.0,
            selection: Vec::new(),
        }
    }

    /// Add an object
    pub fn add_object(&mut self, object: AnimatedObject) -> ObjectId {
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    /// Get an object
    pub fn object(&self, id: ObjectId) -> Option<&AnimatedObject> {
        self.objects.get(&id)
    }

    /// Get a mutable object
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut AnimatedObject> {
        self.objects.get_mut(&id)
    }

    /// Find an object by name
    pub fn object_by_name(&self, name: &str) -> Option<&AnimatedObject> {
        self.objects.values().find(|o| o.name == name)
    }

    /// Get all objects
    pub fn objects(&self) -> impl Iterator<Item = &AnimatedObject> {
        self.objects.values()
    }

    /// Get object count
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Select objects, replacing the selection
    pub fn select(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.selection = ids.into_iter().filter(|id| self.objects.contains_key(id)).collect();
    }

    /// Load a scene from a RON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut scene: Scene = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if scene.version > SCENE_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Scene version {} is newer than supported version {}",
                    scene.version, SCENE_FORMAT_VERSION
                ),
            ));
        }

        for object in scene.objects.values_mut() {
            for track in &mut object.tracks {
                track.sort_keyframes();
            }
        }

        Ok(scene)
    }

    /// Save the scene to a RON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled Scene")
    }
}

/// Reference [`AnimationHost`] backed by an in-memory [`Scene`]
pub struct SceneHost {
    scene: Scene,
    hook: Option<FrameHook>,
    playing: bool,
    key_edits: usize,
}

impl SceneHost {
    /// Wrap a scene
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            hook: None,
            playing: false,
            key_edits: 0,
        }
    }

    /// Get the scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get the scene mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Unwrap the scene
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a frame hook is armed
    pub fn is_hook_armed(&self) -> bool {
        self.hook.is_some()
    }

    /// Number of key time edits that moved at least one key
    pub fn key_edits(&self) -> usize {
        self.key_edits
    }
}

impl AnimationHost for SceneHost {
    fn current_frame(&self) -> f64 {
        self.scene.current_frame
    }

    fn set_current_frame(&mut self, frame: f64) {
        if self.scene.current_frame == frame {
            return;
        }
        self.scene.current_frame = frame;
        if let Some(hook) = self.hook.as_mut() {
            hook(frame);
        }
    }

    fn playback_range(&self) -> PlaybackRange {
        self.scene.playback
    }

    fn set_playback_range(&mut self, range: PlaybackRange) {
        self.scene.playback = range;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn resume(&mut self) {
        self.playing = true;
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.scene.selection.clone()
    }

    fn frames_per_second(&self) -> f64 {
        self.scene.frame_rate
    }

    fn arm_frame_hook(&mut self, hook: FrameHook) {
        self.hook = Some(hook);
    }

    fn disarm_frame_hook(&mut self) {
        self.hook = None;
    }

    fn last_keyframe_time(&self, object: ObjectId) -> Result<Option<f64>, HostError> {
        self.scene
            .object(object)
            .map(AnimatedObject::last_key_time)
            .ok_or(HostError::ObjectNotFound(object))
    }

    fn change_key_times(
        &mut self,
        object: ObjectId,
        window: TimeWindow,
        change: TimeChange,
    ) -> Result<usize, HostError> {
        let Some(obj) = self.scene.object_mut(object) else {
            return Err(HostError::ObjectNotFound(object));
        };
        if obj.locked {
            return Err(HostError::Locked(obj.name.clone()));
        }
        let locked_track = obj
            .tracks
            .iter()
            .find(|t| t.locked && !t.keyframes_in(window).is_empty());
        if let Some(track) = locked_track {
            return Err(HostError::Locked(format!("{}.{}", obj.name, track.attribute)));
        }

        let moved: usize = obj
            .tracks
            .iter_mut()
            .map(|track| track.change_times(window, change))
            .sum();

        if moved > 0 {
            self.key_edits += 1;
        }
        Ok(moved)
    }
}
