// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retimer settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "retime.ron";

/// User-facing retimer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetimeSettings {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Round remapped keys to whole frames
    #[serde(default = "default_true")]
    pub snap_keys: bool,
    /// Use this frame rate instead of the host's
    #[serde(default)]
    pub frame_rate_override: Option<f64>,
    /// Grow the playback range when the performance runs past its end
    #[serde(default = "default_true")]
    pub extend_playback_range: bool,
}

fn default_version() -> u32 {
    SETTINGS_FORMAT_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for RetimeSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            snap_keys: true,
            frame_rate_override: None,
            extend_playback_range: true,
        }
    }
}

impl RetimeSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: RetimeSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> std::io::Result<Self> {
        match Self::load(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }

    /// Frame rate to normalize with, given the host's
    pub fn frame_rate(&self, host_fps: f64) -> f64 {
        self.frame_rate_override.unwrap_or(host_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RetimeSettings::default();
        assert!(settings.snap_keys);
        assert!(settings.extend_playback_range);
        assert_eq!(settings.frame_rate(24.0), 24.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: RetimeSettings = ron::from_str("(snap_keys: false)").unwrap();
        assert!(!settings.snap_keys);
        assert!(settings.extend_playback_range);
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
    }

    #[test]
    fn test_frame_rate_override() {
        let settings = RetimeSettings {
            frame_rate_override: Some(30.0),
            ..RetimeSettings::default()
        };
        assert_eq!(settings.frame_rate(24.0), 30.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "ordoplay_retimer_settings_{}.ron",
            std::process::id()
        ));
        let settings = RetimeSettings {
            snap_keys: false,
            frame_rate_override: Some(25.0),
            ..RetimeSettings::default()
        };

        settings.save(&path).unwrap();
        let loaded = RetimeSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let path = std::env::temp_dir().join(format!(
            "ordoplay_retimer_settings_v99_{}.ron",
            std::process::id()
        ));
        let settings = RetimeSettings {
            version: SETTINGS_FORMAT_VERSION + 1,
            ..RetimeSettings::default()
        };

        settings.save(&path).unwrap();
        let result = RetimeSettings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(result.map_err(|e| e.kind()), Err(std::io::ErrorKind::InvalidData));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("ordoplay_retimer_missing_settings.ron");
        let settings = RetimeSettings::load_or_default(&path).unwrap();
        assert_eq!(settings, RetimeSettings::default());
    }
}
