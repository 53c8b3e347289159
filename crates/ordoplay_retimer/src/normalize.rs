// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of wall-clock timestamps to elapsed frames.

use crate::error::{Result, RetimeError};

/// Convert wall-clock seconds to frames elapsed since `recording_start`
pub fn normalize_times(times: &[f64], recording_start: f64, fps: f64) -> Result<Vec<f64>> {
    if times.is_empty() {
        return Err(RetimeError::InsufficientSamples { recorded: 0 });
    }
    if !fps.is_finite() || fps <= 0.0 {
        return Err(RetimeError::InvalidFrameRate(fps));
    }

    Ok(times.iter().map(|t| (t - recording_start) * fps).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_frames() {
        let frames = normalize_times(&[10.5, 11.0, 12.0], 10.0, 24.0).unwrap();
        assert_eq!(frames, vec![12.0, 24.0, 48.0]);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            normalize_times(&[], 0.0, 24.0),
            Err(RetimeError::InsufficientSamples { recorded: 0 })
        );
    }

    #[test]
    fn test_bad_frame_rate() {
        assert!(matches!(
            normalize_times(&[1.0], 0.0, 0.0),
            Err(RetimeError::InvalidFrameRate(_))
        ));
        assert!(normalize_times(&[1.0], 0.0, f64::NAN).is_err());
    }
}
