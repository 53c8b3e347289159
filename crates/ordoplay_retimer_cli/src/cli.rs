// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use ordoplay_retimer::RetimeSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ordoplay_retime")]
#[command(version)]
#[command(about = "Retime keyframes to match a recorded timeline scrub", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a performance against a scene and write the retimed scene
    Retime(RetimeArgs),
    /// Print a summary of a scene file
    Inspect {
        /// Scene file (RON)
        scene: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RetimeArgs {
    /// Scene file (RON)
    #[arg(short, long, value_name = "FILE")]
    pub scene: PathBuf,

    /// Performance file: RON list of (frame, seconds) observations
    #[arg(short, long, value_name = "FILE")]
    pub performance: PathBuf,

    /// Where to write the retimed scene (default: <scene>.retimed.ron)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Settings file (default: retime.ron next to the scene, if present)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Retime these objects instead of the scene's selection
    #[arg(long = "object", value_name = "NAME")]
    pub objects: Vec<String>,

    /// Keep remapped keys on sub-frame times
    #[arg(long = "no-snap")]
    pub no_snap: bool,

    /// Normalize with this frame rate instead of the scene's
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Leave the playback range alone even if the performance runs past it
    #[arg(long = "no-extend-range")]
    pub no_extend_range: bool,

    /// Print the remap report as JSON on stdout
    #[arg(long)]
    pub report: bool,
}

impl RetimeArgs {
    /// Apply flag overrides on top of file settings
    pub fn apply_overrides(&self, mut settings: RetimeSettings) -> RetimeSettings {
        if self.no_snap {
            settings.snap_keys = false;
        }
        if let Some(fps) = self.fps {
            settings.frame_rate_override = Some(fps);
        }
        if self.no_extend_range {
            settings.extend_playback_range = false;
        }
        settings
    }

    /// Output path, defaulting to a sibling of the scene
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.scene.with_extension("retimed.ron"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retime() {
        let cli = Cli::parse_from([
            "ordoplay_retime",
            "retime",
            "--scene",
            "shot.ron",
            "--performance",
            "take1.ron",
            "--object",
            "ball",
            "--object",
            "box",
            "--no-snap",
            "--fps",
            "30",
        ]);
        let Command::Retime(args) = cli.command else {
            panic!("expected retime");
        };
        assert_eq!(args.objects, vec!["ball", "box"]);
        assert_eq!(args.output_path(), PathBuf::from("shot.retimed.ron"));

        let settings = args.apply_overrides(RetimeSettings::default());
        assert!(!settings.snap_keys);
        assert!(settings.extend_playback_range);
        assert_eq!(settings.frame_rate_override, Some(30.0));
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::parse_from(["ordoplay_retime", "inspect", "shot.ron"]);
        assert!(matches!(cli.command, Command::Inspect { .. }));
    }
}
