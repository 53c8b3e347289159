// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Retime - batch front-end for the keyframe retimer
//!
//! Replays a recorded scrub (frame changes with their wall-clock times)
//! against a scene file, the same way the editor does between Start and
//! Stop, and writes the retimed scene.

mod cli;
mod error;
mod inspect;
mod performance;

use clap::Parser;
use cli::{Cli, Command, RetimeArgs};
use error::CliError;
use ordoplay_retimer::{ObjectId, RetimeSettings, Scene, SETTINGS_FILE_NAME};
use performance::Performance;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["ordoplay_retimer=info", "ordoplay_retime=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    // stdout carries the report
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Retime(args) => retime(&args),
        Command::Inspect { scene } => {
            load_scene(&scene).map(|scene| print!("{}", inspect::summarize(&scene)))
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn retime(args: &RetimeArgs) -> Result<(), CliError> {
    let mut scene = load_scene(&args.scene)?;
    let performance = Performance::load(&args.performance)?;
    let settings = args.apply_overrides(load_settings(args)?);

    if !args.objects.is_empty() {
        let ids = resolve_objects(&scene, &args.objects)?;
        scene.select(ids);
    }

    tracing::info!(
        scene = %scene.name,
        observations = performance.len(),
        "Replaying performance"
    );
    let (scene, report) = performance::replay(scene, &performance, settings)?;

    let output = args.output_path();
    scene.save(&output).map_err(|e| CliError::io(&output, e))?;
    tracing::info!(path = %output.display(), "Saved retimed scene");

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn load_scene(path: &Path) -> Result<Scene, CliError> {
    Scene::load(path).map_err(|e| CliError::io(path, e))
}

fn load_settings(args: &RetimeArgs) -> Result<RetimeSettings, CliError> {
    match &args.settings {
        Some(path) => RetimeSettings::load(path).map_err(|e| CliError::io(path, e)),
        None => {
            let path = args
                .scene
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(SETTINGS_FILE_NAME);
            RetimeSettings::load_or_default(&path).map_err(|e| CliError::io(path, e))
        }
    }
}

fn resolve_objects(scene: &Scene, names: &[String]) -> Result<Vec<ObjectId>, CliError> {
    names
        .iter()
        .map(|name| {
            scene
                .object_by_name(name)
                .map(|object| object.id)
                .ok_or_else(|| CliError::UnknownObject(name.clone()))
        })
        .collect()
}
