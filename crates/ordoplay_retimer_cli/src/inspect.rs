// SPDX-License-Identifier: MIT OR Apache-2.0
//! Human-readable scene summary.

use ordoplay_retimer::{AnimatedObject, Scene};

/// Describe a scene: timeline settings, then one line per object
pub fn summarize(scene: &Scene) -> String {
    let header = [
        format!("Scene: {}", scene.name),
        format!(
            "Playback: {} - {} @ {} fps (current frame {})",
            scene.playback.min, scene.playback.max, scene.frame_rate, scene.current_frame
        ),
        format!("Objects: {}", scene.object_count()),
    ];
    let objects = scene
        .objects()
        .map(|object| describe(object, scene.selection.contains(&object.id)));

    let mut out: Vec<String> = header.into_iter().chain(objects).collect();
    out.push(String::new());
    out.join("\n")
}

fn describe(object: &AnimatedObject, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let span = match (first_key(object), object.last_key_time()) {
        (Some(first), Some(last)) => format!("{first} - {last}"),
        _ => "no keys".to_string(),
    };
    let locked = if object.locked { " [locked]" } else { "" };
    format!(
        "{marker} {} ({} tracks, {} keys, {span}){locked}",
        object.name,
        object.tracks.len(),
        object.keyframe_count()
    )
}

fn first_key(object: &AnimatedObject) -> Option<f64> {
    object
        .tracks
        .iter()
        .filter_map(|t| t.first_key_time())
        .min_by(f64::total_cmp)
}
