//! JSON rig format.
//!
//! A small text format carrying a part hierarchy and keyframe clips:
//!
//! ```json
//! {
//!   "name": "deer",
//!   "root": { "name": "Armature", "children": [{ "name": "Body", "mesh": true }] },
//!   "animations": [{
//!     "name": "idle",
//!     "tracks": [{
//!       "node": "Body", "target": "rotation", "interpolation": "linear",
//!       "times": [0.0, 1.0],
//!       "values": [[0, 0, 0, 1], [0, 0.38, 0, 0.92]]
//!     }]
//!   }]
//! }
//! ```
//!
//! Translation and scale keys hold 3 floats, rotation keys 4 (`x, y, z, w`),
//! weight keys one float per morph target. Cubic-spline tracks store
//! `in_tangent, value, out_tangent` per keyframe.

use fawn_animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, MAX_MORPH_TARGETS, MorphWeightData, TargetPath,
    Track, TrackData, TrackMeta,
};
use fawn_core::errors::AssetError;
use glam::{Quat, Vec3};
use serde::Deserialize;

use super::AssetDecoder;
use crate::asset::{Asset, ModelNode};

#[derive(Debug, Deserialize)]
struct RigFile {
    #[serde(default)]
    name: Option<String>,
    root: RigNode,
    #[serde(default)]
    animations: Vec<RigClip>,
}

#[derive(Debug, Deserialize)]
struct RigNode {
    name: String,
    #[serde(default)]
    mesh: bool,
    #[serde(default)]
    children: Vec<RigNode>,
}

#[derive(Debug, Deserialize)]
struct RigClip {
    name: String,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    tracks: Vec<RigTrack>,
}

#[derive(Debug, Deserialize)]
struct RigTrack {
    node: String,
    target: TargetPath,
    #[serde(default)]
    interpolation: InterpolationMode,
    times: Vec<f32>,
    values: Vec<Vec<f32>>,
}

pub struct RigDecoder;

impl AssetDecoder for RigDecoder {
    fn extensions(&self) -> &[&'static str] {
        &["rig.json"]
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Asset, AssetError> {
        let file: RigFile = serde_json::from_slice(bytes)
            .map_err(|e| AssetError::Format(format!("Failed to parse rig '{name}': {e}")))?;

        let clips = file
            .animations
            .into_iter()
            .map(convert_clip)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Asset {
            name: file.name.unwrap_or_else(|| name.to_string()),
            root: convert_node(file.root),
            clips,
        })
    }
}

fn convert_node(node: RigNode) -> ModelNode {
    ModelNode {
        name: node.name,
        has_mesh: node.mesh,
        children: node.children.into_iter().map(convert_node).collect(),
    }
}

fn convert_clip(clip: RigClip) -> Result<AnimationClip, AssetError> {
    let tracks = clip
        .tracks
        .into_iter()
        .enumerate()
        .map(|(index, track)| {
            convert_track(track).map_err(|reason| {
                AssetError::Format(format!("Clip '{}', track {index}: {reason}", clip.name))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let converted = AnimationClip::new(clip.name, tracks);
    Ok(match clip.duration {
        Some(duration) => converted.with_duration(duration),
        None => converted,
    })
}

fn convert_track(track: RigTrack) -> Result<Track, String> {
    let RigTrack {
        node,
        target,
        interpolation,
        times,
        values,
    } = track;

    let width = |expected: usize| -> Result<(), String> {
        match values.iter().find(|v| v.len() != expected) {
            Some(bad) => Err(format!("expected {expected} floats per key, found {}", bad.len())),
            None => Ok(()),
        }
    };

    let data = match target {
        TargetPath::Translation | TargetPath::Scale => {
            width(3)?;
            let values = values.iter().map(|v| Vec3::from_slice(v)).collect();
            TrackData::Vector3(KeyframeTrack::new(times, values, interpolation))
        }
        TargetPath::Rotation => {
            width(4)?;
            let values = values.iter().map(|v| Quat::from_slice(v)).collect();
            TrackData::Quaternion(KeyframeTrack::new(times, values, interpolation))
        }
        TargetPath::Weights => {
            let targets = values.first().map_or(0, Vec::len);
            if targets > MAX_MORPH_TARGETS {
                return Err(format!(
                    "{targets} morph targets exceed the limit of {MAX_MORPH_TARGETS}"
                ));
            }
            width(targets)?;
            let values = values.iter().map(|v| MorphWeightData::from_slice(v)).collect();
            TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation))
        }
    };

    if !data.is_well_formed() {
        return Err("keyframe times and values do not line up".to_string());
    }

    Ok(Track {
        meta: TrackMeta {
            node_name: node,
            target,
        },
        data,
    })
}
