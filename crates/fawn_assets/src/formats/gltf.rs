//! glTF 2.0 decoder (`.glb`, and `.gltf` with embedded buffers).
//!
//! Only the node hierarchy and the animations are extracted; meshes are
//! recorded as `has_mesh` flags for the host renderer.

use base64::Engine;
use fawn_animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, MorphWeightData, TargetPath, Track, TrackData,
    TrackMeta,
};
use fawn_core::errors::AssetError;
use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use super::AssetDecoder;
use crate::asset::{Asset, ModelNode};

pub struct GltfDecoder;

impl AssetDecoder for GltfDecoder {
    fn extensions(&self) -> &[&'static str] {
        &["glb", "gltf"]
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Asset, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes)
            .map_err(|e| AssetError::Format(format!("glTF error in '{name}': {e}")))?;

        let buffers = load_buffers(&gltf)?;

        let mut root = ModelNode::new(name);
        if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            root.children = scene.nodes().map(|node| convert_node(&node)).collect();
        }

        let clips = load_animations(&gltf, &buffers);
        log::debug!(
            "Decoded glTF '{name}': {} mesh node(s), {} clip(s)",
            root.mesh_count(),
            clips.len()
        );

        Ok(Asset {
            name: name.to_string(),
            root,
            clips,
        })
    }
}

fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>, AssetError> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| AssetError::Format("Missing GLB binary chunk".to_string()))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => buffer_data.push(decode_data_uri(uri)?),
        }
    }
    Ok(buffer_data)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, AssetError> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| {
            AssetError::UnsupportedFormat(format!(
                "external glTF buffer '{uri}' (pack the model as .glb)"
            ))
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AssetError::Format(format!("Invalid data URI: {e}")))
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn convert_node(node: &gltf::Node) -> ModelNode {
    ModelNode {
        name: node_name(node),
        has_mesh: node.mesh().is_some(),
        children: node.children().map(|child| convert_node(&child)).collect(),
    }
}

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    let mut animations = Vec::new();

    for anim in gltf.animations() {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let target = channel.target();
            let node_name = node_name(&target.node());

            let Some(inputs) = reader.read_inputs() else {
                log::warn!("Skipping channel on '{node_name}': missing keyframe times");
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let (path, data) = match reader.read_outputs() {
                Some(ReadOutputs::Translations(iter)) => (
                    TargetPath::Translation,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                Some(ReadOutputs::Rotations(iter)) => (
                    TargetPath::Rotation,
                    TrackData::Quaternion(KeyframeTrack::new(
                        times,
                        iter.into_f32().map(Quat::from_array).collect(),
                        interpolation,
                    )),
                ),
                Some(ReadOutputs::Scales(iter)) => (
                    TargetPath::Scale,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                Some(ReadOutputs::MorphTargetWeights(iter)) => {
                    let outputs: Vec<f32> = iter.into_f32().collect();
                    let keys_per_frame = match interpolation {
                        InterpolationMode::CubicSpline => 3,
                        _ => 1,
                    };
                    let entries = times.len() * keys_per_frame;
                    let per_entry = if entries == 0 { 0 } else { outputs.len() / entries };

                    let values = (0..entries)
                        .map(|i| {
                            MorphWeightData::from_slice(&outputs[i * per_entry..(i + 1) * per_entry])
                        })
                        .collect();
                    (
                        TargetPath::Weights,
                        TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
                None => {
                    log::warn!("Skipping channel on '{node_name}': missing keyframe values");
                    continue;
                }
            };

            if !data.is_well_formed() {
                log::warn!("Skipping malformed channel on '{node_name}'");
                continue;
            }

            tracks.push(Track {
                meta: TrackMeta {
                    node_name,
                    target: path,
                },
                data,
            });
        }

        let name = anim
            .name()
            .map_or_else(|| format!("anim_{}", anim.index()), str::to_string);
        animations.push(AnimationClip::new(name, tracks));
    }

    animations
}
