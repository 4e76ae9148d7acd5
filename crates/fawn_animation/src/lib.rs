//! Animation data and playback for the Fawn viewer.
//!
//! Clips are immutable keyframe data ([`AnimationClip`]); each clip gets a
//! stateful [`AnimationAction`]; the [`AnimationController`] owns the actions
//! and enforces exclusive playback.

pub mod action;
pub mod clip;
pub mod controller;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode, PoseSample, TrackValue};
pub use clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta};
pub use controller::{AnimationController, ControllerState, ReadinessPolicy};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MAX_MORPH_TARGETS, MorphWeightData};
