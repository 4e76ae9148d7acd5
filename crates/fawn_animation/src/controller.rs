//! Exclusive Playback Controller
//!
//! [`AnimationController`] owns one [`AnimationAction`] per clip of a loaded
//! model and guarantees that at most one of them is playing at any time.
//!
//! # State machine
//!
//! ```text
//!  Uninitialized --build--> Idle --play(i)--> Playing(i)
//!                            ^                  |  ^
//!                            |   stop_all /     |  | play(j)  (stop all, start j)
//!                            +-- Once finished -+--+
//! ```
//!
//! `play` always lands in `Playing`, whether it switches clips or replays the
//! active one. Replaying restarts the clip from time zero.

use std::sync::Arc;

use fawn_core::errors::{AnimationError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::action::{AnimationAction, LoopMode, PoseSample};
use crate::clip::AnimationClip;

/// What `update` does when it arrives before `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// Treat the call as a no-op.
    #[default]
    Skip,
    /// Return [`AnimationError::NotReady`].
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Idle,
    Playing(usize),
}

#[derive(Debug)]
pub struct AnimationController {
    actions: Vec<AnimationAction>,
    by_name: FxHashMap<String, usize>,
    active: Option<usize>,
    built: bool,

    policy: ReadinessPolicy,
    loop_mode: LoopMode,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            by_name: FxHashMap::default(),
            active: None,
            built: false,
            policy: ReadinessPolicy::default(),
            loop_mode: LoopMode::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ReadinessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Loop mode given to every action created by [`build`](Self::build).
    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Creates one action per clip, preserving order. Allowed exactly once.
    pub fn build(&mut self, clips: Vec<AnimationClip>) -> Result<()> {
        if self.built {
            return Err(AnimationError::AlreadyBuilt.into());
        }

        self.actions = clips
            .into_iter()
            .map(|clip| AnimationAction::new(Arc::new(clip)).with_loop_mode(self.loop_mode))
            .collect();

        self.by_name.clear();
        for (index, action) in self.actions.iter().enumerate() {
            // First clip wins when a model repeats a name.
            self.by_name.entry(action.name().to_string()).or_insert(index);
        }

        self.active = None;
        self.built = true;

        log::info!("Animation controller built with {} clip(s)", self.actions.len());
        Ok(())
    }

    /// Stops every action, then starts the action at `index`.
    ///
    /// On error nothing changes: the active index and every cursor keep
    /// their previous values.
    pub fn play(&mut self, index: usize) -> Result<()> {
        if !self.built {
            return Err(AnimationError::NotReady.into());
        }
        let len = self.actions.len();
        if index >= len {
            return Err(AnimationError::IndexOutOfRange { index, len }.into());
        }

        for action in &mut self.actions {
            action.stop();
        }
        self.actions[index].play();
        self.active = Some(index);

        log::debug!("Playing clip #{index} '{}'", self.actions[index].name());
        Ok(())
    }

    /// Resolves a clip name and plays it.
    pub fn play_by_name(&mut self, name: &str) -> Result<()> {
        if !self.built {
            return Err(AnimationError::NotReady.into());
        }
        let index = self
            .index_of(name)
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;
        self.play(index)
    }

    /// Stops every action and returns to the idle state.
    pub fn stop_all(&mut self) -> Result<()> {
        if !self.built {
            return Err(AnimationError::NotReady.into());
        }
        for action in &mut self.actions {
            action.stop();
        }
        self.active = None;
        Ok(())
    }

    /// Advances the active action by `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f32) -> Result<()> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(AnimationError::InvalidDelta(delta_seconds).into());
        }
        if !self.built {
            return match self.policy {
                ReadinessPolicy::Skip => Ok(()),
                ReadinessPolicy::FailFast => Err(AnimationError::NotReady.into()),
            };
        }

        let Some(index) = self.active else {
            return Ok(());
        };

        let action = &mut self.actions[index];
        action.update(delta_seconds);
        if !action.is_playing() {
            log::debug!("Clip '{}' finished", action.name());
            self.active = None;
        }
        Ok(())
    }

    /// Samples the active action's tracks into `out`.
    ///
    /// Returns the number of samples written; zero while idle.
    pub fn sample_active(&mut self, out: &mut Vec<PoseSample>) -> usize {
        match self.active {
            Some(index) => self.actions[index].sample_all(out),
            None => 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        match (self.built, self.active) {
            (false, _) => ControllerState::Uninitialized,
            (true, None) => ControllerState::Idle,
            (true, Some(index)) => ControllerState::Playing(index),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built
    }

    #[inline]
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active_action(&self) -> Option<&AnimationAction> {
        self.active.map(|index| &self.actions[index])
    }

    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, index: usize) -> Option<&AnimationAction> {
        self.actions.get(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions whose `playing` flag is set. Never exceeds one.
    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_playing()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{TargetPath, Track, TrackData, TrackMeta};
    use crate::tracks::{InterpolationMode, KeyframeTrack};
    use fawn_core::Error;
    use glam::Vec3;

    fn clip(name: &str, duration: f32) -> AnimationClip {
        AnimationClip::new(
            name,
            vec![Track {
                meta: TrackMeta {
                    node_name: "root".into(),
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, duration],
                    vec![Vec3::ZERO, Vec3::ONE],
                    InterpolationMode::Linear,
                )),
            }],
        )
    }

    fn built(names: &[&str]) -> AnimationController {
        let mut controller = AnimationController::new();
        controller
            .build(names.iter().map(|n| clip(n, 4.0)).collect())
            .unwrap();
        controller
    }

    #[test]
    fn build_twice_is_rejected() {
        let mut controller = built(&["idle"]);
        let err = controller.build(vec![clip("again", 1.0)]).unwrap_err();
        assert!(matches!(err, Error::Animation(AnimationError::AlreadyBuilt)));
        assert_eq!(controller.len(), 1);
    }

    #[test]
    fn duplicate_names_resolve_to_first_clip() {
        let controller = built(&["walk", "walk"]);
        assert_eq!(controller.index_of("walk"), Some(0));
    }

    #[test]
    fn state_tracks_transitions() {
        let mut controller = AnimationController::new();
        assert_eq!(controller.state(), ControllerState::Uninitialized);
        controller.build(vec![clip("a", 1.0), clip("b", 1.0)]).unwrap();
        assert_eq!(controller.state(), ControllerState::Idle);
        controller.play(1).unwrap();
        assert_eq!(controller.state(), ControllerState::Playing(1));
        controller.stop_all().unwrap();
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(controller.playing_count(), 0);
    }

    #[test]
    fn once_clip_finishing_returns_to_idle() {
        let mut controller = AnimationController::new().with_loop_mode(LoopMode::Once);
        controller.build(vec![clip("die", 1.0)]).unwrap();
        controller.play(0).unwrap();
        controller.update(0.4).unwrap();
        assert_eq!(controller.state(), ControllerState::Playing(0));
        controller.update(5.0).unwrap();
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!((controller.actions()[0].time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        let mut controller = built(&["idle"]);
        assert!(controller.update(f32::NAN).is_err());
        assert!(controller.update(f32::INFINITY).is_err());
    }

    #[test]
    fn sampling_reads_only_the_active_clip() {
        let mut controller = built(&["idle", "die"]);
        let mut out = Vec::new();
        assert_eq!(controller.sample_active(&mut out), 0);

        controller.play(0).unwrap();
        controller.update(2.0).unwrap();
        assert_eq!(controller.sample_active(&mut out), 1);
        assert_eq!(out[0].target, TargetPath::Translation);
        assert_eq!(out[0].value, crate::action::TrackValue::Vector3(Vec3::splat(0.5)));
    }
}
