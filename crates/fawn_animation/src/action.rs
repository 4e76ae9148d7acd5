use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clip::{AnimationClip, TargetPath, TrackData};
use crate::tracks::KeyframeCursor;
use crate::values::MorphWeightData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play to the end, clamp there and stop.
    Once,
    /// Wrap around to the start.
    #[default]
    Loop,
    /// Bounce between start and end.
    PingPong,
}

/// A stateful player bound to exactly one clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    time: f32,
    playing: bool,
    /// Travel direction for `PingPong`: `1.0` forward, `-1.0` backward.
    direction: f32,

    pub time_scale: f32,
    pub loop_mode: LoopMode,

    track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            playing: false,
            direction: 1.0,
            time_scale: 1.0,
            loop_mode: LoopMode::default(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    /// Playback cursor in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stops playback and rewinds, so the next `play` starts from zero.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
        self.direction = 1.0;
        for cursor in &mut self.track_cursors {
            cursor.reset();
        }
    }

    /// Advances the cursor by `dt` seconds. Does nothing while stopped.
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        let step = dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                self.time += step;
                if self.time >= duration {
                    self.time = duration;
                    self.playing = false;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.playing = false;
                }
            }
            LoopMode::Loop => {
                self.time += step;
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    self.time = duration + (self.time % duration);
                }
            }
            LoopMode::PingPong => {
                // Unfold the cursor onto one forward-then-back cycle.
                let cycle = duration * 2.0;
                let phase = if self.direction < 0.0 {
                    cycle - self.time
                } else {
                    self.time
                };
                let phase = (phase + step).rem_euclid(cycle);
                if phase > duration {
                    self.time = cycle - phase;
                    self.direction = -1.0;
                } else {
                    self.time = phase;
                    self.direction = 1.0;
                }
            }
        }
    }

    /// Samples one track at the current cursor.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)?),
            TrackData::Quaternion(t) => {
                TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor)?)
            }
            TrackData::Scalar(t) => TrackValue::Scalar(t.sample_with_cursor(self.time, cursor)?),
            TrackData::MorphWeights(t) => {
                TrackValue::MorphWeight(Box::new(t.sample_with_cursor(self.time, cursor)?))
            }
        })
    }

    /// Samples every track into `out`, returning how many samples were written.
    pub fn sample_all(&mut self, out: &mut Vec<PoseSample>) -> usize {
        let before = out.len();
        for track_index in 0..self.clip.tracks.len() {
            let target = self.clip.tracks[track_index].meta.target;
            if let Some(value) = self.sample_track(track_index) {
                out.push(PoseSample {
                    track_index,
                    target,
                    value,
                });
            }
        }
        out.len() - before
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackValue {
    Vector3(glam::Vec3),
    Quaternion(glam::Quat),
    Scalar(f32),
    MorphWeight(Box<MorphWeightData>),
}

/// One sampled track value, addressed by its index in the active clip.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    pub track_index: usize,
    pub target: TargetPath,
    pub value: TrackValue,
}
