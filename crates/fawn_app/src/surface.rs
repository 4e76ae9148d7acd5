//! Seams to the host renderer and input layer.
//!
//! The viewer core never draws and never does camera math. Once per tick it
//! hands a [`FrameView`] to a [`RenderSurface`] and lets a
//! [`CameraController`] update itself.

use fawn_animation::{AnimationAction, PoseSample};
use fawn_assets::ModelNode;

use crate::context::LoadStatus;

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub frame_index: u64,
    /// Seconds the animation advanced this tick (zero while not ready).
    pub delta_seconds: f32,
    pub load_status: &'a LoadStatus,
    /// Part hierarchy, once the model is ready.
    pub model: Option<&'a ModelNode>,
    /// The playing action, if any.
    pub active: Option<&'a AnimationAction>,
    /// Track values of the playing action at its current cursor.
    pub pose: &'a [PoseSample],
}

impl FrameView<'_> {
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.load_status.is_ready()
    }
}

/// Drawable surface sized to the viewport.
pub trait RenderSurface {
    fn render(&mut self, frame: &FrameView<'_>);

    /// Viewport size changed. Projection and aspect math belong to the host.
    #[allow(unused_variables)]
    fn resize(&mut self, width: u32, height: u32) {}
}

/// External camera / orbit controller, updated once per tick.
pub trait CameraController {
    fn update(&mut self);
}

/// Camera controller that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedCamera;

impl CameraController for FixedCamera {
    fn update(&mut self) {}
}

/// Surface that draws nothing and logs load and playback changes.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    frames: u64,
    last_clip: Option<String>,
    size: (u32, u32),
}

impl HeadlessSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl RenderSurface for HeadlessSurface {
    fn render(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;
        let clip = frame.active.map(|action| action.name().to_string());
        if clip != self.last_clip {
            match &clip {
                Some(name) => log::info!("Frame {}: now playing '{name}'", frame.frame_index),
                None => log::info!("Frame {}: idle", frame.frame_index),
            }
            self.last_clip = clip;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}
