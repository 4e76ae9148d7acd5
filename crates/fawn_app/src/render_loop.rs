//! Render Loop
//!
//! One [`RenderLoop::tick`] per displayed frame:
//!
//! 1. pump finished load events into the [`ViewerContext`]
//! 2. update the external camera controller
//! 3. if the viewer is ready, advance the animation by the wall-clock time
//!    since the previous ready tick
//! 4. hand a [`FrameView`] to the render surface
//!
//! The loop is stoppable through a [`LoopHandle`], both when driven by a
//! windowing event loop and in [`run_headless`](RenderLoop::run_headless).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fawn_animation::PoseSample;
use fawn_core::errors::Result;
use fawn_core::time::{FrameClock, SystemTimeSource, TimeSource};

use crate::context::ViewerContext;
use crate::surface::{CameraController, FrameView, RenderSurface};

/// Cloneable stop switch for a [`RenderLoop`].
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stopped: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

pub struct RenderLoop<S, C, T = SystemTimeSource>
where
    S: RenderSurface,
    C: CameraController,
    T: TimeSource,
{
    surface: S,
    camera: C,
    clock: FrameClock<T>,
    handle: LoopHandle,
    pose: Vec<PoseSample>,
    frame_index: u64,
}

impl<S: RenderSurface, C: CameraController> RenderLoop<S, C, SystemTimeSource> {
    pub fn new(surface: S, camera: C) -> Self {
        Self::with_time_source(surface, camera, SystemTimeSource::new())
    }
}

impl<S, C, T> RenderLoop<S, C, T>
where
    S: RenderSurface,
    C: CameraController,
    T: TimeSource,
{
    pub fn with_time_source(surface: S, camera: C, time: T) -> Self {
        Self {
            surface,
            camera,
            clock: FrameClock::new(time),
            handle: LoopHandle::default(),
            pose: Vec::new(),
            frame_index: 0,
        }
    }

    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Forwards a viewport size change to the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// Runs exactly one update-and-render pair.
    pub fn tick(&mut self, context: &mut ViewerContext) -> Result<()> {
        context.poll_load();

        self.camera.update();

        self.pose.clear();
        let mut delta_seconds = 0.0;
        if context.is_ready() {
            delta_seconds = self.clock.delta_seconds();
            let playback = context.playback_mut();
            playback.update(delta_seconds)?;
            playback.sample_active(&mut self.pose);
        }

        let view = FrameView {
            frame_index: self.frame_index,
            delta_seconds,
            load_status: context.status(),
            model: context.model(),
            active: context.playback().active_action(),
            pose: &self.pose,
        };
        self.surface.render(&view);

        self.frame_index += 1;
        Ok(())
    }

    /// Ticks every `frame_interval` until the handle is stopped.
    ///
    /// Returns the number of ticks run. A tick error stops the loop.
    pub fn run_headless(
        &mut self,
        context: &mut ViewerContext,
        frame_interval: Duration,
    ) -> Result<u64> {
        let mut ticks = 0;
        while !self.handle.is_stopped() {
            self.tick(context)?;
            ticks += 1;
            if !frame_interval.is_zero() {
                std::thread::sleep(frame_interval);
            }
        }
        log::info!("Render loop stopped after {ticks} tick(s)");
        Ok(ticks)
    }
}
