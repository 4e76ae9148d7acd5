//! Winit-based Viewer Runner
//!
//! Opens a window, starts the model load, and drives a [`RenderLoop`] from
//! winit's redraw events. The host supplies the surface and camera through
//! a [`SurfaceFactory`] once the window exists.
//!
//! # Input
//!
//! - `1`..`9`: press trigger control 0..8 (ignored with a warning until ready)
//! - `Escape` or closing the window: stop the loop and exit
//!
//! # Example
//!
//! ```rust,ignore
//! use fawn_app::winit::ViewerApp;
//! use fawn_app::{FixedCamera, HeadlessSurface, ViewerSettings};
//!
//! fn main() -> fawn_core::Result<()> {
//!     ViewerApp::new(ViewerSettings::default())
//!         .run(|_window| (HeadlessSurface::new(), FixedCamera))
//! }
//! ```

use std::sync::Arc;

use fawn_assets::{AssetLoader, FileAssetReader};
use fawn_core::errors::{Error, Result};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
pub use winit::window::{Window, WindowId};

use crate::context::ViewerContext;
use crate::render_loop::{LoopHandle, RenderLoop};
use crate::settings::ViewerSettings;
use crate::surface::{CameraController, RenderSurface};
use crate::trigger::TriggerBinding;

/// Builds the host surface and camera for a freshly created window.
pub trait SurfaceFactory: 'static {
    type Surface: RenderSurface;
    type Camera: CameraController;

    fn create(&mut self, window: &Arc<Window>) -> (Self::Surface, Self::Camera);
}

impl<F, S, C> SurfaceFactory for F
where
    F: FnMut(&Arc<Window>) -> (S, C) + 'static,
    S: RenderSurface,
    C: CameraController,
{
    type Surface = S;
    type Camera = C;

    fn create(&mut self, window: &Arc<Window>) -> (S, C) {
        self(window)
    }
}

/// Application builder for the windowed viewer.
pub struct ViewerApp {
    settings: ViewerSettings,
}

impl ViewerApp {
    #[must_use]
    pub fn new(settings: ViewerSettings) -> Self {
        Self { settings }
    }

    /// Runs the viewer until the window closes. Blocks the current thread.
    pub fn run<F: SurfaceFactory>(self, factory: F) -> Result<()> {
        let _ = env_logger::try_init();

        let settings = self.settings;
        let loader = AssetLoader::new(FileAssetReader::new(&settings.asset_root))
            .with_chunk_size(settings.chunk_size);

        let mut context = ViewerContext::from_settings(&settings);
        context.begin_load(&loader, &settings.model_path)?;

        let event_loop = EventLoop::new().map_err(|e| Error::Platform(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = ViewerRunner {
            triggers: settings.trigger_binding(),
            settings,
            factory,
            context,
            window: None,
            render_loop: None,
            handle: None,
        };
        event_loop
            .run_app(&mut runner)
            .map_err(|e| Error::Platform(e.to_string()))
    }
}

struct ViewerRunner<F: SurfaceFactory> {
    settings: ViewerSettings,
    factory: F,
    context: ViewerContext,
    triggers: TriggerBinding,

    window: Option<Arc<Window>>,
    render_loop: Option<RenderLoop<F::Surface, F::Camera>>,
    handle: Option<LoopHandle>,
}

impl<F: SurfaceFactory> ViewerRunner<F> {
    fn on_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => self.stop(event_loop),
            Key::Character(text) => {
                let Some(digit) = text.chars().next().and_then(|c| c.to_digit(10)) else {
                    return;
                };
                let Some(control) = (digit as usize).checked_sub(1) else {
                    return;
                };
                if !self.triggers.is_enabled(&self.context) {
                    log::warn!("Trigger {digit} ignored: model not ready");
                    return;
                }
                if let Err(err) = self.triggers.press(control, &mut self.context) {
                    log::warn!("Trigger {digit} rejected: {err}");
                }
            }
            _ => {}
        }
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(handle) = &self.handle {
            handle.stop();
        }
        event_loop.exit();
    }
}

impl<F: SurfaceFactory> ApplicationHandler for ViewerRunner<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.width,
                self.settings.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Fatal window error: {err}");
                event_loop.exit();
                return;
            }
        };

        let (surface, camera) = self.factory.create(&window);
        let mut render_loop = RenderLoop::new(surface, camera);
        let size = window.inner_size();
        render_loop.resize(size.width, size.height);

        self.handle = Some(render_loop.handle());
        self.render_loop = Some(render_loop);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(render_loop) = &mut self.render_loop {
                    render_loop.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event, event_loop),
            WindowEvent::RedrawRequested => {
                let Some(render_loop) = &mut self.render_loop else {
                    return;
                };
                if render_loop.handle().is_stopped() {
                    event_loop.exit();
                    return;
                }
                if let Err(err) = render_loop.tick(&mut self.context) {
                    log::error!("Frame failed: {err}");
                    self.stop(event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
