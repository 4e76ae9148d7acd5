//! Viewer application layer.
//!
//! - [`ViewerContext`]: owned playback state, load tracking, readiness
//! - [`RenderLoop`]: per-frame tick with a stoppable [`LoopHandle`]
//! - [`TriggerBinding`]: named controls mapped to clip activations
//! - [`ViewerSettings`]: configuration (code or JSON)
//! - [`winit`]: windowed runner (feature `winit`)

pub mod context;
pub mod render_loop;
pub mod settings;
pub mod surface;
pub mod trigger;

#[cfg(feature = "winit")]
pub mod winit;

pub use context::{LoadStatus, ViewerContext};
pub use render_loop::{LoopHandle, RenderLoop};
pub use settings::ViewerSettings;
pub use surface::{CameraController, FixedCamera, FrameView, HeadlessSurface, RenderSurface};
pub use trigger::{Control, TriggerBinding, TriggerTarget};
