//! # Fawn Viewer
//!
//! Core of a real-time character viewer: load a model asynchronously with
//! progress, then play its animation clips one at a time from a render loop.
//!
//! ```rust,ignore
//! use fawn::prelude::*;
//!
//! let loader = AssetLoader::new(FileAssetReader::new("assets"));
//! let mut context = ViewerContext::default();
//! context.begin_load(&loader, "model/deer.glb")?;
//!
//! let mut render_loop = RenderLoop::new(HeadlessSurface::new(), FixedCamera);
//! let triggers = TriggerBinding::by_index(["idle", "die"]);
//!
//! loop {
//!     render_loop.tick(&mut context)?;
//!     if triggers.is_enabled(&context) {
//!         triggers.press(1, &mut context)?;
//!     }
//! }
//! ```
//!
//! Rendering, camera math and input widgets stay with the host; see
//! [`RenderSurface`] and [`CameraController`].

pub use fawn_animation as animation;
pub use fawn_app as app;
pub use fawn_assets as assets;

pub use fawn_animation::{
    AnimationAction, AnimationClip, AnimationController, ControllerState, LoopMode,
    ReadinessPolicy,
};
pub use fawn_app::{
    CameraController, FixedCamera, FrameView, HeadlessSurface, LoadStatus, LoopHandle,
    RenderLoop, RenderSurface, TriggerBinding, ViewerContext, ViewerSettings,
};
pub use fawn_assets::{
    Asset, AssetLoader, AssetReader, FileAssetReader, LoadEvent, LoadProgress, LoadTask,
    MemoryAssetReader, ModelNode,
};
pub use fawn_core::{AnimationError, AssetError, Error, Result, errors, time};

pub mod prelude {
    pub use crate::{
        AnimationController, AssetLoader, CameraController, FileAssetReader, FixedCamera,
        HeadlessSurface, LoadProgress, LoopMode, RenderLoop, RenderSurface, TriggerBinding,
        ViewerContext, ViewerSettings,
    };
    pub use glam::{Quat, Vec3};
}
