//! Viewer Context
//!
//! [`ViewerContext`] is the single owner of the viewer's playback state for
//! the viewer's lifetime: the in-flight [`LoadTask`], the
//! [`AnimationController`] and, once ready, the model hierarchy. The render
//! loop and trigger bindings receive it by reference; there is no global
//! state.
//!
//! Readiness is derived from the controller: the viewer is ready exactly
//! when the clip table has been built from a successfully loaded asset.
//! A failed load leaves the context not ready for good.

use fawn_animation::AnimationController;
use fawn_assets::{Asset, AssetLoader, AssetReader, LoadEvent, LoadProgress, LoadTask, ModelNode};
use fawn_core::errors::{AnimationError, AssetError, Error, Result};

use crate::settings::ViewerSettings;

#[derive(Debug)]
pub enum LoadStatus {
    /// No load has been started.
    Idle,
    /// A load is in flight; `progress` holds the latest report.
    Loading { progress: Option<LoadProgress> },
    Ready,
    /// Terminal for this viewer; no retry happens. Holds the load error, or
    /// the animation error when the loaded clips could not be adopted.
    Failed(Error),
}

impl LoadStatus {
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed(_))
    }
}

pub struct ViewerContext {
    playback: AnimationController,
    status: LoadStatus,
    task: Option<LoadTask>,
    model: Option<ModelNode>,
    autoplay: Option<String>,
}

impl Default for ViewerContext {
    fn default() -> Self {
        Self::new(AnimationController::new())
    }
}

impl ViewerContext {
    #[must_use]
    pub fn new(playback: AnimationController) -> Self {
        Self {
            playback,
            status: LoadStatus::Idle,
            task: None,
            model: None,
            autoplay: None,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        let mut context = Self::new(settings.controller());
        context.autoplay.clone_from(&settings.autoplay);
        context
    }

    /// Clip to play as soon as the model is ready.
    #[must_use]
    pub fn with_autoplay(mut self, clip: impl Into<String>) -> Self {
        self.autoplay = Some(clip.into());
        self
    }

    /// Starts loading the model. Replaces (and cancels) a pending load.
    ///
    /// Fails with [`AnimationError::AlreadyBuilt`] when the controller
    /// already holds clips, since a loaded model could never be adopted.
    pub fn begin_load<R: AssetReader>(&mut self, loader: &AssetLoader<R>, path: &str) -> Result<()> {
        if self.playback.is_built() {
            return Err(AnimationError::AlreadyBuilt.into());
        }
        self.track_load(loader.load(path));
        Ok(())
    }

    /// Adopts a task started elsewhere.
    pub fn track_load(&mut self, task: LoadTask) {
        if let Some(previous) = self.task.replace(task) {
            log::warn!("Replacing pending load of '{}'", previous.path());
        }
        self.status = LoadStatus::Loading { progress: None };
    }

    /// Drains every load event that is ready. Never blocks.
    ///
    /// Returns `true` when this call moved the context into a terminal
    /// state (ready or failed).
    pub fn poll_load(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };

        while let Some(event) = task.try_next_event() {
            match event {
                LoadEvent::Progress(progress) => {
                    log::debug!(
                        "'{}': {:.0}% loaded",
                        task.path(),
                        progress.fraction() * 100.0
                    );
                    self.status = LoadStatus::Loading {
                        progress: Some(progress),
                    };
                }
                LoadEvent::Loaded(asset) => {
                    self.task = None;
                    self.on_asset_loaded(asset);
                    return true;
                }
                LoadEvent::Failed(err) => {
                    self.task = None;
                    self.on_load_failed(err);
                    return true;
                }
            }
        }
        false
    }

    /// Success path: builds the clip table and marks the viewer ready.
    pub fn on_asset_loaded(&mut self, asset: Asset) {
        let name = asset.name.clone();
        let (root, clips) = asset.into_parts();
        if let Err(err) = self.playback.build(clips) {
            log::error!("Cannot adopt model '{name}': {err}");
            self.status = LoadStatus::Failed(err);
            return;
        }

        self.model = Some(root);
        self.status = LoadStatus::Ready;
        log::info!("Viewer ready with model '{name}'");

        if let Some(clip) = self.autoplay.take()
            && let Err(err) = self.playback.play_by_name(&clip)
        {
            log::warn!("Autoplay of '{clip}' skipped: {err}");
        }
    }

    /// Failure path: records the error; the viewer stays not ready.
    pub fn on_load_failed(&mut self, err: AssetError) {
        log::error!("Model load failed: {err}");
        self.status = LoadStatus::Failed(err.into());
    }

    /// Cancels the in-flight load, if any.
    pub fn cancel_load(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            self.status =
                LoadStatus::Failed(AssetError::Cancelled(task.path().to_string()).into());
        }
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<&ModelNode> {
        self.model.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn playback(&self) -> &AnimationController {
        &self.playback
    }

    #[inline]
    pub fn playback_mut(&mut self) -> &mut AnimationController {
        &mut self.playback
    }
}

impl Drop for ViewerContext {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            log::debug!("Viewer disposed, cancelling load of '{}'", task.path());
            task.cancel();
        }
    }
}
