//! Viewer configuration.
//!
//! [`ViewerSettings`] gathers everything the host can tune without code:
//! window, model source, trigger layout and playback policy. It can be
//! built in code or read from a JSON file; missing fields take defaults.
//!
//! ```json
//! {
//!   "title": "Deer",
//!   "model_path": "model/deer.glb",
//!   "triggers": ["idle", "die"],
//!   "loop_mode": "loop",
//!   "readiness": "skip"
//! }
//! ```

use std::path::{Path, PathBuf};

use fawn_animation::{AnimationController, LoopMode, ReadinessPolicy};
use fawn_assets::DEFAULT_CHUNK_SIZE;
use fawn_core::errors::Result;
use serde::{Deserialize, Serialize};

use crate::trigger::TriggerBinding;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    // === Window ===
    pub title: String,
    pub width: u32,
    pub height: u32,

    // === Model ===
    /// Directory model paths are resolved against.
    pub asset_root: PathBuf,
    /// Model path relative to `asset_root`.
    pub model_path: String,
    /// Read granularity; one progress event is reported per chunk.
    pub chunk_size: usize,

    // === Playback ===
    /// Ordered control names. Control `i` plays clip `i`, or the clip with
    /// the same name when `bind_triggers_by_name` is set.
    pub triggers: Vec<String>,
    pub bind_triggers_by_name: bool,
    /// Clip to start as soon as the model is ready.
    pub autoplay: Option<String>,
    pub loop_mode: LoopMode,
    pub readiness: ReadinessPolicy,

    // === Headless loop ===
    /// Tick spacing for [`RenderLoop::run_headless`](crate::RenderLoop::run_headless).
    pub frame_interval_ms: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            title: "Fawn Viewer".into(),
            width: 1280,
            height: 720,
            asset_root: PathBuf::from("."),
            model_path: "model/deer.glb".into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            triggers: vec!["idle".into(), "die".into()],
            bind_triggers_by_name: false,
            autoplay: None,
            loop_mode: LoopMode::Loop,
            readiness: ReadinessPolicy::Skip,
            frame_interval_ms: 16,
        }
    }
}

impl ViewerSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&text)?;
        log::info!("Loaded viewer settings from {}", path.as_ref().display());
        Ok(settings)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, asset_root: impl Into<PathBuf>, model_path: impl Into<String>) -> Self {
        self.asset_root = asset_root.into();
        self.model_path = model_path.into();
        self
    }

    #[must_use]
    pub fn with_triggers<I, T>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_autoplay(mut self, clip: impl Into<String>) -> Self {
        self.autoplay = Some(clip.into());
        self
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// An unbuilt controller configured from these settings.
    #[must_use]
    pub fn controller(&self) -> AnimationController {
        AnimationController::new()
            .with_policy(self.readiness)
            .with_loop_mode(self.loop_mode)
    }

    #[must_use]
    pub fn trigger_binding(&self) -> TriggerBinding {
        if self.bind_triggers_by_name {
            TriggerBinding::by_clip_name(self.triggers.iter().cloned())
        } else {
            TriggerBinding::by_index(self.triggers.iter().cloned())
        }
    }

    #[must_use]
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = ViewerSettings::from_json_str(
            r#"{ "model_path": "model/stag.rig.json", "loop_mode": "once", "readiness": "fail_fast" }"#,
        )
        .unwrap();

        assert_eq!(settings.model_path, "model/stag.rig.json");
        assert_eq!(settings.loop_mode, LoopMode::Once);
        assert_eq!(settings.readiness, ReadinessPolicy::FailFast);
        assert_eq!(settings.triggers, vec!["idle", "die"]);
        assert_eq!(settings.width, 1280);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ViewerSettings::from_json_str("{ \"width\": \"wide\" }").is_err());
    }
}
