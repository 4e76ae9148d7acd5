use fawn_core::errors::{AnimationError, Result};
use smallvec::SmallVec;

use crate::context::ViewerContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerTarget {
    /// Plays the clip at this position in the model.
    Index(usize),
    /// Plays the clip with this name.
    Clip(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub name: String,
    pub target: TriggerTarget,
}

/// Ordered named controls mapped to clip activations.
///
/// Presses are only meaningful once the viewer is ready; before that they
/// fail with [`AnimationError::NotReady`] so the host can keep its controls
/// disabled via [`is_enabled`](Self::is_enabled).
#[derive(Debug, Clone, Default)]
pub struct TriggerBinding {
    controls: SmallVec<[Control; 4]>,
}

impl TriggerBinding {
    /// Control `i` plays clip `i`.
    pub fn by_index<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let controls = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Control {
                name: name.into(),
                target: TriggerTarget::Index(index),
            })
            .collect();
        Self { controls }
    }

    /// Each control plays the clip sharing its name.
    pub fn by_clip_name<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let controls = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                Control {
                    target: TriggerTarget::Clip(name.clone()),
                    name,
                }
            })
            .collect();
        Self { controls }
    }

    #[must_use]
    pub fn with_control(mut self, name: impl Into<String>, target: TriggerTarget) -> Self {
        self.controls.push(Control {
            name: name.into(),
            target,
        });
        self
    }

    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    #[must_use]
    pub fn position(&self, control_name: &str) -> Option<usize> {
        self.controls.iter().position(|c| c.name == control_name)
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self, context: &ViewerContext) -> bool {
        context.is_ready()
    }

    /// Fires control `control`.
    pub fn press(&self, control: usize, context: &mut ViewerContext) -> Result<()> {
        if !context.is_ready() {
            return Err(AnimationError::NotReady.into());
        }
        let entry = self.controls.get(control).ok_or(AnimationError::IndexOutOfRange {
            index: control,
            len: self.controls.len(),
        })?;

        log::debug!("Trigger '{}' pressed", entry.name);
        match &entry.target {
            TriggerTarget::Index(index) => context.playback_mut().play(*index),
            TriggerTarget::Clip(clip) => context.playback_mut().play_by_name(clip),
        }
    }

    /// Fires the control called `control_name`.
    pub fn press_named(&self, control_name: &str, context: &mut ViewerContext) -> Result<()> {
        let control = self
            .position(control_name)
            .ok_or_else(|| AnimationError::UnknownControl(control_name.to_string()))?;
        self.press(control, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fawn_animation::AnimationClip;
    use fawn_assets::{Asset, ModelNode};
    use fawn_core::Error;

    fn ready_context() -> ViewerContext {
        let mut context = ViewerContext::default();
        context.on_asset_loaded(Asset {
            name: "deer".into(),
            root: ModelNode::new("Armature"),
            clips: vec![
                AnimationClip::new("idle", Vec::new()).with_duration(2.0),
                AnimationClip::new("die", Vec::new()).with_duration(1.0),
            ],
        });
        context
    }

    #[test]
    fn disabled_until_ready() {
        let binding = TriggerBinding::by_index(["button-idle", "button-die"]);
        let mut context = ViewerContext::default();
        assert!(!binding.is_enabled(&context));
        assert!(matches!(
            binding.press(0, &mut context),
            Err(Error::Animation(AnimationError::NotReady))
        ));
    }

    #[test]
    fn index_binding_plays_matching_position() {
        let binding = TriggerBinding::by_index(["button-idle", "button-die"]);
        let mut context = ready_context();
        binding.press_named("button-die", &mut context).unwrap();
        assert_eq!(context.playback().active_index(), Some(1));
    }

    #[test]
    fn name_binding_ignores_order() {
        let binding = TriggerBinding::by_clip_name(["die", "idle"]);
        let mut context = ready_context();
        binding.press(0, &mut context).unwrap();
        assert_eq!(context.playback().active_index(), Some(1));
    }

    #[test]
    fn missing_clip_behind_a_known_control_is_a_clip_error() {
        let binding = TriggerBinding::by_clip_name(["gallop"]);
        let mut context = ready_context();
        assert!(matches!(
            binding.press_named("gallop", &mut context),
            Err(Error::Animation(AnimationError::UnknownClip(name))) if name == "gallop"
        ));
    }

    #[test]
    fn unknown_control_is_rejected() {
        let binding = TriggerBinding::by_index(["only"]);
        let mut context = ready_context();
        assert!(matches!(
            binding.press(3, &mut context),
            Err(Error::Animation(AnimationError::IndexOutOfRange { index: 3, len: 1 }))
        ));
        assert!(matches!(
            binding.press_named("missing", &mut context),
            Err(Error::Animation(AnimationError::UnknownControl(name))) if name == "missing"
        ));
    }
}
