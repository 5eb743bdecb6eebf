//! Discrete, edge-triggered operator commands and their key bindings

use std::collections::HashMap;

use crate::handle::HandleMode;
use crate::preset::ViewPreset;
use crate::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    ToggleMovement,
    HandleMode(HandleMode),
    ToggleHandleVisible,
    ViewPreset(ViewPreset),
    CopyPoseToTarget,
    ToggleLookAtTarget,
}

impl Trigger {
    pub fn all() -> Vec<Trigger> {
        let mut all = vec![
            Trigger::ToggleMovement,
            Trigger::HandleMode(HandleMode::Rotate),
            Trigger::HandleMode(HandleMode::Translate),
            Trigger::HandleMode(HandleMode::Scale),
            Trigger::ToggleHandleVisible,
            Trigger::CopyPoseToTarget,
            Trigger::ToggleLookAtTarget,
        ];
        all.extend(ViewPreset::ALL.into_iter().map(Trigger::ViewPreset));
        all
    }

    /// Name used in the `[keys]` configuration table
    pub fn name(&self) -> String {
        match self {
            Trigger::ToggleMovement => "toggle_movement".to_string(),
            Trigger::HandleMode(mode) => mode.to_string(),
            Trigger::ToggleHandleVisible => "toggle_handle".to_string(),
            Trigger::ViewPreset(preset) => format!("preset_{}", preset.number()),
            Trigger::CopyPoseToTarget => "copy_pose".to_string(),
            Trigger::ToggleLookAtTarget => "toggle_look_at".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Trigger::all()
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| CoreError::UnknownTrigger(name.to_string()))
    }
}

/// Key character to trigger map
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    keys: HashMap<char, Trigger>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = HashMap::new();
        keys.insert('m', Trigger::ToggleMovement);
        keys.insert('r', Trigger::HandleMode(HandleMode::Rotate));
        keys.insert('g', Trigger::HandleMode(HandleMode::Translate));
        keys.insert('s', Trigger::HandleMode(HandleMode::Scale));
        keys.insert('e', Trigger::ToggleHandleVisible);
        keys.insert('c', Trigger::CopyPoseToTarget);
        keys.insert('t', Trigger::ToggleLookAtTarget);
        for preset in ViewPreset::ALL {
            let key = char::from(b'0' + preset.number());
            keys.insert(key, Trigger::ViewPreset(preset));
        }
        Self { keys }
    }
}

impl KeyBindings {
    /// Trigger for a typed character; letters match either case
    pub fn trigger_for(&self, key: char) -> Option<Trigger> {
        self.keys
            .get(&key)
            .or_else(|| self.keys.get(&key.to_ascii_lowercase()))
            .copied()
    }

    pub fn key_for(&self, trigger: Trigger) -> Option<char> {
        self.keys
            .iter()
            .find(|(_, t)| **t == trigger)
            .map(|(k, _)| *k)
    }

    /// Bind `key` to `trigger`, dropping the trigger's previous key and
    /// whatever `key` was bound to before.
    pub fn bind(&mut self, key: char, trigger: Trigger) {
        self.keys.retain(|_, t| *t != trigger);
        self.keys.insert(key, trigger);
    }

    /// Apply `trigger name -> key` overrides from configuration
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, key) in overrides {
            let trigger = Trigger::from_name(name)?;
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(CoreError::InvalidKeyBinding {
                    trigger: name.clone(),
                    key: key.clone(),
                });
            };
            self.bind(c.to_ascii_lowercase(), trigger);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.trigger_for('m'), Some(Trigger::ToggleMovement));
        assert_eq!(keys.trigger_for('r'), Some(Trigger::HandleMode(HandleMode::Rotate)));
        assert_eq!(keys.trigger_for('g'), Some(Trigger::HandleMode(HandleMode::Translate)));
        assert_eq!(keys.trigger_for('s'), Some(Trigger::HandleMode(HandleMode::Scale)));
        assert_eq!(keys.trigger_for('e'), Some(Trigger::ToggleHandleVisible));
        assert_eq!(keys.trigger_for('1'), Some(Trigger::ViewPreset(ViewPreset::Top)));
        assert_eq!(
            keys.trigger_for('5'),
            Some(Trigger::ViewPreset(ViewPreset::PerspectiveOpposite))
        );
        assert_eq!(keys.trigger_for('M'), Some(Trigger::ToggleMovement));
        assert_eq!(keys.trigger_for('x'), None);
    }

    #[test]
    fn test_names_round_trip() {
        for trigger in Trigger::all() {
            assert_eq!(Trigger::from_name(&trigger.name()), Ok(trigger));
        }
        assert!(Trigger::from_name("warp_drive").is_err());
    }

    #[test]
    fn test_mode_triggers_hash_apart() {
        let set: std::collections::HashSet<Trigger> = Trigger::all().into_iter().collect();
        assert_eq!(set.len(), Trigger::all().len());
        assert!(set.contains(&Trigger::HandleMode(HandleMode::Scale)));
        assert!(set.contains(&Trigger::ViewPreset(ViewPreset::Top)));
    }

    #[test]
    fn test_override_moves_binding() {
        let mut keys = KeyBindings::default();
        let overrides: HashMap<String, String> =
            [("rotate".to_string(), "q".to_string())].into_iter().collect();
        keys.apply_overrides(&overrides).unwrap();

        assert_eq!(keys.trigger_for('q'), Some(Trigger::HandleMode(HandleMode::Rotate)));
        assert_eq!(keys.trigger_for('r'), None);
        assert_eq!(keys.key_for(Trigger::HandleMode(HandleMode::Rotate)), Some('q'));
    }

    #[test]
    fn test_override_rejects_multi_char_keys() {
        let mut keys = KeyBindings::default();
        let overrides: HashMap<String, String> =
            [("rotate".to_string(), "ctrl+r".to_string())].into_iter().collect();
        let err = keys.apply_overrides(&overrides).unwrap_err();
        assert!(matches!(err, CoreError::InvalidKeyBinding { .. }));
    }
}
