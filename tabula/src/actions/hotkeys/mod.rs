//! Keyboard hotkeys.
//!
//! Actions can have many hotkeys bound to them, and each hotkey can be bound to at most one action.
//! On disk the one-to-many relation of actions to keys is easier for the user to edit, so that's
//! what gets stored. The reverse many-to-one mapping is built from it on load.

mod defaults;

use super::Action;

#[derive(Hash, PartialEq, Eq, Clone, Debug, Copy)]
pub struct KeyboardHotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: winit::keyboard::KeyCode,
}
impl serde::Serialize for KeyboardHotkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Human-readable string rather than a struct, so the file stays pleasant to edit.
        let text = self.try_to_string().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}
impl<'de> serde::Deserialize<'de> for KeyboardHotkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}
impl KeyboardHotkey {
    /// Name of the key code variant, such as `"KeyZ"`.
    fn key_name(key: winit::keyboard::KeyCode) -> Result<String, KeyboardHotkeyError> {
        // KeyCode serializes as its bare variant name, borrow toml's serializer to read it out.
        match toml::Value::try_from(key) {
            Ok(toml::Value::String(name)) => Ok(name),
            _ => Err(KeyboardHotkeyError::UnnamedKey),
        }
    }
    /// Formatted as `[ctrl+][alt+][shift+]<winit key name>`, suitable for [`std::str::FromStr`].
    pub fn try_to_string(&self) -> Result<String, KeyboardHotkeyError> {
        let mut text = String::new();
        if self.ctrl {
            text.push_str("ctrl+");
        }
        if self.alt {
            text.push_str("alt+");
        }
        if self.shift {
            text.push_str("shift+");
        }
        text.push_str(&Self::key_name(self.key)?);
        Ok(text)
    }
}
#[derive(Debug, thiserror::Error)]
pub enum KeyboardHotkeyError {
    #[error("unrecognized key name {0:?}")]
    InvalidKeyName(String),
    #[error("key has no name")]
    UnnamedKey,
}
/// Parse from syntax `[ctrl+][alt+][shift+]<winit key name>`, case-sensitive.
impl std::str::FromStr for KeyboardHotkey {
    type Err = KeyboardHotkeyError;
    fn from_str(mut str: &str) -> Result<Self, Self::Err> {
        let mut take_if_has = |prefix: &str| -> bool {
            if let Some(rest) = str.strip_prefix(prefix) {
                str = rest;
                true
            } else {
                false
            }
        };
        let ctrl = take_if_has("ctrl+");
        let alt = take_if_has("alt+");
        let shift = take_if_has("shift+");
        let key = toml::Value::String(str.to_owned())
            .try_into()
            .map_err(|_| KeyboardHotkeyError::InvalidKeyName(str.to_owned()))?;

        Ok(Self {
            ctrl,
            alt,
            shift,
            key,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HotkeyCollection {
    #[serde(default)]
    pub keyboard: Vec<KeyboardHotkey>,
}

/// Maps each action onto potentially many hotkeys.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActionsToKeys(hashbrown::HashMap<Action, HotkeyCollection>);
impl Default for ActionsToKeys {
    fn default() -> Self {
        let keys_map = defaults::KEYBOARD
            .iter()
            .map(|(action, keys)| {
                (
                    *action,
                    HotkeyCollection {
                        keyboard: keys.to_vec(),
                    },
                )
            })
            .collect();
        let new = Self(keys_map);
        debug_assert!(KeysToActions::try_from(&new).is_ok());
        new
    }
}
impl ActionsToKeys {
    pub fn keys_of(&self, action: Action) -> &[KeyboardHotkey] {
        self.0
            .get(&action)
            .map_or(&[], |collection| collection.keyboard.as_slice())
    }
}

/// Derived from [`ActionsToKeys`], maps each hotkey onto at most one action.
#[derive(Debug)]
pub struct KeysToActions(hashbrown::HashMap<KeyboardHotkey, Action>);
#[derive(thiserror::Error, Debug)]
pub enum KeysToActionsError {
    /// Only the first two encountered (in arbitrary order) are reported.
    #[error("hotkey {key:?} used for more than one action: {actions:?}")]
    DuplicateBinding {
        key: KeyboardHotkey,
        actions: [Action; 2],
    },
}
impl TryFrom<&ActionsToKeys> for KeysToActions {
    type Error = KeysToActionsError;
    fn try_from(value: &ActionsToKeys) -> Result<Self, Self::Error> {
        let mut new = KeysToActions(hashbrown::HashMap::default());

        for (action, keys) in &value.0 {
            for key in &keys.keyboard {
                if let Some(old) = new.0.insert(*key, *action) {
                    return Err(KeysToActionsError::DuplicateBinding {
                        key: *key,
                        actions: [*action, old],
                    });
                }
            }
        }

        Ok(new)
    }
}
impl KeysToActions {
    #[must_use]
    pub fn action_of(&self, key: &KeyboardHotkey) -> Option<Action> {
        self.0.get(key).copied()
    }
}
