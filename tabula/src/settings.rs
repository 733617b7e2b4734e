//! User settings, saved as TOML in the platform preferences directory.

use crate::actions::hotkeys::{ActionsToKeys, KeysToActions};
use tabula_core::tools::ToolKind;

const DOCUMENTATION: &str = r#"# Tabula settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive. Delete it to restore the defaults.

# [window] width and height are the initial window size, in logical pixels.
# [view] colors are RGBA, 0.0 to 1.0. max_texture_dimension optionally caps how large a zoomed
#   image may get, below what the graphics device allows.
# [tools] paint_color is RGBA, 0 to 255. initial is one of "Empty", "PixelSelection", "PixelColor".

# [hotkeys.<Action>] keyboard hotkeys are written `[ctrl+][alt+][shift+]<winit key code>`.
# Each action may have many hotkeys, but each hotkey may only be used once.
# See https://docs.rs/winit/latest/winit/keyboard/enum.KeyCode.html for a list of key codes.

# Example:
# [hotkeys.ZoomIn]
# keyboard = ["Equal", "ctrl+KeyK"]

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
}
impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ViewSettings {
    pub max_texture_dimension: Option<u32>,
    pub outline_color: [f32; 4],
    pub background: [f32; 4],
}
impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            max_texture_dimension: None,
            outline_color: [1.0, 1.0, 1.0, 1.0],
            background: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ToolSettings {
    pub paint_color: [u8; 4],
    pub initial: ToolKind,
}
impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            paint_color: [0xFF, 0x00, 0xFF, 0xFF],
            initial: ToolKind::Empty,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub view: ViewSettings,
    pub tools: ToolSettings,
    pub hotkeys: ActionsToKeys,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoadState {
    Loaded,
    /// No file yet, the defaults are in use.
    Missing,
    /// A file exists but couldn't be used, the defaults are in use.
    Malformed,
}

impl Settings {
    const FILENAME: &'static str = "settings.toml";

    #[must_use]
    pub fn path() -> Option<std::path::PathBuf> {
        let mut dir = preferences_dir()?;
        dir.push(Self::FILENAME);
        Some(dir)
    }
    /// Load from the preferences dir, falling back on defaults.
    #[must_use]
    pub fn load() -> (Self, LoadState) {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("No preferences dir found, using default settings.");
                (Self::default(), LoadState::Missing)
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> (Self, LoadState) {
        let string = match std::fs::read_to_string(path) {
            Ok(string) => string,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return (Self::default(), LoadState::Missing);
            }
            Err(e) => {
                log::warn!("Failed to read {}, using defaults: {e}", path.display());
                return (Self::default(), LoadState::Malformed);
            }
        };
        match Self::parse(&string) {
            Ok(settings) => (settings, LoadState::Loaded),
            Err(e) => {
                log::warn!("Failed to parse {}, using defaults:\n{e:#}", path.display());
                (Self::default(), LoadState::Malformed)
            }
        }
    }
    /// Parse and validate settings text.
    pub fn parse(string: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(string)?;
        // Bindings have to be unambiguous.
        KeysToActions::try_from(&settings.hotkeys)?;
        Ok(settings)
    }
    /// The reverse hotkey mapping. Always valid for settings that came through [`Self::parse`]
    /// or [`Default`].
    pub fn keys_to_actions(&self) -> anyhow::Result<KeysToActions> {
        Ok(KeysToActions::try_from(&self.hotkeys)?)
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Not recursive. If the platform dir itself is missing, the user probably has a good reason.
        // Already existing is fine, anything worse shows up on write.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
    #[must_use]
    pub fn view_config(&self) -> tabula_core::view::ViewConfig {
        tabula_core::view::ViewConfig {
            max_texture_dimension: self.view.max_texture_dimension,
            outline_color: self.view.outline_color,
            paint_color: self.tools.paint_color,
            initial_tool: self.tools.initial,
        }
    }
}
