use super::super::Action;
use super::KeyboardHotkey;
use winit::keyboard::KeyCode;

const fn plain(key: KeyCode) -> KeyboardHotkey {
    KeyboardHotkey {
        ctrl: false,
        alt: false,
        shift: false,
        key,
    }
}
const fn ctrl(key: KeyCode) -> KeyboardHotkey {
    KeyboardHotkey {
        ctrl: true,
        alt: false,
        shift: false,
        key,
    }
}

pub const KEYBOARD: &[(Action, &[KeyboardHotkey])] = &[
    (Action::ToolNone, &[plain(KeyCode::Digit1)]),
    (Action::ToolSelect, &[plain(KeyCode::Digit2)]),
    (Action::ToolColor, &[plain(KeyCode::Digit3)]),
    (Action::OpenFile, &[ctrl(KeyCode::KeyO)]),
    (Action::CenterImage, &[plain(KeyCode::KeyC)]),
    (
        Action::ZoomIn,
        &[plain(KeyCode::Equal), plain(KeyCode::NumpadAdd)],
    ),
    (
        Action::ZoomOut,
        &[plain(KeyCode::Minus), plain(KeyCode::NumpadSubtract)],
    ),
    (Action::Quit, &[ctrl(KeyCode::KeyQ)]),
];
