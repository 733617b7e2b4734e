//! Input events, as delivered to the view. Positions are window-space pixels.
//!
//! These are deliberately windowing-library agnostic, the app converts into them.

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}
impl MouseButton {
    /// The bit for this button, or empty for buttons nothing tracks.
    #[must_use]
    pub fn mask(self) -> ButtonMask {
        match self {
            Self::Left => ButtonMask::LEFT,
            Self::Middle => ButtonMask::MIDDLE,
            Self::Right => ButtonMask::RIGHT,
            Self::Other(_) => ButtonMask::empty(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ButtonState {
    Pressed,
    Released,
}

bitflags::bitflags! {
    /// Set of mouse buttons currently held.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ButtonMask: u8 {
        const LEFT = 0b001;
        const MIDDLE = 0b010;
        const RIGHT = 0b100;
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ClickEvent {
    pub position: ultraviolet::Vec2,
    pub button: MouseButton,
    pub state: ButtonState,
}
impl ClickEvent {
    #[must_use]
    pub fn is_press(&self, button: MouseButton) -> bool {
        self.button == button && self.state == ButtonState::Pressed
    }
    #[must_use]
    pub fn is_release(&self, button: MouseButton) -> bool {
        self.button == button && self.state == ButtonState::Released
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MotionEvent {
    pub position: ultraviolet::Vec2,
    /// Buttons held at the time of the motion.
    pub held: ButtonMask,
}

/// Wheel motion. Positive is away from the user, in notches.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ScrollEvent {
    pub delta: f32,
}

/// Tracks held buttons from a stream of click events, for backends that only report
/// transitions.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ButtonTracker {
    held: ButtonMask,
}
impl ButtonTracker {
    pub fn update(&mut self, button: MouseButton, state: ButtonState) {
        self.held.set(button.mask(), state == ButtonState::Pressed);
    }
    #[must_use]
    pub fn held(&self) -> ButtonMask {
        self.held
    }
    /// Everything released, such as when the cursor leaves the window.
    pub fn clear(&mut self) {
        self.held = ButtonMask::empty();
    }
}

#[cfg(test)]
mod test {
    use super::{ButtonMask, ButtonState, ButtonTracker, MouseButton};
    #[test]
    fn tracker() {
        let mut tracker = ButtonTracker::default();
        tracker.update(MouseButton::Left, ButtonState::Pressed);
        tracker.update(MouseButton::Right, ButtonState::Pressed);
        // Unknown buttons don't disturb anything
        tracker.update(MouseButton::Other(8), ButtonState::Pressed);
        assert_eq!(tracker.held(), ButtonMask::LEFT | ButtonMask::RIGHT);
        tracker.update(MouseButton::Left, ButtonState::Released);
        assert_eq!(tracker.held(), ButtonMask::RIGHT);
        tracker.clear();
        assert!(tracker.held().is_empty());
    }
}
