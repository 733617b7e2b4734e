use crate::events::{ButtonMask, ClickEvent, MotionEvent, MouseButton};

/// Adds the pixel under the cursor to the selection while the left button is down.
pub struct PixelSelectionTool;

impl PixelSelectionTool {
    fn select(target: &mut super::ToolTarget<'_>) {
        if let Err(e) = target.select_pixel(target.mouse_pixel) {
            log::debug!("not selecting: {e}");
        }
    }
}
impl super::Tool for PixelSelectionTool {
    fn on_click(&mut self, event: &ClickEvent, target: &mut super::ToolTarget<'_>) {
        if event.is_press(MouseButton::Left) {
            Self::select(target);
        }
    }
    fn on_motion(&mut self, event: &MotionEvent, target: &mut super::ToolTarget<'_>) {
        if event.held == ButtonMask::LEFT {
            Self::select(target);
        }
    }
    fn kind(&self) -> super::ToolKind {
        super::ToolKind::PixelSelection
    }
}
