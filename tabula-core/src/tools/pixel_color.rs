use crate::events::{ButtonMask, ClickEvent, MotionEvent, MouseButton};

/// Paints the pixel under the cursor with the paint color, on the topmost layer that covers it.
pub struct PixelColorTool;

impl PixelColorTool {
    fn paint(target: &mut super::ToolTarget<'_>) {
        let (point, color) = (target.mouse_pixel, target.paint_color);
        if let Err(e) = target.set_pixel(point, color) {
            log::debug!("not painting: {e}");
        }
    }
}
impl super::Tool for PixelColorTool {
    fn on_click(&mut self, event: &ClickEvent, target: &mut super::ToolTarget<'_>) {
        if event.is_press(MouseButton::Left) {
            Self::paint(target);
        }
    }
    fn on_motion(&mut self, event: &MotionEvent, target: &mut super::ToolTarget<'_>) {
        if event.held == ButtonMask::LEFT {
            Self::paint(target);
        }
    }
    fn kind(&self) -> super::ToolKind {
        super::ToolKind::PixelColor
    }
}
