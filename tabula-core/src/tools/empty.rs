use crate::events::{ClickEvent, MotionEvent};

/// Ignores all input. The view still pans and zooms underneath it.
pub struct EmptyTool;

impl super::Tool for EmptyTool {
    fn on_click(&mut self, _event: &ClickEvent, _target: &mut super::ToolTarget<'_>) {}
    fn on_motion(&mut self, _event: &MotionEvent, _target: &mut super::ToolTarget<'_>) {}
    fn kind(&self) -> super::ToolKind {
        super::ToolKind::Empty
    }
}
