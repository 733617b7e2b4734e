//! # Tools
//!
//! Tools are how the pointer interacts with the image. Exactly one is active on a view at a time,
//! and it sees every click and non-panning motion after the view has worked out which pixel is
//! under the cursor.
//!
//! Tools don't get the whole view, only a [`ToolTarget`] with the pieces they are allowed to touch.
//! Switching tools is requested by [`ToolKind`] over a [`tool_channel`], and the view picks up at
//! most one request per frame.

mod empty;
mod pixel_color;
mod pixel_select;

pub use empty::EmptyTool;
pub use pixel_color::PixelColorTool;
pub use pixel_select::PixelSelectionTool;

use crate::events::{ClickEvent, MotionEvent};
use crate::layer::Layer;
use crate::render::PixelRegion;
use crate::selection::SelectionSet;
use crate::util::{Point, RangeError};

/// The parts of the view a tool may read and modify.
pub struct ToolTarget<'a> {
    /// Image-space pixel under the cursor. May be outside the image.
    pub mouse_pixel: Point,
    pub selection: &'a mut SelectionSet,
    /// Bottom to top.
    pub layers: &'a mut [Layer],
    pub paint_color: [u8; 4],
}
impl ToolTarget<'_> {
    pub fn select_pixel(&mut self, point: Point) -> Result<(), RangeError> {
        self.selection.select(point)
    }
    /// Paint a pixel of the topmost layer covering `point`.
    pub fn set_pixel(&mut self, point: Point, rgba: [u8; 4]) -> Result<PixelRegion, RangeError> {
        crate::layer::set_topmost_pixel(self.layers, point, rgba)
    }
}

pub trait Tool {
    fn on_click(&mut self, event: &ClickEvent, target: &mut ToolTarget<'_>);
    fn on_motion(&mut self, event: &MotionEvent, target: &mut ToolTarget<'_>);
    fn kind(&self) -> ToolKind;
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
    strum::IntoStaticStr,
    strum::AsRefStr,
)]
pub enum ToolKind {
    /// Does nothing with input, for just looking.
    #[default]
    #[strum(serialize = "None")]
    Empty,
    #[strum(serialize = "Select")]
    PixelSelection,
    #[strum(serialize = "Color")]
    PixelColor,
}
impl ToolKind {
    #[must_use]
    pub fn into_tool(self) -> Box<dyn Tool> {
        match self {
            Self::Empty => Box::new(EmptyTool),
            Self::PixelSelection => Box::new(PixelSelectionTool),
            Self::PixelColor => Box::new(PixelColorTool),
        }
    }
}
impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

pub type ToolSender = crossbeam::channel::Sender<ToolKind>;
pub type ToolReceiver = crossbeam::channel::Receiver<ToolKind>;

/// Unbounded, so requesting a tool never blocks the UI. Extra requests just wait their turn.
#[must_use]
pub fn tool_channel() -> (ToolSender, ToolReceiver) {
    crossbeam::channel::unbounded()
}
