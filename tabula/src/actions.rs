//! # Actions
//!
//! Things the user can ask for by hotkey, and the queue of work that has to wait until the view is
//! free to be borrowed.

pub mod hotkeys;

use tabula_core::render::RenderBackend;
use tabula_core::tools::ToolKind;
use tabula_core::ImageView;

#[derive(
    serde::Serialize,
    serde::Deserialize,
    Hash,
    PartialEq,
    Eq,
    strum::AsRefStr,
    strum::EnumIter,
    Clone,
    Copy,
    Debug,
)]
pub enum Action {
    ToolNone,
    ToolSelect,
    ToolColor,

    OpenFile,
    CenterImage,
    ZoomIn,
    ZoomOut,

    Quit,
}
impl Action {
    /// The tool this action switches to, if it's a tool action.
    #[must_use]
    pub fn tool(self) -> Option<ToolKind> {
        match self {
            Self::ToolNone => Some(ToolKind::Empty),
            Self::ToolSelect => Some(ToolKind::PixelSelection),
            Self::ToolColor => Some(ToolKind::PixelColor),
            _ => None,
        }
    }
}

/// Work to run against the view between frames, once nothing else has it borrowed.
pub type Deferred = Box<dyn FnOnce(&mut ImageView, &mut dyn RenderBackend) + Send>;

#[derive(Clone)]
pub struct DeferredSender(crossbeam::channel::Sender<Deferred>);
impl DeferredSender {
    pub fn defer(&self, action: impl FnOnce(&mut ImageView, &mut dyn RenderBackend) + Send + 'static) {
        // Only fails if the window is gone, in which case there's nothing left to act on.
        let _ = self.0.send(Box::new(action));
    }
}
pub struct DeferredQueue(crossbeam::channel::Receiver<Deferred>);
impl DeferredQueue {
    /// Run everything queued so far, in order.
    pub fn drain(&self, view: &mut ImageView, backend: &mut dyn RenderBackend) {
        for action in self.0.try_iter() {
            action(view, backend);
        }
    }
}
#[must_use]
pub fn deferred_queue() -> (DeferredSender, DeferredQueue) {
    let (send, recv) = crossbeam::channel::unbounded();
    (DeferredSender(send), DeferredQueue(recv))
}

/// File extensions offered by the open dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "tif", "tiff", "webp", "tga", "qoi", "pnm", "pbm",
    "pgm", "ppm", "exr", "hdr", "ff",
];

/// Ask the user for an image. None if they cancelled.
#[must_use]
pub fn pick_image_file() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

#[cfg(test)]
mod test {
    use super::Action;
    use strum::IntoEnumIterator;
    #[test]
    fn every_action_has_a_default_key() {
        let keys = super::hotkeys::ActionsToKeys::default();
        for action in Action::iter() {
            assert!(!keys.keys_of(action).is_empty(), "{}", action.as_ref());
        }
    }
    #[test]
    fn tool_actions() {
        let tools: Vec<_> = Action::iter().filter_map(Action::tool).collect();
        assert_eq!(tools.len(), 3);
    }
}
