//! # Tabula core
//!
//! Everything about viewing and editing an image that doesn't need a window: mapping window
//! coordinates onto image pixels, zoom and pan state, the pixel selection and its outline,
//! layers and the quad geometry they render as, and the tools that mutate them.
//!
//! Drawing goes through [`render::RenderBackend`], so the whole view can be driven and
//! inspected without a GPU.

pub mod coords;
pub mod events;
pub mod layer;
pub mod loader;
pub mod render;
pub mod selection;
pub mod status;
pub mod tools;
pub mod util;
pub mod view;
pub mod zoom;

pub use view::ImageView;
