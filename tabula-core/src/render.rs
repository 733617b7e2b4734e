//! # Render
//!
//! The interface the view draws through. The core never talks to a GPU directly, it hands
//! vertices and pixel bytes to a [`RenderBackend`] and gets opaque [`TextureHandle`]s back.
//!
//! All positions handed to the backend are in pixels relative to the most recent
//! [`RenderBackend::set_viewport`] rect, +Y down. Converting to clip space is the backend's job.

use crate::util::Rect;

/// One corner of a textured quad.
#[derive(Copy, Clone, PartialEq, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}
/// One end of an outline segment.
#[derive(Copy, Clone, PartialEq, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct LineVertex {
    pub position: [f32; 2],
}

/// Owning reference to a backend texture. Not `Clone`: there is exactly one owner, and it must
/// give the handle back through [`RenderBackend::destroy_texture`].
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct TextureHandle(u64);
impl TextureHandle {
    /// For use by backend implementations only.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A region of a texture, in texels.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}
impl PixelRegion {
    #[must_use]
    pub fn single(x: u32, y: u32) -> Self {
        Self { x, y, w: 1, h: 1 }
    }
    /// Smallest region covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        Self {
            x,
            y,
            w: right - x,
            h: bottom - y,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("{width}x{height} texture exceeds the device limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },
    #[error("zero-sized texture")]
    Empty,
    #[error("backend error: {0}")]
    Backend(String),
}

pub trait RenderBackend {
    /// Largest width or height a texture can have.
    fn max_texture_dimension(&self) -> u32;
    /// Create an RGBA8 texture from tightly packed rows.
    fn upload_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError>;
    /// Replace a region of an existing texture. `rgba` holds exactly the region's texels.
    fn update_subregion(&mut self, texture: &TextureHandle, region: PixelRegion, rgba: &[u8]);
    fn destroy_texture(&mut self, texture: TextureHandle);
    /// Window-space rect subsequent draws are positioned in and clipped to.
    fn set_viewport(&mut self, viewport: Rect);
    /// Draw a triangle list sampling from `texture`.
    fn draw_triangles(&mut self, texture: &TextureHandle, vertices: &[QuadVertex]);
    /// Draw a line list in a flat color.
    fn draw_lines(&mut self, vertices: &[LineVertex], color: [f32; 4]);
    /// Fill a triangle list with a screen-aligned checkerboard, for transparent pixels to show up
    /// against. Texture coordinates are ignored.
    fn draw_checkerboard(&mut self, vertices: &[QuadVertex]);
}
