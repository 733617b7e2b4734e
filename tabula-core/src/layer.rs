//! # Layers
//!
//! A positioned raster. The base image is a layer at the origin, overlays can sit anywhere,
//! including at negative offsets. Each layer keeps a CPU copy of its pixels alongside the
//! texture, so pixel writes are cheap and only the touched region is pushed to the backend.

use crate::render::{PixelRegion, QuadVertex, RenderBackend, ResourceError, TextureHandle};
use crate::util::{FRect, Point, RangeError};

pub struct Layer {
    origin: Point,
    pixels: image::RgbaImage,
    texture: TextureHandle,
    /// Written on the CPU but not yet uploaded.
    dirty: Option<PixelRegion>,
}
impl Layer {
    /// Upload `pixels` and wrap them as a layer with its top-left at `origin` in image space.
    pub fn new(
        origin: Point,
        pixels: image::RgbaImage,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, ResourceError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ResourceError::Empty);
        }
        let limit = backend.max_texture_dimension();
        if width > limit || height > limit {
            return Err(ResourceError::TooLarge {
                width,
                height,
                limit,
            });
        }
        let texture = backend.upload_texture(pixels.as_raw(), width, height)?;
        Ok(Self {
            origin,
            pixels,
            texture,
            dirty: None,
        })
    }
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
    #[must_use]
    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }
    /// Image-space rect this layer covers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> FRect {
        FRect::new(
            self.origin.x as f32,
            self.origin.y as f32,
            self.width() as f32,
            self.height() as f32,
        )
    }
    /// Image-space point to layer-local.
    #[must_use]
    pub fn to_local(&self, image_point: Point) -> Point {
        image_point - self.origin
    }
    #[must_use]
    pub fn contains_image_point(&self, image_point: Point) -> bool {
        RangeError::check(self.to_local(image_point), self.width(), self.height()).is_ok()
    }
    /// The color at a layer-local pixel.
    #[must_use]
    pub fn pixel(&self, local: Point) -> Option<[u8; 4]> {
        let (x, y) = RangeError::check(local, self.width(), self.height()).ok()?;
        Some(self.pixels.get_pixel(x, y).0)
    }
    /// Write a layer-local pixel. The texture catches up on the next [`Self::flush`].
    pub fn set_pixel(&mut self, local: Point, rgba: [u8; 4]) -> Result<PixelRegion, RangeError> {
        let (x, y) = RangeError::check(local, self.width(), self.height())?;
        self.pixels.put_pixel(x, y, image::Rgba(rgba));
        let region = PixelRegion::single(x, y);
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(region),
            None => region,
        });
        Ok(region)
    }
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }
    /// Push any CPU-side writes to the texture.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) {
        let Some(region) = self.dirty.take() else {
            return;
        };
        let bytes = image::imageops::crop_imm(&self.pixels, region.x, region.y, region.w, region.h)
            .to_image()
            .into_raw();
        backend.update_subregion(&self.texture, region, &bytes);
    }
    /// Quad covering the part of this layer visible through `view`, or `None` if it's entirely
    /// outside. Positions are relative to the view's top left, scaled into screen pixels.
    ///
    /// Vertex order is bottom-left, top-left, top-right, bottom-left, top-right, bottom-right.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn geometry(&self, view: FRect, scale: f32) -> Option<[QuadVertex; 6]> {
        let bounds = self.bounds();
        let visible = bounds.intersect(&view)?;

        let left = (visible.x - view.x) * scale;
        let top = (visible.y - view.y) * scale;
        let right = (visible.right() - view.x) * scale;
        let bottom = (visible.bottom() - view.y) * scale;

        // Where the visible part falls within the texture.
        let s0 = (visible.x - bounds.x) / bounds.w;
        let s1 = (visible.right() - bounds.x) / bounds.w;
        let t0 = (visible.y - bounds.y) / bounds.h;
        let t1 = (visible.bottom() - bounds.y) / bounds.h;

        let bl = QuadVertex {
            position: [left, bottom],
            uv: [s0, t1],
        };
        let tl = QuadVertex {
            position: [left, top],
            uv: [s0, t0],
        };
        let tr = QuadVertex {
            position: [right, top],
            uv: [s1, t0],
        };
        let br = QuadVertex {
            position: [right, bottom],
            uv: [s1, t1],
        };
        Some([bl, tl, tr, bl, tr, br])
    }
    /// Give the texture back to the backend.
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.destroy_texture(self.texture);
    }
}
impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("origin", &self.origin)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("texture", &self.texture)
            .finish_non_exhaustive()
    }
}

/// Write `rgba` at an image-space point into the topmost layer covering it.
///
/// Errors if no layer covers the point, reporting the bounds of the bottom (base) layer.
pub fn set_topmost_pixel(
    layers: &mut [Layer],
    image_point: Point,
    rgba: [u8; 4],
) -> Result<PixelRegion, RangeError> {
    if let Some(layer) = layers
        .iter_mut()
        .rev()
        .find(|layer| layer.contains_image_point(image_point))
    {
        let local = layer.to_local(image_point);
        return layer.set_pixel(local, rgba);
    }
    let (width, height) = layers
        .first()
        .map_or((0, 0), |base| (base.width(), base.height()));
    Err(RangeError {
        x: image_point.x,
        y: image_point.y,
        width,
        height,
    })
}
