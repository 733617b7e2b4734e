//! Window space <-> image space.
//!
//! The viewport is the window-space rect the image view occupies. The view is the image-space
//! rect currently visible through it. Everything here is a pure function of those two.

use crate::util::{FRect, Point, Rect};

/// The image pixel under `window_point`.
///
/// Floors, rather than truncates, so that pixel boundaries don't shift when the view origin is
/// negative. A degenerate viewport maps everything onto the view origin.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_image_pixel(window_point: ultraviolet::Vec2, viewport: Rect, view: FRect) -> Point {
    let map = |point: f32, viewport_start: i32, viewport_len: u32, view_start: f32, view_len: f32| {
        let local = f64::from(point) - f64::from(viewport_start);
        let along = if viewport_len == 0 {
            0.0
        } else {
            local * f64::from(view_len) / f64::from(viewport_len)
        };
        (f64::from(view_start) + along).floor() as i32
    };
    Point {
        x: map(window_point.x, viewport.x, viewport.w, view.x, view.w),
        y: map(window_point.y, viewport.y, viewport.h, view.y, view.h),
    }
}

/// Inverse of [`to_image_pixel`], without the flooring. Takes a (possibly fractional) point in
/// image space and finds where it lands in the window.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_window(image_point: ultraviolet::Vec2, viewport: Rect, view: FRect) -> ultraviolet::Vec2 {
    let map = |point: f32, viewport_start: i32, viewport_len: u32, view_start: f32, view_len: f32| {
        if view_len == 0.0 {
            return viewport_start as f32;
        }
        viewport_start as f32 + (point - view_start) * viewport_len as f32 / view_len
    };
    ultraviolet::Vec2 {
        x: map(image_point.x, viewport.x, viewport.w, view.x, view.w),
        y: map(image_point.y, viewport.y, viewport.h, view.y, view.h),
    }
}
