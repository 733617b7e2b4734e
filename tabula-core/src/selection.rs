//! # Selection
//!
//! A sparse set of selected pixels, stored as row-major indices (`y * width + x`) into the base
//! image grid. Selections only grow: there is no deselect, a new image gets a new set.
//!
//! The outline is derived from scratch on every call by checking the four neighbours of every
//! selected pixel, so it costs O(selected pixels). Fine for hand-picked selections on modest
//! images, and the first thing to revisit if selections ever get flood-filled.

use crate::util::{Point, RangeError};

/// A unit-length segment along a pixel boundary, in pixel-corner coordinates.
/// Pixel `(x, y)` spans corners `(x, y)` to `(x + 1, y + 1)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Edge {
    pub from: [u32; 2],
    pub to: [u32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    width: u32,
    height: u32,
    indices: hashbrown::HashSet<u32>,
}
impl SelectionSet {
    /// An empty selection over a `width` by `height` grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            indices: hashbrown::HashSet::new(),
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    /// Insert a raw index. Returns true if it wasn't already selected.
    ///
    /// Indices past the end of the grid are ignored and return false.
    pub fn add(&mut self, index: u32) -> bool {
        if u64::from(index) >= u64::from(self.width) * u64::from(self.height) {
            log::debug!(
                "index {index} is outside of the {}x{} grid",
                self.width,
                self.height
            );
            return false;
        }
        self.indices.insert(index)
    }
    /// Select the pixel at `point`, if it is on the grid.
    pub fn select(&mut self, point: Point) -> Result<(), RangeError> {
        let (x, y) = RangeError::check(point, self.width, self.height)?;
        self.add(y * self.width + x);
        Ok(())
    }
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }
    /// Like [`Self::contains`], by coordinate. Off-grid points are never selected.
    #[must_use]
    pub fn contains_pixel(&self, point: Point) -> bool {
        RangeError::check(point, self.width, self.height)
            .is_ok_and(|(x, y)| self.contains(y * self.width + x))
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn clear(&mut self) {
        self.indices.clear();
    }
    /// Every selected index, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices.iter().copied()
    }
    /// Edges between selected pixels and unselected or off-grid neighbours, in no particular
    /// order. Interior edges, shared by two selected pixels, are skipped.
    #[must_use]
    pub fn outline_edges(&self) -> Vec<Edge> {
        if self.width == 0 {
            return Vec::new();
        }
        let width = self.width;
        let last_row = self.height.saturating_sub(1);
        // Single isolated pixels are the common case.
        let mut edges = Vec::with_capacity(self.indices.len() * 4);

        for index in self.iter() {
            let (x, y) = (index % width, index / width);
            let (left, top, right, bottom) = (x, y, x + 1, y + 1);

            // Row boundaries wrap in index space, so the column has to be checked explicitly.
            // The short circuits also keep the neighbour indices from under or overflowing.
            if x == 0 || !self.contains(index - 1) {
                edges.push(Edge {
                    from: [left, top],
                    to: [left, bottom],
                });
            }
            if y == 0 || !self.contains(index - width) {
                edges.push(Edge {
                    from: [left, top],
                    to: [right, top],
                });
            }
            if right == width || !self.contains(index + 1) {
                edges.push(Edge {
                    from: [right, top],
                    to: [right, bottom],
                });
            }
            if y >= last_row
                || index
                    .checked_add(width)
                    .map_or(true, |below| !self.contains(below))
            {
                edges.push(Edge {
                    from: [left, bottom],
                    to: [right, bottom],
                });
            }
        }

        edges
    }
}
