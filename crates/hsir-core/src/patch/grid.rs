//! Overlapping tile planning for patch-based inference.

use crate::error::{HsirError, Result};

/// Placement of one tile inside a full image.
///
/// `h`/`w` are the tile's top-left offset. The four padding values give how
/// many border rows/columns of the tile are context only and must be discarded
/// after inference; sides touching the image edge carry no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchDescriptor {
    pub h: usize,
    pub w: usize,
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl PatchDescriptor {
    /// `(h, w, top, left, bottom, right)`.
    pub fn as_tuple(&self) -> (usize, usize, usize, usize, usize, usize) {
        (self.h, self.w, self.top, self.left, self.bottom, self.right)
    }
}

/// Tile layout for an `height x width` image.
///
/// # Examples
/// ```rust
/// use hsir_core::PatchGrid;
///
/// let grid = PatchGrid::new(64, 64, Some(48), 16).unwrap();
/// let tiles: Vec<_> = grid.tiles().collect();
/// assert_eq!(tiles.len(), 4);
/// assert_eq!((tiles[3].h, tiles[3].w), (16, 16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    height: usize,
    width: usize,
    patch_size: usize,
    padding: usize,
    rows: usize,
    cols: usize,
}

impl PatchGrid {
    /// Plan tiles of `patch_size` pixels overlapping by `padding` on each side.
    ///
    /// Without an explicit size the tile is `height / 2 + padding`, which
    /// splits an even-height image into two rows.
    ///
    /// # Errors
    /// Fails when the tile does not leave any interior (`patch_size <= 2 *
    /// padding`) or does not fit the image.
    pub fn new(height: usize, width: usize, patch_size: Option<usize>, padding: usize) -> Result<Self> {
        let patch_size = patch_size.unwrap_or(height / 2 + padding);

        if patch_size <= 2 * padding {
            return Err(HsirError::invalid_configuration(format!(
                "patch size {} leaves no interior with padding {}",
                patch_size, padding
            )));
        }
        if patch_size > height || patch_size > width {
            return Err(HsirError::invalid_configuration(format!(
                "patch size {} exceeds image size {}x{}",
                patch_size, height, width
            )));
        }

        Ok(Self {
            height,
            width,
            patch_size,
            padding,
            rows: tiles_along(height, patch_size, padding),
            cols: tiles_along(width, patch_size, padding),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Tile rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Tile columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tiles in row-major order. Each call starts a fresh, identical sequence.
    pub fn tiles(&self) -> PatchIter {
        PatchIter { grid: *self, next: 0 }
    }

    fn descriptor(&self, row: usize, col: usize) -> PatchDescriptor {
        let (h, top, bottom) = place(row, self.rows, self.height, self.patch_size, self.padding);
        let (w, left, right) = place(col, self.cols, self.width, self.patch_size, self.padding);
        PatchDescriptor {
            h,
            w,
            top,
            left,
            bottom,
            right,
        }
    }
}

/// `ceil((length - 2p) / (size - 2p))`, at least one tile.
fn tiles_along(length: usize, size: usize, padding: usize) -> usize {
    let stride = size - 2 * padding;
    let interior = length - 2 * padding;
    ((interior + stride - 1) / stride).max(1)
}

/// Offset and `(start, end)` padding of tile `index` out of `count`.
fn place(index: usize, count: usize, length: usize, size: usize, padding: usize) -> (usize, usize, usize) {
    let last = count - 1;
    let offset = if index == 0 {
        0
    } else if index == last {
        length - size
    } else {
        index * (size - 2 * padding)
    };
    let start = if index == 0 { 0 } else { padding };
    let end = if index == last { 0 } else { padding };
    (offset, start, end)
}

/// Lazy iterator over the tiles of a [`PatchGrid`].
#[derive(Debug, Clone)]
pub struct PatchIter {
    grid: PatchGrid,
    next: usize,
}

impl Iterator for PatchIter {
    type Item = PatchDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.grid.len() {
            return None;
        }
        let row = self.next / self.grid.cols;
        let col = self.next % self.grid.cols;
        self.next += 1;
        Some(self.grid.descriptor(row, col))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PatchIter {}
