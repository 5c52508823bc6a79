// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile grid geometry.

use crate::PathBbox;

/// Default tile edge length, in canvas units.
pub const TILE_SIZE: u32 = 16;

/// Number of tiles needed to cover one row of a canvas.
///
/// Panics if `tile_size` is zero; [`BinningConfig::validate`](crate::BinningConfig::validate)
/// rejects that before any grid is built.
pub fn tiles_per_row(canvas_width: u32, tile_size: u32) -> u32 {
    canvas_width.div_ceil(tile_size)
}

/// A canvas partitioned into square tiles, one bin per tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    pub width_in_tiles: u32,
    pub height_in_tiles: u32,
    pub tile_size: u32,
}

/// Half-open range of tiles `[x0, x1) x [y0, y1)` covered by a bounding box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TileRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl TileRect {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Number of bins this rectangle contributes to.
    pub fn tile_count(&self) -> u32 {
        self.width() * self.height()
    }
}

impl TileGrid {
    pub fn new(canvas_width: u32, canvas_height: u32, tile_size: u32) -> Self {
        Self {
            width_in_tiles: tiles_per_row(canvas_width, tile_size),
            height_in_tiles: canvas_height.div_ceil(tile_size),
            tile_size,
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.width_in_tiles * self.height_in_tiles
    }

    pub fn bin_index(&self, row: u32, col: u32) -> u32 {
        row * self.width_in_tiles + col
    }

    /// Converts a bounding box to the tiles it covers.
    ///
    /// Lower extents round down to a tile boundary and upper extents round
    /// up. A box with no area in x or y covers nothing, and a box that is
    /// degenerate in x also has its y range collapsed, so zero-width boxes
    /// never smear down a column. The result is clamped to the grid.
    ///
    /// This mirrors the decode phase of the kernel.
    pub fn tile_rect(&self, bbox: &PathBbox) -> TileRect {
        let ts = self.tile_size;
        let x0 = bbox.left as u32 / ts;
        let y0 = bbox.top as u32 / ts;
        let mut x1 = (bbox.right as u32).div_ceil(ts);
        let mut y1 = (bbox.bottom as u32).div_ceil(ts);
        if bbox.left >= bbox.right {
            x1 = x0;
        }
        if x0 == x1 || bbox.top >= bbox.bottom {
            y1 = y0;
        }
        TileRect {
            x0: x0.min(self.width_in_tiles),
            y0: y0.min(self.height_in_tiles),
            x1: x1.min(self.width_in_tiles),
            y1: y1.min(self.height_in_tiles),
        }
    }

    /// Iterates the bin indices covered by `rect`, row by row.
    pub fn bins(&self, rect: TileRect) -> impl Iterator<Item = u32> + '_ {
        (rect.y0..rect.y1)
            .flat_map(move |row| (rect.x0..rect.x1).map(move |col| self.bin_index(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(256, 256, TILE_SIZE)
    }

    #[test]
    fn single_division_per_row() {
        assert_eq!(tiles_per_row(256, 16), 16);
        assert_eq!(tiles_per_row(257, 16), 17);
        assert_eq!(tiles_per_row(1, 16), 1);
        assert_eq!(tiles_per_row(0, 16), 0);
    }

    #[test]
    fn bin_index_is_row_major() {
        let grid = grid();
        assert_eq!(grid.bin_index(0, 0), 0);
        assert_eq!(grid.bin_index(0, 15), 15);
        assert_eq!(grid.bin_index(1, 0), 16);
        assert_eq!(grid.bin_index(15, 15), 255);
    }

    #[test]
    fn box_inside_first_tile() {
        let rect = grid().tile_rect(&PathBbox::new(0, 0, 10, 12));
        assert_eq!(
            rect,
            TileRect {
                x0: 0,
                y0: 0,
                x1: 1,
                y1: 1
            }
        );
        assert_eq!(rect.tile_count(), 1);
    }

    #[test]
    fn box_away_from_tile_origin() {
        let grid = grid();
        let rect = grid.tile_rect(&PathBbox::new(2, 3, 10, 12));
        assert_eq!(
            rect,
            TileRect {
                x0: 0,
                y0: 0,
                x1: 1,
                y1: 1
            }
        );
        // Straddling a tile edge covers both sides of it.
        let rect = grid.tile_rect(&PathBbox::new(20, 14, 30, 18));
        assert_eq!(grid.bins(rect).collect::<Vec<_>>(), vec![16, 17]);
    }

    #[test]
    fn degenerate_off_boundary_is_empty() {
        let grid = grid();
        assert!(grid.tile_rect(&PathBbox::new(3, 5, 9, 5)).is_empty());
        assert!(grid.tile_rect(&PathBbox::new(7, 3, 7, 9)).is_empty());
        // Inverted within a single tile.
        assert!(grid.tile_rect(&PathBbox::new(3, 9, 7, 5)).is_empty());
    }

    #[test]
    fn huge_tile_covers_whole_canvas() {
        let grid = TileGrid::new(256, 256, u32::MAX);
        let rect = grid.tile_rect(&PathBbox::new(0, 0, 10, 10));
        assert_eq!(rect.tile_count(), 1);
    }

    #[test]
    fn box_spanning_four_tiles() {
        let grid = grid();
        let rect = grid.tile_rect(&PathBbox::new(0, 0, 32, 32));
        assert_eq!(rect.tile_count(), 4);
        let bins: Vec<_> = grid.bins(rect).collect();
        assert_eq!(bins, vec![0, 1, 16, 17]);
    }

    #[test]
    fn zero_width_collapses_rows() {
        let rect = grid().tile_rect(&PathBbox::new(0, 20, 200, 20));
        assert_eq!(rect.y0, rect.y1);
        assert_eq!(rect.tile_count(), 0);
    }

    #[test]
    fn zero_height_is_empty() {
        let rect = grid().tile_rect(&PathBbox::new(40, 0, 40, 200));
        assert!(rect.is_empty());
    }

    #[test]
    fn clamped_to_grid() {
        let grid = grid();
        let rect = grid.tile_rect(&PathBbox::new(0, 0, u16::MAX, u16::MAX));
        assert_eq!(rect.x1, grid.width_in_tiles);
        assert_eq!(rect.y1, grid.height_in_tiles);
        assert_eq!(rect.tile_count(), grid.tile_count());
    }

    #[test]
    fn inverted_box_covers_nothing() {
        let rect = grid().tile_rect(&PathBbox::new(64, 64, 16, 16));
        assert_eq!(rect.tile_count(), 0);
        assert_eq!(grid().bins(rect).count(), 0);
    }
}
