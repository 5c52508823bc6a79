// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::{PackedBbox, TileGrid, TILE_SIZE};

/// Number of lanes in the single workgroup the kernel runs.
///
/// This must be kept in sync with `WG_SIZE` in `shader/bin_count.wgsl`.
pub const WORKGROUP_SIZE: u32 = 256;

/// Upper bound on the number of bins each lane publishes.
///
/// This must be kept in sync with `MAX_PUBLISH_FANOUT` in `shader/bin_count.wgsl`.
pub const MAX_PUBLISH_FANOUT: u32 = 2;

/// Size of the workgroup-local accumulator, and so the largest bin table a
/// single dispatch can fill.
pub const MAX_BINS: u32 = WORKGROUP_SIZE * MAX_PUBLISH_FANOUT;

/// Errors produced while validating a [`BinningConfig`] against its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The tile size was zero.
    #[error("Tile size must be non-zero")]
    ZeroTileSize,
    /// Some input or derived size does not fit the allocated capacity.
    #[error("{what} needs {len} entries but capacity is {capacity}")]
    SizeMismatch {
        what: &'static str,
        len: u32,
        capacity: u32,
    },
}

/// Uniform configuration block read by the kernel.
///
/// This data structure must be kept in sync with the `Config` struct in
/// `shader/bin_count.wgsl`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct ConfigUniform {
    /// Number of valid entries in the path buffer.
    pub path_count: u32,
    /// Width of the canvas in tiles.
    pub width_in_tiles: u32,
    /// Height of the canvas in tiles.
    pub height_in_tiles: u32,
    /// Tile edge length in canvas units.
    pub tile_size: u32,
    /// Number of entries in the bin table.
    pub bin_count: u32,
    /// Number of workgroup-sized passes needed to visit every path.
    pub path_passes: u32,
    /// Number of bins each lane publishes to the global table.
    pub publish_fanout: u32,
    pub padding: u32,
}

/// Capacities and canvas geometry for one binning pipeline.
///
/// The capacities size the device buffers once; inputs that exceed them are
/// rejected rather than truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinningConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub tile_size: u32,
    /// Number of entries in the bin table.
    pub bin_capacity: u32,
    /// Maximum number of paths accepted by one upload.
    pub path_capacity: u32,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            canvas_width: 256,
            canvas_height: 256,
            tile_size: TILE_SIZE,
            bin_capacity: 256,
            path_capacity: 303,
        }
    }
}

impl BinningConfig {
    /// A config for the given canvas, using default tile size and capacities.
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            canvas_width,
            canvas_height,
            ..Default::default()
        }
    }

    /// Checks that the configuration can be served by one workgroup and
    /// returns the derived tile grid.
    pub fn validate(&self) -> Result<TileGrid, ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if self.bin_capacity == 0 || self.bin_capacity > MAX_BINS {
            return Err(ConfigError::SizeMismatch {
                what: "bin table",
                len: self.bin_capacity,
                capacity: MAX_BINS,
            });
        }
        let grid = TileGrid::new(self.canvas_width, self.canvas_height, self.tile_size);
        let tiles = grid
            .width_in_tiles
            .checked_mul(grid.height_in_tiles)
            .unwrap_or(u32::MAX);
        if tiles > self.bin_capacity {
            return Err(ConfigError::SizeMismatch {
                what: "tile grid",
                len: tiles,
                capacity: self.bin_capacity,
            });
        }
        Ok(grid)
    }

    /// Number of bins each lane publishes.
    pub fn publish_fanout(&self) -> u32 {
        self.bin_capacity.div_ceil(WORKGROUP_SIZE)
    }

    /// Builds the uniform block for a dispatch over `path_count` paths.
    pub fn uniform(&self, path_count: u32) -> Result<ConfigUniform, ConfigError> {
        let grid = self.validate()?;
        if path_count > self.path_capacity {
            return Err(ConfigError::SizeMismatch {
                what: "path sequence",
                len: path_count,
                capacity: self.path_capacity,
            });
        }
        Ok(ConfigUniform {
            path_count,
            width_in_tiles: grid.width_in_tiles,
            height_in_tiles: grid.height_in_tiles,
            tile_size: grid.tile_size,
            bin_count: self.bin_capacity,
            path_passes: path_count.div_ceil(WORKGROUP_SIZE),
            publish_fanout: self.publish_fanout(),
            padding: 0,
        })
    }

    pub fn buffer_sizes(&self) -> BufferSizes {
        BufferSizes {
            path_bboxes: BufferSize::new(self.path_capacity),
            bin_counts: BufferSize::new(self.bin_capacity),
            config: BufferSize::new(1),
        }
    }
}

/// Typed buffer size primitive.
#[derive(Copy, Clone, Eq, Default, Debug)]
pub struct BufferSize<T: Sized> {
    len: u32,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Sized> BufferSize<T> {
    /// Creates a new buffer size from number of elements.
    pub const fn new(len: u32) -> Self {
        Self {
            // Each buffer binding must be large enough to hold at least one element to avoid
            // triggering validation errors.
            len: if len > 0 { len } else { 1 },
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the number of elements.
    pub const fn len(self) -> u32 {
        self.len
    }

    /// Returns the size in bytes.
    pub const fn size_in_bytes(self) -> u32 {
        std::mem::size_of::<T>() as u32 * self.len
    }
}

impl<T: Sized> PartialEq for BufferSize<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
    }
}

/// Sizes of the buffers a dispatch binds.
#[derive(Copy, Clone, Debug)]
pub struct BufferSizes {
    pub path_bboxes: BufferSize<PackedBbox>,
    pub bin_counts: BufferSize<u32>,
    pub config: BufferSize<ConfigUniform>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacities() {
        let config = BinningConfig::default();
        let grid = config.validate().unwrap();
        assert_eq!(grid.width_in_tiles, 16);
        assert_eq!(grid.height_in_tiles, 16);
        assert_eq!(config.publish_fanout(), 1);
        let uniform = config.uniform(303).unwrap();
        assert_eq!(uniform.path_passes, 2);
        assert_eq!(uniform.bin_count, 256);
    }

    #[test]
    fn too_many_paths() {
        let err = BinningConfig::default().uniform(304).unwrap_err();
        assert_eq!(
            err,
            ConfigError::SizeMismatch {
                what: "path sequence",
                len: 304,
                capacity: 303
            }
        );
    }

    #[test]
    fn grid_larger_than_table() {
        let config = BinningConfig::new(1024, 1024);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SizeMismatch {
                what: "tile grid",
                len: 4096,
                ..
            })
        ));
    }

    #[test]
    fn table_larger_than_workgroup_memory() {
        let config = BinningConfig {
            bin_capacity: MAX_BINS + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SizeMismatch { what: "bin table", .. })
        ));
    }

    #[test]
    fn fanout_follows_capacity() {
        let config = BinningConfig {
            canvas_width: 512,
            canvas_height: 256,
            bin_capacity: MAX_BINS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.uniform(0).unwrap().publish_fanout, MAX_PUBLISH_FANOUT);
    }

    #[test]
    fn zero_tile_size() {
        let config = BinningConfig {
            tile_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTileSize));
    }

    #[test]
    fn empty_buffers_still_bindable() {
        let sizes = BinningConfig {
            path_capacity: 0,
            ..Default::default()
        }
        .buffer_sizes();
        assert_eq!(sizes.path_bboxes.len(), 1);
        assert_eq!(sizes.path_bboxes.size_in_bytes(), 8);
        assert_eq!(sizes.config.size_in_bytes(), 32);
    }
}
