// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT OR Unlicense

use tilebin_encoding::{ConfigUniform, PackedBbox, TileGrid, MAX_BINS};

use super::CpuBinding;

const WG_SIZE: usize = 256;

fn bin_count_main(
    n_wg: u32,
    config: &ConfigUniform,
    path_bboxes: &[PackedBbox],
    bin_counts: &mut [u32],
    lane_order: &[usize],
) {
    let grid = TileGrid {
        width_in_tiles: config.width_in_tiles,
        height_in_tiles: config.height_in_tiles,
        tile_size: config.tile_size,
    };
    for _ in 0..n_wg {
        let mut local_counts = [0_u32; MAX_BINS as usize];
        for pass_ix in 0..config.path_passes as usize {
            for &lane in lane_order {
                let path_ix = pass_ix * WG_SIZE + lane;
                let mut packed = PackedBbox::default();
                if path_ix < config.path_count as usize {
                    packed = path_bboxes[path_ix];
                }
                let rect = grid.tile_rect(&packed.unpack());
                for bin_ix in grid.bins(rect) {
                    local_counts[bin_ix as usize] = local_counts[bin_ix as usize].wrapping_add(1);
                }
            }
        }
        for i in 0..config.publish_fanout as usize {
            for &lane in lane_order {
                let bin_ix = i * WG_SIZE + lane;
                if bin_ix < config.bin_count as usize {
                    let count = local_counts[bin_ix];
                    if count != 0 {
                        bin_counts[bin_ix] = bin_counts[bin_ix].wrapping_add(count);
                    }
                }
            }
        }
    }
}

/// Runs one workgroup of the bin counting kernel, visiting lanes in
/// `lane_order` during both the accumulate and publish phases.
///
/// `lane_order` must be a permutation of `0..256`. Counts are added to
/// `bin_counts`, which is not cleared first.
pub fn bin_count_with_lane_order(
    config: &ConfigUniform,
    path_bboxes: &[PackedBbox],
    bin_counts: &mut [u32],
    lane_order: &[usize],
) {
    assert_eq!(lane_order.len(), WG_SIZE, "lane order must cover the workgroup");
    bin_count_main(1, config, path_bboxes, bin_counts, lane_order);
}

/// CPU version of `bin_count.wgsl`. Bindings follow the shader: path boxes,
/// bin table, config.
pub fn bin_count(n_wg: u32, resources: &[CpuBinding<'_>]) {
    let path_bboxes = resources[0].as_slice();
    let mut bin_counts = resources[1].as_slice_mut();
    let config = resources[2].as_typed();
    let lanes: Vec<usize> = (0..WG_SIZE).collect();
    bin_count_main(n_wg, &config, &path_bboxes, &mut bin_counts, &lanes);
}
