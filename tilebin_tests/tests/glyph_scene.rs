// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glyph scene on the CPU kernel, no GPU needed.

use anyhow::Result;
use tilebin::{BinningConfig, PackedBbox};
use tilebin_tests::{cpu_bin_counts, glyph_scene, GLYPH_TOTAL, GLYPH_WORDS};

#[test]
fn scene_decodes_to_valid_boxes() {
    let paths = glyph_scene();
    assert_eq!(paths.len(), 256);
    assert!(paths.iter().all(|p| p.top <= p.bottom && p.left <= p.right));
    // Packing again reproduces the stored words.
    let words = paths
        .iter()
        .flat_map(|p| {
            let (w0, w1) = PackedBbox::from(*p).words();
            [w0, w1]
        })
        .collect::<Vec<_>>();
    assert_eq!(words, GLYPH_WORDS);
}

#[test]
fn conservation_on_glyph_scene() -> Result<()> {
    let config = BinningConfig::default();
    let grid = config.validate()?;
    let paths = glyph_scene();
    let counts = cpu_bin_counts(&config, &paths)?;
    let overlapped: u32 = paths.iter().map(|p| grid.tile_rect(p).tile_count()).sum();
    assert_eq!(counts.iter().sum::<u32>(), overlapped);
    assert_eq!(overlapped, GLYPH_TOTAL);
    Ok(())
}

#[test]
fn every_glyph_lands_in_a_tile() -> Result<()> {
    let grid = BinningConfig::default().validate()?;
    for (ix, path) in glyph_scene().iter().enumerate() {
        assert!(!path.is_empty(), "glyph {ix} is degenerate");
        assert!(grid.tile_rect(path).tile_count() > 0, "glyph {ix} was dropped");
    }
    Ok(())
}
