// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless

// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
// Feel free to send a PR that solves one or more of these.
#![allow(
    clippy::cast_possible_truncation,
    clippy::allow_attributes_without_reason
)]

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tilebin::{Binner, BinningConfig, PathBbox, Session, SessionOptions, TileGrid};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = BinningConfig {
        canvas_width: args.width,
        canvas_height: args.height,
        tile_size: args.tile_size,
        bin_capacity: args.bins,
        ..Default::default()
    };
    let grid = config.validate()?;
    let paths = args.scene.paths(&grid, args.width, args.height);
    config.path_capacity = config.path_capacity.max(paths.len() as u32);

    let session = match pollster::block_on(Session::new(SessionOptions::default())) {
        Ok(session) => session,
        Err(e) => bail!("Couldn't create a session: {e}"),
    };
    let mut binner = match Binner::new(&session, config) {
        Ok(binner) => binner,
        Err(e) => bail!("Couldn't create the binner: {e}"),
    };
    let counts = match binner.run(&session, &paths) {
        Ok(counts) => counts,
        Err(e) => bail!("Binning failed: {e}"),
    };
    if !counts.is_complete() {
        bail!("The device didn't finish in time");
    }

    println!(
        "{} paths over {}x{} tiles of {}:",
        paths.len(),
        grid.width_in_tiles,
        grid.height_in_tiles,
        grid.tile_size
    );
    for row in counts
        .counts()
        .chunks(grid.width_in_tiles.max(1) as usize)
        .take(grid.height_in_tiles as usize)
    {
        let line = row
            .iter()
            .map(|count| format!("{count:3}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    }
    println!("total {}", counts.total());
    Ok(())
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Scene {
    /// Three boxes inside the first tile
    Corner,
    /// One box covering the top left 2x2 tiles
    Span,
    /// One small box per tile
    Grid,
    /// A fan of boxes anchored at the origin, growing towards the far corner
    Fan,
}

impl Scene {
    fn paths(self, grid: &TileGrid, width: u32, height: u32) -> Vec<PathBbox> {
        let ts = grid.tile_size;
        match self {
            Self::Corner => vec![
                PathBbox::new(2, 3, 10, 12),
                PathBbox::new(0, 0, 16, 16),
                PathBbox::new(8, 8, 9, 9),
            ],
            Self::Span => {
                let extent = saturate(u64::from(ts) * 2);
                vec![PathBbox::new(0, 0, extent, extent)]
            }
            Self::Grid => (0..grid.height_in_tiles)
                .flat_map(|row| {
                    (0..grid.width_in_tiles).map(move |col| {
                        PathBbox::from_extents(row * ts, col * ts, row * ts + 1, col * ts + 1)
                    })
                })
                .collect(),
            Self::Fan => (1..=64)
                .map(|i| {
                    let bottom = saturate(u64::from(height) * i / 64);
                    let right = saturate(u64::from(width) * i / 64);
                    PathBbox::new(0, 0, bottom, right)
                })
                .collect(),
        }
    }
}

/// Extents past what a packed box can hold stick to its far edge.
fn saturate(extent: u64) -> u16 {
    u16::try_from(extent).unwrap_or(u16::MAX)
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name="cargo run -p headless --")]
struct Args {
    /// Canvas width
    #[arg(long, default_value_t = 256)]
    width: u32,
    /// Canvas height
    #[arg(long, default_value_t = 256)]
    height: u32,
    /// Tile edge length
    #[arg(long, default_value_t = tilebin::TILE_SIZE)]
    tile_size: u32,
    /// Number of bins to allocate
    #[arg(long, default_value_t = 256)]
    bins: u32,
    /// Which scene to bin
    #[arg(long, short, value_enum, default_value_t = Scene::Fan)]
    scene: Scene,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_extents_saturate() {
        let grid = TileGrid::new(u32::MAX, u32::MAX, u32::MAX);
        for scene in Scene::value_variants() {
            assert!(!scene.paths(&grid, u32::MAX, u32::MAX).is_empty());
        }
        let fan = Scene::Fan.paths(&grid, u32::MAX, u32::MAX);
        assert_eq!(
            fan.last().map(|p| (p.bottom, p.right)),
            Some((u16::MAX, u16::MAX))
        );
        let span = Scene::Span.paths(&grid, u32::MAX, u32::MAX);
        assert_eq!(span[0].right, u16::MAX);
    }
}
