// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tilebin tests.

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![allow(missing_docs)]

use std::cell::RefCell;

use anyhow::{anyhow, Result};
use tilebin::{BinningConfig, Binner, BinnerOptions, Error, PathBbox, Session, SessionOptions};
use tilebin_shaders::cpu::{bin_count, CpuBinding};

mod fixture;

pub use fixture::{glyph_scene, GLYPH_TOTAL, GLYPH_WORDS};

/// Tilebin errors can carry non-`Sync` wgpu errors, which `anyhow` can't hold.
pub fn gpu_error(error: Error) -> anyhow::Error {
    anyhow!("{error}")
}

/// Creates a session, or `None` when the machine has no usable GPU.
pub fn session() -> Result<Option<Session>> {
    let _ = env_logger::builder().is_test(true).try_init();
    match pollster::block_on(Session::new(SessionOptions::default())) {
        Ok(session) => Ok(Some(session)),
        Err(Error::NoCompatibleDevice) => {
            log::warn!("No compatible device found, skipping GPU test");
            Ok(None)
        }
        Err(e) => Err(gpu_error(e)),
    }
}

pub fn binner(session: &Session, config: BinningConfig, options: BinnerOptions) -> Result<Binner> {
    Binner::with_options(session, config, options).map_err(gpu_error)
}

/// Bins `paths` on the GPU and returns the completed table.
pub fn gpu_bin_counts(
    session: &Session,
    config: BinningConfig,
    paths: &[PathBbox],
) -> Result<Vec<u32>> {
    let mut binner = Binner::new(session, config).map_err(gpu_error)?;
    binner
        .run(session, paths)
        .and_then(|counts| counts.into_result())
        .map_err(gpu_error)
}

/// Bins `paths` with the CPU version of the kernel.
pub fn cpu_bin_counts(config: &BinningConfig, paths: &[PathBbox]) -> Result<Vec<u32>> {
    let uniform = config.uniform(u32::try_from(paths.len())?)?;
    let packed = paths.iter().map(|path| path.pack()).collect::<Vec<_>>();
    let bins = RefCell::new(vec![0_u8; config.buffer_sizes().bin_counts.size_in_bytes() as usize]);
    bin_count(
        1,
        &[
            CpuBinding::Buffer(bytemuck::cast_slice(&packed)),
            CpuBinding::BufferRW(&bins),
            CpuBinding::Buffer(bytemuck::bytes_of(&uniform)),
        ],
    );
    let bins = bins.into_inner();
    Ok(bytemuck::cast_slice(&bins).to_vec())
}
