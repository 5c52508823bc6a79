// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data model shared between the tilebin host code and its compute kernel.
//!
//! This crate has no GPU dependency. It contains:
//!
//! - the bounding box codec ([`PathBbox`] and its packed form [`PackedBbox`]),
//! - tile grid geometry ([`TileGrid`], [`TileRect`]),
//! - validated configuration ([`BinningConfig`]) and the uniform block uploaded
//!   to the kernel ([`ConfigUniform`]).

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![allow(missing_docs)]

mod bbox;
mod config;
mod tile;

pub use bbox::{PackedBbox, PathBbox};
pub use config::{
    BinningConfig, BufferSize, BufferSizes, ConfigError, ConfigUniform, MAX_BINS,
    MAX_PUBLISH_FANOUT, WORKGROUP_SIZE,
};
pub use tile::{tiles_per_row, TileGrid, TileRect, TILE_SIZE};
