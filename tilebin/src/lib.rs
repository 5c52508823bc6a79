// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tilebin counts, for every tile of a canvas, how many path bounding boxes
//! overlap it. The counting runs as a single compute workgroup on the GPU via
//! [wgpu], and the resulting table is read back to the host under a bounded
//! wait.
//!
//! The table is intended as the input of a coarse rasterizer: a bin with a
//! zero count can be skipped entirely.
//!
//! # Usage
//!
//! ```no_run
//! use tilebin::{Binner, BinningConfig, PathBbox, Session, SessionOptions};
//!
//! # fn main() -> tilebin::Result<()> {
//! let session = pollster::block_on(Session::new(SessionOptions::default()))?;
//! let mut binner = Binner::new(&session, BinningConfig::new(256, 256))?;
//! let paths = [PathBbox::new(0, 0, 32, 32)];
//! let counts = binner.run(&session, &paths)?.into_result()?;
//! assert_eq!(counts.iter().sum::<u32>(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! Device work is asynchronous. Every wait in this crate is bounded by a
//! [`WaitPolicy`]; when the ceiling is reached the wait logs a single
//! diagnostic and yields [`Completion::TimedOut`] instead of blocking.
//! Errors the device reports outside of any call (validation failures in
//! submitted work, device loss) are collected by the [`Session`] and surface
//! through [`Session::check_faults`].

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET

mod engine;
mod readback;
mod session;
mod shaders;
pub mod wait;

use thiserror::Error;

pub use engine::{Binner, BinnerOptions};
pub use readback::{copy_read_back, read_back, BinCounts, ReadbackStatus};
pub use session::{DeviceFault, FaultKind, Session, SessionOptions};
pub use wait::{Completion, DevicePoller, Submission, WaitPolicy};

pub use tilebin_encoding::{
    BinningConfig, ConfigError, PackedBbox, PathBbox, TileGrid, TileRect, MAX_BINS, TILE_SIZE,
    WORKGROUP_SIZE,
};
/// Re-export wgpu so that consumers can share a device with the binner.
pub use wgpu;

/// Errors that can occur in Tilebin.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// There is no available device with compute shader support.
    #[error("Couldn't find suitable device")]
    NoCompatibleDevice,
    /// The adapter refused to create a device.
    #[error("Couldn't request wgpu device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// The binning configuration doesn't fit the input or the kernel.
    #[error("Invalid binning configuration: {0}")]
    Config(#[from] ConfigError),
    /// A bounded wait ran out before the device signalled.
    #[error("Timed out waiting for {what}")]
    MapTimeout { what: &'static str },
    /// Failed to async map a buffer.
    #[error("Failed to async map a buffer")]
    BufferAsync(#[from] wgpu::BufferAsyncError),
    /// Failed to create a GPU resource, reported through an error scope.
    #[error("wgpu Error from scope")]
    WgpuErrorFromScope(#[from] wgpu::Error),
    /// The device reported an error asynchronously.
    #[error("{0}")]
    DeviceFault(DeviceFault),
}

/// A specialized `Result` type for Tilebin operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// Used by the doc example.
#[cfg(test)]
use pollster as _;
