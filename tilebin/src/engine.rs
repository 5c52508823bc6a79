// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use static_assertions::const_assert_eq;
use tilebin_encoding::{BinningConfig, BufferSizes, ConfigUniform, PackedBbox, PathBbox, TileGrid};
use wgpu::{BindGroup, Buffer, BufferUsages};

use crate::readback::{copy_read_back, BinCounts};
use crate::shaders::{create_pipeline, KernelPipeline};
use crate::wait::{Completion, Submission};
use crate::{Result, Session};

// Uniform buffers are bound in 16 byte units.
const_assert_eq!(std::mem::size_of::<ConfigUniform>() % 16, 0);
const_assert_eq!(std::mem::size_of::<PackedBbox>(), 8);

/// Options for a [`Binner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinnerOptions {
    /// Clear the bin table in the same submission as every dispatch.
    ///
    /// When disabled, successive dispatches accumulate into the table until
    /// [`Binner::reset`] is called.
    pub reset_before_dispatch: bool,
}

impl Default for BinnerOptions {
    fn default() -> Self {
        Self {
            reset_before_dispatch: true,
        }
    }
}

/// Device resources for counting paths per tile.
///
/// Buffers are sized once from the [`BinningConfig`] and never grow.
pub struct Binner {
    config: BinningConfig,
    grid: TileGrid,
    options: BinnerOptions,
    sizes: BufferSizes,
    path_count: u32,
    path_buf: Buffer,
    bin_buf: Buffer,
    config_buf: Buffer,
    bind_group: BindGroup,
    kernel: KernelPipeline,
}

impl Binner {
    /// Creates a binner with default options.
    pub fn new(session: &Session, config: BinningConfig) -> Result<Self> {
        Self::with_options(session, config, BinnerOptions::default())
    }

    pub fn with_options(
        session: &Session,
        config: BinningConfig,
        options: BinnerOptions,
    ) -> Result<Self> {
        let grid = config.validate()?;
        let uniform = config.uniform(0)?;
        let sizes = config.buffer_sizes();
        let device = &session.device;
        let kernel = create_pipeline(
            device,
            &tilebin_shaders::BIN_COUNT,
            session.options().submission_wait,
        )?;
        let path_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilebin.path_bboxes"),
            size: sizes.path_bboxes.size_in_bytes().into(),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bin_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilebin.bin_counts"),
            size: sizes.bin_counts.size_in_bytes().into(),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let config_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilebin.config"),
            size: sizes.config.size_in_bytes().into(),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        session
            .queue
            .write_buffer(&config_buf, 0, bytemuck::bytes_of(&uniform));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tilebin.bin_count"),
            layout: &kernel.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: path_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: bin_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: config_buf.as_entire_binding(),
                },
            ],
        });
        log::debug!(
            "Binner ready: {}x{} tiles, {} bins, up to {} paths",
            grid.width_in_tiles,
            grid.height_in_tiles,
            config.bin_capacity,
            config.path_capacity
        );
        Ok(Self {
            config,
            grid,
            options,
            sizes,
            path_count: 0,
            path_buf,
            bin_buf,
            config_buf,
            bind_group,
            kernel,
        })
    }

    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn options(&self) -> &BinnerOptions {
        &self.options
    }

    /// The device-side bin table, for consumers that read it on the GPU.
    pub fn bin_buffer(&self) -> &Buffer {
        &self.bin_buf
    }

    /// Number of paths in the last upload.
    pub fn path_count(&self) -> u32 {
        self.path_count
    }

    /// Uploads the paths for the next dispatch.
    ///
    /// Fails without touching the device when there are more paths than
    /// the configured capacity.
    pub fn upload(&mut self, session: &Session, paths: &[PathBbox]) -> Result<()> {
        let path_count = u32::try_from(paths.len()).unwrap_or(u32::MAX);
        let uniform = self.config.uniform(path_count)?;
        if !paths.is_empty() {
            let packed = paths.iter().map(|path| path.pack()).collect::<Vec<_>>();
            session
                .queue
                .write_buffer(&self.path_buf, 0, bytemuck::cast_slice(&packed));
        }
        session
            .queue
            .write_buffer(&self.config_buf, 0, bytemuck::bytes_of(&uniform));
        self.path_count = path_count;
        log::debug!("Uploaded {path_count} paths in {} passes", uniform.path_passes);
        Ok(())
    }

    /// Zeroes the bin table.
    pub fn reset(&self, session: &Session) -> Submission {
        let mut encoder = session
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tilebin.reset"),
            });
        encoder.clear_buffer(&self.bin_buf, 0, None);
        session.submit(encoder.finish())
    }

    /// Submits one workgroup of the bin counting kernel over the last upload.
    ///
    /// Returns without waiting for the device.
    pub fn dispatch(&self, session: &Session) -> Submission {
        let mut encoder = session
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tilebin.dispatch"),
            });
        if self.options.reset_before_dispatch {
            encoder.clear_buffer(&self.bin_buf, 0, None);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("bin_count"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.kernel.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(1, 1, 1);
        }
        log::debug!("Dispatching bin_count over {} paths", self.path_count);
        session.submit(encoder.finish())
    }

    /// Copies the bin table back to the host.
    pub fn read_bin_counts(&self, session: &Session) -> Result<BinCounts> {
        let byte_size = self.sizes.bin_counts.size_in_bytes().into();
        let completion = copy_read_back::<u32>(session, &self.bin_buf, byte_size)?;
        Ok(BinCounts::from_completion(
            completion,
            self.config.bin_capacity as usize,
        ))
    }

    /// Uploads `paths`, dispatches, and reads the table back.
    ///
    /// If the submission doesn't complete within the session's policy, the
    /// result is a zeroed placeholder with [`ReadbackStatus::TimedOut`]
    /// status. Faults the device reported while the work ran are returned as
    /// [`Error::DeviceFault`](crate::Error::DeviceFault).
    ///
    /// [`ReadbackStatus::TimedOut`]: crate::ReadbackStatus::TimedOut
    pub fn run(&mut self, session: &Session, paths: &[PathBbox]) -> Result<BinCounts> {
        self.upload(session, paths)?;
        let submission = self.dispatch(session);
        let counts = match submission.wait(session) {
            Completion::Signaled(()) => self.read_bin_counts(session)?,
            Completion::TimedOut => BinCounts::timed_out(self.config.bin_capacity as usize),
        };
        session.check_faults()?;
        Ok(counts)
    }
}
