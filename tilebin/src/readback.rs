// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Copying device buffers back to the host.

use bytemuck::Pod;
use futures_intrusive::channel::shared::oneshot_channel;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, MapMode};

use crate::wait::{wait_for_signal, Completion};
use crate::{Error, Result, Session};

/// Reads the first `byte_size` bytes of a `MAP_READ` buffer.
///
/// The mapping wait is bounded by the session's mapping policy. On timeout
/// the buffer stays mapped-pending and [`Completion::TimedOut`] is returned.
pub fn read_back<T: Pod>(
    session: &Session,
    buffer: &Buffer,
    byte_size: u64,
) -> Result<Completion<Vec<T>>> {
    let slice = buffer.slice(..byte_size);
    let (sender, receiver) = oneshot_channel();
    slice.map_async(MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    match wait_for_signal(
        &session.device,
        &receiver,
        session.options().mapping_wait,
        "buffer mapping",
    ) {
        Completion::Signaled(result) => result?,
        Completion::TimedOut => return Ok(Completion::TimedOut),
    }
    let data = {
        let mapped = slice.get_mapped_range();
        bytemuck::cast_slice::<u8, T>(&mapped).to_vec()
    };
    buffer.unmap();
    Ok(Completion::Signaled(data))
}

/// Reads the first `byte_size` bytes of a `COPY_SRC` buffer through a
/// transient staging buffer.
///
/// The staging buffer is destroyed before returning, whatever the outcome.
pub fn copy_read_back<T: Pod>(
    session: &Session,
    buffer: &Buffer,
    byte_size: u64,
) -> Result<Completion<Vec<T>>> {
    let staging = session.device.create_buffer(&BufferDescriptor {
        label: Some("tilebin.staging"),
        size: byte_size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = session
        .device
        .create_command_encoder(&CommandEncoderDescriptor {
            label: Some("tilebin.readback"),
        });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, byte_size);
    // Mapping waits for the copy, so the submission itself needn't be awaited.
    let _ = session.submit(encoder.finish());
    let result = read_back(session, &staging, byte_size);
    staging.destroy();
    result
}

/// Whether a [`BinCounts`] holds data read from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadbackStatus {
    Complete,
    /// The device didn't answer in time; the counts are all zero.
    TimedOut,
}

/// The per-tile reference counts produced by a dispatch.
///
/// A timed-out readback still yields a table of the full size, filled with
/// zeros. Check [`BinCounts::is_complete`] or use [`BinCounts::into_result`]
/// before trusting the values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinCounts {
    counts: Vec<u32>,
    status: ReadbackStatus,
}

impl BinCounts {
    pub(crate) fn from_completion(completion: Completion<Vec<u32>>, len: usize) -> Self {
        match completion {
            Completion::Signaled(mut counts) => {
                counts.truncate(len);
                Self {
                    counts,
                    status: ReadbackStatus::Complete,
                }
            }
            Completion::TimedOut => Self::timed_out(len),
        }
    }

    pub(crate) fn timed_out(len: usize) -> Self {
        Self {
            counts: vec![0; len],
            status: ReadbackStatus::TimedOut,
        }
    }

    pub fn status(&self) -> ReadbackStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == ReadbackStatus::Complete
    }

    /// The table, indexed by bin. Zero-filled when the readback timed out.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Returns the table, or [`Error::MapTimeout`] if it is a placeholder.
    pub fn into_result(self) -> Result<Vec<u32>> {
        match self.status {
            ReadbackStatus::Complete => Ok(self.counts),
            ReadbackStatus::TimedOut => Err(Error::MapTimeout { what: "bin counts" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_table() {
        let counts = BinCounts::from_completion(Completion::Signaled(vec![3, 0, 1, 9]), 3);
        assert!(counts.is_complete());
        assert_eq!(counts.counts(), &[3, 0, 1]);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.into_result().unwrap(), vec![3, 0, 1]);
    }

    #[test]
    fn timeout_yields_zeroed_placeholder() {
        let counts = BinCounts::from_completion(Completion::TimedOut, 256);
        assert_eq!(counts.status(), ReadbackStatus::TimedOut);
        assert_eq!(counts.counts().len(), 256);
        assert_eq!(counts.total(), 0);
        assert!(matches!(
            counts.into_result(),
            Err(Error::MapTimeout { what: "bin counts" })
        ));
    }
}
