// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device faults reported outside of any call.

use anyhow::{bail, Result};
use tilebin::{wgpu, BinningConfig, Error, FaultKind};
use tilebin_tests::{gpu_error, glyph_scene};

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn uncaptured_validation_error_is_reported() -> Result<()> {
    let Some(session) = tilebin_tests::session()? else {
        return Ok(());
    };
    session.check_faults().map_err(gpu_error)?;

    // Storage buffers can't be mapped for reading without a native-only feature.
    let _buffer = session.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("unmappable"),
        size: 16,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::STORAGE,
        mapped_at_creation: false,
    });
    session.device.poll(wgpu::Maintain::Wait);

    match session.check_faults() {
        Err(Error::DeviceFault(fault)) => assert_eq!(fault.kind, FaultKind::Validation),
        other => bail!("expected a validation fault, got {other:?}"),
    }
    assert!(session.take_faults().is_empty(), "faults should be drained");
    Ok(())
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn clean_run_records_no_faults() -> Result<()> {
    let Some(session) = tilebin_tests::session()? else {
        return Ok(());
    };
    let mut binner = tilebin::Binner::new(&session, BinningConfig::default()).map_err(gpu_error)?;
    let counts = binner.run(&session, &glyph_scene()).map_err(gpu_error)?;
    assert!(counts.is_complete());
    assert_eq!(session.take_faults(), vec![]);
    Ok(())
}
