// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline construction from kernel metadata.

use tilebin_shaders::{BindType, ComputeShader};
use wgpu::{BindGroupLayout, ComputePipeline, Device};

use crate::wait::{wait_with_timeout, WaitPolicy};
use crate::{Error, Result};

pub(crate) struct KernelPipeline {
    pub(crate) bind_group_layout: BindGroupLayout,
    pub(crate) pipeline: ComputePipeline,
}

fn layout_entry(bind_type: BindType, binding: u32) -> wgpu::BindGroupLayoutEntry {
    let ty = match bind_type {
        BindType::Buffer | BindType::BufReadOnly => wgpu::BufferBindingType::Storage {
            read_only: !bind_type.is_mutable(),
        },
        BindType::Uniform => wgpu::BufferBindingType::Uniform,
    };
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Compiles `shader` and builds its bind group layout and pipeline.
///
/// Creation runs inside a validation error scope, so a kernel the device
/// rejects is reported here instead of through the uncaptured error handler.
pub(crate) fn create_pipeline(
    device: &Device,
    shader: &ComputeShader<'_>,
    policy: WaitPolicy,
) -> Result<KernelPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&shader.name),
        source: wgpu::ShaderSource::Wgsl(shader.wgsl.code.clone()),
    });
    let entries = shader
        .bindings
        .iter()
        .zip(shader.wgsl.binding_indices.iter())
        .map(|(bind_type, &binding)| layout_entry(*bind_type, binding as u32))
        .collect::<Vec<_>>();
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&shader.name),
        entries: &entries,
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&shader.name),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&shader.name),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: &shader.entry_point,
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });
    let scope = wait_with_timeout(device, device.pop_error_scope(), policy, "pipeline creation");
    if let Some(error) = scope.into_result("pipeline creation")? {
        log::error!("Failed to create {} pipeline: {error}", shader.name);
        return Err(Error::WgpuErrorFromScope(error));
    }
    log::debug!("Created {} pipeline", shader.name);
    Ok(KernelPipeline {
        bind_group_layout,
        pipeline,
    })
}
