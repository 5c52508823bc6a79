// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tilebin compute kernel.
//!
//! This crate provides the metadata needed to construct the bin counting
//! compute pipeline on any GPU API (workgroup size, binding types and the WGSL
//! source), leaving resource management and command encoding to the client.
//!
//! With the `cpu` feature (on by default) it also provides a CPU
//! implementation of the same kernel in [`cpu`], used as a reference in tests.

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![allow(missing_docs)]

mod types;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use types::BindType;

use std::borrow::Cow;

#[derive(Clone, Debug)]
pub struct ComputeShader<'a> {
    pub name: Cow<'a, str>,
    pub workgroup_size: [u32; 3],
    pub bindings: Cow<'a, [BindType]>,
    /// Size in bytes of each `var<workgroup>` buffer.
    pub workgroup_buffers: Cow<'a, [u32]>,
    pub entry_point: Cow<'a, str>,

    #[cfg(feature = "wgsl")]
    pub wgsl: WgslSource<'a>,
}

#[cfg(feature = "wgsl")]
#[derive(Clone, Debug)]
pub struct WgslSource<'a> {
    pub code: Cow<'a, str>,

    /// Contains the binding index of each resource listed in `ComputeShader::bindings`.
    /// This is guaranteed to have the same element count as `ComputeShader::bindings`.
    ///
    /// Each index directly corresponds to the value of the corresponding
    /// `@binding(..)` declaration in the shader source. The bind group index
    /// (i.e. value of `@group(..)`) is always 0.
    pub binding_indices: Cow<'a, [u8]>,
}

/// Counts path bounding boxes per tile.
///
/// Bindings: the packed path boxes (read only), the bin table (read/write,
/// atomic), and the config uniform.
pub const BIN_COUNT: ComputeShader<'static> = ComputeShader {
    name: Cow::Borrowed("bin_count"),
    workgroup_size: [256, 1, 1],
    bindings: Cow::Borrowed(&[BindType::BufReadOnly, BindType::Buffer, BindType::Uniform]),
    workgroup_buffers: Cow::Borrowed(&[512 * 4]),
    entry_point: Cow::Borrowed("main"),
    #[cfg(feature = "wgsl")]
    wgsl: WgslSource {
        code: Cow::Borrowed(include_str!("../shader/bin_count.wgsl")),
        binding_indices: Cow::Borrowed(&[0, 1, 2]),
    },
};

#[cfg(all(test, feature = "wgsl"))]
mod tests {
    use super::BIN_COUNT;
    use naga::{
        front::wgsl,
        valid::{Capabilities, ValidationFlags, Validator},
        AddressSpace, ShaderStage, StorageAccess,
    };

    fn parse() -> naga::Module {
        match wgsl::parse_str(&BIN_COUNT.wgsl.code) {
            Ok(module) => module,
            Err(e) => panic!("{}", e.emit_to_string(&BIN_COUNT.wgsl.code)),
        }
    }

    #[test]
    fn kernel_validates() {
        let module = parse();
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap();
    }

    #[test]
    fn metadata_matches_source() {
        let module = parse();
        let entry = module
            .entry_points
            .iter()
            .find(|e| e.name == BIN_COUNT.entry_point)
            .expect("entry point present");
        assert_eq!(entry.stage, ShaderStage::Compute);
        assert_eq!(entry.workgroup_size, BIN_COUNT.workgroup_size);
        assert_eq!(
            entry.workgroup_size[0],
            tilebin_encoding::WORKGROUP_SIZE,
            "kernel and host disagree on workgroup size"
        );

        let mut bound = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.binding, var.space)))
            .collect::<Vec<_>>();
        bound.sort_by_key(|(binding, _)| *binding);
        let indices = bound.iter().map(|(b, _)| *b as u8).collect::<Vec<_>>();
        assert_eq!(indices, BIN_COUNT.wgsl.binding_indices.to_vec());
        assert!(matches!(
            bound[0].1,
            AddressSpace::Storage { access } if access == StorageAccess::LOAD
        ));
        assert!(matches!(
            bound[1].1,
            AddressSpace::Storage { access } if access.contains(StorageAccess::STORE)
        ));
        assert_eq!(bound[2].1, AddressSpace::Uniform);
        for ((binding, space), bind_type) in bound.iter().zip(BIN_COUNT.bindings.iter()) {
            let writable = matches!(
                space,
                AddressSpace::Storage { access } if access.contains(StorageAccess::STORE)
            );
            assert_eq!(writable, bind_type.is_mutable(), "binding {binding}");
        }

        let workgroup_bytes = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == AddressSpace::WorkGroup)
            .map(|(_, var)| module.types[var.ty].inner.size(module.to_ctx()))
            .collect::<Vec<_>>();
        assert_eq!(workgroup_bytes, BIN_COUNT.workgroup_buffers.to_vec());
    }
}
