// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The WGSL ribbon shaders and the metadata a host needs to bind them.
//!
//! This is a utility library to help integrate the strake shader permutations
//! into any renderer project. It provides the binding interface of each
//! permutation while leaving all GPU API interactions (resource management,
//! pipeline and command encoding) up to the client.
//!
//! Your first choice should be the build time generated [`SHADERS`].
//! Alternatively you can recompile shaders from disk at runtime via the
//! [`compile`] module by enabling the `compile` feature, which is useful for
//! hot reloading during shader development.

#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod types;

#[cfg(feature = "compile")]
pub mod compile;
#[cfg(feature = "cpu")]
pub mod cpu;

pub use types::{BindType, BindingInfo};

use std::borrow::Cow;

/// A compiled shader permutation and its binding interface.
///
/// Entry points follow a fixed convention: `vs_main` and `fs_main` for
/// rendering, plus `main` for the compute entry of the capture permutations.
#[derive(Clone, Debug)]
pub struct RenderShader<'a> {
    pub name: Cow<'a, str>,
    /// Workgroup size of the compute entry point; `None` for the pure render
    /// permutations.
    pub workgroup_size: Option<[u32; 3]>,
    /// The type of each binding used by any entry point, ordered by
    /// `binding_locations`.
    pub bindings: Cow<'a, [BindType]>,
    /// The `(group, binding)` slot of each entry in `bindings`. The ribbon
    /// permutations spread their bindings over one group per update
    /// frequency (view, line, capture output), so each binding carries its
    /// full location.
    pub binding_locations: Cow<'a, [(u32, u32)]>,

    /// The preprocessed WGSL source.
    #[cfg(feature = "wgsl")]
    pub wgsl: Cow<'a, str>,
}

impl RenderShader<'_> {
    /// The bindings of one group as `(binding, type)` pairs, in binding order.
    pub fn group_bindings(&self, group: u32) -> Vec<(u32, BindType)> {
        self.binding_locations
            .iter()
            .zip(self.bindings.iter())
            .filter(|((binding_group, _), _)| *binding_group == group)
            .map(|((_, binding), ty)| (*binding, *ty))
            .collect()
    }

    /// Number of bind groups the pipeline layout needs, counting groups the
    /// shader leaves empty.
    pub fn group_count(&self) -> u32 {
        self.binding_locations
            .iter()
            .map(|(group, _)| group + 1)
            .max()
            .unwrap_or(0)
    }
}

include!(concat!(env!("OUT_DIR"), "/shaders.rs"));

pub use generated::SHADERS;
