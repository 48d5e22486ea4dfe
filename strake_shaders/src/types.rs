// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The type of resource that will be bound to a slot in a shader.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BindType {
    /// A storage buffer with read/write access.
    Buffer,
    /// A storage buffer with read only access.
    BufReadOnly,
    /// A small storage buffer to be used as uniforms.
    Uniform,
}

impl BindType {
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Buffer)
    }
}

/// A buffer binding found by reflecting a compiled shader.
#[derive(Clone, Debug)]
pub struct BindingInfo {
    pub name: Option<String>,
    /// The `(group, binding)` slot of the resource.
    pub location: (u32, u32),
    pub ty: BindType,
}
