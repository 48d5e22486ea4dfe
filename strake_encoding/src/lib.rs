// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU-visible uniform layouts and view mathematics for the strake renderer.
//!
//! This crate holds the plain-data side of the renderer: the `#[repr(C)]`
//! structs that are uploaded verbatim into uniform buffers, the interleaved
//! point-buffer layout, and the [`Viewport`] machinery that maps a window of
//! data space onto the clip-space rectangle the shaders draw into.

#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod config;
pub mod view;

pub use config::{
    interleave_points, LineParams, LineStyle, ViewTransform, DEFAULT_MITER_LIMIT,
    DEFAULT_THICKNESS,
};
pub use view::{Bounds, Interval, Padding, Viewport, ViewportBuilder};
