// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strake renders polylines as solid ribbons of configurable thickness,
//! entirely on the GPU.
//!
//! A [`Polyline`] keeps its points in a growable storage buffer and never
//! reads them back: the vertex shader expands point index `i` into the two
//! rails of a triangle strip, joining segments with miters and clamping
//! runaway spikes at a configurable [miter limit](LineStyle::with_miter_limit).
//! Appending points is a buffer copy, so streaming data stays cheap.
//!
//! The [`Renderer`] draws any number of polylines into a texture view in one
//! render pass, either through a [`ViewTransform`] mapping data coordinates
//! into clip space or taking the stored points as clip coordinates as they
//! are. [`Viewport`] builds such transforms from data bounds, padding and a
//! window size, and supports dragging and zooming.
//!
//! The `demos/` folder of the repository shows the crate driven headless,
//! from winit, and from generated trace data.

#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod buffer;
mod polyline;
mod render;

pub mod util;

/// Color and styling primitives, re-exported for convenience.
pub use peniko;
pub use wgpu;

pub use buffer::GpuBuffer;
pub use polyline::Polyline;
pub use render::{RenderParams, Renderer, RendererOptions};
pub use strake_encoding::{
    interleave_points, Bounds, Interval, LineParams, LineStyle, Padding, ViewTransform, Viewport,
    ViewportBuilder, DEFAULT_MITER_LIMIT, DEFAULT_THICKNESS,
};

use thiserror::Error;

/// Errors that can occur in Strake.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// There is no available device with the features required by Strake.
    #[error("Couldn't find suitable device")]
    NoCompatibleDevice,
    /// Failed to create surface.
    /// See [`wgpu::CreateSurfaceError`] for more information.
    #[error("Couldn't create wgpu surface")]
    WgpuCreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    /// Surface doesn't support the required texture formats.
    /// Make sure that you have a surface which provides one of
    /// [`wgpu::TextureFormat::Rgba8Unorm`] or [`wgpu::TextureFormat::Bgra8Unorm`]
    /// as texture formats.
    #[error("Couldn't find `Rgba8Unorm` or `Bgra8Unorm` texture formats for surface")]
    UnsupportedSurfaceFormat,
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

static_assertions::assert_impl_all!(Renderer: Send);
