// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use strake_encoding::{LineParams, LineStyle};
use wgpu::{BufferUsages, CommandBuffer};

use crate::GpuBuffer;

/// A polyline and its ribbon style, with the points stored on the GPU.
///
/// Points live in an interleaved `x, y` storage buffer that only ever travels
/// host to device. Appending is a buffer copy, so a polyline can be extended
/// every frame without re-uploading its history.
pub struct Polyline {
    points: GpuBuffer<f32>,
    /// Ribbon style, applied at the next render.
    pub style: LineStyle,
}

impl Polyline {
    /// Upload a polyline from split coordinate slices.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn new(device: &wgpu::Device, xs: &[f32], ys: &[f32], style: LineStyle) -> Self {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have the same length");
        let usage = BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC;
        Self {
            points: GpuBuffer::new(device, usage, 2 * xs.len(), |buffer| {
                for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
                    buffer[2 * i] = x;
                    buffer[2 * i + 1] = y;
                }
            }),
            style,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The GPU point buffer.
    pub fn points(&self) -> &GpuBuffer<f32> {
        &self.points
    }

    /// Append a single point.
    ///
    /// The returned command buffer must be submitted before the next render;
    /// it carries the copy that publishes the new point.
    pub fn append(&mut self, device: &wgpu::Device, x: f32, y: f32) -> CommandBuffer {
        self.points.extend(device, 2, |buffer| {
            buffer[0] = x;
            buffer[1] = y;
        })
    }

    /// Append a run of points from split coordinate slices.
    ///
    /// The returned command buffer must be submitted before the next render.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn extend(&mut self, device: &wgpu::Device, xs: &[f32], ys: &[f32]) -> CommandBuffer {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have the same length");
        self.points.extend(device, 2 * xs.len(), |buffer| {
            for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
                buffer[2 * i] = x;
                buffer[2 * i + 1] = y;
            }
        })
    }

    /// The uniform contents describing this polyline.
    pub(crate) fn params(&self) -> LineParams {
        LineParams::new(&self.style, self.len() as u32)
    }
}
