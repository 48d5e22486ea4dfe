// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};
use peniko::Color;

/// Default maximum miter length multiplier.
///
/// Matches the SVG and HTML canvas convention. Joins sharper than roughly
/// 29 degrees have their miter clamped to this multiple of the half-width.
pub const DEFAULT_MITER_LIMIT: f32 = 4.0;

/// Default full ribbon width, in clip-space units.
pub const DEFAULT_THICKNESS: f32 = 0.005;

/// Linear view transform applied to every sampled point as `p * scale + offset`.
///
/// This must be kept in sync with the struct in `shader/shared/view.wgsl`.
#[derive(Clone, Copy, Debug, Zeroable, Pod)]
#[repr(C)]
pub struct ViewTransform {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: [1.0, 1.0],
        offset: [0.0, 0.0],
    };

    pub fn new(scale: [f32; 2], offset: [f32; 2]) -> Self {
        Self { scale, offset }
    }

    /// Apply the transform to a single point.
    pub fn apply(&self, point: [f32; 2]) -> [f32; 2] {
        [
            point[0] * self.scale[0] + self.offset[0],
            point[1] * self.scale[1] + self.offset[1],
        ]
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-polyline parameters bound alongside the point buffer.
///
/// This must be kept in sync with the `LineParams` struct in
/// `shader/ribbon.wgsl`.
#[derive(Clone, Copy, Debug, Default, Zeroable, Pod)]
#[repr(C)]
pub struct LineParams {
    /// Straight-alpha ribbon color.
    pub color: [f32; 4],
    /// Full ribbon width, in clip-space units.
    pub thickness: f32,
    /// Maximum miter length multiplier.
    pub miter_limit: f32,
    /// Logical number of points. The storage binding may be larger than the
    /// polyline it holds, so the shader never consults `arrayLength`.
    pub point_count: u32,
    pub pad: u32,
}

impl LineParams {
    pub fn new(style: &LineStyle, point_count: u32) -> Self {
        let color = style.color;
        Self {
            color: [
                f32::from(color.r) / 255.0,
                f32::from(color.g) / 255.0,
                f32::from(color.b) / 255.0,
                f32::from(color.a) / 255.0,
            ],
            thickness: style.thickness,
            miter_limit: style.miter_limit,
            point_count,
            pad: 0,
        }
    }
}

/// Host-side style of a polyline ribbon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    /// Full ribbon width, in clip-space units.
    pub thickness: f32,
    /// Maximum miter length multiplier. `f32::INFINITY` leaves sharp miters
    /// unclamped.
    pub miter_limit: f32,
    /// Solid ribbon color.
    pub color: Color,
}

impl LineStyle {
    pub fn new(color: Color) -> Self {
        Self {
            thickness: DEFAULT_THICKNESS,
            miter_limit: DEFAULT_MITER_LIMIT,
            color,
        }
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_miter_limit(mut self, miter_limit: f32) -> Self {
        self.miter_limit = miter_limit;
        self
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

/// Interleave split coordinate slices into the `x0, y0, x1, y1, ...` layout
/// of the point buffer.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn interleave_points(xs: &[f32], ys: &[f32]) -> Vec<f32> {
    assert_eq!(xs.len(), ys.len(), "coordinate slices must match in length");
    xs.iter()
        .zip(ys.iter())
        .flat_map(|(&x, &y)| [x, y])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        // vec2f + vec2f
        assert_eq!(std::mem::size_of::<ViewTransform>(), 16);
        // vec4f + three scalars, rounded up to a 16 byte multiple
        assert_eq!(std::mem::size_of::<LineParams>(), 32);
    }

    #[test]
    fn params_capture_style() {
        let style = LineStyle::new(Color::rgba8(255, 0, 0, 255)).with_thickness(0.25);
        let params = LineParams::new(&style, 7);
        assert_eq!(params.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(params.thickness, 0.25);
        assert_eq!(params.miter_limit, DEFAULT_MITER_LIMIT);
        assert_eq!(params.point_count, 7);
    }

    #[test]
    fn interleave_alternates_coordinates() {
        let points = interleave_points(&[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0]);
        assert_eq!(points, [0.0, 5.0, 1.0, 6.0, 2.0, 7.0]);
    }
}
