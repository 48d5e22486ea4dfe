// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between data space and the clip-space rectangle the ribbons are
//! drawn into, plus the interactive state (drag, zoom, resize) that moves
//! that mapping around.

use std::ops::{Add, AddAssign};

use crate::ViewTransform;

/// A closed interval on one axis of data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    pub const INFINITY: Self = Self {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    #[inline]
    pub fn size(self) -> f64 {
        self.max - self.min
    }

    /// Intersect with `other`.
    #[inline]
    pub fn clamp(self, other: Self) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Shift `other` until it lies within `self`, keeping its size where
    /// possible. An `other` larger than `self` collapses to `self`.
    #[inline]
    pub fn bound(self, other: Self) -> Self {
        if other.size() > self.size() {
            self
        } else if other.min < self.min {
            let shift = self.min - other.min;
            Self {
                min: other.min + shift,
                max: other.max + shift,
            }
        } else if other.max > self.max {
            let shift = other.max - self.max;
            Self {
                min: other.min - shift,
                max: other.max - shift,
            }
        } else {
            other
        }
    }

    /// Grow by `fraction` of the size on both ends.
    #[inline]
    pub fn expand(self, fraction: f64) -> Self {
        let pad = self.size() * fraction;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// The smallest interval covering every finite value, widened to a
    /// non-empty interval when all values coincide. `None` when no finite
    /// value is present.
    pub fn covering(values: &[f32]) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in values {
            if value.is_finite() {
                min = min.min(f64::from(value));
                max = max.max(f64::from(value));
            }
        }
        if min > max {
            return None;
        }
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        Some(Self { min, max })
    }
}

impl Add for Interval {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            min: self.min + other.min,
            max: self.max + other.max,
        }
    }
}

impl AddAssign for Interval {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Add<f64> for Interval {
    type Output = Interval;

    fn add(self, other: f64) -> Self::Output {
        Interval {
            min: self.min + other,
            max: self.max + other,
        }
    }
}

impl AddAssign<f64> for Interval {
    fn add_assign(&mut self, other: f64) {
        *self = *self + other;
    }
}

/// An axis-aligned window of data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: Interval,
    pub y: Interval,
}

impl Bounds {
    pub const UNIT: Self = Self {
        x: Interval::UNIT,
        y: Interval::UNIT,
    };

    pub const INFINITY: Self = Self {
        x: Interval::INFINITY,
        y: Interval::INFINITY,
    };

    #[inline]
    pub fn clamp(self, other: Self) -> Self {
        Self {
            x: self.x.clamp(other.x),
            y: self.y.clamp(other.y),
        }
    }

    #[inline]
    pub fn bound(self, other: Self) -> Self {
        Self {
            x: self.x.bound(other.x),
            y: self.y.bound(other.y),
        }
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self {
            x: Interval {
                min: self.x.min.min(other.x.min),
                max: self.x.max.max(other.x.max),
            },
            y: Interval {
                min: self.y.min.min(other.y.min),
                max: self.y.max.max(other.y.max),
            },
        }
    }

    /// Grow both axes by `fraction` of their size on every side.
    #[inline]
    pub fn expand(self, fraction: f64) -> Self {
        Self {
            x: self.x.expand(fraction),
            y: self.y.expand(fraction),
        }
    }

    /// The smallest bounds covering every finite point of the split
    /// coordinate slices. `None` when no finite point is present.
    pub fn from_points(xs: &[f32], ys: &[f32]) -> Option<Self> {
        let x = Interval::covering(xs)?;
        let y = Interval::covering(ys)?;
        Some(Self { x, y })
    }
}

/// Logical-pixel padding between the render target edge and the inner plot
/// area the data window maps onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Padding {
    pub const ZERO: Self = Self {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
    };

    pub const fn even(amount: f64) -> Self {
        Self {
            top: amount,
            bottom: amount,
            left: amount,
            right: amount,
        }
    }
}

/// Configuration for a [`Viewport`], built before the target size and data
/// are known.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportBuilder {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub initial_bounds: Option<Bounds>,
    pub interaction_bounds: Bounds,
}

impl ViewportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_initial_bounds(mut self, bounds: Bounds) -> Self {
        self.initial_bounds = Some(bounds);
        self
    }

    /// Limit how far the data window can be dragged or zoomed out.
    pub fn with_interaction_bounds(mut self, bounds: Bounds) -> Self {
        self.interaction_bounds = bounds;
        self
    }

    /// Instantiate the viewport. Explicit initial bounds win over
    /// `data_bounds`; with neither, the unit square is shown.
    pub fn build(self, scale_factor: f64, data_bounds: Option<Bounds>) -> Viewport {
        let data_bounds = self
            .initial_bounds
            .or(data_bounds)
            .unwrap_or(Bounds::UNIT);

        Viewport {
            logical_width: self.width,
            logical_height: self.height,
            padding: self.padding,
            data_bounds,
            interaction_bounds: self.interaction_bounds,
            scale_factor,
        }
    }
}

impl Default for ViewportBuilder {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: Padding {
                top: 20.0,
                bottom: 20.0,
                left: 50.0,
                right: 20.0,
            },
            initial_bounds: None,
            interaction_bounds: Bounds::INFINITY,
        }
    }
}

/// A live view of a window of data space, positioned inside a render target.
///
/// Mouse positions taken by the interaction methods are physical-pixel
/// positions with y growing downwards, as delivered by windowing systems.
/// Data space has y growing upwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub logical_width: f64,
    pub logical_height: f64,
    pub padding: Padding,

    pub data_bounds: Bounds,
    pub interaction_bounds: Bounds,

    pub scale_factor: f64,
}

impl Viewport {
    /// The uniform mapping data space onto clip space, combining the data
    /// window, the padding and the target size into one scale and offset
    /// per axis.
    pub fn transform(&self) -> ViewTransform {
        let inner_width = self.inner_width();
        let inner_height = self.inner_height();
        let x = self.data_bounds.x;
        let y = self.data_bounds.y;

        let scale_x = 2.0 * inner_width / (self.logical_width * x.size());
        let scale_y = 2.0 * inner_height / (self.logical_height * y.size());
        let offset_x = 2.0 * (self.padding.left - x.min * inner_width / x.size())
            / self.logical_width
            - 1.0;
        let offset_y = 2.0 * (self.padding.bottom - y.min * inner_height / y.size())
            / self.logical_height
            - 1.0;

        ViewTransform {
            scale: [scale_x as f32, scale_y as f32],
            offset: [offset_x as f32, offset_y as f32],
        }
    }

    fn inner_width(&self) -> f64 {
        self.logical_width - self.padding.left - self.padding.right
    }

    fn inner_height(&self) -> f64 {
        self.logical_height - self.padding.top - self.padding.bottom
    }

    fn is_on_inner(&self, mouse_position: (f64, f64)) -> bool {
        let (x, y) = (
            mouse_position.0 / self.scale_factor,
            mouse_position.1 / self.scale_factor,
        );

        x >= self.padding.left
            && x <= self.logical_width - self.padding.right
            && y >= self.padding.top
            && y <= self.logical_height - self.padding.bottom
    }

    /// The data-space position under a mouse position, or `None` outside the
    /// inner plot area.
    pub fn to_data_position(&self, mouse_position: (f64, f64)) -> Option<(f64, f64)> {
        let logical = (
            mouse_position.0 / self.scale_factor,
            self.logical_height - mouse_position.1 / self.scale_factor,
        );
        let inner = (
            logical.0 - self.padding.left,
            logical.1 - self.padding.bottom,
        );
        let fraction = (inner.0 / self.inner_width(), inner.1 / self.inner_height());

        if fraction.0 >= 0. && fraction.0 <= 1. && fraction.1 >= 0. && fraction.1 <= 1. {
            Some((
                self.data_bounds.x.min + fraction.0 * self.data_bounds.x.size(),
                self.data_bounds.y.min + fraction.1 * self.data_bounds.y.size(),
            ))
        } else {
            None
        }
    }

    /// Track a physical resize of the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.logical_width = f64::from(width) / self.scale_factor;
        self.logical_height = f64::from(height) / self.scale_factor;
    }

    /// Pan the data window so the content follows the cursor. All three
    /// positions must lie on the inner plot area for the drag to apply.
    pub fn drag(
        &mut self,
        start_position: (f64, f64),
        previous_position: (f64, f64),
        current_position: (f64, f64),
    ) {
        if !self.is_on_inner(start_position)
            || !self.is_on_inner(previous_position)
            || !self.is_on_inner(current_position)
        {
            return;
        }

        let change = (
            current_position.0 - previous_position.0,
            current_position.1 - previous_position.1,
        );

        let data_x = change.0 * self.data_bounds.x.size() / (self.scale_factor * self.inner_width());
        let data_y =
            change.1 * self.data_bounds.y.size() / (self.scale_factor * self.inner_height());

        // Screen y grows downwards, data y upwards.
        self.data_bounds.x += -data_x;
        self.data_bounds.y += data_y;

        self.data_bounds = self.interaction_bounds.bound(self.data_bounds);
    }

    /// Scale the data window about the data point under the cursor. Factors
    /// below one zoom in.
    pub fn zoom(&mut self, mouse_position: (f64, f64), factor: f64) {
        if let Some(center) = self.to_data_position(mouse_position) {
            self.data_bounds = Bounds {
                x: Interval {
                    min: center.0 - (center.0 - self.data_bounds.x.min) * factor,
                    max: center.0 + (self.data_bounds.x.max - center.0) * factor,
                },
                y: Interval {
                    min: center.1 - (center.1 - self.data_bounds.y.min) * factor,
                    max: center.1 + (self.data_bounds.y.max - center.1) * factor,
                },
            };

            self.data_bounds = self.interaction_bounds.bound(self.data_bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(padding: Padding, bounds: Bounds) -> Viewport {
        ViewportBuilder::new()
            .with_width(200.0)
            .with_height(100.0)
            .with_padding(padding)
            .build(1.0, Some(bounds))
    }

    #[test]
    fn transform_maps_bounds_corners_to_padded_edges() {
        let padding = Padding {
            top: 10.0,
            bottom: 20.0,
            left: 30.0,
            right: 40.0,
        };
        let bounds = Bounds {
            x: Interval { min: -5.0, max: 15.0 },
            y: Interval { min: 2.0, max: 4.0 },
        };
        let transform = viewport(padding, bounds).transform();

        let [min_x, min_y] = transform.apply([-5.0, 2.0]);
        let [max_x, max_y] = transform.apply([15.0, 4.0]);
        // left edge: 2 * 30 / 200 - 1, bottom edge: 2 * 20 / 100 - 1
        assert!((min_x - -0.7).abs() < 1e-6);
        assert!((min_y - -0.6).abs() < 1e-6);
        // right edge: 2 * 160 / 200 - 1, top edge: 2 * 90 / 100 - 1
        assert!((max_x - 0.6).abs() < 1e-6);
        assert!((max_y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_padding_maps_bounds_to_full_clip_square() {
        let transform = viewport(Padding::ZERO, Bounds::UNIT).transform();
        assert_eq!(transform.apply([0.0, 0.0]), [-1.0, -1.0]);
        assert_eq!(transform.apply([1.0, 1.0]), [1.0, 1.0]);
        assert_eq!(transform.apply([0.5, 0.5]), [0.0, 0.0]);
    }

    #[test]
    fn bound_shifts_window_back_inside() {
        let limit = Interval { min: 0.0, max: 10.0 };
        let shifted = limit.bound(Interval { min: -2.0, max: 3.0 });
        assert_eq!(shifted, Interval { min: 0.0, max: 5.0 });
        let shifted = limit.bound(Interval { min: 8.0, max: 13.0 });
        assert_eq!(shifted, Interval { min: 5.0, max: 10.0 });
        let oversized = limit.bound(Interval { min: -5.0, max: 20.0 });
        assert_eq!(oversized, limit);
    }

    #[test]
    fn zoom_scales_about_the_cursor() {
        let mut viewport = viewport(Padding::ZERO, Bounds::UNIT);
        // Center of the target, i.e. data (0.5, 0.5).
        viewport.zoom((100.0, 50.0), 0.5);
        assert_eq!(viewport.data_bounds.x, Interval { min: 0.25, max: 0.75 });
        assert_eq!(viewport.data_bounds.y, Interval { min: 0.25, max: 0.75 });
    }

    #[test]
    fn drag_moves_content_with_the_cursor() {
        let mut viewport = viewport(Padding::ZERO, Bounds::UNIT);
        // Dragging right by a tenth of the width reveals data to the left.
        viewport.drag((100.0, 50.0), (100.0, 50.0), (120.0, 50.0));
        assert!((viewport.data_bounds.x.min - -0.1).abs() < 1e-9);
        assert!((viewport.data_bounds.x.max - 0.9).abs() < 1e-9);
        assert_eq!(viewport.data_bounds.y, Interval::UNIT);
    }

    #[test]
    fn covering_ignores_non_finite_values_and_widens_constants() {
        let interval = Interval::covering(&[1.0, f32::NAN, 3.0, 2.0]).unwrap();
        assert_eq!(interval, Interval { min: 1.0, max: 3.0 });
        let constant = Interval::covering(&[2.0, 2.0]).unwrap();
        assert_eq!(constant, Interval { min: 1.5, max: 2.5 });
        assert!(Interval::covering(&[f32::NAN]).is_none());
        assert!(Interval::covering(&[]).is_none());
    }
}
