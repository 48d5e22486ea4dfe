// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the CPU vertex generator.
//!
//! The GPU permutations are checked against the same generator in
//! `strake_tests`, so everything asserted here pins down the geometry the
//! shader is expected to produce.

use std::cell::RefCell;

use bytemuck::{bytes_of, cast_slice};
use strake_encoding::{interleave_points, LineParams, LineStyle, ViewTransform};
use strake_shaders::cpu::{ribbon, ribbon_raw, ribbon_vertex, CpuBinding};

fn params(thickness: f32, point_count: u32) -> LineParams {
    LineParams::new(&LineStyle::default().with_thickness(thickness), point_count)
}

fn strip(points: &[f32], params: &LineParams, view: Option<&ViewTransform>) -> Vec<[f32; 4]> {
    (0..2 * params.point_count)
        .map(|ix| ribbon_vertex(ix, params, view, points))
        .collect()
}

fn dist(out: [f32; 4], point: [f32; 2]) -> f32 {
    (out[0] - point[0]).hypot(out[1] - point[1])
}

#[test]
fn collinear_points_offset_perpendicular() {
    // On a straight run every join is flat, so the miter multiplier is
    // exactly 1 and the rails sit exactly half a thickness off the spine.
    let points = interleave_points(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.0, 0.0, 0.0]);
    let out = strip(&points, &params(0.5, 4), None);
    for (point_ix, x) in [0.0_f32, 1.0, 2.0, 3.0].into_iter().enumerate() {
        assert_eq!(out[2 * point_ix], [x, -0.25, 0.0, 1.0]);
        assert_eq!(out[2 * point_ix + 1], [x, 0.25, 0.0, 1.0]);
    }
}

#[test]
fn sides_alternate_across_the_strip() {
    let points = interleave_points(&[0.0, 4.0, 7.0, 9.0], &[0.0, 1.0, 5.0, 2.0]);
    let out = strip(&points, &params(0.8, 4), None);
    for point_ix in 0..4 {
        let even = out[2 * point_ix];
        let odd = out[2 * point_ix + 1];
        assert_ne!(even, odd, "the two rails must not coincide");
        // Opposite sides of the same point: the midpoint is the point itself.
        let curr = [points[2 * point_ix], points[2 * point_ix + 1]];
        assert!((0.5 * (even[0] + odd[0]) - curr[0]).abs() < 1e-5);
        assert!((0.5 * (even[1] + odd[1]) - curr[1]).abs() < 1e-5);
    }
}

#[test]
fn generator_is_deterministic() {
    let points = interleave_points(&[-5.0, -1.0, 4.0, 6.0], &[2.0, -3.0, 1.0, 7.0]);
    let params = params(0.37, 4);
    let first = strip(&points, &params, None);
    let second = strip(&points, &params, None);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
    }
}

#[test]
fn identity_view_matches_raw() {
    let points = interleave_points(&[1.0, 3.0, 4.5, 8.0], &[2.0, 5.0, 1.5, 3.0]);
    let params = params(0.37, 4);
    let raw = strip(&points, &params, None);
    let viewed = strip(&points, &params, Some(&ViewTransform::IDENTITY));
    for (a, b) in raw.iter().zip(viewed.iter()) {
        assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
    }
}

#[test]
fn clamped_ends_get_perpendicular_caps() {
    // At the first and last point the out of range neighbor sample is clamped
    // onto the point itself, which must degenerate into a flat end cap.
    let points = interleave_points(&[0.0, 10.0, 10.0], &[0.0, 0.0, 10.0]);
    let out = strip(&points, &params(2.0, 3), None);
    assert_eq!(out[0], [0.0, -1.0, 0.0, 1.0]);
    assert_eq!(out[1], [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(out[4], [11.0, 10.0, 0.0, 1.0]);
    assert_eq!(out[5], [9.0, 10.0, 0.0, 1.0]);

    // A two point polyline is nothing but its caps.
    let segment = interleave_points(&[0.0, 10.0], &[0.0, 0.0]);
    let out = strip(&segment, &params(2.0, 2), None);
    assert_eq!(out[0], [0.0, -1.0, 0.0, 1.0]);
    assert_eq!(out[1], [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(out[2], [10.0, -1.0, 0.0, 1.0]);
    assert_eq!(out[3], [10.0, 1.0, 0.0, 1.0]);
}

#[test]
fn right_angle_corner_miters_at_sqrt_two() {
    let points = interleave_points(&[0.0, 10.0, 10.0], &[0.0, 0.0, 10.0]);
    let out = strip(&points, &params(2.0, 3), None);
    // The corner miter points along normalize((-1, 1)) and stretches the half
    // thickness by sqrt(2), landing on the outer and inner corner.
    assert!(dist(out[2], [11.0, -1.0]) < 1e-5);
    assert!(dist(out[3], [9.0, 1.0]) < 1e-5);
}

#[test]
fn miter_limit_clamps_near_switchback() {
    let points = interleave_points(&[0.0, 10.0, 0.0], &[0.0, 0.0, 0.1]);
    let corner = [10.0, 0.0];

    let limited = params(2.0, 3);
    let out = strip(&points, &limited, None);
    assert!((dist(out[2], corner) - 0.5 * 2.0 * limited.miter_limit).abs() < 1e-3);

    let style = LineStyle::default()
        .with_thickness(2.0)
        .with_miter_limit(f32::INFINITY);
    let unlimited = LineParams::new(&style, 3);
    let out = strip(&points, &unlimited, None);
    assert!(dist(out[2], corner) > 100.0);
}

#[test]
fn exact_switchback_falls_back_to_normal() {
    // The two normals cancel exactly, so the offset keeps the incoming
    // normal and the plain half thickness.
    let points = interleave_points(&[0.0, 10.0, 0.0], &[0.0, 0.0, 0.0]);
    let out = strip(&points, &params(2.0, 3), None);
    assert_eq!(out[2], [10.0, -1.0, 0.0, 1.0]);
    assert_eq!(out[3], [10.0, 1.0, 0.0, 1.0]);
}

#[test]
fn interior_duplicate_point_borrows_direction() {
    let points = interleave_points(&[0.0, 5.0, 5.0, 10.0], &[0.0, 0.0, 0.0, 0.0]);
    let out = strip(&points, &params(0.5, 4), None);
    assert_eq!(out[2], [5.0, -0.25, 0.0, 1.0]);
    assert_eq!(out[3], [5.0, 0.25, 0.0, 1.0]);
    assert_eq!(out[4], [5.0, -0.25, 0.0, 1.0]);
    assert_eq!(out[5], [5.0, 0.25, 0.0, 1.0]);
}

#[test]
fn single_point_collapses() {
    let out = strip(&[3.0, 4.0], &params(2.0, 1), None);
    assert_eq!(out[0], [3.0, 4.0, 0.0, 1.0]);
    assert_eq!(out[1], [3.0, 4.0, 0.0, 1.0]);
}

#[test]
fn cpu_bindings_match_direct_calls() {
    let points = interleave_points(&[0.0, 2.0, 3.0, 7.0, 8.0], &[1.0, 4.0, -2.0, 0.5, 3.0]);
    let params = params(0.6, 5);
    let view = ViewTransform::new([0.5, 2.0], [0.25, -0.75]);
    let n_wg = (2 * params.point_count).div_ceil(64);

    let raw_out = RefCell::new(vec![0_u8; 2 * params.point_count as usize * 16]);
    ribbon_raw(
        n_wg,
        &[
            CpuBinding::Buffer(cast_slice(&points)),
            CpuBinding::Buffer(bytes_of(&params)),
            CpuBinding::BufferRW(&raw_out),
        ],
    );
    let raw = raw_out.borrow();
    assert_eq!(
        cast_slice::<_, [f32; 4]>(&raw),
        strip(&points, &params, None).as_slice(),
    );

    let viewed_out = RefCell::new(vec![0_u8; 2 * params.point_count as usize * 16]);
    ribbon(
        n_wg,
        &[
            CpuBinding::Buffer(bytes_of(&view)),
            CpuBinding::Buffer(cast_slice(&points)),
            CpuBinding::Buffer(bytes_of(&params)),
            CpuBinding::BufferRW(&viewed_out),
        ],
    );
    let viewed = viewed_out.borrow();
    assert_eq!(
        cast_slice::<_, [f32; 4]>(&viewed),
        strip(&points, &params, Some(&view)).as_slice(),
    );
}
