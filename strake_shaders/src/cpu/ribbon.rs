// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use strake_encoding::{LineParams, ViewTransform};

use super::util::Vec2;
use super::CpuBinding;

const WG_SIZE: usize = 64;

fn read_point(points: &[f32], ix: u32) -> Vec2 {
    let ix = ix as usize;
    Vec2::new(points[2 * ix], points[2 * ix + 1])
}

/// Generate one strip vertex, mirroring `generate_vertex` in
/// `shader/ribbon.wgsl`.
///
/// `view` is `Some` for the scene transform permutations and `None` for the
/// raw ones. `params.point_count` must be at least 1 and `vertex_ix` less
/// than twice that count.
pub fn ribbon_vertex(
    vertex_ix: u32,
    params: &LineParams,
    view: Option<&ViewTransform>,
    points: &[f32],
) -> [f32; 4] {
    let point_ix = vertex_ix / 2;
    let side = (vertex_ix % 2) as f32 * 2.0 - 1.0;
    let last = params.point_count - 1;

    let mut prev = read_point(points, point_ix.max(1) - 1);
    let mut curr = read_point(points, point_ix.min(last));
    let mut next = read_point(points, (point_ix + 1).min(last));
    if let Some(view) = view {
        prev = Vec2::from_array(view.apply(prev.to_array()));
        curr = Vec2::from_array(view.apply(curr.to_array()));
        next = Vec2::from_array(view.apply(next.to_array()));
    }

    // Clamped end samples and interior duplicate points make one of the
    // difference vectors zero; borrow the other so both directions stay well
    // defined.
    let mut v_in = curr - prev;
    let mut v_out = next - curr;
    if v_in == Vec2::ZERO {
        v_in = v_out;
    }
    if v_out == Vec2::ZERO {
        v_out = v_in;
    }
    if v_in == Vec2::ZERO {
        // Single point: no direction at all, collapse the strip.
        return [curr.x, curr.y, 0.0, 1.0];
    }

    let dir_in = v_in.normalize();
    let dir_out = v_out.normalize();
    let normal_in = Vec2::new(-dir_in.y, dir_in.x);
    let normal_out = Vec2::new(-dir_out.y, dir_out.x);

    let mut miter = normal_in + normal_out;
    let mut miter_len = 1.0;
    if miter == Vec2::ZERO {
        // Exact switchback: the miter direction is undefined, fall back to
        // the incoming normal.
        miter = normal_in;
    } else {
        miter = miter.normalize();
        miter_len = (1.0 / miter.dot(normal_in)).min(params.miter_limit);
    }

    let position = curr + miter * side * 0.5 * params.thickness * miter_len;
    [position.x, position.y, 0.0, 1.0]
}

fn ribbon_main(
    n_wg: u32,
    params: &LineParams,
    view: Option<&ViewTransform>,
    points: &[f32],
    positions: &mut [[f32; 4]],
) {
    for wg_ix in 0..n_wg as usize {
        for local_ix in 0..WG_SIZE {
            let vertex_ix = (wg_ix * WG_SIZE + local_ix) as u32;
            if vertex_ix < 2 * params.point_count {
                positions[vertex_ix as usize] = ribbon_vertex(vertex_ix, params, view, points);
            }
        }
    }
}

pub fn ribbon(n_wg: u32, resources: &[CpuBinding<'_>]) {
    let view = resources[0].as_typed();
    let points = resources[1].as_slice();
    let params = resources[2].as_typed();
    let mut positions = resources[3].as_slice_mut();
    ribbon_main(n_wg, &params, Some(&view), &points, &mut positions);
}

pub fn ribbon_raw(n_wg: u32, resources: &[CpuBinding<'_>]) {
    let points = resources[0].as_slice();
    let params = resources[1].as_typed();
    let mut positions = resources[2].as_slice_mut();
    ribbon_main(n_wg, &params, None, &points, &mut positions);
}
