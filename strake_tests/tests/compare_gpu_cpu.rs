// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests which ensure that the GPU vertex stage and its CPU mirror expand
//! the same strip across a range of the demo traces.
//!
//! This type of test is useful, as it avoids committing snapshots of
//! generated geometry to the repository.

use strake::{interleave_points, LineParams, ViewTransform};
use strake_shaders::cpu::ribbon_vertex;
use strake_tests::{capture_positions_sync, TestLine};
use traces::{test_traces, Trace};

/// Largest per-component difference tolerated between the GPU strip and the
/// CPU mirror. Both run the same arithmetic, so this only absorbs fused
/// multiply-adds and library `normalize` differences.
const TOLERANCE: f32 = 1e-4;

fn compare_line(name: &str, line: &TestLine, view: Option<ViewTransform>) {
    let gpu = capture_positions_sync(line, view).unwrap();
    let point_count = line.xs.len() as u32;
    assert_eq!(gpu.len(), 2 * point_count as usize);

    let points = interleave_points(&line.xs, &line.ys);
    let params = LineParams::new(&line.style, point_count);
    for (vertex_ix, gpu_vertex) in gpu.iter().enumerate() {
        let cpu_vertex = ribbon_vertex(vertex_ix as u32, &params, view.as_ref(), &points);
        for (gpu_value, cpu_value) in gpu_vertex.iter().zip(&cpu_vertex) {
            assert!(
                (gpu_value - cpu_value).abs() <= TOLERANCE,
                "vertex {vertex_ix} of {name} differs: gpu {gpu_vertex:?}, cpu {cpu_vertex:?}"
            );
        }
    }
}

fn compare_trace(trace: Trace, view: Option<ViewTransform>) {
    let line = TestLine::new(trace.xs, trace.ys, trace.style);
    compare_line(&trace.config.name, &line, view);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_random_walk() {
    compare_trace(test_traces::random_walk(512, 1), None);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_random_walk_viewed() {
    let view = ViewTransform::new([0.003, 0.02], [-0.8, 0.1]);
    compare_trace(test_traces::random_walk(512, 7), Some(view));
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_sine() {
    compare_trace(test_traces::sine(256), None);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_staircase() {
    let view = ViewTransform::new([0.05, 0.05], [-0.6, -0.6]);
    compare_trace(test_traces::staircase(16), Some(view));
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_switchback() {
    // Every joint of this trace clamps to the miter limit.
    compare_trace(test_traces::switchback(40), None);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_spiral() {
    compare_trace(test_traces::spiral(360), None);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_single_point() {
    // One point has no direction; both stages collapse the strip onto it.
    let line = TestLine::new([3.0], [4.0], Default::default());
    compare_line("single_point", &line, None);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn compare_duplicate_points() {
    let line = TestLine::new(
        [0.0, 0.0, 1.0, 1.0, 2.0],
        [0.0, 0.0, 0.5, 0.5, 0.0],
        Default::default(),
    );
    compare_line("duplicate_points", &line, None);
}
