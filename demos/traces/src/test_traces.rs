// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Procedurally generated traces covering the geometry regimes worth looking
//! at: smooth curves, right angles, near-switchbacks and noisy data.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use strake::peniko::Color;
use strake::LineStyle;

use crate::{Trace, TraceConfig, TraceSet};

/// Default number of steps in the generated random walks.
pub const WALK_STEPS: usize = 4096;

/// The standard demo set.
pub fn test_traces() -> TraceSet {
    test_traces_sized(WALK_STEPS)
}

/// The standard demo set, with `walk_steps` points per random walk.
pub fn test_traces_sized(walk_steps: usize) -> TraceSet {
    TraceSet {
        traces: vec![
            random_walk(walk_steps, 1),
            random_walk(walk_steps, 2),
            sine(512),
            staircase(24),
            switchback(40),
            spiral(720),
        ],
    }
}

fn trace(name: &str, xs: Vec<f32>, ys: Vec<f32>, style: LineStyle) -> Trace {
    Trace {
        config: TraceConfig {
            name: name.to_owned(),
        },
        xs,
        ys,
        style,
    }
}

/// Cumulative sum of standard normal steps. The seed also names the walk, so
/// the same call always produces the same data.
pub fn random_walk(steps: usize, seed: u64) -> Trace {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut xs = Vec::with_capacity(steps);
    let mut ys = Vec::with_capacity(steps);
    let mut value = 0.0_f32;
    for i in 0..steps {
        xs.push(i as f32);
        ys.push(value);
        let step: f32 = StandardNormal.sample(&mut rng);
        value += step;
    }
    let color = if seed % 2 == 0 {
        Color::MAGENTA
    } else {
        Color::ROYAL_BLUE
    };
    trace(
        &format!("random_walk_{seed}"),
        xs,
        ys,
        LineStyle::new(color).with_thickness(0.004),
    )
}

/// A few cycles of a sine wave. Every joint is nearly collinear.
pub fn sine(samples: usize) -> Trace {
    let cycles = 3.0;
    let mut xs = Vec::with_capacity(samples);
    let mut ys = Vec::with_capacity(samples);
    for i in 0..samples {
        let phase = i as f32 / (samples - 1) as f32;
        xs.push(phase * samples as f32);
        ys.push((cycles * std::f32::consts::TAU * phase).sin());
    }
    trace(
        "sine",
        xs,
        ys,
        LineStyle::new(Color::SEA_GREEN).with_thickness(0.006),
    )
}

/// Axis-aligned steps. Every interior joint is a right angle.
pub fn staircase(steps: usize) -> Trace {
    let mut xs = Vec::with_capacity(2 * steps + 1);
    let mut ys = Vec::with_capacity(2 * steps + 1);
    xs.push(0.0);
    ys.push(0.0);
    for i in 0..steps {
        xs.push((i + 1) as f32);
        ys.push(i as f32);
        xs.push((i + 1) as f32);
        ys.push((i + 1) as f32);
    }
    trace(
        "staircase",
        xs,
        ys,
        LineStyle::new(Color::GOLDENROD).with_thickness(0.01),
    )
}

/// A tight zigzag whose joints almost reverse direction, so the miters run
/// into the length limit.
pub fn switchback(teeth: usize) -> Trace {
    let mut xs = Vec::with_capacity(teeth + 1);
    let mut ys = Vec::with_capacity(teeth + 1);
    for i in 0..=teeth {
        xs.push(if i % 2 == 0 { 0.0 } else { 10.0 });
        ys.push(i as f32 * 0.2);
    }
    trace(
        "switchback",
        xs,
        ys,
        LineStyle::new(Color::TOMATO).with_thickness(0.008),
    )
}

/// An archimedean spiral, turning through joints of every angle.
pub fn spiral(samples: usize) -> Trace {
    let turns = 4.0;
    let mut xs = Vec::with_capacity(samples);
    let mut ys = Vec::with_capacity(samples);
    for i in 0..samples {
        let theta = turns * std::f32::consts::TAU * i as f32 / (samples - 1) as f32;
        xs.push(theta * theta.cos());
        ys.push(theta * theta.sin());
    }
    trace(
        "spiral",
        xs,
        ys,
        LineStyle::new(Color::SLATE_BLUE).with_thickness(0.006),
    )
}
