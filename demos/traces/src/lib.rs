// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polyline traces used by the demos and the integration tests.

pub mod test_traces;

use anyhow::{anyhow, Result};
use clap::Args;
use strake::peniko::Color;
use strake::{Bounds, LineStyle};

pub use test_traces::test_traces;

/// A named polyline in data coordinates, with the style to draw it in.
pub struct Trace {
    pub config: TraceConfig,
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub style: LineStyle,
}

pub struct TraceConfig {
    pub name: String,
}

pub struct TraceSet {
    pub traces: Vec<Trace>,
}

impl Trace {
    /// Data-space bounds of the trace, ignoring thickness. `None` when the
    /// trace has no finite point.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.xs, &self.ys)
    }
}

impl TraceSet {
    /// Bounds covering every trace in the set.
    pub fn bounds(&self) -> Option<Bounds> {
        self.traces
            .iter()
            .filter_map(Trace::bounds)
            .reduce(Bounds::union)
    }
}

#[derive(Args, Debug)]
/// Shared config for trace generation
pub struct Arguments {
    #[arg(help_heading = "Trace Generation")]
    #[arg(long, global(false))]
    /// Number of steps in each generated random walk
    pub walk_steps: Option<usize>,
    #[arg(help_heading = "Render Parameters")]
    #[arg(long, global(false))]
    /// The clear color behind the traces.
    /// Format is CSS style hexadecimal (#RGB, #RGBA, #RRGGBB, #RRGGBBAA) or
    /// an SVG color name such as "aliceblue"
    base_color: Option<String>,
}

impl Arguments {
    pub fn select_trace_set(&self) -> TraceSet {
        test_traces::test_traces_sized(self.walk_steps.unwrap_or(test_traces::WALK_STEPS))
    }

    pub fn get_base_color(&self) -> Result<Option<Color>> {
        self.base_color.as_ref().map_or_else(
            || Ok(None),
            |s| {
                Color::parse(s)
                    .ok_or_else(|| anyhow!("malformed color: {s}"))
                    .map(Some)
            },
        )
    }
}
