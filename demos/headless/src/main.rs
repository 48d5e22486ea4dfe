// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use strake::peniko::Color;
use strake::util::{block_on_wgpu, RenderContext};
use strake::wgpu::{
    self, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Extent3d, TextureDescriptor,
    TextureFormat, TextureUsages,
};
use strake::{Polyline, RendererOptions, ViewportBuilder};
use traces::TraceSet;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let trace_set = args.args.select_trace_set();
    let mut trace_idx = None;
    for (idx, trace) in trace_set.traces.iter().enumerate() {
        if trace.config.name.eq_ignore_ascii_case(&args.trace) {
            if let Some(trace_idx) = trace_idx {
                eprintln!(
                    "Trace names conflict, skipping trace {idx} (instead rendering {trace_idx})"
                );
            } else {
                trace_idx = Some(idx);
            }
        }
    }
    let trace_idx = match trace_idx {
        Some(idx) => idx,
        None => {
            let parsed = args.trace.parse::<usize>().context(format!(
                "'{}' didn't match any trace, trying to parse as index",
                args.trace
            ))?;

            if parsed >= trace_set.traces.len() {
                if trace_set.traces.is_empty() {
                    bail!("Cannot select a trace, as there are no traces")
                }
                bail!(
                    "{parsed} doesn't fit in traces (len {})",
                    trace_set.traces.len()
                );
            }
            parsed
        }
    };
    if args.print_traces {
        println!("Available traces:");

        for (idx, trace) in trace_set.traces.iter().enumerate() {
            println!(
                "{idx}: {}{}",
                trace.config.name,
                if trace_idx == idx { " (selected)" } else { "" }
            );
        }
        return Ok(());
    }
    pollster::block_on(render(trace_set, trace_idx, &args))
}

async fn render(traces: TraceSet, index: usize, args: &Args) -> Result<()> {
    let mut context = RenderContext::new();
    let device_id = context
        .device(None)
        .await
        .ok_or_else(|| anyhow!("No compatible device found"))?;
    let device_handle = &context.devices[device_id];
    let device = &device_handle.device;
    let queue = &device_handle.queue;
    let mut renderer = strake::Renderer::new(
        device,
        RendererOptions {
            target_format: TextureFormat::Rgba8Unorm,
            sample_count: args.sample_count,
        },
    );

    let trace = &traces.traces[index];
    let polyline = Polyline::new(device, &trace.xs, &trace.ys, trace.style);

    let (width, height) = (args.width, args.height);
    let viewport = ViewportBuilder::new()
        .with_width(f64::from(width))
        .with_height(f64::from(height))
        .build(1.0, trace.bounds());
    let render_params = strake::RenderParams {
        base_color: args.args.get_base_color()?.unwrap_or(Color::BLACK),
        width,
        height,
        view: Some(viewport.transform()),
    };

    let size = Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = device.create_texture(&TextureDescriptor {
        label: Some("Target texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let padded_byte_width = (width * 4).next_multiple_of(256);
    let buffer_size = padded_byte_width as u64 * height as u64;
    let buffer = device.create_buffer(&BufferDescriptor {
        label: Some("readback"),
        size: buffer_size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
        label: Some("Render and copy out"),
    });
    renderer.render_to_texture(device, &mut encoder, &view, [&polyline], &render_params);
    encoder.copy_texture_to_buffer(
        target.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_byte_width),
                rows_per_image: None,
            },
        },
        size,
    );
    queue.submit([encoder.finish()]);
    let buf_slice = buffer.slice(..);

    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buf_slice.map_async(wgpu::MapMode::Read, move |v| sender.send(v).unwrap());
    if let Some(recv_result) = block_on_wgpu(device, receiver.receive()) {
        recv_result?;
    } else {
        bail!("channel was closed");
    }

    let data = buf_slice.get_mapped_range();
    let mut result_unpadded = Vec::<u8>::with_capacity((width * height * 4).try_into()?);
    for row in 0..height {
        let start = (row * padded_byte_width).try_into()?;
        result_unpadded.extend(&data[start..start + (width * 4) as usize]);
    }
    std::fs::create_dir_all(&args.out_directory)?;
    let out_path = args
        .out_directory
        .join(&trace.config.name)
        .with_extension("png");
    let mut file = File::create(&out_path)?;
    let mut png_encoder = png::Encoder::new(&mut file, width, height);
    png_encoder.set_color(png::ColorType::Rgba);
    png_encoder.set_depth(png::BitDepth::Eight);
    let mut writer = png_encoder.write_header()?;
    writer.write_image_data(&result_unpadded)?;
    writer.finish()?;
    println!("Wrote result ({width}x{height}) to {out_path:?}");
    Ok(())
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name="cargo run -p headless --")]
struct Args {
    /// Width of the output image
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Height of the output image
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Which trace (name) to render
    /// If no traces have that name, an index can be specified instead
    #[arg(long, short, default_value = "0", global(false))]
    trace: String,
    /// Samples per pixel of the multisampled render target
    #[arg(long, default_value_t = 4)]
    sample_count: u32,
    /// Directory to store the result into
    #[arg(long, default_value_os_t = default_directory())]
    out_directory: PathBuf,
    #[arg(long, short, global(false))]
    /// Display a list of all trace names
    print_traces: bool,
    #[command(flatten)]
    args: traces::Arguments,
}

fn default_directory() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("outputs")
}
