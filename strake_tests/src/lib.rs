// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strake tests.

#![warn(unused_crate_dependencies)]
#![allow(missing_docs, missing_debug_implementations, unreachable_pub)]

use std::env;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use strake::peniko::Color;
use strake::util::{block_on_wgpu, RenderContext};
use strake::wgpu::{
    self, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Extent3d, TextureDescriptor,
    TextureFormat, TextureUsages,
};
use strake::{LineStyle, Polyline, RendererOptions, ViewTransform};

// Suppress the unused_crate_dependencies lint; only the tests use traces.
use traces as _;

mod capture;

pub use capture::{capture_positions, capture_positions_sync};

pub struct TestParams {
    pub width: u32,
    pub height: u32,
    pub base_color: Color,
    pub sample_count: u32,
    pub view: Option<ViewTransform>,
    pub name: String,
}

impl TestParams {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            base_color: Color::BLACK,
            sample_count: 1,
            view: None,
            name: name.into(),
        }
    }
}

/// A polyline described on the host, uploaded per render.
pub struct TestLine {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub style: LineStyle,
}

impl TestLine {
    pub fn new(xs: impl Into<Vec<f32>>, ys: impl Into<Vec<f32>>, style: LineStyle) -> Self {
        Self {
            xs: xs.into(),
            ys: ys.into(),
            style,
        }
    }
}

/// An RGBA8 frame read back from the GPU.
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height);
        let ix = ((y * self.width + x) * 4) as usize;
        let &[r, g, b, a] = &self.data[ix..ix + 4] else {
            unreachable!()
        };
        [r, g, b, a]
    }
}

pub fn render_lines_sync(lines: &[TestLine], params: &TestParams) -> Result<RenderedImage> {
    pollster::block_on(render_lines(lines, params))
}

/// Render `lines` into an RGBA8 texture and read the frame back.
///
/// If the `STRAKE_DEBUG_TEST` environment variable names this test (or is
/// `all`), the frame is also written as a PNG under `debug_outputs/`.
pub async fn render_lines(lines: &[TestLine], params: &TestParams) -> Result<RenderedImage> {
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
            sample_count: params.sample_count,
        },
    );
    let polylines: Vec<Polyline> = lines
        .iter()
        .map(|line| Polyline::new(device, &line.xs, &line.ys, line.style))
        .collect();

    let width = params.width;
    let height = params.height;
    let render_params = strake::RenderParams {
        base_color: params.base_color,
        width,
        height,
        view: params.view,
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
        label: Some("val"),
        size: buffer_size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
        label: Some("Render and copy out"),
    });
    renderer.render_to_texture(device, &mut encoder, &view, &polylines, &render_params);
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
    let mut result_unpadded = Vec::<u8>::with_capacity((width * height * 4) as usize);
    for row in 0..height {
        let start = (row * padded_byte_width) as usize;
        result_unpadded.extend(&data[start..start + (width * 4) as usize]);
    }

    let image = RenderedImage {
        width,
        height,
        data: result_unpadded,
    };
    let out_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("debug_outputs")
        .join(&params.name)
        .with_extension("png");
    if env_var_relates_to("STRAKE_DEBUG_TEST", &params.name) {
        write_png_to_file(&out_path, &image)?;
    } else {
        match std::fs::remove_file(&out_path) {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::NotFound => (),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(image)
}

pub fn write_png_to_file(out_path: &Path, image: &RenderedImage) -> Result<()> {
    if let Some(dir) = out_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(out_path)?;
    let mut encoder = png::Encoder::new(file, image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.data)?;
    writer.finish()?;
    Ok(())
}

/// Determine whether the value of the environment variable `env_var`
/// includes a specific test.
/// This is used when dumping the debug output.
fn env_var_relates_to(env_var: &'static str, name: &str) -> bool {
    if let Ok(val) = env::var(env_var) {
        if val.eq_ignore_ascii_case("all") {
            return true;
        }
        for test in val.split(',') {
            if test.eq_ignore_ascii_case(name) {
                return true;
            }
        }
    }
    false
}
