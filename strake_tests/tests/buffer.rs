// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Round trips the growable point buffer through edits that force it to
//! relocate, then reads the device copy back.

use anyhow::{anyhow, bail, Result};
use strake::util::{block_on_wgpu, RenderContext};
use strake::wgpu::{self, BufferUsages};
use strake::{LineStyle, Polyline};

async fn points_after_edits() -> Result<(usize, Vec<f32>)> {
    let mut context = RenderContext::new();
    let device_id = context
        .device(None)
        .await
        .ok_or_else(|| anyhow!("No compatible device found"))?;
    let device_handle = &context.devices[device_id];
    let device = &device_handle.device;
    let queue = &device_handle.queue;

    let mut polyline = Polyline::new(device, &[0.0, 1.0], &[10.0, 11.0], LineStyle::default());
    // Both edits outgrow the current allocation, so each relocates the buffer.
    let append = polyline.append(device, 2.0, 12.0);
    let extend = polyline.extend(device, &[3.0, 4.0], &[13.0, 14.0]);
    queue.submit([append, extend]);

    let byte_size = (polyline.points().len() * std::mem::size_of::<f32>()) as u64;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("points staging"),
        size: byte_size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("read points"),
    });
    encoder.copy_buffer_to_buffer(polyline.points().buffer(), 0, &staging, 0, byte_size);
    queue.submit([encoder.finish()]);

    let buf_slice = staging.slice(..);
    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buf_slice.map_async(wgpu::MapMode::Read, move |v| sender.send(v).unwrap());
    if let Some(recv_result) = block_on_wgpu(device, receiver.receive()) {
        recv_result?;
    } else {
        bail!("channel was closed");
    }
    let data = buf_slice.get_mapped_range();
    Ok((polyline.len(), bytemuck::cast_slice(&data).to_vec()))
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn growing_preserves_appended_points() {
    let (len, points) = pollster::block_on(points_after_edits()).unwrap();
    assert_eq!(len, 5);
    assert_eq!(
        points,
        [0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0, 4.0, 14.0]
    );
}
