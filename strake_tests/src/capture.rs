// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Readback of generated strip positions through the capture permutations.

use anyhow::{anyhow, bail, Result};
use bytemuck::{bytes_of, cast_slice};
use strake::util::{block_on_wgpu, RenderContext};
use strake::wgpu::util::DeviceExt;
use strake::wgpu::{self, BufferUsages};
use strake::{interleave_points, LineParams, ViewTransform};
use strake_shaders::BindType;

use crate::TestLine;

pub fn capture_positions_sync(
    line: &TestLine,
    view: Option<ViewTransform>,
) -> Result<Vec<[f32; 4]>> {
    pollster::block_on(capture_positions(line, view))
}

/// Run the capture compute entry over `line` and read back every generated
/// clip position, in vertex index order.
///
/// This is the exact vertex shader expansion the render pipelines use, so it
/// pins the GPU geometry down without rasterizing anything.
pub async fn capture_positions(
    line: &TestLine,
    view: Option<ViewTransform>,
) -> Result<Vec<[f32; 4]>> {
    let mut context = RenderContext::new();
    let device_id = context
        .device(None)
        .await
        .ok_or_else(|| anyhow!("No compatible device found"))?;
    let device_handle = &context.devices[device_id];
    let device = &device_handle.device;
    let queue = &device_handle.queue;

    let shader = if view.is_some() {
        &strake_shaders::SHADERS.ribbon_capture
    } else {
        &strake_shaders::SHADERS.ribbon_raw_capture
    };
    let [wg_size, _, _] = shader
        .workgroup_size
        .ok_or_else(|| anyhow!("capture permutation must have a compute entry"))?;

    let point_count = line.xs.len() as u32;
    if point_count == 0 {
        bail!("capture needs at least one point");
    }
    let vertex_count = 2 * point_count;
    let points = interleave_points(&line.xs, &line.ys);
    let params = LineParams::new(&line.style, point_count);

    let points_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("capture points"),
        contents: cast_slice(&points),
        usage: BufferUsages::STORAGE,
    });
    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("capture params"),
        contents: bytes_of(&params),
        usage: BufferUsages::UNIFORM,
    });
    let positions_size = u64::from(vertex_count) * 16;
    let positions_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("capture positions"),
        size: positions_size,
        usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let layouts: Vec<wgpu::BindGroupLayout> = (0..shader.group_count())
        .map(|group| {
            let entries: Vec<_> = shader
                .group_bindings(group)
                .into_iter()
                .map(|(binding, ty)| layout_entry(binding, ty))
                .collect();
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: None,
                entries: &entries,
            })
        })
        .collect();
    let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("capture"),
        bind_group_layouts: &layout_refs,
        push_constant_ranges: &[],
    });
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&shader.name),
        source: wgpu::ShaderSource::Wgsl(shader.wgsl.clone()),
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&shader.name),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: "main",
        compilation_options: Default::default(),
        cache: None,
    });

    let view_buffer = view.map(|view| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("capture view"),
            contents: bytes_of(&view),
            usage: BufferUsages::UNIFORM,
        })
    });
    let group0_entries = match &view_buffer {
        Some(buffer) => vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        None => Vec::new(),
    };
    let bind_groups = [
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("capture view"),
            layout: &layouts[0],
            entries: &group0_entries,
        }),
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("capture line"),
            layout: &layouts[1],
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: points_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        }),
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("capture positions"),
            layout: &layouts[2],
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: positions_buffer.as_entire_binding(),
            }],
        }),
    ];

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("capture staging"),
        size: positions_size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("capture"),
    });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("capture"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        for (group, bind_group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(group as u32, bind_group, &[]);
        }
        pass.dispatch_workgroups(vertex_count.div_ceil(wg_size), 1, 1);
    }
    encoder.copy_buffer_to_buffer(&positions_buffer, 0, &staging, 0, positions_size);
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
    Ok(cast_slice(&data).to_vec())
}

fn layout_entry(binding: u32, ty: BindType) -> wgpu::BindGroupLayoutEntry {
    let buffer_ty = match ty {
        BindType::Buffer => wgpu::BufferBindingType::Storage { read_only: false },
        BindType::BufReadOnly => wgpu::BufferBindingType::Storage { read_only: true },
        BindType::Uniform => wgpu::BufferBindingType::Uniform,
    };
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: buffer_ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
