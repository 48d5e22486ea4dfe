// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::bytes_of;
use strake_encoding::ViewTransform;
use strake_shaders::{BindType, RenderShader};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Device, RenderPipeline, TextureFormat, TextureView};

use crate::Polyline;

/// Options which are set at renderer creation time, used in [`Renderer::new`].
#[derive(Clone, Debug)]
pub struct RendererOptions {
    /// Format of the color target the ribbons are drawn into.
    pub target_format: TextureFormat,
    /// Samples per pixel. `1` draws straight into the target; higher counts
    /// draw into a multisampled intermediate which is resolved into the
    /// target at the end of the pass.
    pub sample_count: u32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            target_format: TextureFormat::Rgba8Unorm,
            sample_count: 4,
        }
    }
}

/// Parameters used in a single render that are configurable by the client.
pub struct RenderParams {
    /// The background color applied to the target.
    pub base_color: peniko::Color,
    /// Dimensions of the rasterization target. These must match the texture
    /// view handed to [`Renderer::render_to_texture`] and be nonzero.
    pub width: u32,
    pub height: u32,
    /// Transform from stored point coordinates into clip space, or `None` to
    /// take the stored points as clip coordinates directly.
    pub view: Option<ViewTransform>,
}

/// Draws polylines as mitered ribbons into a texture.
///
/// A renderer is tied to the target format and sample count of its
/// [`RendererOptions`]; one renderer is needed per distinct target
/// configuration.
pub struct Renderer {
    options: RendererOptions,
    view_layout: BindGroupLayout,
    empty_layout: BindGroupLayout,
    line_layout: BindGroupLayout,
    ribbon: RenderPipeline,
    ribbon_raw: RenderPipeline,
    msaa_target: Option<TargetTexture>,
}

struct TargetTexture {
    view: TextureView,
    width: u32,
    height: u32,
}

impl TargetTexture {
    fn new(device: &Device, options: &RendererOptions, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ribbon msaa target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: options.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: options.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            width,
            height,
        }
    }
}

impl Renderer {
    /// Creates a new renderer for the specified device.
    ///
    /// The bind group layouts are derived from the shader metadata, so the
    /// pipelines always agree with the bindings the permutations declare.
    pub fn new(device: &Device, options: RendererOptions) -> Self {
        let shader = &strake_shaders::SHADERS.ribbon;
        let shader_raw = &strake_shaders::SHADERS.ribbon_raw;

        let view_layout = bind_group_layout(device, "ribbon view", &shader.group_bindings(0));
        let line_layout = bind_group_layout(device, "ribbon line", &shader.group_bindings(1));
        // The raw permutation has no view uniform, but group 0 is still
        // declared so both pipelines share the group numbering.
        let empty_layout = bind_group_layout(device, "ribbon empty view", &[]);

        let ribbon = build_pipeline(device, shader, &[&view_layout, &line_layout], &options);
        let ribbon_raw =
            build_pipeline(device, shader_raw, &[&empty_layout, &line_layout], &options);

        Self {
            options,
            view_layout,
            empty_layout,
            line_layout,
            ribbon,
            ribbon_raw,
            msaa_target: None,
        }
    }

    /// Record a render of `lines` into `target`, in iteration order.
    ///
    /// The target is cleared to `params.base_color` first, so a render with
    /// no lines still produces a solid frame. Polylines with fewer than two
    /// points have no segment to widen and are skipped.
    pub fn render_to_texture<'a, I>(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &TextureView,
        lines: I,
        params: &RenderParams,
    ) where
        I: IntoIterator<Item = &'a Polyline>,
    {
        // Bind groups must outlive the pass, so all of them are created up
        // front and the pass only records state changes and draws.
        let group0 = match &params.view {
            Some(view) => {
                let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("ribbon view uniform"),
                    contents: bytes_of(view),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("ribbon view"),
                    layout: &self.view_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: view_buffer.as_entire_binding(),
                    }],
                })
            }
            None => device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ribbon empty view"),
                layout: &self.empty_layout,
                entries: &[],
            }),
        };

        let mut draws: Vec<(BindGroup, u32)> = Vec::new();
        for line in lines {
            let point_count = line.len() as u32;
            if point_count < 2 {
                log::debug!("skipping {point_count} point polyline; a ribbon needs two");
                continue;
            }
            let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ribbon line uniform"),
                contents: bytes_of(&line.params()),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ribbon line"),
                layout: &self.line_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: line.points().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            });
            draws.push((bind_group, 2 * point_count));
        }

        if self.options.sample_count > 1 {
            let stale = self
                .msaa_target
                .as_ref()
                .map_or(true, |t| t.width != params.width || t.height != params.height);
            if stale {
                self.msaa_target = Some(TargetTexture::new(
                    device,
                    &self.options,
                    params.width,
                    params.height,
                ));
            }
        }
        // The intermediate is only ever allocated when multisampling is on.
        let (attachment, resolve_target) = match &self.msaa_target {
            Some(msaa) => (&msaa.view, Some(target)),
            None => (target, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ribbon render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(params.base_color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(if params.view.is_some() {
            &self.ribbon
        } else {
            &self.ribbon_raw
        });
        pass.set_bind_group(0, &group0, &[]);
        for (bind_group, vertex_count) in &draws {
            pass.set_bind_group(1, bind_group, &[]);
            pass.draw(0..*vertex_count, 0..1);
        }
    }
}

fn clear_color(color: peniko::Color) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(color.r) / 255.0,
        g: f64::from(color.g) / 255.0,
        b: f64::from(color.b) / 255.0,
        a: f64::from(color.a) / 255.0,
    }
}

fn bind_group_layout(
    device: &Device,
    label: &str,
    bindings: &[(u32, BindType)],
) -> BindGroupLayout {
    let entries: Vec<_> = bindings
        .iter()
        .map(|&(binding, ty)| layout_entry(binding, ty))
        .collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn layout_entry(binding: u32, ty: BindType) -> wgpu::BindGroupLayoutEntry {
    let buffer_ty = match ty {
        BindType::Buffer => wgpu::BufferBindingType::Storage { read_only: false },
        BindType::BufReadOnly => wgpu::BufferBindingType::Storage { read_only: true },
        BindType::Uniform => wgpu::BufferBindingType::Uniform,
    };
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: buffer_ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn build_pipeline(
    device: &Device,
    shader: &RenderShader<'_>,
    layouts: &[&BindGroupLayout],
    options: &RendererOptions,
) -> RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&shader.name),
        source: wgpu::ShaderSource::Wgsl(shader.wgsl.clone()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&shader.name),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&shader.name),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: "vs_main",
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: "fs_main",
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: options.target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: options.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
