// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders the demo traces in a window, with dragging and scroll zoom.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use strake::peniko::Color;
use strake::util::{RenderContext, RenderSurface};
use strake::wgpu;
use strake::{Polyline, Renderer, RendererOptions, Viewport, ViewportBuilder};
use traces::TraceSet;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

struct ActiveRenderState<'s> {
    // The fields MUST be in this order, so that the surface is dropped before the window
    surface: RenderSurface<'s>,
    window: Arc<Window>,
}

enum RenderState<'s> {
    Active(ActiveRenderState<'s>),
    // Cache a window so that it can be reused when the app is resumed after being suspended
    Suspended(Option<Arc<Window>>),
}

/// Pointer state the drag and zoom gestures read from.
#[derive(Debug, Default)]
struct Input {
    drag_start: Option<(f64, f64)>,
    prior_position: Option<(f64, f64)>,
}

struct TraceApp<'s> {
    context: RenderContext,
    renderers: Vec<Option<Renderer>>,
    state: RenderState<'s>,

    trace_set: TraceSet,
    polylines: Vec<Polyline>,
    viewport: Option<Viewport>,
    input: Input,

    base_color: Color,
    sample_count: u32,
}

impl ApplicationHandler for TraceApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let RenderState::Suspended(cached_window) = &mut self.state else {
            return;
        };

        let window = cached_window
            .take()
            .unwrap_or_else(|| create_winit_window(event_loop));

        let size = window.inner_size();
        let surface_future = self.context.create_surface(
            window.clone(),
            size.width,
            size.height,
            wgpu::PresentMode::AutoVsync,
        );
        let surface = pollster::block_on(surface_future).expect("Error creating surface");

        self.renderers
            .resize_with(self.context.devices.len(), || None);
        let device = &self.context.devices[surface.dev_id].device;
        let sample_count = self.sample_count;
        self.renderers[surface.dev_id].get_or_insert_with(|| {
            Renderer::new(
                device,
                RendererOptions {
                    target_format: surface.format,
                    sample_count,
                },
            )
        });

        // The point buffers live on the device the surface chose, so they are
        // rebuilt whenever the surface is.
        self.polylines = self
            .trace_set
            .traces
            .iter()
            .map(|trace| Polyline::new(device, &trace.xs, &trace.ys, trace.style))
            .collect();

        if self.viewport.is_none() {
            let mut viewport =
                ViewportBuilder::new().build(window.scale_factor(), self.trace_set.bounds());
            viewport.resize(size.width, size.height);
            self.viewport = Some(viewport);
        }

        window.request_redraw();
        self.state = RenderState::Active(ActiveRenderState { window, surface });

        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        if let RenderState::Active(state) = &self.state {
            self.state = RenderState::Suspended(Some(state.window.clone()));
        }
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let render_state = match &mut self.state {
            RenderState::Active(state) if state.window.id() == window_id => state,
            _ => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Key::Named(NamedKey::Escape) = event.logical_key.as_ref() {
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(size) => {
                self.context
                    .resize_surface(&mut render_state.surface, size.width, size.height);
                if let Some(viewport) = &mut self.viewport {
                    viewport.resize(size.width, size.height);
                }
                render_state.window.request_redraw();
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.input.drag_start = if state == ElementState::Pressed {
                        self.input.prior_position
                    } else {
                        None
                    };
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.input.prior_position = None;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let factor = match delta {
                    MouseScrollDelta::LineDelta(_, y) => 1.0 + f64::from(y) / 10.0,
                    MouseScrollDelta::PixelDelta(delta) => 1.0 + delta.y / 500.0,
                };
                if let Some(viewport) = &mut self.viewport {
                    if let Some(prior) = self.input.prior_position {
                        viewport.zoom(prior, factor);
                        render_state.window.request_redraw();
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = (position.x, position.y);
                if let Some(viewport) = &mut self.viewport {
                    if let (Some(start), Some(prior)) =
                        (self.input.drag_start, self.input.prior_position)
                    {
                        viewport.drag(start, prior, position);
                        render_state.window.request_redraw();
                    }
                }
                self.input.prior_position = Some(position);
            }

            WindowEvent::RedrawRequested => {
                let surface = &render_state.surface;
                let width = surface.config.width;
                let height = surface.config.height;
                let device_handle = &self.context.devices[surface.dev_id];

                let surface_texture = surface
                    .surface
                    .get_current_texture()
                    .expect("failed to get surface texture");
                let surface_view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let params = strake::RenderParams {
                    base_color: self.base_color,
                    width,
                    height,
                    view: self.viewport.as_ref().map(Viewport::transform),
                };
                let mut encoder = device_handle.device.create_command_encoder(
                    &wgpu::CommandEncoderDescriptor {
                        label: Some("Trace render"),
                    },
                );
                self.renderers[surface.dev_id]
                    .as_mut()
                    .unwrap()
                    .render_to_texture(
                        &device_handle.device,
                        &mut encoder,
                        &surface_view,
                        &self.polylines,
                        &params,
                    );
                device_handle.queue.submit([encoder.finish()]);

                surface_texture.present();
                device_handle.device.poll(wgpu::Maintain::Poll);
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let trace_set = args.args.select_trace_set();
    let base_color = args.args.get_base_color()?.unwrap_or(Color::BLACK);

    let mut app = TraceApp {
        context: RenderContext::new(),
        renderers: vec![],
        state: RenderState::Suspended(None),
        trace_set,
        polylines: vec![],
        viewport: None,
        input: Input::default(),
        base_color,
        sample_count: args.sample_count,
    };

    let event_loop = EventLoop::new()?;
    event_loop
        .run_app(&mut app)
        .expect("Couldn't run event loop");
    Ok(())
}

fn create_winit_window(event_loop: &ActiveEventLoop) -> Arc<Window> {
    let attr = Window::default_attributes()
        .with_inner_size(LogicalSize::new(800, 600))
        .with_resizable(true)
        .with_title("Strake traces");
    Arc::new(event_loop.create_window(attr).unwrap())
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name = "cargo run -p with_winit --")]
struct Args {
    /// Samples per pixel of the multisampled render target
    #[arg(long, default_value_t = 4)]
    sample_count: u32,
    #[command(flatten)]
    args: traces::Arguments,
}
