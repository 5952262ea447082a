use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::{Vec2, Vec3};

mod cli;
mod renderer;
mod ui;

use cli::Args;
use renderer::{Camera, GpuState, SceneView};
use surface3d::math::presets::PRESETS;
use surface3d::{Scene, ScalarField, SurfaceMesher};
use ui::{HudState, apply_theme, draw_help_overlay, draw_stats_panel};

struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            forward: 0.0,
            right: 0.0,
            up: 0.0,
            mouse_captured: false,
            mouse_delta: Vec2::ZERO,
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    camera: Camera,
    input: InputState,
    mesher: SurfaceMesher,
    field: ScalarField,
    hud: HudState,
    vsync: bool,

    /// Camera position the current mesh was built for.
    meshed_at: Option<Vec3>,

    last_frame: Instant,
    fps_timer: Instant,
    frame_count: u32,
}

impl App {
    fn new(args: &Args, mesher: SurfaceMesher, field: ScalarField) -> Self {
        let mut camera = Camera::at(args.camera_position());
        camera.look_at(Vec3::ZERO);

        let hud = HudState {
            expression: field
                .expression()
                .map(|expr| expr.source().to_string())
                .unwrap_or_default(),
            ..HudState::default()
        };

        Self {
            window: None,
            gpu: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            egui_renderer: None,
            camera,
            input: InputState::default(),
            mesher,
            field,
            hud,
            vsync: args.vsync,
            meshed_at: None,
            last_frame: Instant::now(),
            fps_timer: Instant::now(),
            frame_count: 0,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let max_vertices = self.mesher.config().vertex_count();
        let gpu = pollster::block_on(GpuState::new(window.clone(), max_vertices, self.vsync))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.camera
            .set_aspect(gpu.size.width as f32, gpu.size.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        self.refresh_surface();
        Ok(())
    }

    /// Re-meshes around the camera. A failed refresh leaves the previous
    /// mesh on screen and surfaces the error in the HUD.
    fn refresh_surface(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_deref()) else {
            return;
        };

        let mut view = SceneView {
            camera: &self.camera,
            gpu,
            window,
        };

        match self.mesher.refresh(&mut view, &self.field) {
            Ok(stats) => self.hud.record_refresh(&stats),
            Err(err) => self.hud.record_error(&err),
        }
        view.render_frame();

        self.meshed_at = Some(self.camera.position);
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            self.hud.fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera
            .process_keyboard(self.input.forward, self.input.right, self.input.up, dt);

        if self.input.mouse_captured {
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        if self.meshed_at != Some(self.camera.position) {
            self.refresh_surface();
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let camera_pos = self.camera.position.to_array();
        let camera_speed = self.camera.move_speed;
        let hud = &self.hud;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_stats_panel(ctx, hud);
            draw_help_overlay(ctx, camera_pos, camera_speed);
        });

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(err @ wgpu::SurfaceError::OutOfMemory) => {
                error!(%err, "surface unavailable, skipping frame");
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_graph(&view, &mut encoder);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW | KeyCode::KeyZ => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA | KeyCode::KeyQ => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::Space => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Escape if pressed => {
                self.input.mouse_captured = false;
                if let Some(window) = &self.window {
                    let _ = window.set_cursor_grab(winit::window::CursorGrabMode::None);
                    window.set_cursor_visible(true);
                }
            }
            KeyCode::F1 if pressed => self.hud.show_stats = !self.hud.show_stats,
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Surface 3D")
            .with_inner_size(PhysicalSize::new(1600, 900));

        let result = event_loop
            .create_window(window_attrs)
            .context("failed to create window")
            .and_then(|window| self.init_gpu(Arc::new(window)));

        if let Err(err) = result {
            error!("{err:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.input.mouse_captured = state == ElementState::Pressed;

                if let Some(window) = &self.window {
                    if self.input.mouse_captured {
                        let _ = window.set_cursor_grab(winit::window::CursorGrabMode::Confined);
                        window.set_cursor_visible(false);
                    } else {
                        let _ = window.set_cursor_grab(winit::window::CursorGrabMode::None);
                        window.set_cursor_visible(true);
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    if args.list_presets {
        for preset in PRESETS {
            println!("{:<8} {:<40} y = {}", preset.name, preset.description, preset.expression);
        }
        return Ok(());
    }

    let text = args.expression_text()?;
    let field = ScalarField::with_expression(&text)
        .with_context(|| format!("cannot compile expression '{text}'"))?;
    let mesher = SurfaceMesher::new(args.grid_config()).context("invalid grid configuration")?;

    info!(
        expression = %text,
        rings = mesher.config().ring_count,
        segments = mesher.config().angular_segments,
        triangles = mesher.config().triangle_count(),
        "starting viewer"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&args, mesher, field);
    event_loop.run_app(&mut app)?;
    Ok(())
}
