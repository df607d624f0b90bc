use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::Vec2;

mod config;
mod error;
mod math;
mod renderer;
mod scene;
mod ui;

use config::SceneConfig;
use error::ContextError;
use math::SurfaceParameters;
use renderer::{FrameRenderer, GpuState, Trackball, TransformComposer};
use scene::{FrameClock, FrameGate, RendererState, StopHandle, StopSignal, stop_channel};
use ui::{FrameStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

struct App {
    config: SceneConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    scene: Option<RendererState>,
    frame_renderer: FrameRenderer,
    trackball: Trackball,
    ui_state: UiState,
    cursor: Vec2,

    clock: FrameClock,
    gate: FrameGate,
    stop_handle: StopHandle,
    stop_signal: StopSignal,

    frame_count: u32,
    fps_timer: Instant,
    fps: f32,

    last_error: Option<String>,
    fatal: Option<ContextError>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let (stop_handle, stop_signal) = stop_channel();
        let frame_renderer = FrameRenderer::new(
            TransformComposer::new(&config.placement, &config.projection),
            config.light,
        );
        let gate = FrameGate::new(config.target_fps);
        let ui_state = UiState {
            u_steps: config.default_steps.0,
            v_steps: config.default_steps.1,
            ..UiState::default()
        };

        Self {
            config,

            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            scene: None,
            frame_renderer,
            trackball: Trackball::default(),
            ui_state,
            cursor: Vec2::ZERO,

            clock: FrameClock::new(),
            gate,
            stop_handle,
            stop_signal,

            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,

            last_error: None,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ContextError> {
        let (u, v) = self.config.default_steps;
        let params = SurfaceParameters::new(u as i64, v as i64)?;

        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title)
            .with_inner_size(PhysicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                window.set_title(&fallback_title(self.config.title, &e));
                self.window = Some(window);
                return Err(e);
            }
        };

        self.init_scene(gpu, window, params);
        Ok(())
    }

    fn init_scene(&mut self, mut gpu: GpuState, window: Arc<Window>, params: SurfaceParameters) {
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

        let scene = RendererState::new(params, &mut gpu.mesh_upload());

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.sync_trackball_viewport();
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        self.scene = Some(scene);
    }

    fn sync_trackball_viewport(&mut self) {
        if let Some(gpu) = &self.gpu {
            let (x, y, side) = gpu.square_viewport();
            self.trackball
                .set_viewport(Vec2::new(x, y), Vec2::splat(side));
        }
    }

    fn frame_stats(&self) -> FrameStats {
        let Some(scene) = &self.scene else {
            return FrameStats::default();
        };
        let mesh = scene.mesh();
        FrameStats {
            fps: self.fps,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            u_steps: mesh.params.u_steps(),
            v_steps: mesh.params.v_steps(),
        }
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }
    }

    fn render(&mut self) {
        self.update_fps();

        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);
        let stats = self.frame_stats();
        let show_help = self.ui_state.show_help;

        let mut ui_actions = UiActions::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats, &self.last_error);
            if show_help {
                draw_help_overlay(ctx);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };
        let Some(scene) = &self.scene else { return };

        egui_state.handle_platform_output(window, full_output.platform_output);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
            Err(e) => {
                log::error!("cannot acquire frame: {}", e);
                self.stop_handle.stop();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

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

        {
            let mut frame = gpu.frame(&view, &mut encoder);
            self.frame_renderer.render_frame(
                &mut frame,
                scene.index_count(),
                self.trackball.view_matrix(),
                self.clock.now_ms(),
                &self.config.shading,
            );
        }

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
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

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if let Some((u, v)) = actions.regenerate {
            self.regenerate(u as f64, v as f64);
        }

        if actions.reset_view {
            self.trackball.reset();
        }

        if actions.quit {
            self.stop_handle.stop();
        }
    }

    fn regenerate(&mut self, u_steps: f64, v_steps: f64) {
        let (Some(gpu), Some(scene)) = (&mut self.gpu, &mut self.scene) else {
            return;
        };

        match scene.regenerate(u_steps, v_steps, &mut gpu.mesh_upload()) {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }

        match key {
            KeyCode::Escape => self.stop_handle.stop(),
            KeyCode::KeyR => self.trackball.reset(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("initialization failed: {}", e);
            self.fatal = Some(e);
            // Without a window there is nothing to show the failure in.
            if self.window.is_none() {
                event_loop.exit();
            }
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
                self.stop_handle.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.sync_trackball_viewport();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                if self.trackball.is_dragging() {
                    self.trackball.drag_to(self.cursor);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => self.trackball.begin_drag(self.cursor),
                ElementState::Released => self.trackball.end_drag(),
            },

            WindowEvent::RedrawRequested => {
                let now = self.clock.now_ms();
                if self.gate.tick(now) {
                    self.render();
                } else {
                    log::trace!("frame skipped at {:.1} ms", now);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop_signal.is_raised() {
            log::info!("stop requested, leaving event loop");
            event_loop.exit();
            return;
        }

        if self.fatal.is_some() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let remaining = self.gate.remaining_ms(self.clock.now_ms());
        if remaining <= 0.0 {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.instant_after(remaining)));
        }
    }
}

fn fallback_title(title: &str, err: &ContextError) -> String {
    format!("{} - graphics unavailable: {}", title, err)
}

fn main() -> anyhow::Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(SceneConfig::default());
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.fatal.take() {
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_title_names_the_failure() {
        let title = fallback_title("Richmond's Minimal Surface", &ContextError::NoSurfaceFormat);
        assert!(title.starts_with("Richmond's Minimal Surface - graphics unavailable: "));
        assert!(title.ends_with(&ContextError::NoSurfaceFormat.to_string()));
    }
}
