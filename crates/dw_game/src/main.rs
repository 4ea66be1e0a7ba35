//! Driftwood: level editor and platformer in one window.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` on a fixed timestep:
//!
//!   1. `begin_frame()` measures wall time and feeds the accumulator
//!   2. `next_step()` hands out fixed `dt` slices to the active mode
//!   3. the active mode records a `DrawList`, which becomes one quad batch
//!   4. the batch is streamed to the GPU and the egui overlay is composited
//!
//! The editor survives a play session. Return exports the canvas and builds
//! a fresh level from it; Escape drops the level and resumes the same editor.

mod assets;
mod catalog;
mod editor;
mod level;
#[cfg(test)]
mod replay;
mod settings;
mod transition;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::AssetLibrary;
use catalog::Catalog;
use dw_core::{FrameClock, InputState, Key, MouseBtn};
use dw_devtools::{DebugOverlay, OverlayStats};
use dw_platform::PlatformConfig;
use dw_render::{CameraUniform, ColorVertex, DrawList, GpuContext, QuadBatch, QuadPipeline};
use editor::{Editor, EditorConfig};
use glam::Vec2;
use level::{Level, LevelConfig, LevelEvent};
use settings::{CATALOG_PATH, FIXED_DT, SKY_COLOR, WINDOW_HEIGHT, WINDOW_WIDTH};
use transition::Transition;

/// Trackpads report pixels; this many count as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 50.0;

enum Mode {
    Editor,
    Level(Box<Level>),
}

impl Mode {
    fn label(&self) -> &'static str {
        match self {
            Mode::Editor => "Editor",
            Mode::Level(_) => "Level",
        }
    }
}

/// Everything that needs the window and GPU. Built in `resumed`.
struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    pipeline: QuadPipeline,
    debug_overlay: DebugOverlay,

    catalog: Catalog,
    assets: AssetLibrary,
    editor: Editor,
    mode: Mode,
    paused: bool,
    single_step_requested: bool,
    coins: u32,

    draw_list: DrawList,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    vertex_capacity: usize,
    index_capacity: usize,
    index_count: u32,
}

impl AppState {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let pipeline = QuadPipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let catalog = Catalog::load_or_embedded(Path::new(CATALOG_PATH))
            .map_err(|e| format!("Failed to load catalog: {e}"))?;
        let assets = AssetLibrary::placeholder(&catalog);
        let editor = Editor::new(&catalog, &assets, EditorConfig::default())
            .map_err(|e| format!("Failed to start editor: {e}"))?;
        log::info!("Catalog ready: {} tile kinds", catalog.len());

        let viewport = Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT);
        let camera_uniform = CameraUniform::screen(viewport.x, viewport.y);
        let camera_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &gpu.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );
        let camera_bind_group = pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let vertex_capacity = 1024;
        let index_capacity = 1536;
        let vertex_buffer = create_vertex_buffer(&gpu.device, vertex_capacity);
        let index_buffer = create_index_buffer(&gpu.device, index_capacity);

        Ok(Self {
            window,
            gpu,
            clock: FrameClock::new(FIXED_DT),
            input: InputState::new(),
            pipeline,
            debug_overlay,
            catalog,
            assets,
            editor,
            mode: Mode::Editor,
            paused: false,
            single_step_requested: false,
            coins: 0,
            draw_list: DrawList::new(viewport),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            vertex_capacity,
            index_capacity,
            index_count: 0,
        })
    }

    /// One fixed step of whichever mode is active.
    fn step(&mut self, dt: f32) -> Result<(), String> {
        let transition = match &mut self.mode {
            Mode::Editor => self
                .editor
                .update(dt, &self.input, &self.catalog, &self.assets)
                .map_err(|e| format!("Editor update failed: {e}"))?,
            Mode::Level(level) => {
                let (events, transition) = level.update(dt, &self.input, &self.assets);
                for event in events {
                    match event {
                        LevelEvent::CoinCollected(kind) => {
                            self.coins += 1;
                            log::debug!("Coin {kind:?}, {} so far", self.coins);
                        }
                        LevelEvent::PlayerDamaged => log::debug!("Player damaged"),
                        LevelEvent::PearlFired => {}
                    }
                }
                transition
            }
        };

        match transition {
            Some(Transition::Play(blueprint)) => {
                let level = level::builder::build(
                    &blueprint,
                    &self.catalog,
                    &self.assets,
                    LevelConfig::default(),
                )
                .map_err(|e| format!("Failed to build level: {e}"))?;
                log::info!("Switching to level ({} cells exported)", blueprint.len());
                self.coins = 0;
                self.mode = Mode::Level(Box::new(level));
                self.input.release_all();
            }
            Some(Transition::Edit) => {
                log::info!("Back to the editor");
                self.mode = Mode::Editor;
                self.input.release_all();
            }
            None => {}
        }
        Ok(())
    }

    fn record_draw_list(&mut self) -> Result<(), String> {
        self.draw_list.reset();
        match &self.mode {
            Mode::Editor => editor::view::draw(
                &mut self.draw_list,
                &self.editor,
                &self.catalog,
                &self.assets,
                self.input.mouse_position,
            )
            .map_err(|e| format!("Editor draw failed: {e}"))?,
            Mode::Level(level) => level::view::draw(&mut self.draw_list, level),
        }
        Ok(())
    }

    fn upload_batch(&mut self) {
        let batch = QuadBatch::from_draw_list(&self.draw_list);

        let needed_vertices = batch.vertices.len().max(1);
        if needed_vertices > self.vertex_capacity {
            self.vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.vertex_capacity);
        }
        let needed_indices = batch.indices.len().max(1);
        if needed_indices > self.index_capacity {
            self.index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.index_capacity);
        }

        if !batch.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&batch.vertices),
            );
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
        }
        self.index_count = batch.indices.len() as u32;
    }

    fn overlay_stats(&self) -> OverlayStats {
        let stats = OverlayStats {
            draw_commands: self.draw_list.len() as u32,
            quads: self.index_count / 6,
            paused: self.paused,
            ..OverlayStats::new(self.mode.label())
        };
        match &self.mode {
            Mode::Editor => stats
                .line("Selection", self.editor.selection().0)
                .line("Cells", self.editor.grid().len())
                .line("Objects", self.editor.objects().len())
                .line("Origin", format!("{:.0}", self.editor.origin())),
            Mode::Level(level) => {
                let player_state = level
                    .player_body()
                    .map_or("-".to_string(), |body| format!("{:?}", body.state()));
                stats
                    .line("Entities", level.arena().len())
                    .line("Player", player_state)
                    .line("Coins", self.coins)
            }
        }
    }

    fn render(&mut self) {
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::screen(WINDOW_WIDTH, WINDOW_HEIGHT)]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay.prepare(&self.window, &self.clock, &stats);
        if overlay_actions.toggle_pause {
            self.paused = !self.paused;
            log::info!(
                "Simulation {}",
                if self.paused { "PAUSED" } else { "RESUMED" }
            );
        }
        if overlay_actions.single_step {
            self.single_step_requested = true;
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let clear = self.draw_list.clear_color().unwrap_or(SKY_COLOR);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear.r),
                            g: f64::from(clear.g),
                            b: f64::from(clear.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if self.index_count > 0 {
                render_pass.set_pipeline(&self.pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
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
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn redraw(&mut self) -> Result<(), String> {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return Ok(());
        }

        self.clock.begin_frame();
        while let Some(dt) = self.clock.next_step() {
            if self.input.is_just_pressed(Key::F3) {
                self.debug_overlay.toggle();
            }
            if self.input.is_just_pressed(Key::F4) {
                self.paused = !self.paused;
                log::info!(
                    "Simulation {}",
                    if self.paused { "PAUSED" } else { "RESUMED" }
                );
            }
            let run = !self.paused || self.single_step_requested;
            self.single_step_requested = false;
            if run {
                self.step(dt)?;
            }
            // Edges belong to the step that saw them. A click on a frame with
            // zero steps waits for the next one instead of being dropped.
            self.input.end_frame();
            if !run {
                break;
            }
        }

        self.record_draw_list()?;
        self.upload_batch();
        self.render();
        Ok(())
    }
}

struct App {
    config: PlatformConfig,
    state: Option<AppState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let started = dw_platform::create_window(event_loop, &self.config).and_then(|window| {
            log::info!(
                "Window created: {}x{}",
                self.config.width,
                self.config.height
            );
            AppState::new(window)
        });
        match started {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.release_all(),

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_mouse_button(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_NOTCH) as f32,
                };
                state.input.scroll(notches);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(state.window.scale_factor());
                state.input.mouse_position = Vec2::new(logical.x, logical.y);
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = state.redraw() {
                    log::error!("{err}");
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<ColorVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Quad Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Quad Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Return),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::ControlLeft | KeyCode::ControlRight => Some(Key::Ctrl),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyW => Some(Key::W),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Driftwood starting...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_cover_editor_and_player_controls() {
        assert_eq!(map_key(KeyCode::Enter), Some(Key::Return));
        assert_eq!(map_key(KeyCode::ControlRight), Some(Key::Ctrl));
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyZ), None);
        assert_eq!(map_mouse_button(MouseButton::Middle), Some(MouseBtn::Middle));
        assert_eq!(map_mouse_button(MouseButton::Back), None);
    }
}
