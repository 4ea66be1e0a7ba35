//! Debug overlay rendered via egui on top of the editor or level.
//!
//! egui needs a split render: `prepare()` runs the UI and tessellates,
//! `upload()` pushes textures and buffers through the encoder, `paint()` draws
//! into a pass created with `forget_lifetime()`, and `cleanup()` frees what
//! egui released. UI logic only runs while `visible` (F3), but window events
//! always go through egui so it can claim clicks while shown.

use dw_core::time::FrameClock;
use winit::window::Window;

/// Per-frame numbers the game reports to the overlay.
#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    /// "Editor" or "Level".
    pub mode_label: String,
    pub draw_commands: u32,
    pub quads: u32,
    pub lines: Vec<(String, String)>,
    pub paused: bool,
}

impl OverlayStats {
    pub fn new(mode_label: &str) -> Self {
        Self {
            mode_label: mode_label.to_string(),
            ..Default::default()
        }
    }

    /// Appends a labelled value row.
    pub fn line(mut self, label: &str, value: impl ToString) -> Self {
        self.lines.push((label.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance one fixed step while paused.
    pub single_step: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    /// Returns true when egui wants the event for itself.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        self.visible && response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                    ui.label(format!("Steps this frame: {}", clock.steps_this_frame));
                    ui.label(format!("Total steps: {}", clock.fixed_step_count));

                    ui.separator();
                    ui.label(format!("Mode: {}", stats.mode_label));
                    for (label, value) in &stats.lines {
                        ui.label(format!("{label}: {value}"));
                    }
                    ui.label(format!("Draw commands: {}", stats.draw_commands));
                    ui.label(format!("Quads: {}", stats.quads));

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_builder_keeps_row_order() {
        let stats = OverlayStats::new("Level")
            .line("Entities", 12)
            .line("Player", "run");
        assert_eq!(stats.mode_label, "Level");
        assert_eq!(
            stats.lines,
            vec![
                ("Entities".to_string(), "12".to_string()),
                ("Player".to_string(), "run".to_string())
            ]
        );
        assert!(!stats.paused);
    }
}
