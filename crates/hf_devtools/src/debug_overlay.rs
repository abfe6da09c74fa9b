//! egui layer drawn on top of the sprite pass.
//!
//! `egui_wgpu::Renderer::render()` wants a `RenderPass<'static>` while
//! `begin_render_pass` borrows the encoder, so a frame goes through four calls:
//!
//!   1. `prepare()` runs the UI and tessellates
//!   2. `upload()` pushes textures and buffers (borrows the encoder)
//!   3. `paint()` renders into a pass created with `forget_lifetime()`
//!   4. `cleanup()` frees textures egui dropped
//!
//! Screen labels (titles, buttons) are painted every frame. The debug window
//! only when `visible` is set (F3).

use hf_core::time::TimeState;
use winit::window::Window;

use crate::labels::{paint_labels, LabelTransform, ScreenLabel};

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub screen: String,
    pub world_tick: u64,
    pub enemies: usize,
    pub attacks: usize,
    /// Top-left of the player, if alive.
    pub player_position: Option<(f32, f32)>,
    pub level_cleared: bool,
    pub rng_seed: u64,
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub sprite_count: u32,
    pub memory_estimate_mb: f32,
    pub show_hitboxes: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance one fixed step while paused.
    pub single_step: bool,
    pub toggle_hitboxes: bool,
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

    /// Returns true when egui wants the event for itself (clicks on the
    /// debug window should not reach the game).
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
        time: &TimeState,
        stats: &OverlayStats,
        labels: &[ScreenLabel],
        transform: LabelTransform,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_labels(ctx, labels, transform);

            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                    ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                    ui.label(format!("Dropped: {:.0} ms", time.dropped_time * 1000.0));

                    ui.separator();
                    ui.label(format!("Screen: {}", stats.screen));
                    ui.label(format!("World tick: {}", stats.world_tick));
                    ui.label(format!("Enemies: {}", stats.enemies));
                    ui.label(format!("Attacks: {}", stats.attacks));
                    match stats.player_position {
                        Some((x, y)) => ui.label(format!("Player: ({x:.0}, {y:.0})")),
                        None => ui.label("Player: dead"),
                    };
                    if stats.level_cleared {
                        ui.label("Level cleared");
                    }
                    ui.label(format!("Seed: {}", stats.rng_seed));

                    ui.separator();
                    ui.label(format!("Draw calls: {}", stats.draw_calls));
                    ui.label(format!("Texture binds: {}", stats.texture_binds));
                    ui.label(format!("Sprites: {}", stats.sprite_count));
                    ui.label(format!("Memory: {:.1} MB", stats.memory_estimate_mb));

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                        let hitbox_label = if stats.show_hitboxes {
                            "Hide hitboxes"
                        } else {
                            "Show hitboxes"
                        };
                        if ui.button(hitbox_label).clicked() {
                            actions.toggle_hitboxes = true;
                        }
                    });
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

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
