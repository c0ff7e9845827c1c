//! egui layer composited over the playfield.
//!
//! It carries two things: the game's text (score, menu and game-over lines),
//! painted straight onto a background layer at the configured font sizes,
//! and an F3 debug window with pacer and session statistics.
//!
//! egui needs a split render because `egui_wgpu::Renderer::render()` wants a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run the UI, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers
//!   3. `paint()`   -- render into a pass made with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use flap_core::config::HudConfig;
use flap_core::frame::{Rgb, TextCommand, TextSize};
use flap_core::time::FramePacer;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub phase_label: String,
    pub score: u32,
    pub obstacles: usize,
    pub frame_clock: u64,
    pub paused: bool,
    /// e.g. "COM5" or "keyboard only"
    pub device_label: String,
    pub sessions: u32,
    pub last_score: u32,
    /// Cause of the last finished session, if it was a collision.
    pub last_hit: Option<String>,
    pub sprites: usize,
    pub texture_binds: usize,
}

pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub hud: HudConfig,
    pub debug_visible: bool,
}

impl Overlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
        hud: HudConfig,
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
            hud,
            debug_visible: false,
        }
    }

    /// True when egui wants the event for itself (e.g. a click on the debug window).
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        texts: &[TextCommand],
        pacer: &FramePacer,
        stats: Option<&OverlayStats>,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let hud = &self.hud;
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Background,
                egui::Id::new("flap_hud"),
            ));
            for text in texts {
                paint_hud_text(&painter, text, hud);
            }

            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", pacer.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", pacer.smoothed_frame_time_ms));
                        ui.label(format!("Target: {} fps", pacer.target_fps));
                        ui.label(format!("Ticks: {}", pacer.tick_count));
                        if let Some(stats) = stats {
                            ui.separator();
                            ui.label(format!("Phase: {}", stats.phase_label));
                            ui.label(format!("Score: {}", stats.score));
                            ui.label(format!("Obstacles: {}", stats.obstacles));
                            ui.label(format!("Frame clock: {}", stats.frame_clock));
                            ui.label(format!("Device: {}", stats.device_label));
                            ui.label(format!(
                                "Session: {} (last score {})",
                                stats.sessions, stats.last_score
                            ));
                            if let Some(hit) = &stats.last_hit {
                                ui.label(format!("Last hit: {hit}"));
                            }
                            ui.separator();
                            ui.label(format!("Sprites: {}", stats.sprites));
                            ui.label(format!("Texture binds: {}", stats.texture_binds));
                            if stats.paused {
                                ui.label("\u{23f8} PAUSED");
                            }
                        }
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
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

/// Horizontal distance between the two strikes of HUD text. egui's bundled
/// proportional font has no bold face, so bold is drawn as a double strike.
pub const BOLD_STRIKE_OFFSET: f32 = 1.0;

pub fn paint_hud_text(painter: &egui::Painter, text: &TextCommand, hud: &HudConfig) {
    let font = egui::FontId::proportional(font_size(text.size, hud));
    let color = text_color(text.color);
    for dx in [0.0, BOLD_STRIKE_OFFSET] {
        painter.text(
            egui::pos2(text.center_x + dx, text.top_y),
            egui::Align2::CENTER_TOP,
            &text.text,
            font.clone(),
            color,
        );
    }
}

pub fn font_size(size: TextSize, hud: &HudConfig) -> f32 {
    match size {
        TextSize::Regular => hud.regular_size,
        TextSize::Title => hud.title_size,
    }
}

pub fn text_color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}
