use flap_core::frame::{DrawCommand, RenderSink, Rgb, TextCommand};
use flap_core::time::FramePacer;
use flap_overlay::{Overlay, OverlayStats};
use flap_render::{to_wgpu_color, GpuContext, SpriteBatch, SpriteRenderer};
use winit::window::Window;

/// Collects one frame's commands, then draws sprites and the egui text layer
/// into the swapchain image on `present`.
pub struct GpuFrameSink<'a> {
    window: &'a Window,
    gpu: &'a GpuContext,
    renderer: &'a mut SpriteRenderer,
    overlay: &'a mut Overlay,
    batch: &'a mut SpriteBatch,
    pacer: &'a FramePacer,
    stats: OverlayStats,
    clear: wgpu::Color,
    texts: Vec<TextCommand>,
}

impl<'a> GpuFrameSink<'a> {
    pub fn new(
        window: &'a Window,
        gpu: &'a GpuContext,
        renderer: &'a mut SpriteRenderer,
        overlay: &'a mut Overlay,
        batch: &'a mut SpriteBatch,
        pacer: &'a FramePacer,
        stats: OverlayStats,
    ) -> Self {
        Self {
            window,
            gpu,
            renderer,
            overlay,
            batch,
            pacer,
            stats,
            clear: wgpu::Color::BLACK,
            texts: Vec::new(),
        }
    }
}

impl RenderSink for GpuFrameSink<'_> {
    fn clear(&mut self, color: Rgb) {
        self.clear = to_wgpu_color(color);
        self.batch.clear();
        self.texts.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.batch.add_quad(command.image, &command.dest);
    }

    fn draw_text(&mut self, command: &TextCommand) {
        self.texts.push(command.clone());
    }

    fn present(&mut self) -> Result<(), String> {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return Ok(());
        }
        // Skipped frames also skip egui, so its texture deltas are never dropped.
        let Some((output, view)) = self.gpu.begin_frame() else {
            return Ok(());
        };

        self.stats.sprites = self.batch.quad_count();
        self.stats.texture_binds = self.batch.texture_binds();
        let (primitives, textures_delta) =
            self.overlay
                .prepare(self.window, &self.texts, self.pacer, Some(&self.stats));
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.renderer
            .upload(&self.gpu.device, &self.gpu.queue, self.batch);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.renderer
            .record(&mut encoder, &view, self.batch, self.clear);

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &primitives,
            &textures_delta,
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

            self.overlay
                .paint(&mut egui_pass, &primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
