//! What one tick wants on screen, independent of how it gets there.
//!
//! The game never touches a display. It builds a `FrameDescription` and
//! hands it to a `RenderSink`, which receives draw commands in painter's
//! order followed by exactly one `present()`.

use crate::assets::ImageId;

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const BLACK: Rgb = [0, 0, 0];
pub const RED: Rgb = [255, 0, 0];
pub const GREEN: Rgb = [0, 255, 0];

/// Window-pixel rectangle, top-left origin, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub image: ImageId,
    pub dest: DestRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Regular,
    Title,
}

/// A line of text horizontally centred on `center_x`, top edge at `top_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub text: String,
    pub center_x: f32,
    pub top_y: f32,
    pub size: TextSize,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescription {
    pub clear_color: Rgb,
    pub draws: Vec<DrawCommand>,
    pub texts: Vec<TextCommand>,
}

impl FrameDescription {
    pub fn new(clear_color: Rgb) -> Self {
        Self {
            clear_color,
            draws: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Draw `image` at its native size with the top-left corner at (x, y).
    pub fn blit(&mut self, image: ImageId, x: f32, y: f32, size: (u32, u32)) {
        self.draws.push(DrawCommand {
            image,
            dest: DestRect {
                x,
                y,
                width: size.0 as f32,
                height: size.1 as f32,
            },
        });
    }

    pub fn text(
        &mut self,
        text: impl Into<String>,
        center_x: f32,
        top_y: f32,
        size: TextSize,
        color: Rgb,
    ) {
        self.texts.push(TextCommand {
            text: text.into(),
            center_x,
            top_y,
            size,
            color,
        });
    }

    /// Sprites first, text on top, then a single present.
    pub fn submit<S: RenderSink + ?Sized>(&self, sink: &mut S) -> Result<(), String> {
        sink.clear(self.clear_color);
        for draw in &self.draws {
            sink.draw(draw);
        }
        for text in &self.texts {
            sink.draw_text(text);
        }
        sink.present()
    }
}

pub trait RenderSink {
    fn clear(&mut self, color: Rgb);
    fn draw(&mut self, command: &DrawCommand);
    fn draw_text(&mut self, command: &TextCommand);
    fn present(&mut self) -> Result<(), String>;
}
