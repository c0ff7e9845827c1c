use flap_core::assets::ImageId;
use flap_core::frame::DestRect;

use crate::vertex::SpriteVertex;

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub image: ImageId,
    pub index_start: u32,
    pub index_count: u32,
}

/// CPU-side sprite mesh for one frame, rebuilt from scratch every tick.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Texture binds the render pass will issue.
    pub fn texture_binds(&self) -> usize {
        self.draw_calls
            .windows(2)
            .filter(|pair| pair[0].image != pair[1].image)
            .count()
            + usize::from(!self.draw_calls.is_empty())
    }

    /// Quad in window pixels, top-left origin, whole image mapped.
    pub fn add_quad(&mut self, image: ImageId, dest: &DestRect) {
        let (left, top) = (dest.x, dest.y);
        let (right, bottom) = (dest.x + dest.width, dest.y + dest.height);
        let base_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [0.0, 0.0],
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [1.0, 0.0],
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [1.0, 1.0],
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [0.0, 1.0],
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        self.push_draw_call(image, draw_start, 6);
    }

    /// Consecutive quads of the same image collapse into one `draw_indexed`.
    /// Painter's order is kept, so an image that reappears later starts a new call.
    fn push_draw_call(&mut self, image: ImageId, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if last.image == image && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            image,
            index_start,
            index_count,
        });
    }
}
