//! Bird-versus-world collision: pixel-accurate against every live obstacle,
//! plus the ceiling and floor of the window.

use crate::bird::Bird;
use crate::mask::PixelMask;
use crate::obstacle::ObstaclePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Ceiling,
    Floor,
    /// Index into the obstacle queue, head first.
    Obstacle(usize),
}

/// First thing the bird is touching, bounds before obstacles.
pub fn first_hit(
    bird: &Bird,
    bird_mask: &PixelMask,
    obstacles: &ObstaclePool,
    window_height: f32,
) -> Option<Hit> {
    if bird.y <= 0.0 {
        return Some(Hit::Ceiling);
    }
    if bird.y >= window_height - bird.height {
        return Some(Hit::Floor);
    }

    let (bird_x, bird_y) = bird.pixel_pos();
    obstacles
        .iter()
        .position(|pair| {
            // Pair masks span the full window height from y = 0.
            pair.mask()
                .overlaps(bird_mask, (bird_x - pair.pixel_x(), bird_y))
        })
        .map(Hit::Obstacle)
}

pub fn check(
    bird: &Bird,
    bird_mask: &PixelMask,
    obstacles: &ObstaclePool,
    window_height: f32,
) -> bool {
    first_hit(bird, bird_mask, obstacles, window_height).is_some()
}
