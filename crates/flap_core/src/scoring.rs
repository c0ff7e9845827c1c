use crate::obstacle::{ObstaclePool, PipeGeometry};

/// Count every pair whose trailing edge is now left of the bird and that has
/// not been counted yet. Returns the number newly scored this call.
pub fn award_passed(obstacles: &mut ObstaclePool, bird_x: f32, geometry: &PipeGeometry) -> u32 {
    let mut awarded = 0;
    for pair in obstacles.iter_mut() {
        if !pair.scored && pair.right_edge(geometry) < bird_x {
            pair.scored = true;
            awarded += 1;
        }
    }
    awarded
}
