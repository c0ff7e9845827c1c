//! Obstacle pairs and the ordered queue that holds them.
//!
//! A pair is one pipe growing up from the floor and one hanging from the
//! ceiling, each a stack of body pieces topped by an end cap. The shared
//! body-piece budget is fixed by the window geometry; only the split between
//! the stacks is random. Pairs enter at the right edge and move left, so the
//! queue is always sorted oldest/leftmost first and eviction only ever pops
//! from the head.

use crate::assets::{AssetSet, ImageId};
use crate::config::GameConfig;
use crate::mask::PixelMask;
use image::{imageops, RgbaImage};
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeGeometry {
    pub width: u32,
    pub piece_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub total_pieces: u32,
}

impl PipeGeometry {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            width: config.obstacles.width,
            piece_height: config.obstacles.piece_height,
            window_width: config.window.width,
            window_height: config.window.height,
            total_pieces: config.total_body_pieces().max(0) as u32,
        }
    }

    pub fn spawn_x(&self) -> f32 {
        self.window_width as f32 - 1.0
    }
}

/// One image placed inside the pair's `width x window_height` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePlacement {
    pub image: ImageId,
    pub y: i64,
}

#[derive(Debug, Clone)]
pub struct ObstaclePair {
    pub x: f32,
    /// Body pieces plus the end cap.
    pub top_pieces: u32,
    /// Body pieces plus the end cap.
    pub bottom_pieces: u32,
    pub scored: bool,
    pieces: Vec<PiecePlacement>,
    mask: PixelMask,
}

impl ObstaclePair {
    /// Build a pair with `bottom_body` body pieces in the floor stack; the
    /// ceiling stack gets the rest of the budget.
    pub fn with_split(bottom_body: u32, geometry: &PipeGeometry, assets: &AssetSet) -> Self {
        let bottom_body = bottom_body.clamp(1, geometry.total_pieces.saturating_sub(1).max(1));
        let top_body = geometry.total_pieces.saturating_sub(bottom_body);
        let pieces = piece_layout(bottom_body, top_body, geometry);
        let composite = compose(&pieces, geometry, assets);

        Self {
            x: geometry.spawn_x(),
            top_pieces: top_body + 1,
            bottom_pieces: bottom_body + 1,
            scored: false,
            pieces,
            mask: PixelMask::from_image(&composite),
        }
    }

    pub fn spawn<R: Rng>(rng: &mut R, geometry: &PipeGeometry, assets: &AssetSet) -> Self {
        let bottom_body = rng.gen_range(1..geometry.total_pieces);
        Self::with_split(bottom_body, geometry, assets)
    }

    pub fn top_height_px(&self, geometry: &PipeGeometry) -> u32 {
        self.top_pieces * geometry.piece_height
    }

    pub fn bottom_height_px(&self, geometry: &PipeGeometry) -> u32 {
        self.bottom_pieces * geometry.piece_height
    }

    pub fn right_edge(&self, geometry: &PipeGeometry) -> f32 {
        self.x + geometry.width as f32
    }

    pub fn visible(&self, geometry: &PipeGeometry) -> bool {
        -(geometry.width as f32) < self.x && self.x < geometry.window_width as f32
    }

    pub fn mask(&self) -> &PixelMask {
        &self.mask
    }

    pub fn pieces(&self) -> &[PiecePlacement] {
        &self.pieces
    }

    pub fn pixel_x(&self) -> i32 {
        self.x.floor() as i32
    }
}

/// Floor stack is laid out bottom-up, ceiling stack top-down, each closed by
/// an end cap facing the gap.
fn piece_layout(bottom_body: u32, top_body: u32, geometry: &PipeGeometry) -> Vec<PiecePlacement> {
    let height = geometry.window_height as i64;
    let piece = geometry.piece_height as i64;
    let mut pieces = Vec::with_capacity((bottom_body + top_body + 2) as usize);

    for i in 1..=bottom_body as i64 {
        pieces.push(PiecePlacement {
            image: ImageId::PipeBody,
            y: height - i * piece,
        });
    }
    pieces.push(PiecePlacement {
        image: ImageId::PipeEnd,
        y: height - bottom_body as i64 * piece - piece,
    });

    for i in 0..top_body as i64 {
        pieces.push(PiecePlacement {
            image: ImageId::PipeBody,
            y: i * piece,
        });
    }
    pieces.push(PiecePlacement {
        image: ImageId::PipeEnd,
        y: top_body as i64 * piece,
    });
    pieces
}

fn compose(pieces: &[PiecePlacement], geometry: &PipeGeometry, assets: &AssetSet) -> RgbaImage {
    let mut canvas = RgbaImage::new(geometry.width, geometry.window_height);
    for piece in pieces {
        imageops::overlay(&mut canvas, assets.get(piece.image), 0, piece.y);
    }
    canvas
}

#[derive(Debug, Clone, Default)]
pub struct ObstaclePool {
    pairs: VecDeque<ObstaclePair>,
}

impl ObstaclePool {
    pub fn new() -> Self {
        Self {
            pairs: VecDeque::new(),
        }
    }

    pub fn push(&mut self, pair: ObstaclePair) {
        self.pairs.push_back(pair);
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R, geometry: &PipeGeometry, assets: &AssetSet) {
        let pair = ObstaclePair::spawn(rng, geometry, assets);
        log::trace!(
            "Spawned obstacle: bottom={} top={}",
            pair.bottom_pieces,
            pair.top_pieces
        );
        self.push(pair);
    }

    pub fn advance_all(&mut self, dt_ms: f32, scroll_speed: f32) {
        let dx = scroll_speed * dt_ms;
        for pair in &mut self.pairs {
            pair.x -= dx;
        }
    }

    /// Pop invisible pairs from the head. Returns how many were removed.
    pub fn evict_offscreen(&mut self, geometry: &PipeGeometry) -> usize {
        let mut removed = 0;
        while self.pairs.front().is_some_and(|p| !p.visible(geometry)) {
            self.pairs.pop_front();
            removed += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObstaclePair> {
        self.pairs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ObstaclePair> {
        self.pairs.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::sample_assets;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn geometry() -> PipeGeometry {
        PipeGeometry::from_config(&GameConfig::default())
    }

    #[test]
    fn default_geometry_has_ten_body_pieces() {
        let geo = geometry();
        assert_eq!(geo.total_pieces, 10);
        assert!((geo.spawn_x() - 567.0).abs() < f32::EPSILON);
    }

    #[test]
    fn split_counts_include_end_caps() {
        let geo = geometry();
        let assets = sample_assets();
        let pair = ObstaclePair::with_split(3, &geo, &assets);
        assert_eq!(pair.bottom_pieces, 4);
        assert_eq!(pair.top_pieces, 8);
        assert_eq!(pair.bottom_height_px(&geo), 128);
        assert_eq!(pair.top_height_px(&geo), 256);
        assert_eq!(pair.pieces().len(), 12);
        assert!(!pair.scored);
    }

    #[test]
    fn layout_places_caps_next_to_the_gap() {
        let geo = geometry();
        let assets = sample_assets();
        let pair = ObstaclePair::with_split(2, &geo, &assets);
        let ends: Vec<i64> = pair
            .pieces()
            .iter()
            .filter(|p| p.image == ImageId::PipeEnd)
            .map(|p| p.y)
            .collect();
        // Floor stack: bodies at 480 and 448, cap at 416. Ceiling: 8 bodies, cap at 256.
        assert_eq!(ends, vec![416, 256]);
    }

    #[test]
    fn mask_leaves_the_gap_clear() {
        let geo = geometry();
        let assets = sample_assets();
        let pair = ObstaclePair::with_split(2, &geo, &assets);
        let mask = pair.mask();
        assert_eq!((mask.width(), mask.height()), (80, 512));
        // Ceiling stack ends at 256 + 32 = 288, floor cap starts at 416.
        assert!(mask.get(40, 287));
        assert!(!mask.get(40, 288));
        assert!(!mask.get(40, 415));
        assert!(mask.get(40, 416));
        assert!(mask.get(0, 0));
        assert!(mask.get(79, 511));
    }

    #[test]
    fn gap_is_three_birds_and_a_piece() {
        let geo = geometry();
        let assets = sample_assets();
        for split in 1..geo.total_pieces {
            let pair = ObstaclePair::with_split(split, &geo, &assets);
            let gap = geo.window_height - pair.top_height_px(&geo) - pair.bottom_height_px(&geo);
            assert_eq!(gap, 128);
        }
    }

    #[test]
    fn visibility_window_is_open_on_both_ends() {
        let geo = geometry();
        let assets = sample_assets();
        let mut pair = ObstaclePair::with_split(5, &geo, &assets);
        assert!(pair.visible(&geo));
        pair.x = 568.0;
        assert!(!pair.visible(&geo));
        pair.x = -80.0;
        assert!(!pair.visible(&geo));
        pair.x = -79.5;
        assert!(pair.visible(&geo));
    }

    #[test]
    fn advance_moves_every_pair_left() {
        let geo = geometry();
        let assets = sample_assets();
        let mut pool = ObstaclePool::new();
        pool.push(ObstaclePair::with_split(1, &geo, &assets));
        pool.push(ObstaclePair::with_split(9, &geo, &assets));
        pool.advance_all(100.0, 0.18);
        for pair in pool.iter() {
            assert!((pair.x - 549.0).abs() < 1e-3);
        }
    }

    #[test]
    fn evict_pops_only_from_head() {
        let geo = geometry();
        let assets = sample_assets();
        let mut pool = ObstaclePool::new();
        for x in [-200.0, -90.0, 10.0, 300.0] {
            let mut pair = ObstaclePair::with_split(4, &geo, &assets);
            pair.x = x;
            pool.push(pair);
        }
        assert_eq!(pool.evict_offscreen(&geo), 2);
        let xs: Vec<f32> = pool.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 300.0]);
        assert_eq!(pool.evict_offscreen(&geo), 0);
    }

    #[test]
    fn spawn_uses_rng_within_budget() {
        let geo = geometry();
        let assets = sample_assets();
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = ObstaclePool::new();
        for _ in 0..50 {
            pool.spawn(&mut rng, &geo, &assets);
        }
        assert_eq!(pool.len(), 50);
        for pair in pool.iter() {
            assert_eq!(pair.top_pieces + pair.bottom_pieces, geo.total_pieces + 2);
        }
    }

    proptest! {
        #[test]
        fn random_split_stays_in_range(seed in any::<u64>()) {
            let geo = geometry();
            let assets = sample_assets();
            let mut rng = StdRng::seed_from_u64(seed);
            let pair = ObstaclePair::spawn(&mut rng, &geo, &assets);
            let bottom_body = pair.bottom_pieces - 1;
            let top_body = pair.top_pieces - 1;
            prop_assert!((1..=geo.total_pieces - 1).contains(&bottom_body));
            prop_assert_eq!(top_body, geo.total_pieces - bottom_body);
        }

        #[test]
        fn queue_stays_sorted_through_spawn_advance_evict(
            steps in proptest::collection::vec((any::<bool>(), 1.0f32..200.0), 1..60),
            seed in any::<u64>(),
        ) {
            let geo = geometry();
            let assets = sample_assets();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = ObstaclePool::new();
            for (spawn, dt) in steps {
                if spawn {
                    pool.spawn(&mut rng, &geo, &assets);
                }
                pool.advance_all(dt, 0.18);
                pool.evict_offscreen(&geo);
                let xs: Vec<f32> = pool.iter().map(|p| p.x).collect();
                prop_assert!(xs.windows(2).all(|w| w[0] < w[1]));
                if let Some(head) = pool.iter().next() {
                    prop_assert!(head.visible(&geo));
                }
            }
        }
    }
}
