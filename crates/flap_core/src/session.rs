use crate::bird::Bird;
use crate::config::GameConfig;
use crate::obstacle::ObstaclePool;

/// Everything that belongs to one play attempt. Rebuilt from the config on
/// every (re)start, so nothing leaks from one session into the next.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unpaused ticks since the session started; drives the spawn cadence.
    pub frame_clock: u64,
    pub score: u32,
    pub background_x: f32,
    pub paused: bool,
    pub done: bool,
    pub bird: Bird,
    pub obstacles: ObstaclePool,
    last_spawn_clock: Option<u64>,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            frame_clock: 0,
            score: 0,
            background_x: 0.0,
            paused: false,
            done: false,
            bird: Bird::from_config(config),
            obstacles: ObstaclePool::new(),
            last_spawn_clock: None,
        }
    }

    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(config);
    }

    /// A spawn is due on every multiple of the interval, once per clock value.
    pub fn spawn_due(&self, interval_ticks: u64) -> bool {
        !self.paused
            && self.frame_clock % interval_ticks.max(1) == 0
            && self.last_spawn_clock != Some(self.frame_clock)
    }

    pub fn mark_spawned(&mut self) {
        self.last_spawn_clock = Some(self.frame_clock);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("Game {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Scroll left by `dx`, snapping back to zero after one full background width.
    pub fn scroll_background(&mut self, dx: f32, wrap_width: f32) {
        self.background_x -= dx;
        if self.background_x <= -wrap_width {
            self.background_x = 0.0;
        }
    }
}
