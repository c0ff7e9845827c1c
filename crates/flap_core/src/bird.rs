use crate::assets::ImageId;
use crate::config::GameConfig;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct BirdMotion {
    pub climb_duration_ms: f32,
    pub climb_speed: f32,
    pub sink_speed: f32,
}

impl Default for BirdMotion {
    fn default() -> Self {
        Self {
            climb_duration_ms: 333.3,
            climb_speed: 0.2,
            sink_speed: 0.15,
        }
    }
}

/// Which of the two wing images is shown. Driven by wall-clock time only,
/// so the flap cycle is independent of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WingFrame {
    Up,
    Down,
}

impl WingFrame {
    pub fn at(wall_ms: u64, period_ms: u64) -> Self {
        let period = period_ms.max(2);
        if wall_ms % period >= period / 2 {
            WingFrame::Up
        } else {
            WingFrame::Down
        }
    }

    pub fn image(self) -> ImageId {
        match self {
            WingFrame::Up => ImageId::BirdWingUp,
            WingFrame::Down => ImageId::BirdWingDown,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bird {
    pub x: f32,
    pub y: f32,
    pub climb_remaining_ms: f32,
    pub width: f32,
    pub height: f32,
    pub motion: BirdMotion,
}

impl Bird {
    pub fn new(x: f32, y: f32, climb_remaining_ms: f32, motion: BirdMotion) -> Self {
        Self {
            x,
            y,
            climb_remaining_ms,
            width: 32.0,
            height: 32.0,
            motion,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let bird = &config.bird;
        let mut out = Self::new(
            bird.start_x,
            config.bird_start_y(),
            bird.initial_climb_ms,
            BirdMotion {
                climb_duration_ms: bird.climb_duration_ms,
                climb_speed: bird.climb_speed,
                sink_speed: bird.sink_speed,
            },
        );
        out.width = bird.width as f32;
        out.height = bird.height as f32;
        out
    }

    pub fn start_climb(&mut self) {
        self.climb_remaining_ms = self.motion.climb_duration_ms;
    }

    pub fn is_climbing(&self) -> bool {
        self.climb_remaining_ms > 0.0
    }

    /// Ease-in-ease-out rise while a climb is active, constant sink otherwise.
    /// No clamping here: leaving the window is the collision check's business.
    pub fn advance(&mut self, dt_ms: f32) {
        if self.climb_remaining_ms > 0.0 {
            let frac = 1.0 - self.climb_remaining_ms / self.motion.climb_duration_ms;
            self.y -= self.motion.climb_speed * dt_ms * (1.0 - (frac * PI).cos());
            self.climb_remaining_ms -= dt_ms;
        } else {
            self.y += self.motion.sink_speed * dt_ms;
        }
    }

    /// Whole-pixel top-left corner used for mask offsets.
    pub fn pixel_pos(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}
