//! Fixed-rate frame pacing.
//!
//! The game loop runs exactly one simulation tick per frame. `FramePacer::tick`
//! is the only place the loop blocks: it sleeps until one frame period has
//! passed since the previous tick, so cadence is time-based rather than
//! CPU-based. The simulation itself always advances by `fixed_dt_ms()`; the
//! measured delta only feeds the frame statistics shown in the debug panel.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;
const HITCH_THRESHOLD_MS: f64 = 250.0;

pub struct FramePacer {
    pub target_fps: u32,
    frame_duration: Duration,
    last_tick: Instant,
    pub tick_count: u64,
    pub real_dt_ms: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let frame_ms = frames_to_ms(1.0, target_fps);
        Self {
            target_fps,
            frame_duration: Duration::from_secs_f64(frame_ms / 1000.0),
            last_tick: Instant::now(),
            tick_count: 0,
            real_dt_ms: 0.0,
            fps_samples: [frame_ms; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: target_fps as f64,
            smoothed_frame_time_ms: frame_ms,
        }
    }

    /// Simulation delta for one tick, in milliseconds.
    pub fn fixed_dt_ms(&self) -> f64 {
        frames_to_ms(1.0, self.target_fps)
    }

    /// How long the caller still has to wait at `now` before the next tick is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        (self.last_tick + self.frame_duration).saturating_duration_since(now)
    }

    /// Block until the next tick is due, then return the measured elapsed
    /// milliseconds since the previous tick.
    pub fn tick(&mut self) -> f64 {
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }

        let now = Instant::now();
        self.real_dt_ms = now.duration_since(self.last_tick).as_secs_f64() * 1000.0;
        self.last_tick = now;
        self.tick_count += 1;

        if self.tick_count > 1 && self.real_dt_ms > HITCH_THRESHOLD_MS {
            log::warn!(
                "Frame took {:.1}ms, pacer target is {:.1}ms",
                self.real_dt_ms,
                self.fixed_dt_ms()
            );
        }

        self.fps_samples[self.fps_sample_index] = self.real_dt_ms;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_ms: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_ms;
        self.smoothed_fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };

        self.real_dt_ms
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}

pub fn frames_to_ms(frames: f64, fps: u32) -> f64 {
    1000.0 * frames / fps.max(1) as f64
}

pub fn ms_to_frames(ms: f64, fps: u32) -> f64 {
    fps as f64 * ms / 1000.0
}

/// Whole number of ticks that make up `interval_ms`, never less than one.
pub fn interval_ticks(interval_ms: f64, fps: u32) -> u64 {
    ms_to_frames(interval_ms, fps).round().max(1.0) as u64
}
