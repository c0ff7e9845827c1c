//! The game-loop orchestrator.
//!
//! `Game` is a three-state machine driven once per pacer tick:
//!
//!   Menu ──Jump/Confirm──▶ Playing ──collision / Escape──▶ GameOver
//!     │                      │                                │
//!     └──Quit/Escape──▶ exit └──Quit──▶ exit    Jump/Confirm ─┘ (restart)
//!
//! A Playing tick runs: spawn check, input, (stop here while paused),
//! background scroll, bird motion, obstacle motion and eviction, collision,
//! scoring, clock advance. Rendering is a separate read-only pass
//! (`frame`) so the caller decides when and where pixels go.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::{AssetSet, ImageId};
use crate::bird::WingFrame;
use crate::collision::{self, Hit};
use crate::config::{validate_config, GameConfig};
use crate::frame::{FrameDescription, TextSize, BLACK, GREEN, RED, WHITE};
use crate::input::InputEvent;
use crate::mask::PixelMask;
use crate::obstacle::PipeGeometry;
use crate::scoring;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Menu => "Menu",
            Phase::Playing => "Playing",
            Phase::GameOver => "Game Over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Exit,
}

struct WingMasks {
    up: PixelMask,
    down: PixelMask,
}

impl WingMasks {
    fn for_frame(&self, frame: WingFrame) -> &PixelMask {
        match frame {
            WingFrame::Up => &self.up,
            WingFrame::Down => &self.down,
        }
    }
}

pub struct Game {
    config: GameConfig,
    geometry: PipeGeometry,
    assets: Arc<AssetSet>,
    wing_masks: WingMasks,
    rng: StdRng,
    phase: Phase,
    session: Session,
    spawn_interval: u64,
    sessions_started: u32,
    last_score: u32,
    last_hit: Option<Hit>,
    device_connected: bool,
}

impl Game {
    pub fn new(config: GameConfig, assets: Arc<AssetSet>) -> Result<Self, String> {
        Self::with_rng(config, assets, StdRng::from_entropy())
    }

    /// Deterministic obstacle splits, for replays and tests.
    pub fn with_seed(config: GameConfig, assets: Arc<AssetSet>, seed: u64) -> Result<Self, String> {
        Self::with_rng(config, assets, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, assets: Arc<AssetSet>, rng: StdRng) -> Result<Self, String> {
        validate_config(&config)?;
        validate_art(&config, &assets)?;

        let geometry = PipeGeometry::from_config(&config);
        let wing_masks = WingMasks {
            up: PixelMask::from_image(assets.get(ImageId::BirdWingUp)),
            down: PixelMask::from_image(assets.get(ImageId::BirdWingDown)),
        };
        let spawn_interval = config.spawn_interval_ticks();
        log::debug!(
            "Obstacle budget {} pieces, spawn every {} ticks",
            geometry.total_pieces,
            spawn_interval
        );
        let session = Session::new(&config);

        Ok(Self {
            config,
            geometry,
            assets,
            wing_masks,
            rng,
            phase: Phase::Menu,
            session,
            spawn_interval,
            sessions_started: 0,
            last_score: 0,
            last_hit: None,
            device_connected: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Score of the most recently finished session.
    pub fn last_score(&self) -> u32 {
        self.last_score
    }

    /// What ended the most recent session, `None` when it was abandoned.
    pub fn last_hit(&self) -> Option<Hit> {
        self.last_hit
    }

    pub fn sessions_started(&self) -> u32 {
        self.sessions_started
    }

    pub fn set_device_connected(&mut self, connected: bool) {
        self.device_connected = connected;
    }

    /// A window close wins over everything else queued in the same tick.
    pub fn tick(&mut self, events: &[InputEvent], wall_ms: u64) -> TickOutcome {
        if events.contains(&InputEvent::Quit) {
            return TickOutcome::Exit;
        }
        match self.phase {
            Phase::Menu | Phase::GameOver => self.tick_waiting(events),
            Phase::Playing => self.tick_playing(events, wall_ms),
        }
    }

    /// Menu and game-over screens wait for the same two decisions.
    fn tick_waiting(&mut self, events: &[InputEvent]) -> TickOutcome {
        for event in events {
            match event {
                InputEvent::MenuCancel => return TickOutcome::Exit,
                InputEvent::Jump | InputEvent::MenuConfirm => {
                    self.start_session();
                    break;
                }
                InputEvent::Quit | InputEvent::TogglePause => {}
            }
        }
        TickOutcome::Continue
    }

    fn tick_playing(&mut self, events: &[InputEvent], wall_ms: u64) -> TickOutcome {
        if self.session.spawn_due(self.spawn_interval) {
            self.session
                .obstacles
                .spawn(&mut self.rng, &self.geometry, &self.assets);
            self.session.mark_spawned();
        }

        for event in events {
            match event {
                InputEvent::MenuCancel => {
                    self.end_session("abandoned", None);
                    return TickOutcome::Continue;
                }
                InputEvent::TogglePause => self.session.toggle_pause(),
                InputEvent::Jump | InputEvent::MenuConfirm => self.session.bird.start_climb(),
                InputEvent::Quit => {}
            }
        }

        if self.session.paused {
            return TickOutcome::Continue;
        }

        let dt = self.config.frame_ms();
        let scroll_speed = self.config.timing.scroll_speed;
        self.session
            .scroll_background(scroll_speed * dt, self.config.window.background_width);
        self.session.bird.advance(dt);
        self.session.obstacles.advance_all(dt, scroll_speed);
        self.session.obstacles.evict_offscreen(&self.geometry);

        let wing = WingFrame::at(wall_ms, self.config.timing.wing_period_ms);
        let hit = collision::first_hit(
            &self.session.bird,
            self.wing_masks.for_frame(wing),
            &self.session.obstacles,
            self.config.window.height as f32,
        );

        self.session.score += scoring::award_passed(
            &mut self.session.obstacles,
            self.session.bird.x,
            &self.geometry,
        );
        self.session.frame_clock += 1;

        if let Some(hit) = hit {
            log::debug!("Bird hit {hit:?} at tick {}", self.session.frame_clock);
            self.end_session("collision", Some(hit));
        }
        TickOutcome::Continue
    }

    fn start_session(&mut self) {
        self.session.reset(&self.config);
        self.sessions_started += 1;
        self.phase = Phase::Playing;
        log::info!("Session {} started", self.sessions_started);
    }

    fn end_session(&mut self, reason: &str, hit: Option<Hit>) {
        self.session.done = true;
        self.last_score = self.session.score;
        self.last_hit = hit;
        self.phase = Phase::GameOver;
        log::info!(
            "Session {} ended ({reason}), score {}",
            self.sessions_started,
            self.last_score
        );
    }

    pub fn frame(&self, wall_ms: u64) -> FrameDescription {
        match self.phase {
            Phase::Menu => self.menu_frame(),
            Phase::Playing => self.playing_frame(wall_ms),
            Phase::GameOver => self.game_over_frame(),
        }
    }

    fn menu_frame(&self) -> FrameDescription {
        let (cx, h) = self.text_anchor();
        let mut frame = FrameDescription::new(BLACK);
        frame.text(&self.config.window.title, cx, h / 3.0, TextSize::Title, WHITE);
        frame.text("Press SPACE to start", cx, h / 2.0, TextSize::Regular, WHITE);
        frame.text(
            "Use the board button or SPACE to jump",
            cx,
            h / 2.0 + 40.0,
            TextSize::Regular,
            WHITE,
        );
        let (status, color) = if self.device_connected {
            ("Board: Connected", GREEN)
        } else {
            ("Board: Not Connected", RED)
        };
        frame.text(status, cx, h / 2.0 + 80.0, TextSize::Regular, color);
        frame
    }

    fn playing_frame(&self, wall_ms: u64) -> FrameDescription {
        let session = &self.session;
        let mut frame = FrameDescription::new(BLACK);

        let background = self.assets.size(ImageId::Background);
        let wrap = self.config.window.background_width;
        frame.blit(ImageId::Background, session.background_x, 0.0, background);
        frame.blit(ImageId::Background, session.background_x + wrap, 0.0, background);

        for pair in session.obstacles.iter() {
            for piece in pair.pieces() {
                frame.blit(piece.image, pair.x, piece.y as f32, self.assets.size(piece.image));
            }
        }

        let wing = WingFrame::at(wall_ms, self.config.timing.wing_period_ms).image();
        frame.blit(wing, session.bird.x, session.bird.y, self.assets.size(wing));

        let (cx, h) = self.text_anchor();
        frame.text(
            session.score.to_string(),
            cx,
            self.config.obstacles.piece_height as f32,
            TextSize::Regular,
            WHITE,
        );
        if session.paused {
            frame.text("Paused", cx, h / 3.0, TextSize::Title, WHITE);
        }
        frame
    }

    fn game_over_frame(&self) -> FrameDescription {
        let (cx, h) = self.text_anchor();
        let mut frame = FrameDescription::new(BLACK);
        frame.text("Game Over", cx, h / 3.0, TextSize::Title, RED);
        frame.text(
            format!("Final Score: {}", self.last_score),
            cx,
            h / 2.0,
            TextSize::Regular,
            WHITE,
        );
        frame.text("Press SPACE to play again", cx, h / 2.0 + 40.0, TextSize::Regular, WHITE);
        frame.text("Press ESC to quit", cx, h / 2.0 + 80.0, TextSize::Regular, WHITE);
        frame
    }

    fn text_anchor(&self) -> (f32, f32) {
        (
            self.config.window.width as f32 / 2.0,
            self.config.window.height as f32,
        )
    }
}

/// Pipe pieces are composited into a column `obstacles.width` wide, one
/// `piece_height` slot each; art that does not fit would corrupt the mask.
/// Bird frames must match the configured bird size, since the bounds check
/// uses the config while the collision mask uses the image.
fn validate_art(config: &GameConfig, assets: &AssetSet) -> Result<(), String> {
    for id in [ImageId::PipeEnd, ImageId::PipeBody] {
        let (w, h) = assets.size(id);
        if w > config.obstacles.width || h > config.obstacles.piece_height {
            return Err(format!(
                "Asset validation failed: {} is {}x{}, obstacle slot is {}x{}",
                id.label(),
                w,
                h,
                config.obstacles.width,
                config.obstacles.piece_height
            ));
        }
    }

    let bird = (config.bird.width, config.bird.height);
    for id in [ImageId::BirdWingUp, ImageId::BirdWingDown] {
        let (w, h) = assets.size(id);
        if (w, h) != bird {
            return Err(format!(
                "Asset validation failed: {} is {}x{}, bird is {}x{}",
                id.label(),
                w,
                h,
                bird.0,
                bird.1
            ));
        }
    }
    Ok(())
}
