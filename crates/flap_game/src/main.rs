//! Flap -- window, event loop and wiring.
//!
//! winit drives the loop through `ApplicationHandler`. Each `RedrawRequested`
//! is exactly one game tick:
//!
//!   1. `FramePacer::tick()` -- sleep until the next frame is due
//!   2. `collect_events()` -- drain window input, poll the board once
//!   3. `Game::tick()` -- advance the state machine
//!   4. `Game::frame()` -> `GpuFrameSink` -- sprites, then egui text, then present
//!
//! The board is optional. If it cannot be opened the game still runs on the
//! keyboard, and read errors after that are never fatal.

mod cli;
mod device;
mod frame_sink;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use cli::Args;
use flap_core::assets::load_assets_from_dir;
use flap_core::config::resolve_config;
use flap_core::game::{Game, TickOutcome};
use flap_core::input::{collect_events, InputState, Key, LineSource, MouseBtn};
use flap_core::time::FramePacer;
use flap_overlay::{Overlay, OverlayStats};
use flap_platform::serial::SerialDevice;
use flap_platform::window::{create_window, PlatformConfig};
use flap_render::{GpuContext, SpriteBatch, SpriteRenderer};
use frame_sink::GpuFrameSink;

/// Everything that needs the window. Built in `resumed`.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SpriteRenderer,
    overlay: Overlay,
    batch: SpriteBatch,
    pacer: FramePacer,
    input: InputState,
    game: Game,
    device: Option<SerialDevice>,
    device_label: String,
    started: Instant,
}

impl EngineState {
    fn new(event_loop: &ActiveEventLoop, args: &Args) -> Result<Self, String> {
        let config = resolve_config(args.config.as_deref())?;
        log::info!("Loading assets from {}", args.assets.display());
        let assets = Arc::new(load_assets_from_dir(&args.assets)?);
        let mut game = Game::new(config.clone(), Arc::clone(&assets))?;

        let device = device::open_device(
            device::requested_port(args, &config.device),
            &config.device,
        );
        game.set_device_connected(device.is_some());
        let device_label = device::device_label(device.as_ref());

        let window = create_window(event_loop, &PlatformConfig::from_game_config(&config))?;
        let gpu = GpuContext::new(window.clone())?;
        let renderer = SpriteRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format,
            &assets,
            (config.window.width, config.window.height),
        );
        let overlay = Overlay::new(&gpu.device, gpu.surface_format, &window, config.hud.clone());

        Ok(Self {
            window,
            gpu,
            renderer,
            overlay,
            batch: SpriteBatch::new(),
            pacer: FramePacer::new(config.timing.fps),
            input: InputState::new(),
            game,
            device,
            device_label,
            started: Instant::now(),
        })
    }

    fn overlay_stats(&self) -> OverlayStats {
        let session = self.game.session();
        OverlayStats {
            phase_label: self.game.phase().label().to_string(),
            score: session.score,
            obstacles: session.obstacles.len(),
            frame_clock: session.frame_clock,
            paused: session.paused,
            device_label: self.device_label.clone(),
            sessions: self.game.sessions_started(),
            last_score: self.game.last_score(),
            last_hit: self.game.last_hit().map(|hit| format!("{hit:?}")),
            ..OverlayStats::default()
        }
    }

    fn close_device(&mut self) {
        if let Some(device) = self.device.as_mut() {
            device.close();
        }
    }

    /// One pacer tick: input, simulation, then render.
    fn run_tick(&mut self) -> TickOutcome {
        self.pacer.tick();
        let wall_ms = self.started.elapsed().as_millis() as u64;

        let events = collect_events(
            &mut self.input,
            self.device.as_mut().map(|d| d as &mut dyn LineSource),
        );
        if self.input.is_just_pressed(Key::F3) {
            self.overlay.toggle_debug();
        }
        let outcome = self.game.tick(&events, wall_ms);
        self.input.end_frame();
        if outcome == TickOutcome::Exit {
            return outcome;
        }

        let frame = self.game.frame(wall_ms);
        let stats = self.overlay_stats();
        let mut sink = GpuFrameSink::new(
            &self.window,
            &self.gpu,
            &mut self.renderer,
            &mut self.overlay,
            &mut self.batch,
            &self.pacer,
            stats,
        );
        if let Err(e) = frame.submit(&mut sink) {
            log::error!("Frame submit failed: {e}");
        }
        outcome
    }
}

struct App {
    args: Args,
    state: Option<EngineState>,
}

impl App {
    fn new(args: Args) -> Self {
        Self { args, state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match EngineState::new(event_loop, &self.args) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("{e}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                state.input.close_requested();
            }

            WindowEvent::Resized(physical_size) => {
                state.gpu.resize(physical_size.width, physical_size.height);
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_mouse(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.run_tick() == TickOutcome::Exit {
                    log::info!("Game over! Score: {}", state.game.session().score);
                    state.close_device();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.close_device();
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::Pause => Some(Key::Pause),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn map_mouse(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Flap starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args);
    event_loop.run_app(&mut app).expect("Event loop error");
}
