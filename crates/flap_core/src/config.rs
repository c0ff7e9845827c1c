//! Game configuration: window geometry plus every motion and timing constant.
//!
//! Loaded from JSON; any field left out takes its built-in default, so an
//! empty object `{}` is a complete configuration. Validation runs before the
//! first session so geometry that cannot fit an obstacle pair is rejected up
//! front instead of surfacing mid-tick.

use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub bird: BirdConfig,
    pub obstacles: ObstacleConfig,
    pub device: DeviceConfig,
    pub hud: HudConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Horizontal period of the scrolling background.
    pub background_width: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fps: u32,
    /// Leftward scroll speed of background and obstacles, px per ms.
    pub scroll_speed: f32,
    pub wing_period_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub width: u32,
    pub height: u32,
    pub start_x: f32,
    pub initial_climb_ms: f32,
    pub climb_duration_ms: f32,
    pub climb_speed: f32,
    pub sink_speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub width: u32,
    pub piece_height: u32,
    pub spawn_interval_ms: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub regular_size: f32,
    pub title_size: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flap".to_string(),
            width: 568,
            height: 512,
            background_width: 1136.0,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            scroll_speed: 0.18,
            wing_period_ms: 500,
        }
    }
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            start_x: 50.0,
            initial_climb_ms: 2.0,
            climb_duration_ms: 333.3,
            climb_speed: 0.2,
            sink_speed: 0.15,
        }
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            width: 80,
            piece_height: 32,
            spawn_interval_ms: 1500.0,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            read_timeout_ms: 10,
        }
    }
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            regular_size: 24.0,
            title_size: 36.0,
        }
    }
}

impl GameConfig {
    /// Simulation step in milliseconds.
    pub fn frame_ms(&self) -> f32 {
        crate::time::frames_to_ms(1.0, self.timing.fps) as f32
    }

    pub fn spawn_interval_ticks(&self) -> u64 {
        crate::time::interval_ticks(self.obstacles.spawn_interval_ms as f64, self.timing.fps)
    }

    /// Vertical start position: bird centred in the window, truncated to a whole pixel.
    pub fn bird_start_y(&self) -> f32 {
        (self.window.height as i64 / 2 - self.bird.height as i64 / 2) as f32
    }

    /// Body pieces shared between the two stacks of one obstacle pair,
    /// leaving room for a gap of three birds plus the two end caps.
    pub fn total_body_pieces(&self) -> i64 {
        let height = self.window.height as i64;
        let bird = self.bird.height as i64;
        let piece = self.obstacles.piece_height.max(1) as i64;
        (height - 3 * bird - 3 * piece) / piece
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Explicit path: must load. No path: use the default file when present,
/// otherwise the built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<GameConfig, String> {
    if let Some(path) = explicit {
        log::info!("Loading config from {}", path.display());
        return load_config_from_path(path);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        log::info!("Loading config from {}", default_path.display());
        load_config_from_path(default_path)
    } else {
        log::info!("No config file at {}, using defaults", default_path.display());
        let config = GameConfig::default();
        validate_config(&config)?;
        Ok(config)
    }
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let window = &config.window;
    if window.width == 0 || window.height == 0 {
        return Err("Config validation failed: window width and height must be > 0".to_string());
    }
    if window.background_width <= 0.0 {
        return Err("Config validation failed: background_width must be > 0".to_string());
    }
    if config.timing.fps == 0 {
        return Err("Config validation failed: fps must be > 0".to_string());
    }
    if config.timing.scroll_speed < 0.0 {
        return Err("Config validation failed: scroll_speed must be >= 0".to_string());
    }
    if config.timing.wing_period_ms < 2 {
        return Err("Config validation failed: wing_period_ms must be >= 2".to_string());
    }

    let bird = &config.bird;
    if bird.width == 0 || bird.height == 0 {
        return Err("Config validation failed: bird width and height must be > 0".to_string());
    }
    if bird.climb_duration_ms <= 0.0 {
        return Err("Config validation failed: climb_duration_ms must be > 0".to_string());
    }
    if bird.climb_speed < 0.0 || bird.sink_speed < 0.0 {
        return Err("Config validation failed: climb and sink speeds must be >= 0".to_string());
    }
    if bird.start_x < 0.0 || bird.start_x + bird.width as f32 > window.width as f32 {
        return Err(format!(
            "Config validation failed: bird at x={} does not fit a {}px wide window",
            bird.start_x, window.width
        ));
    }
    if bird.height >= window.height {
        return Err("Config validation failed: bird is taller than the window".to_string());
    }

    let obstacles = &config.obstacles;
    if obstacles.width == 0 || obstacles.piece_height == 0 {
        return Err(
            "Config validation failed: obstacle width and piece_height must be > 0".to_string(),
        );
    }
    if obstacles.spawn_interval_ms <= 0.0 {
        return Err("Config validation failed: spawn_interval_ms must be > 0".to_string());
    }
    let total = config.total_body_pieces();
    if total < 2 {
        return Err(format!(
            "Config validation failed: window height {} leaves {} obstacle body pieces, need at least 2",
            window.height, total
        ));
    }

    if config.device.baud_rate == 0 {
        return Err("Config validation failed: device baud_rate must be > 0".to_string());
    }
    if config.hud.regular_size <= 0.0 || config.hud.title_size <= 0.0 {
        return Err("Config validation failed: hud font sizes must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "flap_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        validate_config(&config).expect("defaults should validate");
        assert_eq!(config.total_body_pieces(), 10);
        assert_eq!(config.spawn_interval_ticks(), 90);
        assert!((config.bird_start_y() - 240.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_object_takes_all_defaults() {
        let config: GameConfig = serde_json::from_str("{}").expect("empty config parses");
        assert_eq!(config.window.width, 568);
        assert_eq!(config.device.baud_rate, 115_200);
        assert!(config.device.port.is_none());
    }

    #[test]
    fn load_config_partial_override() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{
              "timing": { "fps": 30 },
              "device": { "port": "/dev/ttyACM0" }
            }"#,
        )
        .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.timing.fps, 30);
        assert!((config.timing.scroll_speed - 0.18).abs() < f32::EPSILON);
        assert_eq!(config.device.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.spawn_interval_ticks(), 45);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_rejects_short_window() {
        let path = temp_file_path("short");
        fs::write(&path, r#"{ "window": { "height": 200 } }"#).expect("write temp file");

        let err = load_config_from_path(&path).expect_err("short window should fail");
        assert!(err.contains("obstacle body pieces"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_config_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read"));
    }

    #[test]
    fn load_config_reports_bad_json() {
        let path = temp_file_path("bad");
        fs::write(&path, "{ not json").expect("write temp file");
        let err = load_config_from_path(&path).expect_err("bad json should fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn validation_rejects_zero_fps() {
        let mut config = GameConfig::default();
        config.timing.fps = 0;
        let err = validate_config(&config).expect_err("zero fps should fail");
        assert!(err.contains("fps"));
    }

    #[test]
    fn validation_rejects_bird_outside_window() {
        let mut config = GameConfig::default();
        config.bird.start_x = 560.0;
        let err = validate_config(&config).expect_err("bird off-screen should fail");
        assert!(err.contains("does not fit"));
    }

    #[test]
    fn smallest_valid_window_has_two_pieces() {
        let mut config = GameConfig::default();
        // 3*32 + 3*32 + 2*32 = 256
        config.window.height = 256;
        assert_eq!(config.total_body_pieces(), 2);
        validate_config(&config).expect("two pieces is enough");
        config.window.height = 255;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let path = temp_file_path("explicit_missing");
        assert!(resolve_config(Some(&path)).is_err());
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/game.json");
        let config = load_config_from_path(&path).expect("bundled config should load");
        assert_eq!(config.spawn_interval_ticks(), GameConfig::default().spawn_interval_ticks());
        assert_eq!(config.window.height, 512);
        assert!(config.device.port.is_none());
    }
}
