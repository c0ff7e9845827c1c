use crate::input::{collect_events, InputEvent, InputState, Key, LineSource};
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Scripted per-tick input: keyboard releases plus what the board sends.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default = "default_fps")]
    pub fps: u32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReplayFrame {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub device_line: Option<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

struct ScriptedDevice {
    lines: VecDeque<Option<String>>,
}

impl LineSource for ScriptedDevice {
    fn poll_line(&mut self) -> Option<String> {
        self.lines.pop_front().flatten()
    }
}

impl ReplayScript {
    /// Runs every frame through the real input path so key bindings and the
    /// device token check are part of the replay.
    pub fn expanded_events(&self) -> Result<Vec<Vec<InputEvent>>, String> {
        let mut input = InputState::new();
        let mut out = Vec::new();
        for frame in &self.frames {
            let keys = frame
                .keys
                .iter()
                .map(|name| parse_key(name))
                .collect::<Result<Vec<_>, _>>()?;
            for _ in 0..frame.repeat.max(1) {
                for &key in &keys {
                    input.key_down(key);
                    input.key_up(key);
                }
                let mut device = ScriptedDevice {
                    lines: VecDeque::from([frame.device_line.clone()]),
                };
                out.push(collect_events(&mut input, Some(&mut device)));
                input.end_frame();
            }
        }
        Ok(out)
    }
}

fn parse_key(name: &str) -> Result<Key, String> {
    match name {
        "space" => Ok(Key::Space),
        "enter" => Ok(Key::Enter),
        "up" => Ok(Key::Up),
        "p" => Ok(Key::P),
        "pause" => Ok(Key::Pause),
        "escape" => Ok(Key::Escape),
        other => Err(format!("Replay validation failed: unknown key '{other}'")),
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplayScript) -> Result<(), String> {
    if replay.fps == 0 {
        return Err("Replay validation failed: fps must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_fps() -> u32 {
    60
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::sample_assets;
    use crate::config::GameConfig;
    use crate::game::{Game, Phase, TickOutcome};
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "flap_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_replay(name_hint: &str, json: &str) -> ReplayScript {
        let path = temp_file_path(name_hint);
        fs::write(&path, json).expect("write replay file");
        let replay = load_replay_from_path(&path).expect("replay should load");
        let _ = fs::remove_file(path);
        replay
    }

    fn play(replay: &ReplayScript, seed: u64) -> (Game, Vec<TickOutcome>) {
        let mut config = GameConfig::default();
        config.timing.fps = replay.fps;
        let mut game = Game::with_seed(config, Arc::new(sample_assets()), seed)
            .expect("game should build");
        let frame_ms = 1000 / replay.fps as u64;
        let mut outcomes = Vec::new();
        for (i, events) in replay
            .expanded_events()
            .expect("replay keys are valid")
            .iter()
            .enumerate()
        {
            outcomes.push(game.tick(events, i as u64 * frame_ms));
        }
        (game, outcomes)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let replay = write_replay(
            "parse",
            r#"{
              "frames": [
                { "keys": ["space"] },
                { "repeat": 3 },
                { "device_line": "JUMP\r\n" },
                { "device_line": "jump" }
              ]
            }"#,
        );
        let events = replay.expanded_events().expect("valid keys");
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], vec![InputEvent::Jump]);
        assert!(events[1].is_empty());
        assert_eq!(events[4], vec![InputEvent::Jump]);
        assert!(events[5].is_empty());
    }

    #[test]
    fn replay_rejects_unknown_key() {
        let replay = write_replay("unknown", r#"{ "frames": [ { "keys": ["tab"] } ] }"#);
        let err = replay.expanded_events().expect_err("tab is not bound");
        assert!(err.contains("unknown key"));
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn board_only_session_is_playable() {
        let replay = write_replay(
            "board",
            r#"{
              "frames": [
                { "device_line": "JUMP" },
                { "repeat": 5 },
                { "device_line": "JUMP" },
                { "repeat": 5 }
              ]
            }"#,
        );
        let (game, _) = play(&replay, 3);
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.session().bird.is_climbing());
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = write_replay(
            "deterministic",
            r#"{
              "frames": [
                { "keys": ["enter"] },
                { "repeat": 12 },
                { "keys": ["space"] },
                { "repeat": 20 },
                { "keys": ["up"] },
                { "repeat": 20 },
                { "keys": ["p"] },
                { "repeat": 10 },
                { "keys": ["pause"] },
                { "repeat": 40 }
              ]
            }"#,
        );
        let (a, outcomes_a) = play(&replay, 99);
        let (b, outcomes_b) = play(&replay, 99);
        assert_eq!(outcomes_a, outcomes_b);
        assert_eq!(a.phase(), b.phase());
        let (sa, sb) = (a.session(), b.session());
        assert_eq!(sa.frame_clock, sb.frame_clock);
        assert_eq!(sa.score, sb.score);
        assert_eq!(sa.obstacles.len(), sb.obstacles.len());
        assert_eq!(sa.bird.y.to_bits(), sb.bird.y.to_bits());
        let splits_a: Vec<u32> = sa.obstacles.iter().map(|p| p.bottom_pieces).collect();
        let splits_b: Vec<u32> = sb.obstacles.iter().map(|p| p.bottom_pieces).collect();
        assert_eq!(splits_a, splits_b);
    }

    #[test]
    fn long_pause_does_not_burst_spawns() {
        let replay = write_replay(
            "pause",
            r#"{
              "frames": [
                { "keys": ["space"] },
                { "repeat": 3 },
                { "keys": ["p"] },
                { "repeat": 50 },
                { "keys": ["p"] },
                { "repeat": 3 }
              ]
            }"#,
        );
        let (game, _) = play(&replay, 5);
        let session = game.session();
        // 3 + 1 (resume tick) + 3 unpaused ticks after the start tick spawned.
        assert_eq!(session.frame_clock, 7);
        assert_eq!(session.obstacles.len(), 1);
    }

    #[test]
    fn escape_twice_quits_from_game_over() {
        let replay = write_replay(
            "quit",
            r#"{ "frames": [ { "keys": ["space"] }, { "keys": ["escape"] }, { "keys": ["escape"] } ] }"#,
        );
        let (game, outcomes) = play(&replay, 1);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(
            outcomes,
            vec![TickOutcome::Continue, TickOutcome::Continue, TickOutcome::Exit]
        );
    }
}
