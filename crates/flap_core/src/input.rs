//! Input aggregation for the game loop.
//!
//! Two sources feed the loop each tick:
//!
//! - **Window events** arrive through `InputState`. Key and mouse *releases*
//!   are translated into abstract `InputEvent`s and queued in arrival order.
//!   Held / just-pressed sets are kept as well for edge queries that are not
//!   gameplay signals (the F3 debug toggle).
//!
//! - **The external board** is a `LineSource`. It is polled at most once per
//!   tick and only the exact line `JUMP` (after trimming) counts. Anything
//!   else, including a failed or timed-out read, yields nothing.
//!
//! Both sources assert the same small set of signals, so merge order is not
//! significant and a duplicate `Jump` within one tick is harmless.

use std::collections::{HashSet, VecDeque};

pub const DEVICE_JUMP_TOKEN: &str = "JUMP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Up,
    P,
    Pause,
    Escape,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    TogglePause,
    Jump,
    MenuConfirm,
    MenuCancel,
}

/// A line-oriented channel that can be polled without blocking the frame.
pub trait LineSource {
    /// One bounded read attempt. `None` means "no complete line this tick".
    fn poll_line(&mut self) -> Option<String>;
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
    mouse_held: HashSet<MouseBtn>,
    pending: VecDeque<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
            if let Some(event) = release_binding(key) {
                self.pending.push_back(event);
            }
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        self.mouse_held.insert(btn);
    }

    /// Any mouse button release counts as a jump.
    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.pending.push_back(InputEvent::Jump);
        }
    }

    pub fn close_requested(&mut self) {
        self.pending.push_back(InputEvent::Quit);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.pending.drain(..).collect()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

fn release_binding(key: Key) -> Option<InputEvent> {
    match key {
        Key::Space | Key::Up => Some(InputEvent::Jump),
        Key::Enter => Some(InputEvent::MenuConfirm),
        Key::P | Key::Pause => Some(InputEvent::TogglePause),
        Key::Escape => Some(InputEvent::MenuCancel),
        Key::F3 => None,
    }
}

/// Case-sensitive exact match on the board's jump token.
pub fn parse_device_line(line: &str) -> Option<InputEvent> {
    (line.trim() == DEVICE_JUMP_TOKEN).then_some(InputEvent::Jump)
}

/// Everything that happened since the previous tick, window events first,
/// followed by at most one event from the board.
pub fn collect_events(
    input: &mut InputState,
    device: Option<&mut dyn LineSource>,
) -> Vec<InputEvent> {
    let mut events = input.drain_events();
    if let Some(device) = device {
        if let Some(event) = device.poll_line().as_deref().and_then(parse_device_line) {
            events.push(event);
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedLines {
        lines: VecDeque<Option<String>>,
        polls: usize,
    }

    impl ScriptedLines {
        fn new(lines: &[Option<&str>]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.map(str::to_string)).collect(),
                polls: 0,
            }
        }
    }

    impl LineSource for ScriptedLines {
        fn poll_line(&mut self) -> Option<String> {
            self.polls += 1;
            self.lines.pop_front().flatten()
        }
    }

    #[test]
    fn key_release_queues_bound_event() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert_eq!(input.pending_len(), 0);
        input.key_up(Key::Space);
        assert_eq!(input.drain_events(), vec![InputEvent::Jump]);
    }

    #[test]
    fn bindings_cover_every_gameplay_key() {
        let mut input = InputState::new();
        for key in [Key::Up, Key::Enter, Key::P, Key::Pause, Key::Escape] {
            input.key_down(key);
            input.key_up(key);
        }
        assert_eq!(
            input.drain_events(),
            vec![
                InputEvent::Jump,
                InputEvent::MenuConfirm,
                InputEvent::TogglePause,
                InputEvent::TogglePause,
                InputEvent::MenuCancel,
            ]
        );
    }

    #[test]
    fn debug_key_is_edge_only() {
        let mut input = InputState::new();
        input.key_down(Key::F3);
        assert!(input.is_just_pressed(Key::F3));
        input.key_up(Key::F3);
        assert!(input.is_just_released(Key::F3));
        assert!(input.drain_events().is_empty());
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::Space);
        assert!(!input.is_just_released(Key::Space));
        assert!(input.drain_events().is_empty());
    }

    #[test]
    fn key_repeat_does_not_queue_twice() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_down(Key::Space);
        input.key_up(Key::Space);
        assert_eq!(input.drain_events().len(), 1);
    }

    #[test]
    fn end_frame_keeps_held_and_pending() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_down(Key::P);
        input.key_up(Key::P);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Space));
        assert!(!input.is_just_released(Key::P));
        assert!(input.is_held(Key::Space));
        assert_eq!(input.pending_len(), 1);
    }

    #[test]
    fn mouse_release_is_a_jump() {
        let mut input = InputState::new();
        input.mouse_down(MouseBtn::Right);
        input.mouse_up(MouseBtn::Right);
        input.mouse_up(MouseBtn::Right);
        assert_eq!(input.drain_events(), vec![InputEvent::Jump]);
    }

    #[test]
    fn close_request_is_quit() {
        let mut input = InputState::new();
        input.close_requested();
        assert_eq!(input.drain_events(), vec![InputEvent::Quit]);
    }

    #[test]
    fn device_token_is_exact_and_case_sensitive() {
        assert_eq!(parse_device_line("JUMP"), Some(InputEvent::Jump));
        assert_eq!(parse_device_line("  JUMP\r\n"), Some(InputEvent::Jump));
        assert_eq!(parse_device_line("jump"), None);
        assert_eq!(parse_device_line("JUMPJUMP"), None);
        assert_eq!(parse_device_line(""), None);
    }

    #[test]
    fn collect_polls_device_once_per_tick() {
        let mut input = InputState::new();
        let mut device = ScriptedLines::new(&[Some("JUMP"), Some("JUMP")]);
        let events = collect_events(&mut input, Some(&mut device));
        assert_eq!(events, vec![InputEvent::Jump]);
        assert_eq!(device.polls, 1);
    }

    #[test]
    fn lowercase_device_line_emits_nothing() {
        let mut input = InputState::new();
        let mut device = ScriptedLines::new(&[Some("jump")]);
        assert!(collect_events(&mut input, Some(&mut device)).is_empty());
    }

    #[test]
    fn idle_device_and_keyboard_merge() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_up(Key::Space);
        let mut device = ScriptedLines::new(&[None]);
        let events = collect_events(&mut input, Some(&mut device));
        assert_eq!(events, vec![InputEvent::Jump]);
    }

    #[test]
    fn no_device_skips_the_read() {
        let mut input = InputState::new();
        assert!(collect_events(&mut input, None).is_empty());
    }
}
