//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` / `is_mouse_held(btn)` are true
//!   every frame the key or button is physically down. The editor paints and
//!   erases from these; the player reads movement from them.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened. Pan start, object drag start/end, menu
//!   clicks, selection hotkeys and mode switches all key off edges.
//!
//! Mouse wheel motion accumulates into `wheel_delta` until `end_frame()`.
//! Edges and wheel are cleared by `end_frame()`, which the main loop calls only
//! after at least one fixed simulation step has consumed them, so a click
//! landing on a frame with zero steps is not lost.

use glam::Vec2;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Space,
    Return,
    Escape,
    Ctrl,
    F3,
    F4,
    A,
    D,
    W,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,
    mouse_just_released: HashSet<MouseBtn>,

    /// Cursor position in logical window pixels, y down.
    pub mouse_position: Vec2,
    wheel_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.mouse_just_released.insert(btn);
        }
    }

    /// Wheel notches, positive away from the user.
    pub fn scroll(&mut self, notches: f32) {
        self.wheel_delta += notches;
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
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

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse_just_released.contains(&btn)
    }

    /// Drop every held key and button, e.g. when the window loses focus or
    /// the app switches between editor and level.
    pub fn release_all(&mut self) {
        for key in self.held.drain() {
            self.just_released.insert(key);
        }
        for btn in self.mouse_held.drain() {
            self.mouse_just_released.insert(btn);
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
        self.wheel_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn key_repeat_does_not_retrigger_edge_after_end_frame() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.end_frame();
        // OS key repeat delivers another press while the key is still held.
        input.key_down(Key::Right);
        assert!(input.is_held(Key::Right));
        assert!(!input.is_just_pressed(Key::Right));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::Escape);
        assert!(!input.is_just_released(Key::Escape));
        assert!(!input.is_held(Key::Escape));
    }

    #[test]
    fn end_frame_clears_edges_but_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.mouse_down(MouseBtn::Left);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Left));
        assert!(!input.is_mouse_just_pressed(MouseBtn::Left));
        assert!(input.is_held(Key::Left));
        assert!(input.is_mouse_held(MouseBtn::Left));
    }

    #[test]
    fn mouse_up_sets_just_released() {
        let mut input = InputState::new();
        input.mouse_down(MouseBtn::Middle);
        input.mouse_up(MouseBtn::Middle);
        assert!(input.is_mouse_just_released(MouseBtn::Middle));
        assert!(!input.is_mouse_held(MouseBtn::Middle));
    }

    #[test]
    fn wheel_accumulates_until_end_frame() {
        let mut input = InputState::new();
        input.scroll(1.0);
        input.scroll(2.0);
        assert_eq!(input.wheel_delta(), 3.0);
        input.end_frame();
        assert_eq!(input.wheel_delta(), 0.0);
    }

    #[test]
    fn release_all_emits_release_edges() {
        let mut input = InputState::new();
        input.key_down(Key::Ctrl);
        input.mouse_down(MouseBtn::Right);
        input.end_frame();
        input.release_all();
        assert!(!input.is_held(Key::Ctrl));
        assert!(input.is_just_released(Key::Ctrl));
        assert!(input.is_mouse_just_released(MouseBtn::Right));
    }

    #[test]
    fn default_state_is_empty() {
        let input = InputState::new();
        assert!(!input.is_held(Key::A));
        assert!(!input.is_mouse_held(MouseBtn::Left));
        assert_eq!(input.mouse_position, Vec2::ZERO);
        assert_eq!(input.wheel_delta(), 0.0);
    }
}
