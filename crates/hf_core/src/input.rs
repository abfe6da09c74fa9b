//! Keyboard and pointer state gathered from window events between frames.
//!
//! `is_held` is level-triggered and drives continuous movement. The
//! `just_pressed` / `just_released` sets are edge-triggered: they survive until
//! `end_frame()`, which the main loop calls only once a fixed step has run, so a
//! press landing on a zero-step frame is not lost.
//!
//! Discrete actions that must fire at most once per press (attacking, clicking a
//! button) use the `consume_*` variants. The first fixed step of a frame takes
//! the edge and later steps of the same frame no longer see it.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    F3,
    F4,
    P,
    N,
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

    /// Last pointer position in physical window pixels.
    pub cursor: Vec2,
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

    /// Takes the press edge for `key`. Returns true at most once per press.
    pub fn consume_just_pressed(&mut self, key: Key) -> bool {
        self.just_pressed.remove(&key)
    }

    pub fn consume_mouse_just_pressed(&mut self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.remove(&btn)
    }

    /// Drops everything, held keys included. Used when the window loses focus
    /// so a key released elsewhere does not stay stuck down.
    pub fn clear(&mut self) {
        self.held.clear();
        self.mouse_held.clear();
        self.end_frame();
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
    }
}
