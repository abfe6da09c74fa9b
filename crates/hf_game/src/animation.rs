//! Per-entity sprite animation driven by the simulation tick.
//!
//! Every entity carries a `FrameCounter`: a fractional counter advanced by a
//! fixed step each tick it is moving or acting. The displayed frame is the
//! counter truncated to an integer, wrapped for looping sequences or clamped
//! to the last frame for one-shot sequences. Frame sequences live in
//! `FacingTable`s indexed by `Facing`, so a lookup can never miss.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset in screen space (y grows downward).
    pub fn offset(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    /// Initial pose before the player first moves.
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Facing::Idle => 0,
            Facing::Up => 1,
            Facing::Down => 2,
            Facing::Left => 3,
            Facing::Right => 4,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Facing::Idle => None,
            Facing::Up => Some(Direction::Up),
            Facing::Down => Some(Direction::Down),
            Facing::Left => Some(Direction::Left),
            Facing::Right => Some(Direction::Right),
        }
    }
}

impl From<Direction> for Facing {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Facing::Up,
            Direction::Down => Facing::Down,
            Direction::Left => Facing::Left,
            Direction::Right => Facing::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Loop,
    /// Hold the last frame; the owner is told when the sequence has run out.
    Once,
}

pub type FrameSeq = &'static [&'static str];

/// Frame sequences for one kind of entity, one per facing.
#[derive(Debug, Clone, Copy)]
pub struct FacingTable {
    frames: [FrameSeq; Facing::COUNT],
    pub playback: Playback,
}

impl FacingTable {
    pub const fn new(
        idle: FrameSeq,
        up: FrameSeq,
        down: FrameSeq,
        left: FrameSeq,
        right: FrameSeq,
        playback: Playback,
    ) -> Self {
        Self {
            frames: [idle, up, down, left, right],
            playback,
        }
    }

    pub fn frames(&self, facing: Facing) -> FrameSeq {
        self.frames[facing.index()]
    }

    pub fn sprite(&self, facing: Facing, frame: usize) -> Option<&'static str> {
        self.frames(facing).get(frame).copied()
    }
}

const PLAYER_IDLE: FrameSeq = &["player_idle"];
const PLAYER_UP: FrameSeq = &["player_up_0", "player_up_1"];
const PLAYER_DOWN: FrameSeq = &["player_down_0", "player_down_1"];
const PLAYER_LEFT: FrameSeq = &["player_left_0", "player_left_1"];
const PLAYER_RIGHT: FrameSeq = &["player_right_0", "player_right_1"];

pub const PLAYER_FRAMES: FacingTable = FacingTable::new(
    PLAYER_IDLE,
    PLAYER_UP,
    PLAYER_DOWN,
    PLAYER_LEFT,
    PLAYER_RIGHT,
    Playback::Loop,
);

const ENEMY_LEFT: FrameSeq = &["enemy_left_0", "enemy_left_1"];
const ENEMY_RIGHT: FrameSeq = &["enemy_right_0", "enemy_right_1"];

// Enemies only ever face left or right.
pub const ENEMY_FRAMES: FacingTable = FacingTable::new(
    ENEMY_LEFT,
    ENEMY_LEFT,
    ENEMY_LEFT,
    ENEMY_LEFT,
    ENEMY_RIGHT,
    Playback::Loop,
);

const ATTACK_UP: FrameSeq = &[
    "attack_up_0",
    "attack_up_1",
    "attack_up_2",
    "attack_up_3",
    "attack_up_4",
];
const ATTACK_DOWN: FrameSeq = &[
    "attack_down_0",
    "attack_down_1",
    "attack_down_2",
    "attack_down_3",
    "attack_down_4",
];
const ATTACK_LEFT: FrameSeq = &[
    "attack_left_0",
    "attack_left_1",
    "attack_left_2",
    "attack_left_3",
    "attack_left_4",
];
const ATTACK_RIGHT: FrameSeq = &[
    "attack_right_0",
    "attack_right_1",
    "attack_right_2",
    "attack_right_3",
    "attack_right_4",
];

// Attacks are never spawned facing idle; the slot reuses the up sequence.
pub const ATTACK_FRAMES: FacingTable = FacingTable::new(
    ATTACK_UP,
    ATTACK_UP,
    ATTACK_DOWN,
    ATTACK_LEFT,
    ATTACK_RIGHT,
    Playback::Once,
);

const BLOCK: FrameSeq = &["block"];

pub const BLOCK_FRAMES: FacingTable =
    FacingTable::new(BLOCK, BLOCK, BLOCK, BLOCK, BLOCK, Playback::Loop);

/// Fractional frame clock. Stored as a whole number of fixed steps so the
/// value after `n` ticks is exactly `n * step` with no accumulated drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCounter {
    steps: u32,
    step: f32,
}

impl FrameCounter {
    pub fn new(step: f32) -> Self {
        Self { steps: 0, step }
    }

    pub fn value(&self) -> f32 {
        self.steps as f32 * self.step
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn frame_index(&self, len: usize, playback: Playback) -> usize {
        let len = len.max(1);
        let whole = self.value() as usize;
        match playback {
            Playback::Loop => whole % len,
            Playback::Once => whole.min(len - 1),
        }
    }

    pub fn finished(&self, len: usize) -> bool {
        self.value() >= len as f32
    }

    /// Reports the frame to show this tick, then advances one step. Looping
    /// counters restart from zero once they pass the end of the sequence.
    /// Returns `(frame, finished)`; `finished` is only ever true for
    /// `Playback::Once`.
    pub fn tick(&mut self, len: usize, playback: Playback) -> (usize, bool) {
        let frame = self.frame_index(len, playback);
        self.steps = self.steps.saturating_add(1);
        match playback {
            Playback::Loop => {
                if self.finished(len) {
                    self.steps = 0;
                }
                (frame, false)
            }
            Playback::Once => (frame, self.finished(len)),
        }
    }
}
