pub mod clip;
pub mod input;
pub mod time;

pub use clip::{ClipCursor, ClipFrame, SpriteClip};
pub use input::{InputState, Key, MouseBtn};
pub use time::TimeState;
