pub mod debug_overlay;
pub mod labels;

pub use debug_overlay::{DebugOverlay, OverlayActions, OverlayStats};
pub use labels::{LabelTransform, Panel, ScreenLabel};
