use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Window parameters. The size is the logical playfield size; the game
/// renders at this resolution and stretches to whatever the surface becomes.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Valentine's Day Game".to_string(),
            width: 640,
            height: 480,
            resizable: false,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable);

    let window = event_loop
        .create_window(attrs)
        .map_err(|e| format!("Failed to create window '{}': {e}", config.title))?;
    log::debug!("Window scale factor: {}", window.scale_factor());
    Ok(Arc::new(window))
}
