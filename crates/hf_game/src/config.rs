//! Game tuning. Every value has a compiled-in default; an optional JSON file
//! overrides any subset of them.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The shipped level. `B` wall, `E` enemy spawn, `P` player spawn, `.` empty.
pub const DEFAULT_TILE_MAP: [&str; 15] = [
    "BBBBBBBBBBBBBBBBBBBB",
    "B.......E.....E....B",
    "B....BBBB..BBBB....B",
    "B.E.B....BB....B...B",
    "B....B........B....B",
    "B.....B......B.....B",
    "B...E...B..B...E...B",
    "B........BB........B",
    "B.B.B.BBB.B.B.BBB..B",
    "B..B..B.B..B..B.B..B",
    "B.B.B.BBB.B.B.BBB..B",
    "B..............E...B",
    "B...E..............B",
    "B........P.........B",
    "BBBBBBBBBBBBBBBBBBBB",
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub tile_size: f32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub ticks_per_second: u32,
    /// Pixels per tick.
    pub player_speed: f32,
    /// Pixels per tick.
    pub enemy_speed: f32,
    pub block_layer: i32,
    pub enemy_layer: i32,
    /// Attacks draw on this layer too.
    pub player_layer: i32,
    pub player_frame_step: f32,
    pub enemy_frame_step: f32,
    pub attack_frame_step: f32,
    /// Patrol half-span bounds in ticks, inclusive.
    pub patrol_min_travel: i32,
    pub patrol_max_travel: i32,
    /// Fixed seed for enemy patrols. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            screen_width: 640,
            screen_height: 480,
            ticks_per_second: 60,
            player_speed: 3.0,
            enemy_speed: 2.0,
            block_layer: 1,
            enemy_layer: 2,
            player_layer: 3,
            player_frame_step: 0.1,
            enemy_frame_step: 0.1,
            attack_frame_step: 0.2,
            patrol_min_travel: 7,
            patrol_max_travel: 30,
            rng_seed: None,
        }
    }
}

/// Reads `path` if it exists. A missing file is not an error: defaults apply.
pub fn load_config(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!("No config at '{}', using built-in defaults", path.display());
        return Ok(GameConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    validate_config(&config)?;
    log::info!("Loaded config '{}'", path.display());
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if !(config.tile_size > 0.0) {
        return Err("Config validation failed: tile_size must be > 0".to_string());
    }
    if config.screen_width == 0 || config.screen_height == 0 {
        return Err("Config validation failed: screen size must be non-zero".to_string());
    }
    if config.ticks_per_second == 0 {
        return Err("Config validation failed: ticks_per_second must be > 0".to_string());
    }
    if !(config.player_speed >= 0.0) || !(config.enemy_speed >= 0.0) {
        return Err("Config validation failed: speeds must be >= 0".to_string());
    }
    for (name, step) in [
        ("player_frame_step", config.player_frame_step),
        ("enemy_frame_step", config.enemy_frame_step),
        ("attack_frame_step", config.attack_frame_step),
    ] {
        if !(step > 0.0) {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    if config.patrol_min_travel < 1 || config.patrol_min_travel > config.patrol_max_travel {
        return Err(format!(
            "Config validation failed: patrol travel range [{}, {}] is invalid",
            config.patrol_min_travel, config.patrol_max_travel
        ));
    }
    Ok(())
}
