use crate::animation::Direction;
use crate::world::TickInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default)]
    pub seed: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub movement: Option<Direction>,
    #[serde(default)]
    pub attack: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One `TickInput` per fixed step. An attack fires only on the first
    /// tick of a repeated frame, the way a held key yields one press.
    pub fn expanded_inputs(&self) -> Vec<TickInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(TickInput {
                    movement: frame.movement,
                    attack: frame.attack && i == 0,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, DEFAULT_TILE_MAP};
    use crate::entity::Groups;
    use crate::tilemap::parse_tile_map;
    use crate::world::{World, WorldEvent};
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    struct RunSummary {
        player: Option<Vec2>,
        enemies: Vec<Vec2>,
        events: Vec<(u64, WorldEvent)>,
    }

    fn run(replay: &ReplaySequence) -> RunSummary {
        let map = parse_tile_map(&DEFAULT_TILE_MAP).expect("shipped map parses");
        let mut rng = StdRng::seed_from_u64(replay.seed);
        let mut world = World::new(&map, GameConfig::default(), &mut rng);
        let mut events = Vec::new();
        for input in replay.expanded_inputs() {
            let report = world.step(input);
            events.extend(report.events.iter().map(|e| (report.tick, *e)));
        }
        RunSummary {
            player: world.player().map(|p| p.pos),
            enemies: world.group(Groups::ENEMIES).map(|e| e.pos).collect(),
            events,
        }
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "seed": 7,
              "frames": [
                { "movement": "Up", "repeat": 3 },
                { "attack": true, "repeat": 2 },
                { }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert_eq!(expanded[0].movement, Some(Direction::Up));
        assert!(expanded[3].attack);
        assert!(!expanded[4].attack);
        assert_eq!(expanded[5], TickInput::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "seed": 42,
              "frames": [
                { "movement": "Up", "repeat": 40 },
                { "attack": true },
                { "movement": "Left", "repeat": 60 },
                { "attack": true },
                { "movement": "Down", "repeat": 20 },
                { "movement": "Right", "repeat": 120 },
                { "attack": true, "repeat": 30 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let run_a = run(&replay);
        let run_b = run(&replay);

        assert_eq!(run_a.player, run_b.player);
        assert_eq!(run_a.enemies, run_b.enemies);
        assert_eq!(run_a.events, run_b.events);
        assert!(run_a
            .events
            .iter()
            .any(|(_, e)| matches!(e, WorldEvent::AttackSpawned(_))));

        let _ = fs::remove_file(path);
    }
}
