//! Timed sprite clips: frame sequences where every frame carries its own
//! duration. Used for full-screen backdrops, which play on wall-clock-like
//! time instead of the per-tick frame counters the simulation uses.
//!
//! Durations are stored in integer microseconds so playback under the fixed
//! step is exact. Clip files keep `duration_ms` for readability.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CLIP_FILE_VERSION: &str = "0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipFrame {
    pub sprite_id: String,
    pub duration_us: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteClip {
    pub frames: Vec<ClipFrame>,
    pub looping: bool,
}

impl SpriteClip {
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }

    pub fn sprite_ids(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.sprite_id.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ClipFile {
    pub clip_set: String,
    pub clips: BTreeMap<String, SpriteClip>,
}

/// Playback position within one clip. Holds no reference to the clip so the
/// clip data can be hot-reloaded underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipCursor {
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl ClipCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sprite shown at the current position, or `None` for an empty clip.
    pub fn current<'a>(&self, clip: &'a SpriteClip) -> Option<&'a str> {
        clip.frames
            .get(self.frame_index)
            .or_else(|| clip.frames.last())
            .map(|f| f.sprite_id.as_str())
    }

    /// Advances by `dt_us` and returns the sprite now showing.
    pub fn tick<'a>(&mut self, dt_us: u64, clip: &'a SpriteClip) -> Option<&'a str> {
        if clip.frames.is_empty() || self.finished {
            return self.current(clip);
        }
        if self.frame_index >= clip.frames.len() {
            // Clip was swapped for a shorter one.
            self.reset();
        }

        self.elapsed_us += dt_us;
        let total = clip.total_duration_us();
        if clip.looping && total > 0 && self.elapsed_us >= total {
            self.elapsed_us %= total;
        }

        while self.elapsed_us >= clip.frames[self.frame_index].duration_us {
            self.elapsed_us -= clip.frames[self.frame_index].duration_us;
            if self.frame_index + 1 < clip.frames.len() {
                self.frame_index += 1;
            } else if clip.looping {
                self.frame_index = 0;
            } else {
                self.elapsed_us = 0;
                self.finished = true;
                break;
            }
        }

        self.current(clip)
    }
}

#[derive(Debug, Deserialize)]
struct ClipFileJson {
    version: String,
    clip_set: String,
    clips: BTreeMap<String, ClipJson>,
}

#[derive(Debug, Deserialize)]
struct ClipJson {
    frames: Vec<ClipFrameJson>,
    #[serde(default)]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct ClipFrameJson {
    sprite_id: String,
    duration_ms: u64,
}

pub fn load_clip_file(path: &Path) -> Result<ClipFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read clip file {}: {e}", path.display()))?;
    parse_clip_file(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

pub fn parse_clip_file(raw: &str) -> Result<ClipFile, String> {
    let json: ClipFileJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse clip file: {e}"))?;
    validate_clip_json(&json)?;

    let clips = json
        .clips
        .into_iter()
        .map(|(name, clip)| {
            let frames = clip
                .frames
                .into_iter()
                .map(|f| ClipFrame {
                    sprite_id: f.sprite_id,
                    duration_us: f.duration_ms * 1000,
                })
                .collect();
            (
                name,
                SpriteClip {
                    frames,
                    looping: clip.looping,
                },
            )
        })
        .collect();

    Ok(ClipFile {
        clip_set: json.clip_set,
        clips,
    })
}

fn validate_clip_json(json: &ClipFileJson) -> Result<(), String> {
    if json.version != CLIP_FILE_VERSION {
        return Err(format!(
            "Clip validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.clip_set.is_empty() {
        return Err("Clip validation failed: clip_set is empty".to_string());
    }
    for (name, clip) in &json.clips {
        if clip.frames.is_empty() {
            return Err(format!("Clip validation failed: clip '{name}' has no frames"));
        }
        for (i, frame) in clip.frames.iter().enumerate() {
            if frame.sprite_id.is_empty() {
                return Err(format!(
                    "Clip validation failed: clip '{name}' frame {i} has empty sprite_id"
                ));
            }
            if frame.duration_ms == 0 {
                return Err(format!(
                    "Clip validation failed: clip '{name}' frame {i} has zero duration"
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_clip_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn clip(durations_ms: &[u64], looping: bool) -> SpriteClip {
        SpriteClip {
            frames: durations_ms
                .iter()
                .enumerate()
                .map(|(i, &d)| ClipFrame {
                    sprite_id: format!("rose_{i}"),
                    duration_us: d * 1000,
                })
                .collect(),
            looping,
        }
    }

    #[test]
    fn tick_walks_frames_in_order() {
        let clip = clip(&[100, 100, 100], true);
        let mut cursor = ClipCursor::new();
        assert_eq!(cursor.tick(0, &clip), Some("rose_0"));
        assert_eq!(cursor.tick(99_000, &clip), Some("rose_0"));
        assert_eq!(cursor.tick(1_000, &clip), Some("rose_1"));
        assert_eq!(cursor.tick(150_000, &clip), Some("rose_2"));
    }

    #[test]
    fn looping_clip_wraps_even_for_huge_steps() {
        let clip = clip(&[100, 100], true);
        let mut cursor = ClipCursor::new();
        // 10 full cycles plus 150ms lands on the second frame.
        assert_eq!(cursor.tick(2_150_000, &clip), Some("rose_1"));
        assert!(!cursor.finished);
        assert_eq!(cursor.elapsed_us, 50_000);
    }

    #[test]
    fn one_shot_clip_holds_last_frame() {
        let clip = clip(&[100, 100], false);
        let mut cursor = ClipCursor::new();
        assert_eq!(cursor.tick(300_000, &clip), Some("rose_1"));
        assert!(cursor.finished);
        assert_eq!(cursor.tick(100_000, &clip), Some("rose_1"));
    }

    #[test]
    fn reset_restarts_from_first_frame() {
        let clip = clip(&[50, 50, 50], true);
        let mut cursor = ClipCursor::new();
        cursor.tick(120_000, &clip);
        assert_eq!(cursor.current(&clip), Some("rose_2"));
        cursor.reset();
        assert_eq!(cursor.current(&clip), Some("rose_0"));
        assert_eq!(cursor.elapsed_us, 0);
    }

    #[test]
    fn cursor_survives_clip_shrinking() {
        let long = clip(&[10, 10, 10, 10], true);
        let short = clip(&[10], true);
        let mut cursor = ClipCursor::new();
        cursor.tick(35_000, &long);
        assert_eq!(cursor.frame_index, 3);
        assert_eq!(cursor.tick(1_000, &short), Some("rose_0"));
    }

    #[test]
    fn empty_clip_has_no_sprite() {
        let clip = SpriteClip {
            frames: Vec::new(),
            looping: true,
        };
        let mut cursor = ClipCursor::new();
        assert_eq!(cursor.tick(16_667, &clip), None);
    }

    #[test]
    fn fixed_step_playback_is_deterministic() {
        let clip = clip(&[100, 150, 80], true);
        let mut a = ClipCursor::new();
        let mut b = ClipCursor::new();
        for _ in 0..500 {
            assert_eq!(a.tick(16_667, &clip), b.tick(16_667, &clip));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn load_clip_file_converts_durations() {
        let path = temp_file_path("valid");
        let json = r#"
        {
          "version": "0.1",
          "clip_set": "backdrops",
          "clips": {
            "roses": {
              "frames": [
                { "sprite_id": "roses_0", "duration_ms": 120 },
                { "sprite_id": "roses_1", "duration_ms": 80 }
              ],
              "looping": true
            },
            "title": {
              "frames": [{ "sprite_id": "intro_background", "duration_ms": 1000 }]
            }
          }
        }
        "#;
        fs::write(&path, json).expect("write temp file");

        let file = load_clip_file(&path).expect("should parse");
        assert_eq!(file.clip_set, "backdrops");
        let roses = &file.clips["roses"];
        assert!(roses.looping);
        assert_eq!(roses.frames[0].duration_us, 120_000);
        assert_eq!(roses.total_duration_us(), 200_000);
        assert!(!file.clips["title"].looping);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn parse_rejects_bad_version() {
        let json = r#"{ "version": "2.0", "clip_set": "x", "clips": {} }"#;
        let err = parse_clip_file(json).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
    }

    #[test]
    fn parse_rejects_zero_duration_and_empty_clips() {
        let zero = r#"{ "version": "0.1", "clip_set": "x",
            "clips": { "a": { "frames": [{ "sprite_id": "s", "duration_ms": 0 }] } } }"#;
        assert!(parse_clip_file(zero)
            .expect_err("zero duration")
            .contains("zero duration"));

        let empty = r#"{ "version": "0.1", "clip_set": "x",
            "clips": { "a": { "frames": [] } } }"#;
        assert!(parse_clip_file(empty)
            .expect_err("no frames")
            .contains("has no frames"));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = temp_file_path("missing");
        let err = load_clip_file(&path).expect_err("missing file");
        assert!(err.contains("Failed to read clip file"));
    }
}
