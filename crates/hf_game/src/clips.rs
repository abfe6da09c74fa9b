//! Registry of timed sprite clips loaded from clip files.
//!
//! Clips are grouped by the `clip_set` named inside each file, so reloading
//! one file swaps exactly the clips it defined.

use std::collections::BTreeMap;
use std::path::Path;

use hf_core::clip::{load_clip_file, ClipFile, SpriteClip};

use crate::atlas::MultiAtlasRegistry;

#[derive(Debug, Default)]
pub struct ClipRegistry {
    /// clip_set -> clip name -> clip
    sets: BTreeMap<String, BTreeMap<String, SpriteClip>>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and registers its clips, replacing any set of the same
    /// name. Nothing changes if the file fails to load. Returns the set name.
    pub fn load_file(&mut self, path: &Path) -> Result<String, String> {
        let file = load_clip_file(path)?;
        log::debug!(
            "Loaded clip set '{}' ({} clips) from {}",
            file.clip_set,
            file.clips.len(),
            path.display()
        );
        Ok(self.insert_file(file))
    }

    pub fn insert_file(&mut self, file: ClipFile) -> String {
        self.sets.insert(file.clip_set.clone(), file.clips);
        file.clip_set
    }

    /// With a set name only that set is searched; otherwise the first set (in
    /// name order) defining `name` wins.
    pub fn resolve_clip(&self, clip_set: Option<&str>, name: &str) -> Option<&SpriteClip> {
        match clip_set {
            Some(set) => self.sets.get(set).and_then(|clips| clips.get(name)),
            None => self.sets.values().find_map(|clips| clips.get(name)),
        }
    }

    pub fn clip_count(&self) -> usize {
        self.sets.values().map(BTreeMap::len).sum()
    }

    /// Fails with every frame whose sprite no atlas serves.
    pub fn validate_sprites(&self, atlases: &MultiAtlasRegistry) -> Result<(), String> {
        let mut problems = Vec::new();
        for (set, clips) in &self.sets {
            for (name, clip) in clips {
                for sprite_id in atlases.missing(clip.sprite_ids()) {
                    problems.push(format!("{set}/{name} -> '{sprite_id}'"));
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Clips reference missing sprite_id(s): {}",
                problems.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::load_atlas_from_path;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_clips_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const BACKDROPS: &str = r#"{
      "version": "0.1",
      "clip_set": "backdrops",
      "clips": {
        "roses": {
          "frames": [
            { "sprite_id": "roses_0", "duration_ms": 100 },
            { "sprite_id": "roses_1", "duration_ms": 100 }
          ],
          "looping": true
        },
        "intro": {
          "frames": [ { "sprite_id": "intro_background", "duration_ms": 1000 } ],
          "looping": true
        }
      }
    }"#;

    fn atlas_with(ids: &[&str]) -> MultiAtlasRegistry {
        let path = temp_file_path("atlas");
        let sprites: Vec<String> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                format!(
                    r#"{{ "sprite_id": "{id}", "rect_px": {{ "x": {}, "y": 0, "w": 1, "h": 1 }},
                         "uv": {{ "u0": 0.0, "v0": 0.0, "u1": 0.5, "v1": 1.0 }} }}"#,
                    i
                )
            })
            .collect();
        let json = format!(
            r#"{{ "version": "0.1", "atlas_id": "t",
                 "texture": {{ "path": "t.png", "width": 16, "height": 1 }},
                 "sprites": [{}] }}"#,
            sprites.join(",")
        );
        fs::write(&path, json).expect("write atlas");
        let atlas = load_atlas_from_path(&path).expect("atlas loads");
        let _ = fs::remove_file(path);
        let mut multi = MultiAtlasRegistry::new();
        multi.add_atlas("t.json", atlas).expect("add atlas");
        multi
    }

    #[test]
    fn loads_and_resolves_clips() {
        let path = temp_file_path("load");
        fs::write(&path, BACKDROPS).expect("write clips");

        let mut registry = ClipRegistry::new();
        let set = registry.load_file(&path).expect("clips load");
        assert_eq!(set, "backdrops");
        assert_eq!(registry.clip_count(), 2);
        let roses = registry
            .resolve_clip(Some("backdrops"), "roses")
            .expect("roses clip");
        assert_eq!(roses.frames.len(), 2);
        assert!(registry.resolve_clip(None, "intro").is_some());
        assert!(registry.resolve_clip(Some("other"), "roses").is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_reload_keeps_previous_clips() {
        let path = temp_file_path("reload");
        fs::write(&path, BACKDROPS).expect("write clips");
        let mut registry = ClipRegistry::new();
        registry.load_file(&path).expect("clips load");

        fs::write(&path, "{ not json").expect("corrupt clips");
        assert!(registry.load_file(&path).is_err());
        assert!(registry.resolve_clip(None, "roses").is_some());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn validate_sprites_lists_every_missing_frame() {
        let path = temp_file_path("validate");
        fs::write(&path, BACKDROPS).expect("write clips");
        let mut registry = ClipRegistry::new();
        registry.load_file(&path).expect("clips load");

        registry
            .validate_sprites(&atlas_with(&["roses_0", "roses_1", "intro_background"]))
            .expect("all sprites present");

        let err = registry
            .validate_sprites(&atlas_with(&["roses_0"]))
            .expect_err("missing sprites");
        assert!(err.contains("backdrops/roses -> 'roses_1'"), "{err}");
        assert!(err.contains("backdrops/intro -> 'intro_background'"), "{err}");

        let _ = fs::remove_file(path);
    }
}
