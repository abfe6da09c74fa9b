//! Sprite atlas metadata.
//!
//! `hf_sheet_slicer` cuts the raw sprite sheets into one packed PNG per
//! atlas and writes a JSON file next to it mapping each sprite id (the
//! names used by the frame tables, e.g. `player_left_1`) to a pixel rect and
//! a UV rect inside that PNG. The game never touches the raw sheets.
//!
//! `MultiAtlasRegistry::resolve(sprite_id)` is the lookup used when building
//! the frame mesh.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

pub const ATLAS_FILE_VERSION: &str = "0.1";

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AtlasFile {
    pub version: String,
    pub atlas_id: String,
    pub texture: AtlasTexture,
    /// sha256 over the packed cell pixels, written by the slicer.
    #[serde(default)]
    pub content_hash: Option<String>,
    pub sprites: Vec<AtlasSprite>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AtlasTexture {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AtlasSprite {
    pub sprite_id: String,
    pub rect_px: RectPx,
    pub uv: UvRect,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RectPx {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

/// Everything the mesh builder needs for one sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRegion {
    pub texture_path: String,
    pub size_px: (u32, u32),
    /// `[u0, v0, u1, v1]`, v growing downward.
    pub uv: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct AtlasRegistry {
    pub atlas_id: String,
    pub content_hash: Option<String>,
    regions: HashMap<String, SpriteRegion>,
}

impl AtlasRegistry {
    pub fn resolve(&self, sprite_id: &str) -> Option<&SpriteRegion> {
        self.regions.get(sprite_id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }
}

pub fn load_atlas_from_path(path: &Path) -> Result<AtlasRegistry, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read atlas metadata {}: {e}", path.display()))?;
    let atlas: AtlasFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse atlas metadata {}: {e}", path.display()))?;
    validate_atlas(&atlas).map_err(|e| format!("{} ({})", e, path.display()))?;
    Ok(registry_from_file(atlas))
}

fn registry_from_file(atlas: AtlasFile) -> AtlasRegistry {
    let texture_path = atlas.texture.path;
    let regions = atlas
        .sprites
        .into_iter()
        .map(|sprite| {
            let region = SpriteRegion {
                texture_path: texture_path.clone(),
                size_px: (sprite.rect_px.w, sprite.rect_px.h),
                uv: [sprite.uv.u0, sprite.uv.v0, sprite.uv.u1, sprite.uv.v1],
            };
            (sprite.sprite_id, region)
        })
        .collect();
    AtlasRegistry {
        atlas_id: atlas.atlas_id,
        content_hash: atlas.content_hash,
        regions,
    }
}

fn validate_atlas(atlas: &AtlasFile) -> Result<(), String> {
    if atlas.version != ATLAS_FILE_VERSION {
        return Err(format!(
            "Atlas validation failed: unsupported version '{}'",
            atlas.version
        ));
    }
    if atlas.atlas_id.trim().is_empty() {
        return Err("Atlas validation failed: atlas_id is empty".to_string());
    }
    let (tex_w, tex_h) = (atlas.texture.width, atlas.texture.height);
    if tex_w == 0 || tex_h == 0 {
        return Err("Atlas validation failed: texture width/height must be > 0".to_string());
    }

    let mut ids = HashSet::new();
    for sprite in &atlas.sprites {
        let id = &sprite.sprite_id;
        if !ids.insert(id.as_str()) {
            return Err(format!("Atlas validation failed: duplicate sprite_id '{id}'"));
        }
        let r = sprite.rect_px;
        if r.w == 0 || r.h == 0 {
            return Err(format!(
                "Atlas validation failed: sprite '{id}' has zero-sized rect"
            ));
        }
        let fits = match (r.x.checked_add(r.w), r.y.checked_add(r.h)) {
            (Some(right), Some(bottom)) => right <= tex_w && bottom <= tex_h,
            _ => false,
        };
        if !fits {
            return Err(format!(
                "Atlas validation failed: sprite '{id}' rect exceeds atlas bounds"
            ));
        }
        let uv = sprite.uv;
        let in_unit = [uv.u0, uv.v0, uv.u1, uv.v1]
            .iter()
            .all(|c| (0.0..=1.0).contains(c));
        if !in_unit || uv.u0 >= uv.u1 || uv.v0 >= uv.v1 {
            return Err(format!(
                "Atlas validation failed: sprite '{id}' has invalid UV rect"
            ));
        }
    }

    Ok(())
}

/// Sprite lookup across every loaded atlas.
///
/// Atlases are kept per metadata path so one file can be swapped on hot
/// reload; the flat index answers lookups without walking them.
#[derive(Debug, Clone, Default)]
pub struct MultiAtlasRegistry {
    atlases: HashMap<String, AtlasRegistry>,
    index: HashMap<String, SpriteRegion>,
}

impl MultiAtlasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the atlas if any of its sprite ids is already served by
    /// another atlas.
    pub fn add_atlas(&mut self, key: &str, atlas: AtlasRegistry) -> Result<(), String> {
        if let Some(dup) = atlas.regions.keys().find(|id| self.index.contains_key(*id)) {
            return Err(format!(
                "Duplicate sprite_id '{dup}' across atlases (adding '{key}')"
            ));
        }
        for (id, region) in &atlas.regions {
            self.index.insert(id.clone(), region.clone());
        }
        self.atlases.insert(key.to_string(), atlas);
        Ok(())
    }

    pub fn remove_atlas(&mut self, key: &str) -> Option<AtlasRegistry> {
        let atlas = self.atlases.remove(key)?;
        for id in atlas.regions.keys() {
            self.index.remove(id);
        }
        Some(atlas)
    }

    /// Swaps the atlas stored under `key`. On failure the previous atlas
    /// stays loaded.
    pub fn replace_atlas(&mut self, key: &str, atlas: AtlasRegistry) -> Result<(), String> {
        let previous = self.remove_atlas(key);
        match self.add_atlas(key, atlas) {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Some(previous) = previous {
                    self.add_atlas(key, previous)?;
                }
                Err(e)
            }
        }
    }

    pub fn resolve(&self, sprite_id: &str) -> Option<&SpriteRegion> {
        self.index.get(sprite_id)
    }

    /// Ids from `wanted` that no atlas serves, sorted.
    pub fn missing<'a>(&self, wanted: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
        wanted
            .into_iter()
            .filter(|id| !self.index.contains_key(*id))
            .collect()
    }

    pub fn texture_paths(&self) -> BTreeSet<String> {
        self.index.values().map(|r| r.texture_path.clone()).collect()
    }

    pub fn atlas_count(&self) -> usize {
        self.atlases.len()
    }

    pub fn sprite_count(&self) -> usize {
        self.index.len()
    }
}
