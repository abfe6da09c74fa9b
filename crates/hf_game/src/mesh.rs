//! CPU-side sprite mesh built fresh every rendered frame.
//!
//! Draw commands arrive in draw order. Each becomes one textured quad; runs
//! of quads sharing a texture collapse into a single `DrawCall`, so the whole
//! playfield normally renders with one bind per atlas.

use std::collections::BTreeSet;
use std::sync::Arc;

use hf_render::SpriteVertex;

use crate::atlas::MultiAtlasRegistry;
use crate::flow::BACKDROP_LAYER;
use crate::world::DrawCommand;

/// Texture key for the 1x1 white texture used by hitbox quads.
pub const DEBUG_WHITE_TEXTURE: &str = "__debug_white";
pub const HITBOX_COLOR: [f32; 4] = [0.15, 0.9, 0.15, 0.35];

/// A contiguous run of indices sharing one texture binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

/// One quad in playfield pixels, top-left origin, y down.
#[derive(Debug, Clone, Copy)]
pub struct QuadSpec<'a> {
    pub texture_key: &'a str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `[u0, v0, u1, v1]`; `(u0, v0)` lands on the top-left corner.
    pub uv: [f32; 4],
    pub color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct SpriteMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
    /// Sprite ids no atlas could resolve this frame. Those commands were
    /// dropped.
    pub unresolved: BTreeSet<String>,
}

impl SpriteMesh {
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            draw_calls: Vec::with_capacity(8),
            unresolved: BTreeSet::new(),
        }
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn add_quad(&mut self, spec: QuadSpec<'_>) {
        let base_index = self.vertices.len() as u32;
        let (left, top) = (spec.x, spec.y);
        let (right, bottom) = (spec.x + spec.width, spec.y + spec.height);
        let [u0, v0, u1, v1] = spec.uv;

        for (position, tex_coords) in [
            ([left, top], [u0, v0]),
            ([right, top], [u1, v0]),
            ([right, bottom], [u1, v1]),
            ([left, bottom], [u0, v1]),
        ] {
            self.vertices.push(SpriteVertex {
                position,
                tex_coords,
                color: spec.color,
            });
        }

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        push_draw_call(&mut self.draw_calls, spec.texture_key, draw_start, 6);
    }
}

/// Merges with the previous call when the texture matches and the indices
/// are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: &str,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if &*last.texture_key == texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key: Arc::from(texture_key),
        index_start,
        index_count,
    });
}

/// Builds the frame mesh. With `show_hitboxes` a translucent quad is added
/// over every command's destination rect after all sprites. Backdrops get
/// none.
pub fn build_mesh(
    commands: &[DrawCommand<'_>],
    atlases: &MultiAtlasRegistry,
    show_hitboxes: bool,
) -> SpriteMesh {
    let extra = if show_hitboxes { commands.len() } else { 0 };
    let mut mesh = SpriteMesh::with_capacity(commands.len() + extra);

    for command in commands {
        let Some(region) = atlases.resolve(command.sprite) else {
            mesh.unresolved.insert(command.sprite.to_string());
            continue;
        };
        let top_left = command.dest.top_left();
        mesh.add_quad(QuadSpec {
            texture_key: &region.texture_path,
            x: top_left.x,
            y: top_left.y,
            width: command.dest.width(),
            height: command.dest.height(),
            uv: region.uv,
            color: SpriteVertex::WHITE,
        });
    }

    if show_hitboxes {
        for command in commands.iter().filter(|c| c.layer != BACKDROP_LAYER) {
            let top_left = command.dest.top_left();
            mesh.add_quad(QuadSpec {
                texture_key: DEBUG_WHITE_TEXTURE,
                x: top_left.x,
                y: top_left.y,
                width: command.dest.width(),
                height: command.dest.height(),
                uv: [0.0, 0.0, 1.0, 1.0],
                color: HITBOX_COLOR,
            });
        }
    }

    mesh
}

pub fn count_texture_binds(draw_calls: &[DrawCall]) -> usize {
    let mut binds = 0usize;
    let mut current: Option<&str> = None;
    for draw in draw_calls {
        let key: &str = &draw.texture_key;
        if current != Some(key) {
            current = Some(key);
            binds += 1;
        }
    }
    binds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::load_atlas_from_path;
    use crate::collision::Aabb;
    use glam::Vec2;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_mesh_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn atlases() -> MultiAtlasRegistry {
        let mut multi = MultiAtlasRegistry::new();
        for (key, texture, sprites) in [
            (
                "sprites",
                "sprites.png",
                r#"[
                  { "sprite_id": "block", "rect_px": { "x": 0, "y": 0, "w": 32, "h": 32 },
                    "uv": { "u0": 0.0, "v0": 0.0, "u1": 0.5, "v1": 1.0 } },
                  { "sprite_id": "player_idle", "rect_px": { "x": 32, "y": 0, "w": 32, "h": 32 },
                    "uv": { "u0": 0.5, "v0": 0.0, "u1": 1.0, "v1": 1.0 } }
                ]"#,
            ),
            (
                "backdrops",
                "backdrops.png",
                r#"[
                  { "sprite_id": "intro_background", "rect_px": { "x": 0, "y": 0, "w": 64, "h": 32 },
                    "uv": { "u0": 0.0, "v0": 0.0, "u1": 1.0, "v1": 1.0 } }
                ]"#,
            ),
        ] {
            let path = temp_file_path(key);
            let json = format!(
                r#"{{ "version": "0.1", "atlas_id": "{key}",
                     "texture": {{ "path": "{texture}", "width": 64, "height": 32 }},
                     "sprites": {sprites} }}"#
            );
            fs::write(&path, json).expect("write atlas");
            let atlas = load_atlas_from_path(&path).expect("atlas loads");
            multi.add_atlas(key, atlas).expect("add atlas");
            let _ = fs::remove_file(path);
        }
        multi
    }

    fn command(sprite: &str, x: f32, y: f32, layer: i32) -> DrawCommand<'_> {
        DrawCommand {
            sprite,
            dest: Aabb::from_top_left(Vec2::new(x, y), Vec2::splat(32.0)),
            layer,
        }
    }

    #[test]
    fn same_texture_quads_share_one_draw_call() {
        let commands = [
            command("block", 0.0, 0.0, 1),
            command("block", 32.0, 0.0, 1),
            command("player_idle", 64.0, 0.0, 3),
        ];
        let mesh = build_mesh(&commands, &atlases(), false);
        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.indices.len(), 18);
        assert_eq!(mesh.draw_calls.len(), 1);
        assert_eq!(mesh.draw_calls[0].index_count, 18);
        assert_eq!(&*mesh.draw_calls[0].texture_key, "sprites.png");
    }

    #[test]
    fn texture_switch_splits_draw_calls() {
        let commands = [
            command("intro_background", 0.0, 0.0, i32::MIN),
            command("block", 0.0, 0.0, 1),
            command("intro_background", 0.0, 0.0, 5),
        ];
        let mesh = build_mesh(&commands, &atlases(), false);
        assert_eq!(mesh.draw_calls.len(), 3);
        assert_eq!(count_texture_binds(&mesh.draw_calls), 3);
        assert_eq!(mesh.draw_calls[1].index_start, 6);
    }

    #[test]
    fn quad_corners_follow_y_down_playfield() {
        let mesh = build_mesh(&[command("player_idle", 64.0, 96.0, 3)], &atlases(), false);
        let corners: Vec<([f32; 2], [f32; 2])> = mesh
            .vertices
            .iter()
            .map(|v| (v.position, v.tex_coords))
            .collect();
        assert_eq!(
            corners,
            vec![
                ([64.0, 96.0], [0.5, 0.0]),
                ([96.0, 96.0], [1.0, 0.0]),
                ([96.0, 128.0], [1.0, 1.0]),
                ([64.0, 128.0], [0.5, 1.0]),
            ]
        );
    }

    #[test]
    fn unresolved_sprites_are_dropped_and_reported() {
        let commands = [
            command("block", 0.0, 0.0, 1),
            command("enemy_left_0", 0.0, 0.0, 2),
            command("enemy_left_0", 32.0, 0.0, 2),
        ];
        let mesh = build_mesh(&commands, &atlases(), false);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(
            mesh.unresolved.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["enemy_left_0"]
        );
    }

    #[test]
    fn hitboxes_cover_every_command_after_sprites() {
        let commands = [
            command("block", 0.0, 0.0, 1),
            command("missing", 32.0, 0.0, 2),
        ];
        let mesh = build_mesh(&commands, &atlases(), true);
        assert_eq!(mesh.quad_count(), 3);
        let last = mesh.draw_calls.last().expect("hitbox call");
        assert_eq!(&*last.texture_key, DEBUG_WHITE_TEXTURE);
        assert_eq!(last.index_count, 12);
        assert_eq!(mesh.vertices[4].color, HITBOX_COLOR);
    }

    #[test]
    fn backdrops_get_no_hitbox() {
        let commands = [
            command("intro_background", 0.0, 0.0, BACKDROP_LAYER),
            command("block", 0.0, 0.0, 1),
        ];
        let mesh = build_mesh(&commands, &atlases(), true);
        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.draw_calls.last().expect("hitbox call").index_count, 6);
    }
}
