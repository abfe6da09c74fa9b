//! Entity records shared by every simulated object.
//!
//! Entities live in the `World`'s table keyed by `EntityId`. Group membership
//! is a tag set on each record, so "the enemies" is a filtered view of the
//! table rather than a second owner. Ids are handed out monotonically and
//! never reused.

use bitflags::bitflags;
use glam::Vec2;

use crate::animation::{
    Direction, Facing, FacingTable, FrameCounter, ATTACK_FRAMES, BLOCK_FRAMES, ENEMY_FRAMES,
    PLAYER_FRAMES,
};
use crate::collision::Aabb;
use crate::config::GameConfig;
use crate::patrol::Patrol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

bitflags! {
    /// Simulation sets an entity takes part in. Every live entity has `ALL`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Groups: u8 {
        const ALL     = 1 << 0;
        const BLOCKS  = 1 << 1;
        const ENEMIES = 1 << 2;
        const ATTACKS = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Player,
    Enemy { patrol: Patrol, spawn_x: f32 },
    Block,
    Attack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Top-left corner in playfield pixels.
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub counter: FrameCounter,
    /// Frame index shown this tick within the facing's sequence.
    pub frame: usize,
    /// Draw order only. Higher draws later.
    pub layer: i32,
    pub groups: Groups,
    pub kind: EntityKind,
}

impl Entity {
    fn base(id: EntityId, pos: Vec2, config: &GameConfig, kind: EntityKind) -> Self {
        let (layer, groups, step) = match kind {
            EntityKind::Player => (config.player_layer, Groups::ALL, config.player_frame_step),
            EntityKind::Enemy { .. } => (
                config.enemy_layer,
                Groups::ALL | Groups::ENEMIES,
                config.enemy_frame_step,
            ),
            EntityKind::Block => (config.block_layer, Groups::ALL | Groups::BLOCKS, 1.0),
            EntityKind::Attack => (
                config.player_layer,
                Groups::ALL | Groups::ATTACKS,
                config.attack_frame_step,
            ),
        };
        Self {
            id,
            pos,
            size: Vec2::splat(config.tile_size),
            facing: Facing::Idle,
            counter: FrameCounter::new(step),
            frame: 0,
            layer,
            groups,
            kind,
        }
    }

    pub fn player(id: EntityId, pos: Vec2, config: &GameConfig) -> Self {
        Self::base(id, pos, config, EntityKind::Player)
    }

    pub fn enemy(id: EntityId, pos: Vec2, patrol: Patrol, config: &GameConfig) -> Self {
        let mut entity = Self::base(
            id,
            pos,
            config,
            EntityKind::Enemy {
                patrol,
                spawn_x: pos.x,
            },
        );
        entity.facing = patrol.heading.facing();
        entity
    }

    pub fn block(id: EntityId, pos: Vec2, config: &GameConfig) -> Self {
        Self::base(id, pos, config, EntityKind::Block)
    }

    pub fn attack(id: EntityId, pos: Vec2, direction: Direction, config: &GameConfig) -> Self {
        let mut entity = Self::base(id, pos, config, EntityKind::Attack);
        entity.facing = direction.into();
        entity
    }

    pub fn rect(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    pub fn in_group(&self, groups: Groups) -> bool {
        self.groups.contains(groups)
    }

    pub fn frame_table(&self) -> &'static FacingTable {
        match self.kind {
            EntityKind::Player => &PLAYER_FRAMES,
            EntityKind::Enemy { .. } => &ENEMY_FRAMES,
            EntityKind::Block => &BLOCK_FRAMES,
            EntityKind::Attack => &ATTACK_FRAMES,
        }
    }

    /// Sprite key for the frame currently shown.
    pub fn sprite(&self) -> Option<&'static str> {
        self.frame_table().sprite(self.facing, self.frame)
    }

    /// Advances the frame counter one tick and updates the shown frame.
    /// Returns true when a one-shot sequence has run out.
    pub fn animate(&mut self) -> bool {
        let table = self.frame_table();
        let len = table.frames(self.facing).len();
        let (frame, finished) = self.counter.tick(len, table.playback);
        self.frame = frame;
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patrol::PatrolHeading;

    #[test]
    fn constructors_assign_groups_and_layers() {
        let config = GameConfig::default();
        let player = Entity::player(EntityId(0), Vec2::ZERO, &config);
        let enemy = Entity::enemy(
            EntityId(1),
            Vec2::ZERO,
            Patrol::new(PatrolHeading::Left, 9),
            &config,
        );
        let block = Entity::block(EntityId(2), Vec2::ZERO, &config);
        let attack = Entity::attack(EntityId(3), Vec2::ZERO, Direction::Up, &config);

        assert_eq!(player.groups, Groups::ALL);
        assert!(enemy.in_group(Groups::ENEMIES) && enemy.in_group(Groups::ALL));
        assert!(block.in_group(Groups::BLOCKS) && !block.in_group(Groups::ENEMIES));
        assert!(attack.in_group(Groups::ATTACKS));

        assert!(block.layer < enemy.layer);
        assert!(enemy.layer < player.layer);
        assert_eq!(attack.layer, player.layer);
    }

    #[test]
    fn rect_derives_from_position_and_tile_size() {
        let config = GameConfig::default();
        let block = Entity::block(EntityId(0), Vec2::new(64.0, 32.0), &config);
        let rect = block.rect();
        assert_eq!((rect.left(), rect.top()), (64.0, 32.0));
        assert_eq!((rect.right(), rect.bottom()), (96.0, 64.0));
    }

    #[test]
    fn initial_sprites() {
        let config = GameConfig::default();
        let player = Entity::player(EntityId(0), Vec2::ZERO, &config);
        assert_eq!(player.sprite(), Some("player_idle"));
        let enemy = Entity::enemy(
            EntityId(1),
            Vec2::ZERO,
            Patrol::new(PatrolHeading::Right, 9),
            &config,
        );
        assert_eq!(enemy.facing, Facing::Right);
        assert_eq!(enemy.sprite(), Some("enemy_right_0"));
        let attack = Entity::attack(EntityId(2), Vec2::ZERO, Direction::Left, &config);
        assert_eq!(attack.sprite(), Some("attack_left_0"));
    }

    #[test]
    fn ids_order_numerically() {
        assert!(EntityId(2) < EntityId(10));
    }
}
