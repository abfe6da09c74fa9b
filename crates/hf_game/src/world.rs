//! The playfield: every live entity, the per-tick systems that move them, and
//! the one-shot "level cleared" latch.
//!
//! A tick runs in a fixed order:
//!
//!   1. spawn the queued attack, if any, next to the player
//!   2. patrol and animate enemies
//!   3. move the player, resolve it against every block, animate it
//!   4. player-vs-enemy contact (kills the player)
//!   5. attack-vs-enemy contact, then attack animation and expiry
//!   6. the level-cleared latch
//!
//! Systems are free functions over group views so no entity ever needs a
//! handle back to the world. Outcomes are reported as `WorldEvent`s; the
//! world itself never decides what happens to the screen.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;

use crate::animation::{Direction, Facing};
use crate::collision::{resolve_against_obstacles, Aabb};
use crate::config::GameConfig;
use crate::entity::{Entity, EntityId, EntityKind, Groups};
use crate::patrol::Patrol;
use crate::tilemap::{TileKind, TileMap};

/// Player intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub movement: Option<Direction>,
    /// Discrete attack trigger. Consumed by this tick whether or not an
    /// attack could be spawned.
    pub attack: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    AttackSpawned(EntityId),
    AttackExpired(EntityId),
    EnemyKilled { enemy: EntityId, by: EntityId },
    PlayerDied { killer: EntityId },
    LevelCleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<WorldEvent>,
}

impl TickReport {
    pub fn player_died(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, WorldEvent::PlayerDied { .. }))
    }

    pub fn level_cleared(&self) -> bool {
        self.events.contains(&WorldEvent::LevelCleared)
    }
}

/// One sprite blit for the renderer: what to draw and where, in playfield
/// pixels. Commands come pre-sorted in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand<'a> {
    pub sprite: &'a str,
    pub dest: Aabb,
    pub layer: i32,
}

pub struct World {
    config: GameConfig,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
    player: Option<EntityId>,
    tick: u64,
    level_cleared: bool,
}

impl World {
    /// Builds the level from `map`. Enemies draw their patrols from `rng` in
    /// map scan order.
    pub fn new(map: &TileMap, config: GameConfig, rng: &mut impl Rng) -> Self {
        let mut world = Self {
            config,
            entities: BTreeMap::new(),
            next_id: 0,
            player: None,
            tick: 0,
            level_cleared: false,
        };

        for placement in &map.placements {
            let pos = Vec2::new(
                placement.col as f32 * config.tile_size,
                placement.row as f32 * config.tile_size,
            );
            match placement.kind {
                TileKind::Wall => {
                    world.spawn(|id| Entity::block(id, pos, &config));
                }
                TileKind::EnemySpawn => {
                    let patrol =
                        Patrol::random(rng, config.patrol_min_travel, config.patrol_max_travel);
                    world.spawn(|id| Entity::enemy(id, pos, patrol, &config));
                }
                TileKind::PlayerSpawn => {
                    let id = world.spawn(|id| Entity::player(id, pos, &config));
                    world.player = Some(id);
                }
                TileKind::Empty => {}
            }
        }

        log::debug!(
            "World built: {} blocks, {} enemies",
            world.count(Groups::BLOCKS),
            world.count(Groups::ENEMIES)
        );
        world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn level_cleared(&self) -> bool {
        self.level_cleared
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(&id))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Live entities tagged with every group in `groups`, in id order.
    pub fn group(&self, groups: Groups) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.in_group(groups))
    }

    fn group_mut(&mut self, groups: Groups) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut().filter(move |e| e.in_group(groups))
    }

    pub fn count(&self, groups: Groups) -> usize {
        self.group(groups).count()
    }

    pub fn spawn(&mut self, make: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, make(id));
        id
    }

    /// Removes the entity from every group at once.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if self.player == Some(id) {
            self.player = None;
        }
        self.entities.remove(&id)
    }

    pub fn step(&mut self, input: TickInput) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            events: Vec::new(),
        };

        if input.attack {
            if let Some(id) = self.spawn_attack() {
                report.events.push(WorldEvent::AttackSpawned(id));
            }
        }

        let enemy_speed = self.config.enemy_speed;
        patrol_enemies(self.group_mut(Groups::ENEMIES), enemy_speed);

        let blocks: Vec<Aabb> = self.group(Groups::BLOCKS).map(Entity::rect).collect();
        let speed = self.config.player_speed;
        if let Some(player) = self.player.and_then(|id| self.entities.get_mut(&id)) {
            move_player(player, input.movement, speed, &blocks);
        }

        let enemies: Vec<(EntityId, Aabb)> = self
            .group(Groups::ENEMIES)
            .map(|e| (e.id, e.rect()))
            .collect();
        if let Some(player) = self.player() {
            if let Some(killer) = first_contact(&player.rect(), &enemies) {
                let id = player.id;
                self.despawn(id);
                log::debug!("Player {:?} killed by enemy {:?}", id, killer);
                report.events.push(WorldEvent::PlayerDied { killer });
            }
        }

        self.run_attacks(&mut report);

        if !self.level_cleared && self.count(Groups::ENEMIES) == 0 {
            self.level_cleared = true;
            log::info!("Level cleared at tick {}", self.tick);
            report.events.push(WorldEvent::LevelCleared);
        }

        report
    }

    /// Attacks land on the tile adjacent to the player in its facing. An idle
    /// (never moved) or dead player cannot attack.
    fn spawn_attack(&mut self) -> Option<EntityId> {
        let player = self.player()?;
        let direction = player.facing.direction()?;
        let (ox, oy) = direction.offset();
        let pos = player.pos + Vec2::new(ox, oy) * self.config.tile_size;
        let config = self.config;
        let id = self.spawn(|id| Entity::attack(id, pos, direction, &config));
        log::trace!("Attack {:?} spawned at {:?} facing {:?}", id, pos, direction);
        Some(id)
    }

    fn run_attacks(&mut self, report: &mut TickReport) {
        let attacks: Vec<EntityId> = self.group(Groups::ATTACKS).map(|e| e.id).collect();
        for attack_id in attacks {
            let Some(attack_rect) = self.entity(attack_id).map(Entity::rect) else {
                continue;
            };
            let hits: Vec<EntityId> = self
                .group(Groups::ENEMIES)
                .filter(|e| attack_rect.overlaps(&e.rect()))
                .map(|e| e.id)
                .collect();

            if !hits.is_empty() {
                for enemy in hits {
                    self.despawn(enemy);
                    report.events.push(WorldEvent::EnemyKilled {
                        enemy,
                        by: attack_id,
                    });
                }
                self.despawn(attack_id);
                continue;
            }

            let finished = self
                .entity_mut(attack_id)
                .map(Entity::animate)
                .unwrap_or(false);
            if finished {
                self.despawn(attack_id);
                report.events.push(WorldEvent::AttackExpired(attack_id));
            }
        }
    }

    /// Sprite commands for every live entity, ordered by layer and then by id.
    pub fn draw_list(&self) -> Vec<DrawCommand<'static>> {
        let mut commands: Vec<DrawCommand<'static>> = self
            .entities
            .values()
            .filter_map(|e| {
                e.sprite().map(|sprite| DrawCommand {
                    sprite,
                    dest: e.rect(),
                    layer: e.layer,
                })
            })
            .collect();
        // Stable: entities already come in id order.
        commands.sort_by_key(|c| c.layer);
        commands
    }
}

fn patrol_enemies<'a>(enemies: impl Iterator<Item = &'a mut Entity>, speed: f32) {
    for enemy in enemies {
        if let EntityKind::Enemy { patrol, .. } = &mut enemy.kind {
            let step = patrol.step();
            enemy.pos.x += step as f32 * speed;
            enemy.facing = patrol.heading.facing();
        }
        enemy.animate();
    }
}

/// Moves the player one tick, resolves it against `blocks` and picks its
/// frame. A player whose resolved position did not change shows frame 0 of
/// its facing without advancing the counter, so walking into a wall reads
/// as standing still.
fn move_player(player: &mut Entity, movement: Option<Direction>, speed: f32, blocks: &[Aabb]) {
    let before = player.pos;
    if let Some(direction) = movement {
        player.facing = Facing::from(direction);
        let (dx, dy) = direction.offset();
        let result = resolve_against_obstacles(player.rect(), dx * speed, dy * speed, blocks);
        player.pos = result.aabb.top_left();
    }

    if player.pos != before {
        player.animate();
    } else {
        player.frame = 0;
    }
}

fn first_contact(target: &Aabb, others: &[(EntityId, Aabb)]) -> Option<EntityId> {
    others
        .iter()
        .find(|(_, rect)| target.overlaps(rect))
        .map(|(id, _)| *id)
}
