//! Screen flow: Intro -> Playing -> GameOver / Cleared -> Playing ...
//!
//! `Flow` owns the current `World` and the RNG that seeds each new one. It
//! is advanced once per fixed step with a `FrameInput` and reports whether
//! the app should keep running. Quit is honoured on every screen before
//! anything else happens that step.

use glam::Vec2;
use hf_core::clip::ClipCursor;
use hf_devtools::ScreenLabel;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::Direction;
use crate::clips::ClipRegistry;
use crate::collision::Aabb;
use crate::config::GameConfig;
use crate::tilemap::TileMap;
use crate::world::{DrawCommand, TickInput, World};

pub const TITLE: &str = "Valentine's Day Game";
pub const BACKDROP_CLIP_SET: &str = "backdrops";
pub const GAME_OVER_CLIP: &str = "roses";
pub const INTRO_BACKDROP: &str = "intro_background";
pub const BACKDROP_LAYER: i32 = i32::MIN;

const FONT_SIZE: f32 = 36.0;
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const BUTTON_FILL: [u8; 4] = [148, 3, 37, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Playing,
    GameOver,
    Cleared,
}

/// Everything the flow reads for one fixed step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub movement: Option<Direction>,
    pub attack: bool,
    /// Pointer position in playfield pixels.
    pub pointer: Vec2,
    pub pointer_pressed: bool,
    pub quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSignal {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    pub signal: FlowSignal,
    pub transition: Option<(Screen, Screen)>,
}

impl FlowStep {
    fn stay() -> Self {
        Self {
            signal: FlowSignal::Continue,
            transition: None,
        }
    }
}

/// A clickable rectangle with a caption. Hits are strict on every edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub caption: &'static str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Button {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.x
            && point.x < self.x + self.width
            && point.y > self.y
            && point.y < self.y + self.height
    }

    fn label(&self) -> ScreenLabel {
        let center = [self.x + self.width / 2.0, self.y + self.height / 2.0];
        ScreenLabel::new(self.caption, center, FONT_SIZE, WHITE)
            .with_panel([self.x, self.y, self.width, self.height], BUTTON_FILL)
    }
}

pub fn play_button(config: &GameConfig) -> Button {
    Button {
        caption: "Play",
        x: (config.screen_width / 2) as f32 - 100.0,
        y: 220.0,
        width: 200.0,
        height: 60.0,
    }
}

pub fn play_again_button(config: &GameConfig) -> Button {
    Button {
        caption: "Play Again",
        x: (config.screen_width / 2) as f32 - 130.0,
        y: (config.screen_height / 2) as f32,
        width: 250.0,
        height: 80.0,
    }
}

pub struct Flow {
    screen: Screen,
    map: TileMap,
    config: GameConfig,
    rng: StdRng,
    world: Option<World>,
    backdrop: ClipCursor,
    runs: u32,
}

impl Flow {
    /// Seeds from `config.rng_seed` when set, otherwise from OS entropy.
    pub fn new(map: TileMap, config: GameConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            screen: Screen::Intro,
            map,
            config,
            rng,
            world: None,
            backdrop: ClipCursor::new(),
            runs: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Takes effect from the next world built. The screen size stays the one
    /// the window was opened with.
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = GameConfig {
            screen_width: self.config.screen_width,
            screen_height: self.config.screen_height,
            ..config
        };
    }

    pub fn tick(&mut self, input: &FrameInput, clips: &ClipRegistry) -> FlowStep {
        if input.quit {
            log::info!("Quit requested on {:?}", self.screen);
            return FlowStep {
                signal: FlowSignal::Quit,
                transition: None,
            };
        }

        let next = match self.screen {
            Screen::Intro => self
                .pressed(&play_button(&self.config), input)
                .then_some(Screen::Playing),
            Screen::Playing => self.tick_playing(input),
            Screen::GameOver | Screen::Cleared => {
                let dt_us = self.tick_us();
                if self.screen == Screen::GameOver {
                    let clip = clips.resolve_clip(Some(BACKDROP_CLIP_SET), GAME_OVER_CLIP);
                    if let Some(clip) = clip {
                        self.backdrop.tick(dt_us, clip);
                    }
                }
                self.pressed(&play_again_button(&self.config), input)
                    .then_some(Screen::Playing)
            }
        };

        match next {
            Some(to) => {
                let from = self.screen;
                self.enter(to);
                FlowStep {
                    signal: FlowSignal::Continue,
                    transition: Some((from, to)),
                }
            }
            None => FlowStep::stay(),
        }
    }

    fn pressed(&self, button: &Button, input: &FrameInput) -> bool {
        input.pointer_pressed && button.contains(input.pointer)
    }

    fn tick_us(&self) -> u64 {
        1_000_000 / u64::from(self.config.ticks_per_second.max(1))
    }

    fn tick_playing(&mut self, input: &FrameInput) -> Option<Screen> {
        let world = self.world.as_mut()?;
        let report = world.step(TickInput {
            movement: input.movement,
            attack: input.attack,
        });
        // The player is gone even if the same tick cleared the level.
        if report.player_died() {
            Some(Screen::GameOver)
        } else if report.level_cleared() {
            Some(Screen::Cleared)
        } else {
            None
        }
    }

    fn enter(&mut self, to: Screen) {
        log::info!("Screen {:?} -> {:?}", self.screen, to);
        match to {
            Screen::Playing => {
                self.world = Some(World::new(&self.map, self.config, &mut self.rng));
                self.runs += 1;
            }
            Screen::GameOver => self.backdrop.reset(),
            Screen::Intro | Screen::Cleared => {}
        }
        self.screen = to;
    }

    /// Sprite commands for the current screen, backdrop first.
    pub fn draw_list<'a>(&'a self, clips: &'a ClipRegistry) -> Vec<DrawCommand<'a>> {
        let backdrop = match self.screen {
            Screen::Intro | Screen::Cleared => Some(INTRO_BACKDROP),
            Screen::GameOver => clips
                .resolve_clip(Some(BACKDROP_CLIP_SET), GAME_OVER_CLIP)
                .and_then(|clip| self.backdrop.current(clip)),
            Screen::Playing => None,
        };
        let mut commands: Vec<DrawCommand<'a>> = backdrop
            .map(|sprite| DrawCommand {
                sprite,
                dest: self.screen_rect(),
                layer: BACKDROP_LAYER,
            })
            .into_iter()
            .collect();
        if self.screen == Screen::Playing {
            if let Some(world) = &self.world {
                commands.extend(world.draw_list());
            }
        }
        commands
    }

    fn screen_rect(&self) -> Aabb {
        Aabb::from_top_left(
            Vec2::ZERO,
            Vec2::new(self.config.screen_width as f32, self.config.screen_height as f32),
        )
    }

    /// Text and button faces for the current screen.
    pub fn labels(&self) -> Vec<ScreenLabel> {
        let w = self.config.screen_width as f32;
        let h = self.config.screen_height as f32;
        match self.screen {
            Screen::Intro => vec![
                ScreenLabel::new(
                    TITLE,
                    [(self.config.screen_width / 2) as f32, 50.0],
                    FONT_SIZE,
                    BLACK,
                ),
                play_button(&self.config).label(),
            ],
            Screen::Playing => Vec::new(),
            Screen::GameOver => vec![
                ScreenLabel::new("Game Over", [w / 2.0, (h / 3.0).floor()], FONT_SIZE, WHITE),
                play_again_button(&self.config).label(),
            ],
            Screen::Cleared => vec![
                ScreenLabel::new("Level Cleared", [w / 2.0, (h / 3.0).floor()], FONT_SIZE, WHITE),
                play_again_button(&self.config).label(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Facing;
    use crate::config::DEFAULT_TILE_MAP;
    use crate::entity::{EntityKind, Groups};
    use crate::patrol::PatrolHeading;
    use crate::tilemap::parse_tile_map;
    use hf_core::clip::parse_clip_file;

    fn seeded(config: GameConfig) -> GameConfig {
        GameConfig {
            rng_seed: Some(3),
            ..config
        }
    }

    fn flow_for(rows: &[&str], config: GameConfig) -> Flow {
        Flow::new(parse_tile_map(rows).expect("test map"), seeded(config))
    }

    fn backdrop_clips() -> ClipRegistry {
        let file = parse_clip_file(
            r#"{
              "version": "0.1",
              "clip_set": "backdrops",
              "clips": {
                "roses": {
                  "frames": [
                    { "sprite_id": "roses_0", "duration_ms": 50 },
                    { "sprite_id": "roses_1", "duration_ms": 50 }
                  ],
                  "looping": true
                }
              }
            }"#,
        )
        .expect("clip json");
        let mut clips = ClipRegistry::new();
        clips.insert_file(file);
        clips
    }

    fn click(x: f32, y: f32) -> FrameInput {
        FrameInput {
            pointer: Vec2::new(x, y),
            pointer_pressed: true,
            ..FrameInput::default()
        }
    }

    fn start(flow: &mut Flow, clips: &ClipRegistry) {
        let step = flow.tick(&click(320.0, 250.0), clips);
        assert_eq!(step.transition, Some((Screen::Intro, Screen::Playing)));
    }

    /// Enemy oscillates one step around a spawn touching the player, so the
    /// player dies within three ticks whatever heading it drew.
    fn doomed_config() -> GameConfig {
        GameConfig {
            patrol_min_travel: 1,
            patrol_max_travel: 1,
            ..GameConfig::default()
        }
    }

    fn run_until_game_over(flow: &mut Flow, clips: &ClipRegistry) {
        for _ in 0..3 {
            if flow.tick(&FrameInput::default(), clips).transition
                == Some((Screen::Playing, Screen::GameOver))
            {
                return;
            }
        }
        panic!("player should have died");
    }

    #[test]
    fn quit_wins_on_every_screen() {
        let clips = backdrop_clips();
        let quit = FrameInput {
            quit: true,
            ..click(320.0, 250.0)
        };
        let mut flow = flow_for(&["PE"], doomed_config());

        let step = flow.tick(&quit, &clips);
        assert_eq!(step.signal, FlowSignal::Quit);
        assert_eq!(step.transition, None);
        assert_eq!(flow.screen(), Screen::Intro);

        start(&mut flow, &clips);
        assert_eq!(flow.tick(&quit, &clips).signal, FlowSignal::Quit);
        let tick = flow.world().map(World::tick);
        assert_eq!(tick, Some(0), "quit aborts before the world steps");

        run_until_game_over(&mut flow, &clips);
        assert_eq!(flow.tick(&quit, &clips).signal, FlowSignal::Quit);
        assert_eq!(flow.screen(), Screen::GameOver);
    }

    #[test]
    fn play_button_hit_test_is_strict() {
        let clips = backdrop_clips();
        let mut flow = flow_for(&DEFAULT_TILE_MAP, GameConfig::default());
        let button = play_button(flow.config());
        assert_eq!(
            (button.x, button.y, button.width, button.height),
            (220.0, 220.0, 200.0, 60.0)
        );

        let misses = [
            (220.0, 250.0),
            (420.0, 250.0),
            (300.0, 220.0),
            (300.0, 280.0),
            (10.0, 10.0),
        ];
        for (x, y) in misses {
            assert_eq!(flow.tick(&click(x, y), &clips).transition, None, "({x}, {y})");
        }
        let hover = FrameInput {
            pointer: Vec2::new(300.0, 250.0),
            ..FrameInput::default()
        };
        assert_eq!(flow.tick(&hover, &clips).transition, None);
        assert!(flow.world().is_none());

        start(&mut flow, &clips);
        assert_eq!(flow.runs(), 1);
        assert!(flow.world().is_some());
    }

    #[test]
    fn death_leads_to_game_over_and_play_again_restarts() {
        let clips = backdrop_clips();
        let mut flow = flow_for(&["PE"], doomed_config());
        start(&mut flow, &clips);
        run_until_game_over(&mut flow, &clips);

        let again = play_again_button(flow.config());
        assert_eq!((again.x, again.y, again.width, again.height), (190.0, 240.0, 250.0, 80.0));
        let step = flow.tick(&click(300.0, 280.0), &clips);
        assert_eq!(step.transition, Some((Screen::GameOver, Screen::Playing)));
        assert_eq!(flow.runs(), 2);
        let world = flow.world().expect("fresh world");
        assert_eq!(world.tick(), 0);
        assert!(world.player().is_some());
    }

    #[test]
    fn clearing_the_level_leads_to_cleared() {
        let clips = backdrop_clips();
        let mut flow = flow_for(&["P....", ".....", "E...."], GameConfig::default());
        start(&mut flow, &clips);

        let down = FrameInput {
            movement: Some(Direction::Down),
            ..FrameInput::default()
        };
        assert_eq!(flow.tick(&down, &clips).transition, None);
        let attack = FrameInput {
            attack: true,
            ..FrameInput::default()
        };
        let step = flow.tick(&attack, &clips);
        assert_eq!(step.transition, Some((Screen::Playing, Screen::Cleared)));

        let labels = flow.labels();
        assert_eq!(labels[0].text, "Level Cleared");
        assert_eq!(labels[1].text, "Play Again");
        let commands = flow.draw_list(&clips);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].sprite, INTRO_BACKDROP);
    }

    #[test]
    fn death_beats_clear_on_the_same_tick() {
        let clips = backdrop_clips();
        let config = GameConfig {
            patrol_min_travel: 20,
            patrol_max_travel: 20,
            ..GameConfig::default()
        };
        let mut flow = flow_for(&["PE.."], config);
        start(&mut flow, &clips);

        // Player already faces the enemy; the enemy steps left into it while
        // the fresh attack lands on the enemy's tile.
        let world = flow.world.as_mut().expect("world");
        let player = world.player().map(|p| p.id).expect("player");
        let enemy = world
            .group(Groups::ENEMIES)
            .map(|e| e.id)
            .next()
            .expect("enemy");
        if let Some(p) = world.entity_mut(player) {
            p.facing = Facing::Right;
        }
        if let Some(e) = world.entity_mut(enemy) {
            if let EntityKind::Enemy { patrol, .. } = &mut e.kind {
                patrol.heading = PatrolHeading::Left;
            }
        }

        let attack = FrameInput {
            attack: true,
            ..FrameInput::default()
        };
        let step = flow.tick(&attack, &clips);
        assert_eq!(step.transition, Some((Screen::Playing, Screen::GameOver)));
        let world = flow.world().expect("world");
        assert!(world.player().is_none());
        assert!(world.level_cleared());
        assert_eq!(world.count(Groups::ENEMIES), 0);
    }

    #[test]
    fn reloaded_config_keeps_the_startup_screen_size() {
        let mut flow = flow_for(&DEFAULT_TILE_MAP, GameConfig::default());
        flow.set_config(GameConfig {
            screen_width: 800,
            screen_height: 600,
            player_speed: 4.0,
            ..GameConfig::default()
        });
        assert_eq!(flow.config().player_speed, 4.0);
        assert_eq!(
            (flow.config().screen_width, flow.config().screen_height),
            (640, 480)
        );
        let button = play_button(flow.config());
        assert_eq!((button.x, button.y), (220.0, 220.0));
    }

    #[test]
    fn game_over_backdrop_restarts_on_every_entry() {
        let clips = backdrop_clips();
        let mut flow = flow_for(&["PE"], doomed_config());
        start(&mut flow, &clips);
        run_until_game_over(&mut flow, &clips);
        assert_eq!(&flow.backdrop, &ClipCursor::new());

        for _ in 0..4 {
            flow.tick(&FrameInput::default(), &clips);
        }
        // 4 ticks of 16_666us: past the first 50ms frame.
        assert_eq!(flow.backdrop.frame_index, 1);
        let commands = flow.draw_list(&clips);
        assert_eq!(commands[0].sprite, "roses_1");
        assert_eq!(commands[0].dest.width(), 640.0);

        flow.tick(&click(300.0, 280.0), &clips);
        run_until_game_over(&mut flow, &clips);
        assert_eq!(&flow.backdrop, &ClipCursor::new());
        assert_eq!(flow.draw_list(&clips)[0].sprite, "roses_0");
    }

    #[test]
    fn missing_backdrop_clip_draws_nothing_but_buttons_still_work() {
        let clips = ClipRegistry::new();
        let mut flow = flow_for(&["PE"], doomed_config());
        start(&mut flow, &clips);
        run_until_game_over(&mut flow, &clips);
        assert!(flow.draw_list(&clips).is_empty());
        assert_eq!(
            flow.tick(&click(300.0, 280.0), &clips).transition,
            Some((Screen::GameOver, Screen::Playing))
        );
    }

    #[test]
    fn intro_labels_and_playing_draws_world() {
        let clips = backdrop_clips();
        let mut flow = flow_for(&DEFAULT_TILE_MAP, GameConfig::default());
        let labels = flow.labels();
        assert_eq!(labels[0].text, TITLE);
        assert_eq!(labels[0].center, [320.0, 50.0]);
        assert_eq!(labels[1].text, "Play");
        assert_eq!(
            labels[1].panel.map(|p| p.rect),
            Some([220.0, 220.0, 200.0, 60.0])
        );
        assert_eq!(flow.draw_list(&clips)[0].sprite, INTRO_BACKDROP);

        start(&mut flow, &clips);
        assert!(flow.labels().is_empty());
        let world_count = flow.world().map(|w| w.draw_list().len());
        assert_eq!(Some(flow.draw_list(&clips).len()), world_count);
    }

    #[test]
    fn restarts_draw_fresh_patrols_from_one_seeded_stream() {
        let clips = backdrop_clips();
        let mut a = flow_for(&DEFAULT_TILE_MAP, GameConfig::default());
        let mut b = flow_for(&DEFAULT_TILE_MAP, GameConfig::default());
        start(&mut a, &clips);
        start(&mut b, &clips);
        let patrols = |flow: &Flow| -> Vec<EntityKind> {
            flow.world()
                .map(|w| w.group(Groups::ENEMIES).map(|e| e.kind).collect())
                .unwrap_or_default()
        };
        assert_eq!(patrols(&a), patrols(&b));
    }
}
