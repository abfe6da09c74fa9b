//! Heartfield: a single-screen tile game.
//!
//! A fixed 60 Hz simulation (`flow` + `world`) runs inside a `winit`
//! application. Each rendered frame drains whole fixed steps from the
//! accumulator, then rebuilds one batched sprite mesh from the flow's draw
//! list and paints screen labels plus the optional debug overlay with egui.

mod animation;
mod atlas;
mod audio;
mod clips;
mod collision;
mod config;
mod entity;
mod flow;
mod mesh;
mod patrol;
#[cfg(test)]
mod replay;
mod tilemap;
mod watch;
mod world;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use animation::Direction;
use atlas::{load_atlas_from_path, MultiAtlasRegistry};
use audio::AudioContext;
use clips::ClipRegistry;
use config::{load_config, GameConfig, DEFAULT_TILE_MAP};
use entity::Groups;
use flow::{Flow, FlowSignal, FrameInput, Screen};
use hf_core::input::{InputState, Key, MouseBtn};
use hf_core::time::TimeState;
use hf_devtools::{DebugOverlay, LabelTransform, OverlayStats};
use hf_platform::window::PlatformConfig;
use hf_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};
use mesh::{build_mesh, count_texture_binds, DrawCall, DEBUG_WHITE_TEXTURE};
use tilemap::{load_tile_map_file, parse_tile_map, TileMap};
use watch::{AssetKind, AssetWatcher};

const CONFIG_PATH: &str = "assets/config/game.json";
const MAP_PATH: &str = "assets/maps/level.txt";
const ATLAS_PATHS: [&str; 2] = [
    "assets/generated/sprites.json",
    "assets/generated/backdrops.json",
];
const CLIP_PATH: &str = "assets/clips/backdrops.json";
const MUSIC_PATH: &str = "assets/audio/song.mp3";

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything that must be valid before a window is opened. A bad config or
/// map stops the game here.
struct Boot {
    config: GameConfig,
    map: TileMap,
}

impl Boot {
    fn load() -> Result<Self, String> {
        let mut config = load_config(Path::new(CONFIG_PATH))?;
        let seed = *config.rng_seed.get_or_insert_with(rand::random);
        log::info!("RNG seed: {seed}");

        let map_path = Path::new(MAP_PATH);
        let map = if map_path.exists() {
            load_tile_map_file(map_path)
        } else {
            parse_tile_map(&DEFAULT_TILE_MAP)
        }
        .map_err(|e| format!("Level map rejected: {e}"))?;
        if let Some(spawn) = map.player_spawn() {
            log::info!(
                "Level: {}x{} tiles, player at row {} col {}",
                map.cols,
                map.rows,
                spawn.row,
                spawn.col
            );
        }

        Ok(Self { config, map })
    }
}

/// All mutable game state. Built in `ApplicationHandler::resumed` once the
/// window exists.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    debug_overlay: DebugOverlay,
    audio: AudioContext,

    flow: Flow,
    rng_seed: u64,
    paused: bool,
    single_step_requested: bool,
    show_hitboxes: bool,

    // Hot-reloadable content
    watcher: AssetWatcher,
    atlases: MultiAtlasRegistry,
    clips: ClipRegistry,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    warned_sprites: HashSet<String>,

    // Per-frame mesh. Buffers grow to the next power of two and never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    sprite_count: usize,
    mesh_dirty: bool,
}

impl EngineState {
    fn new(window: Arc<Window>, boot: Boot) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let time = TimeState::with_tick_rate(boot.config.ticks_per_second);
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);
        let camera = Camera2D::new(boot.config.screen_width, boot.config.screen_height);

        let mut watcher = AssetWatcher::new();
        let mut atlases = MultiAtlasRegistry::new();
        for path in ATLAS_PATHS {
            watcher.watch(path, AssetKind::Atlas);
            if !Path::new(path).exists() {
                log::warn!("Atlas metadata '{path}' not found. Its sprites will not draw.");
                continue;
            }
            let loaded = load_atlas_from_path(Path::new(path)).and_then(|atlas| {
                let sprites = atlas.len();
                atlases.add_atlas(path, atlas).map(|()| sprites)
            });
            match loaded {
                Ok(sprites) => log::info!("Loaded atlas '{path}' ({sprites} sprites)"),
                Err(err) => log::error!("Failed to load atlas '{path}': {err}"),
            }
        }

        log::info!(
            "{} atlases, {} sprites",
            atlases.atlas_count(),
            atlases.sprite_count()
        );

        let mut clips = ClipRegistry::new();
        watcher.watch(CLIP_PATH, AssetKind::Clips);
        match clips.load_file(Path::new(CLIP_PATH)) {
            Ok(set) => log::info!("Loaded clip set '{set}' ({} clips total)", clips.clip_count()),
            Err(err) => log::warn!("No backdrop clips: {err}"),
        }
        if let Err(err) = clips.validate_sprites(&atlases) {
            log::warn!("{err}");
        }
        watcher.watch(CONFIG_PATH, AssetKind::Config);
        log::info!("Watching {} asset files for changes", watcher.len());

        let mut audio = AudioContext::new();
        audio.load_music(Path::new(MUSIC_PATH));
        audio.play_music();

        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let rng_seed = boot.config.rng_seed.unwrap_or_default();
        let mut state = Self {
            window,
            gpu,
            time,
            input: InputState::new(),
            camera,
            sprite_pipeline,
            debug_overlay,
            audio,
            flow: Flow::new(boot.map, boot.config),
            rng_seed,
            paused: false,
            single_step_requested: false,
            show_hitboxes: false,
            watcher,
            atlases,
            clips,
            textures: HashMap::new(),
            warned_sprites: HashSet::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            sprite_count: 0,
            mesh_dirty: true,
        };

        // Textures must exist before the first mesh references them.
        state.ensure_textures();
        state.ensure_mesh_capacity(4, 6);
        state.rebuild_mesh();
        Ok(state)
    }

    /// Applies file changes seen since the last frame. Failed reloads keep
    /// the previous content.
    fn apply_reloads(&mut self) {
        for (kind, path) in self.watcher.poll() {
            let label = path.display().to_string();
            match kind {
                AssetKind::Atlas => match load_atlas_from_path(&path) {
                    Ok(atlas) => {
                        if let Err(err) = self.atlases.replace_atlas(&label, atlas) {
                            log::error!("Atlas reload rejected for '{label}': {err}");
                            continue;
                        }
                        // Drop every uploaded texture so repacked PNGs are read again.
                        self.textures.clear();
                        self.warned_sprites.clear();
                        self.ensure_textures();
                        log::info!("Reloaded atlas '{label}'");
                    }
                    Err(err) => log::error!("Atlas reload failed, keeping previous: {err}"),
                },
                AssetKind::Clips => match self.clips.load_file(&path) {
                    Ok(set) => {
                        log::info!("Reloaded clip set '{set}'");
                        if let Err(err) = self.clips.validate_sprites(&self.atlases) {
                            log::warn!("{err}");
                        }
                    }
                    Err(err) => log::error!("Clip reload failed, keeping previous: {err}"),
                },
                AssetKind::Config => match load_config(&path) {
                    Ok(mut config) => {
                        config.rng_seed = Some(self.rng_seed);
                        self.flow.set_config(config);
                        log::info!("Reloaded config '{label}'; applies from the next run");
                    }
                    Err(err) => log::error!("Config reload failed, keeping previous: {err}"),
                },
            }
            self.mesh_dirty = true;
        }
    }

    fn ensure_textures(&mut self) {
        for texture_path in self.atlases.texture_paths() {
            if self.textures.contains_key(texture_path.as_str()) {
                continue;
            }
            let texture = load_texture_asset(
                &self.gpu.device,
                &self.gpu.queue,
                &self.sprite_pipeline,
                &texture_path,
            );
            self.textures.insert(Arc::from(texture_path), texture);
        }

        if !self.textures.contains_key(DEBUG_WHITE_TEXTURE) {
            let texture = Texture::from_rgba8(
                &self.gpu.device,
                &self.gpu.queue,
                &[255, 255, 255, 255],
                1,
                1,
                "debug_white",
            );
            let bind_group = self
                .sprite_pipeline
                .create_texture_bind_group(&self.gpu.device, &texture);
            self.textures.insert(
                Arc::from(DEBUG_WHITE_TEXTURE),
                GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            );
        }
    }

    /// Snapshot for one fixed step. Attack and pointer press are consumed so
    /// only the first step of a frame sees them.
    fn frame_input(&mut self) -> FrameInput {
        FrameInput {
            movement: movement_intent(&self.input),
            attack: self.input.consume_just_pressed(Key::Space),
            pointer: self
                .camera
                .surface_to_playfield(self.input.cursor, self.gpu.size),
            pointer_pressed: self.input.consume_mouse_just_pressed(MouseBtn::Left),
            quit: quit_requested(&self.input),
        }
    }

    fn handle_dev_keys(&mut self) {
        if self.input.consume_just_pressed(Key::F3) {
            self.debug_overlay.toggle();
        }
        if self.input.consume_just_pressed(Key::F4) {
            self.toggle_hitboxes();
        }
        if self.input.consume_just_pressed(Key::P) {
            self.toggle_pause();
        }
        if self.input.consume_just_pressed(Key::N) && self.paused {
            self.single_step_requested = true;
        }
    }

    fn toggle_hitboxes(&mut self) {
        self.show_hitboxes = !self.show_hitboxes;
        self.mesh_dirty = true;
        log::info!("Hitboxes: {}", if self.show_hitboxes { "ON" } else { "OFF" });
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!(
            "Simulation {}",
            if self.paused { "PAUSED" } else { "RESUMED" }
        );
    }

    fn overlay_stats(&self) -> OverlayStats {
        let world = self.flow.world();
        OverlayStats {
            screen: format!("{:?}", self.flow.screen()),
            world_tick: world.map_or(0, |w| w.tick()),
            enemies: world.map_or(0, |w| w.count(Groups::ENEMIES)),
            attacks: world.map_or(0, |w| w.count(Groups::ATTACKS)),
            player_position: world.and_then(|w| w.player()).map(|p| (p.pos.x, p.pos.y)),
            level_cleared: world.is_some_and(|w| w.level_cleared()),
            rng_seed: self.rng_seed,
            draw_calls: self.draw_calls.len() as u32,
            texture_binds: count_texture_binds(&self.draw_calls) as u32,
            sprite_count: self.sprite_count as u32,
            memory_estimate_mb: self.estimate_memory_mb(),
            show_hitboxes: self.show_hitboxes,
            paused: self.paused,
        }
    }

    fn estimate_memory_mb(&self) -> f32 {
        let mut bytes: usize = self
            .textures
            .values()
            .map(|t| t.texture.byte_size())
            .sum();
        bytes += self.mesh_vertex_capacity * std::mem::size_of::<SpriteVertex>();
        bytes += self.mesh_index_capacity * std::mem::size_of::<u32>();
        bytes as f32 / (1024.0 * 1024.0)
    }

    fn rebuild_mesh(&mut self) {
        let commands = self.flow.draw_list(&self.clips);
        let mesh = build_mesh(&commands, &self.atlases, self.show_hitboxes);
        for sprite_id in &mesh.unresolved {
            if self.warned_sprites.insert(sprite_id.clone()) {
                log::warn!("Sprite '{sprite_id}' is in no loaded atlas; not drawing it");
            }
        }

        self.ensure_mesh_capacity(mesh.vertices.len(), mesh.indices.len());
        self.sprite_count = mesh.quad_count();
        if !mesh.vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
        }
        if !mesh.indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }
        self.draw_calls = mesh.draw_calls;
        self.mesh_dirty = false;
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    /// Runs the fixed steps owed for this frame. Returns false when the game
    /// should quit; nothing is rendered in that case.
    fn simulate(&mut self) -> bool {
        self.time.begin_frame();
        self.apply_reloads();

        while self.time.should_step() {
            self.handle_dev_keys();

            let quit = quit_requested(&self.input);
            if self.paused && !self.single_step_requested && !quit {
                break;
            }
            self.single_step_requested = false;

            let frame_input = self.frame_input();
            let step = self.flow.tick(&frame_input, &self.clips);
            if let Some((_, Screen::Playing)) = step.transition {
                log::info!("Run {} started", self.flow.runs());
            }
            if step.signal == FlowSignal::Quit {
                self.audio.stop_music();
                return false;
            }
        }
        true
    }

    fn render(&mut self) {
        if self.mesh_dirty || self.time.steps_this_frame > 0 {
            self.rebuild_mesh();
        }

        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let pixels_per_point = self.window.scale_factor() as f32;
        let transform = LabelTransform::new(self.camera.viewport, self.gpu.size, pixels_per_point);
        let labels = self.flow.labels();
        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) = self
            .debug_overlay
            .prepare(&self.window, &self.time, &stats, &labels, transform);

        if overlay_actions.toggle_pause {
            self.toggle_pause();
        }
        if overlay_actions.single_step {
            self.single_step_requested = true;
        }
        if overlay_actions.toggle_hitboxes {
            self.toggle_hitboxes();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut last_bound_texture_key: Option<&Arc<str>> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Playfield Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.draw_calls {
                let Some(texture) = self.textures.get(&draw.texture_key) else {
                    continue;
                };
                let need_rebind = match last_bound_texture_key {
                    Some(last) => *last != draw.texture_key,
                    None => true,
                };
                if need_rebind {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound_texture_key = Some(&draw.texture_key);
                }
                render_pass.draw_indexed(
                    draw.index_start..(draw.index_start + draw.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    boot: Option<Boot>,
    state: Option<EngineState>,
}

impl App {
    fn new(boot: Boot) -> Self {
        Self {
            boot: Some(boot),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(boot) = self.boot.take() else {
            return;
        };
        let platform = PlatformConfig {
            width: boot.config.screen_width,
            height: boot.config.screen_height,
            ..PlatformConfig::default()
        };
        let started = hf_platform::window::create_window(event_loop, &platform).and_then(|window| {
            log::info!("Window created: {}x{}", platform.width, platform.height);
            EngineState::new(window, boot)
        });
        match started {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Startup failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                state.audio.stop_music();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.clear(),

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_mouse_button(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.cursor = Vec2::new(position.x as f32, position.y as f32);
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                if !state.simulate() {
                    log::info!("Quit, exiting.");
                    event_loop.exit();
                    return;
                }
                state.render();

                // Edges are cleared only after a fixed step has seen them, so a
                // press landing on a zero-step frame is not lost.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Missing or undecodable textures become the placeholder checkerboard so
/// the sprites using them stay visible.
fn load_texture_asset(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &SpritePipeline,
    asset_path: &str,
) -> GpuSpriteTexture {
    let texture = std::fs::read(asset_path)
        .map_err(|e| format!("Failed to read texture '{asset_path}': {e}"))
        .and_then(|bytes| Texture::from_bytes(device, queue, &bytes, asset_path))
        .unwrap_or_else(|err| {
            log::warn!("{err}. Using placeholder.");
            Texture::placeholder(device, queue, asset_path)
        });
    let bind_group = pipeline.create_texture_bind_group(device, &texture);
    GpuSpriteTexture {
        texture,
        bind_group,
    }
}

/// First held arrow key in the order Left, Right, Up, Down.
fn movement_intent(input: &InputState) -> Option<Direction> {
    [
        (Key::Left, Direction::Left),
        (Key::Right, Direction::Right),
        (Key::Up, Direction::Up),
        (Key::Down, Direction::Down),
    ]
    .into_iter()
    .find(|(key, _)| input.is_held(*key))
    .map(|(_, direction)| direction)
}

fn quit_requested(input: &InputState) -> bool {
    input.is_held(Key::Escape) || input.is_just_pressed(Key::Escape)
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyN => Some(Key::N),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Heartfield starting...");

    let boot = match Boot::load() {
        Ok(boot) => boot,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(boot);
    event_loop.run_app(&mut app).expect("Event loop error");
}
