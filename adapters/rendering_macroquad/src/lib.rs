#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Grid Invaders.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

mod sprites;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use grid_invaders_rendering::{
    Color, FrameInput, GameOverPresentation, PlayfieldPresentation, Presentation,
    RenderingBackend, RenderingError, Scene, SpriteKey,
};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use self::sprites::SpriteAtlas;

/// Snapshot of keyboard state observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardState {
    /// `Left` or `A` held to steer the ship left.
    move_left: bool,
    /// `Right` or `D` held to steer the ship right.
    move_right: bool,
    /// `Space` or `Up` pressed to fire (and to restart after game over).
    fire_pressed: bool,
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardState {
    fn poll() -> Self {
        let move_left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let move_right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
        let fire_pressed = is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Up);
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);

        Self {
            move_left,
            move_right,
            fire_pressed,
            quit_requested,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

impl FpsCounter {
    /// Records a rendered frame, returning the per-second average once one
    /// second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<(f32, Duration)> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        let render_accum = std::mem::take(&mut self.render_accum);
        if seconds <= f32::EPSILON || frames == 0 {
            return None;
        }
        Some((frames as f32 / seconds, render_accum / frames))
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.playfield.width.round().max(1.0) as i32,
            window_height: scene.playfield.height.round().max(1.0) as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut init_sender = Some(init_sender);
            let mut scene = scene;

            let initial_width = macroquad::window::screen_width();
            let initial_height = macroquad::window::screen_height();
            if !initial_width.is_finite()
                || !initial_height.is_finite()
                || initial_width <= 0.0
                || initial_height <= 0.0
            {
                if let Some(sender) = init_sender.take() {
                    let error = RenderingError::ContextUnavailable {
                        reason: format!(
                            "window reported degenerate dimensions {initial_width}x{initial_height}"
                        ),
                    };
                    let _ = sender.send(Err(anyhow::Error::new(error)));
                }
                return;
            }

            let sprite_atlas = if load_sprites {
                let atlas = SpriteAtlas::from_default_manifest();
                log::debug!("sprite atlas holds {} textures", atlas.texture_count());
                for key in SpriteKey::ALL {
                    if !atlas.contains(key) {
                        log::debug!("sprite {key:?} unavailable, drawing placeholder");
                    }
                }
                Some(atlas)
            } else {
                None
            };

            if let Some(sender) = init_sender.take() {
                let _ = sender.send(Ok(()));
            }

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardState::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    move_left: keyboard.move_left,
                    move_right: keyboard.move_right,
                    fire: keyboard.fire_pressed,
                };

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::new(&scene.playfield, screen_width, screen_height);

                let render_start = Instant::now();
                draw_playfield(&scene.playfield, &metrics);
                draw_particles(&scene, &metrics);
                draw_projectiles(&scene, &metrics);
                draw_enemies(&scene, &metrics, sprite_atlas.as_ref());
                draw_player(&scene, &metrics, sprite_atlas.as_ref());
                draw_hud(&scene, &metrics);
                if let Some(game_over) = scene.game_over {
                    draw_game_over(game_over, &metrics);
                }
                let render_duration = render_start.elapsed();

                if show_fps {
                    if let Some((per_second, avg_render)) =
                        fps_counter.record_frame(frame_dt, render_duration)
                    {
                        println!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                } else {
                    let _ = fps_counter.record_frame(frame_dt, render_duration);
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

/// Maps playfield coordinates onto the current window, preserving aspect ratio.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn new(playfield: &PlayfieldPresentation, screen_width: f32, screen_height: f32) -> Self {
        let scale = if playfield.width <= f32::EPSILON || playfield.height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / playfield.width).min(screen_height / playfield.height)
        };
        let offset_x = (screen_width - playfield.width * scale) * 0.5;
        let offset_y = (screen_height - playfield.height * scale) * 0.5;

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, position: Vec2) -> (f32, f32) {
        (
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }

    fn length(&self, world_length: f32) -> f32 {
        world_length * self.scale
    }
}

fn draw_playfield(playfield: &PlayfieldPresentation, metrics: &SceneMetrics) {
    let (x, y) = metrics.to_screen(Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        x,
        y,
        metrics.length(playfield.width),
        metrics.length(playfield.height),
        to_macroquad_color(playfield.background),
    );
}

fn draw_player(scene: &Scene, metrics: &SceneMetrics, atlas: Option<&SpriteAtlas>) {
    let player = scene.player;
    draw_sprite_or_placeholder(
        atlas,
        SpriteKey::PlayerShip,
        metrics.to_screen(player.position),
        (metrics.length(player.size.x), metrics.length(player.size.y)),
    );
}

fn draw_enemies(scene: &Scene, metrics: &SceneMetrics, atlas: Option<&SpriteAtlas>) {
    for enemy in &scene.enemies {
        draw_sprite_or_placeholder(
            atlas,
            enemy.sprite,
            metrics.to_screen(enemy.position),
            (metrics.length(enemy.size.x), metrics.length(enemy.size.y)),
        );
    }
}

fn draw_projectiles(scene: &Scene, metrics: &SceneMetrics) {
    for projectile in &scene.projectiles {
        let (x, y) = metrics.to_screen(projectile.position);
        macroquad::shapes::draw_rectangle(
            x,
            y,
            metrics.length(projectile.size.x),
            metrics.length(projectile.size.y),
            to_macroquad_color(projectile.color),
        );
    }
}

fn draw_particles(scene: &Scene, metrics: &SceneMetrics) {
    for particle in &scene.particles {
        let (x, y) = metrics.to_screen(particle.position);
        let faded = particle.color.with_alpha(particle.life);
        macroquad::shapes::draw_circle(
            x,
            y,
            metrics.length(particle.radius),
            to_macroquad_color(faded),
        );
    }
}

const HUD_TEXT_COLOR: Color = Color::from_rgb_u8(0xe8, 0xea, 0xf6);
const HUD_MARGIN: f32 = 12.0;
const HUD_FONT_SIZE: f32 = 22.0;

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let hud = scene.hud;
    let text = format!(
        "SCORE {:05}  HI {:05}  LEVEL {}  LIVES {}",
        hud.score, hud.high_score, hud.level, hud.lives,
    );
    let font_size = (HUD_FONT_SIZE * metrics.scale).max(12.0);
    let (x, y) = metrics.to_screen(Vec2::ZERO);
    macroquad::text::draw_text(
        &text,
        x + HUD_MARGIN,
        y + HUD_MARGIN + font_size,
        font_size,
        to_macroquad_color(HUD_TEXT_COLOR),
    );
}

const GAME_OVER_DIM: Color = Color::new(0.0, 0.0, 0.0, 0.6);
const GAME_OVER_FONT_SIZE: f32 = 48.0;
const GAME_OVER_LINE_GAP: f32 = 18.0;

fn draw_game_over(game_over: GameOverPresentation, metrics: &SceneMetrics) {
    let screen_width = macroquad::window::screen_width();
    let screen_height = macroquad::window::screen_height();
    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        screen_width,
        screen_height,
        to_macroquad_color(GAME_OVER_DIM),
    );

    let title_size = (GAME_OVER_FONT_SIZE * metrics.scale).max(24.0);
    let detail_size = (HUD_FONT_SIZE * metrics.scale).max(12.0);
    let center_x = screen_width * 0.5;
    let mut baseline = screen_height * 0.5 - GAME_OVER_LINE_GAP;

    draw_centered_text("GAME OVER", center_x, baseline, title_size);
    baseline += title_size + GAME_OVER_LINE_GAP;
    let final_score = format!("final score {}", game_over.final_score);
    draw_centered_text(&final_score, center_x, baseline, detail_size);
    baseline += detail_size + GAME_OVER_LINE_GAP;
    draw_centered_text(
        GameOverPresentation::RESTART_PROMPT,
        center_x,
        baseline,
        detail_size,
    );
}

fn draw_centered_text(text: &str, center_x: f32, baseline: f32, font_size: f32) {
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    macroquad::text::draw_text(
        text,
        center_x - dimensions.width * 0.5,
        baseline,
        font_size,
        to_macroquad_color(HUD_TEXT_COLOR),
    );
}

fn draw_sprite_or_placeholder(
    atlas: Option<&SpriteAtlas>,
    key: SpriteKey,
    position: (f32, f32),
    size: (f32, f32),
) {
    let (x, y) = position;
    let (width, height) = size;
    if let Some(texture) = atlas.and_then(|atlas| atlas.texture(key)) {
        macroquad::texture::draw_texture_ex(
            texture,
            x,
            y,
            macroquad::color::WHITE,
            macroquad::texture::DrawTextureParams {
                dest_size: Some(macroquad::math::Vec2::new(width, height)),
                ..macroquad::texture::DrawTextureParams::default()
            },
        );
    } else {
        macroquad::shapes::draw_rectangle(
            x,
            y,
            width,
            height,
            to_macroquad_color(key.placeholder_color()),
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
