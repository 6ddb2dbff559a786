#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Grid Invaders adapters.
//!
//! Backends receive a declarative [`Scene`] each frame, gather an input
//! snapshot for the simulation, and draw without mutating game state.

use anyhow::Result as AnyResult;
use glam::Vec2;
use grid_invaders_core::{EnemyId, EnemySprite};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the move-left key is held this frame.
    pub move_left: bool,
    /// Whether the move-right key is held this frame.
    pub move_right: bool,
    /// Whether the fire key was pressed this frame.
    pub fire: bool,
}

/// Named sprite resources a backend may load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// The player ship sprite.
    PlayerShip,
    /// First enemy row variant.
    EnemyAlpha,
    /// Second enemy row variant.
    EnemyBeta,
    /// Third enemy row variant.
    EnemyGamma,
    /// Fourth enemy row variant.
    EnemyDelta,
}

impl SpriteKey {
    /// Every sprite key a backend may attempt to load.
    pub const ALL: [Self; 5] = [
        Self::PlayerShip,
        Self::EnemyAlpha,
        Self::EnemyBeta,
        Self::EnemyGamma,
        Self::EnemyDelta,
    ];

    /// Maps an enemy sprite variant to its backend resource key.
    #[must_use]
    pub const fn for_enemy(sprite: EnemySprite) -> Self {
        match sprite {
            EnemySprite::Alpha => Self::EnemyAlpha,
            EnemySprite::Beta => Self::EnemyBeta,
            EnemySprite::Gamma => Self::EnemyGamma,
            EnemySprite::Delta => Self::EnemyDelta,
        }
    }

    /// Solid color substituted when the sprite asset is unavailable.
    #[must_use]
    pub const fn placeholder_color(self) -> Color {
        match self {
            Self::PlayerShip => Color::from_rgb_u8(0x4d, 0xd0, 0xe1),
            Self::EnemyAlpha => Color::from_rgb_u8(0xc8, 0x2a, 0x36),
            Self::EnemyBeta => Color::from_rgb_u8(0xff, 0xc1, 0x07),
            Self::EnemyGamma => Color::from_rgb_u8(0x2f, 0x95, 0x32),
            Self::EnemyDelta => Color::from_rgb_u8(0x58, 0x47, 0xff),
        }
    }
}

/// Describes the playfield rectangle that frames all entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayfieldPresentation {
    /// Width of the playfield in world units.
    pub width: f32,
    /// Height of the playfield in world units.
    pub height: f32,
    /// Fill color drawn behind all entities.
    pub background: Color,
}

impl PlayfieldPresentation {
    /// Creates a new playfield descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
        }
    }
}

/// Player ship rendered as a sprite or placeholder rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePlayer {
    /// Top-left corner of the ship in playfield units.
    pub position: Vec2,
    /// Size of the ship in playfield units.
    pub size: Vec2,
}

impl ScenePlayer {
    /// Creates a new player descriptor.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }
}

/// Enemy rendered as a sprite or placeholder rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Identifier assigned by the session.
    pub id: EnemyId,
    /// Top-left corner of the enemy in playfield units.
    pub position: Vec2,
    /// Size of the enemy in playfield units.
    pub size: Vec2,
    /// Sprite resource used to draw the enemy.
    pub sprite: SpriteKey,
}

impl SceneEnemy {
    /// Creates a new enemy descriptor.
    #[must_use]
    pub const fn new(id: EnemyId, position: Vec2, size: Vec2, sprite: SpriteKey) -> Self {
        Self {
            id,
            position,
            size,
            sprite,
        }
    }
}

/// Projectile rendered as a filled rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Top-left corner of the projectile in playfield units.
    pub position: Vec2,
    /// Size of the projectile in playfield units.
    pub size: Vec2,
    /// Fill color of the projectile.
    pub color: Color,
}

impl SceneProjectile {
    /// Creates a new projectile descriptor.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            position,
            size,
            color,
        }
    }
}

/// Cosmetic particle rendered as a fading circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParticle {
    /// Center of the particle in playfield units.
    pub position: Vec2,
    /// Radius of the particle in playfield units.
    pub radius: f32,
    /// Remaining life in `0.0..=1.0`, used as the fade alpha.
    pub life: f32,
    /// Base color of the particle.
    pub color: Color,
}

impl SceneParticle {
    /// Creates a new particle descriptor.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32, life: f32, color: Color) -> Self {
        Self {
            position,
            radius,
            life,
            color,
        }
    }
}

/// Score and progression counters displayed outside the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Current session score.
    pub score: u32,
    /// Best score ever observed.
    pub high_score: u32,
    /// Current level, starting at one.
    pub level: u32,
    /// Lives remaining.
    pub lives: u32,
}

/// Overlay shown when the session has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverPresentation {
    /// Score held when the session ended.
    pub final_score: u32,
}

impl GameOverPresentation {
    /// Prompt displayed beneath the final score.
    pub const RESTART_PROMPT: &'static str = "press fire to restart";
}

/// Scene description combining the playfield and all inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Playfield that frames the entities.
    pub playfield: PlayfieldPresentation,
    /// Player ship.
    pub player: ScenePlayer,
    /// Enemies currently alive.
    pub enemies: Vec<SceneEnemy>,
    /// Projectiles currently in flight.
    pub projectiles: Vec<SceneProjectile>,
    /// Cosmetic particles currently fading out.
    pub particles: Vec<SceneParticle>,
    /// Score counters rendered as the HUD.
    pub hud: HudPresentation,
    /// Present when the session ended; drawn as a dimming overlay.
    pub game_over: Option<GameOverPresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        playfield: PlayfieldPresentation,
        player: ScenePlayer,
        enemies: Vec<SceneEnemy>,
        projectiles: Vec<SceneProjectile>,
        particles: Vec<SceneParticle>,
        hud: HudPresentation,
        game_over: Option<GameOverPresentation>,
    ) -> Self {
        Self {
            playfield,
            player,
            enemies,
            projectiles,
            particles,
            hud,
            game_over,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Grid Invaders scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered. Drawing never feeds back into game state.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when a backend initialises.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// No usable rendering context could be created at startup.
    ContextUnavailable {
        /// Backend-specific description of the failure.
        reason: String,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextUnavailable { reason } => {
                write!(f, "rendering context unavailable: {reason}")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_invaders_core::EnemySprite;

    #[test]
    fn color_from_bytes_normalises_channels() {
        let color = Color::from_rgb_u8(255, 0, 51);

        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        assert!((color.blue - 0.2).abs() < 1e-6);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn with_alpha_clamps_to_unit_range() {
        let color = Color::from_rgb_u8(10, 20, 30).with_alpha(1.5);
        assert_eq!(color.alpha, 1.0);

        let transparent = color.with_alpha(-0.5);
        assert_eq!(transparent.alpha, 0.0);
    }

    #[test]
    fn every_enemy_variant_maps_to_a_distinct_key() {
        let keys = [
            SpriteKey::for_enemy(EnemySprite::Alpha),
            SpriteKey::for_enemy(EnemySprite::Beta),
            SpriteKey::for_enemy(EnemySprite::Gamma),
            SpriteKey::for_enemy(EnemySprite::Delta),
        ];

        for (index, key) in keys.iter().enumerate() {
            assert_ne!(*key, SpriteKey::PlayerShip);
            for other in &keys[index + 1..] {
                assert_ne!(key, other);
            }
        }
    }

    #[test]
    fn scene_new_preserves_all_channels() {
        let playfield = PlayfieldPresentation::new(800.0, 600.0, Color::from_rgb_u8(8, 8, 16));
        let player = ScenePlayer::new(Vec2::new(376.0, 560.0), Vec2::new(48.0, 24.0));
        let enemy = SceneEnemy::new(
            EnemyId::new(3),
            Vec2::new(60.0, 60.0),
            Vec2::new(40.0, 28.0),
            SpriteKey::EnemyAlpha,
        );
        let hud = HudPresentation {
            score: 100,
            high_score: 900,
            level: 2,
            lives: 3,
        };

        let scene = Scene::new(
            playfield,
            player,
            vec![enemy],
            Vec::new(),
            Vec::new(),
            hud,
            Some(GameOverPresentation { final_score: 100 }),
        );

        assert_eq!(scene.playfield, playfield);
        assert_eq!(scene.player, player);
        assert_eq!(scene.enemies, vec![enemy]);
        assert!(scene.projectiles.is_empty());
        assert!(scene.particles.is_empty());
        assert_eq!(scene.hud, hud);
        assert_eq!(
            scene.game_over,
            Some(GameOverPresentation { final_score: 100 })
        );
    }

    #[test]
    fn rendering_error_is_displayable() {
        let error = RenderingError::ContextUnavailable {
            reason: "no display".to_owned(),
        };

        assert_eq!(
            error.to_string(),
            "rendering context unavailable: no display"
        );
    }
}
