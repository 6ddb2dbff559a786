#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Invaders engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title presented by windowed adapters.
pub const WINDOW_TITLE: &str = "Grid Invaders";

/// Describes whether a session is still simulating or has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// The session is live and `Tick` commands advance the simulation.
    Running,
    /// The session ended; state is frozen until a restart is requested.
    GameOver,
}

/// Horizontal movement directions available to the player ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing x coordinates.
    Left,
    /// Movement toward increasing x coordinates.
    Right,
}

/// Shared horizontal travel direction of the enemy formation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarchDirection {
    /// The formation marches toward decreasing x coordinates.
    Left,
    /// The formation marches toward increasing x coordinates.
    Right,
}

impl MarchDirection {
    /// Sign applied to horizontal displacement for this direction.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Returns the opposite march direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Unique identifier assigned to a projectile within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual variant assigned to an enemy, cycled per formation row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemySprite {
    /// First row variant.
    Alpha,
    /// Second row variant.
    Beta,
    /// Third row variant.
    Gamma,
    /// Fourth row variant.
    Delta,
}

impl EnemySprite {
    const CYCLE: [Self; 4] = [Self::Alpha, Self::Beta, Self::Gamma, Self::Delta];

    /// Selects the sprite variant used by the provided formation row.
    ///
    /// Row zero is the top of the formation; formations taller than the
    /// variant count repeat the cycle.
    #[must_use]
    pub const fn for_row(row: u32) -> Self {
        Self::CYCLE[(row % Self::CYCLE.len() as u32) as usize]
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from a top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// X coordinate one past the right edge.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Y coordinate one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal center of the rectangle.
    #[must_use]
    pub const fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center of the rectangle.
    #[must_use]
    pub const fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Reports whether two rectangles overlap on both axes simultaneously.
    ///
    /// Edges that merely touch do not count as an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the session configuration and restarts from initial state.
    ConfigureSession {
        /// Validated engine parameters for the new session.
        config: SessionConfig,
        /// Best score previously persisted by the host.
        high_score: u32,
    },
    /// Requests one frame of horizontal player movement.
    MovePlayer {
        /// Direction of the requested movement.
        direction: Direction,
    },
    /// Requests a projectile launch, subject to the fire cooldown.
    FireProjectile,
    /// Restarts a finished session with a fresh score and formation.
    Restart,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player ship moved to a new horizontal position.
    PlayerMoved {
        /// X coordinate of the player's top-left corner after the move.
        x: f32,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the new projectile.
        projectile: ProjectileId,
        /// X coordinate of the projectile's top-left corner at launch.
        x: f32,
        /// Y coordinate of the projectile's top-left corner at launch.
        y: f32,
    },
    /// Reports that a projectile left the top of the playfield unused.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
    /// Reports that a projectile destroyed an enemy.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Point value awarded for the destruction.
        points: u32,
        /// X coordinate of the destroyed enemy's center.
        center_x: f32,
        /// Y coordinate of the destroyed enemy's center.
        center_y: f32,
    },
    /// Announces the session score after a scoring event.
    ScoreChanged {
        /// Current session score.
        score: u32,
    },
    /// Announces that the best score ever observed increased.
    HighScoreChanged {
        /// New best score that hosts should persist.
        value: u32,
    },
    /// Reports that the formation touched a playfield edge and reacted.
    FormationShifted {
        /// March direction adopted by every enemy after the reversal.
        direction: MarchDirection,
    },
    /// Reports that every enemy in the formation was destroyed.
    FormationCleared {
        /// Level that was just cleared.
        level: u32,
    },
    /// Announces that a fresh formation entered the playfield.
    FormationSpawned {
        /// Level the formation belongs to.
        level: u32,
        /// Number of enemies composing the formation.
        enemy_count: u32,
    },
    /// Reports that an enemy breached the player's row.
    LifeLost {
        /// Lives remaining after the breach.
        remaining: u32,
    },
    /// Announces that the session ended.
    GameOver {
        /// Score held when the session ended.
        final_score: u32,
    },
}

/// Errors surfaced when validating a [`SessionConfig`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The playfield must have positive area.
    #[error("playfield dimensions must be positive (received {width}x{height})")]
    InvalidPlayfield {
        /// Provided playfield width.
        width: f32,
        /// Provided playfield height.
        height: f32,
    },
    /// The player ship must fit inside the playfield.
    #[error("player of width {player_width} does not fit a playfield of width {playfield_width}")]
    PlayerTooWide {
        /// Provided player width.
        player_width: f32,
        /// Provided playfield width.
        playfield_width: f32,
    },
    /// Formations require at least one row and one column.
    #[error("formation requires at least one row and one column (received {rows}x{columns})")]
    EmptyFormation {
        /// Provided row count.
        rows: u32,
        /// Provided column count.
        columns: u32,
    },
    /// Every formation row needs an associated point value.
    #[error("row_points lists {provided} entries for {rows} formation rows")]
    RowPointsMismatch {
        /// Number of point entries provided.
        provided: usize,
        /// Number of formation rows configured.
        rows: u32,
    },
    /// The formation must leave horizontal room to march.
    #[error("formation of width {formation_width} cannot march in a playfield of width {playfield_width}")]
    FormationTooWide {
        /// Total width spanned by the formation at spawn.
        formation_width: f32,
        /// Provided playfield width.
        playfield_width: f32,
    },
    /// Speeds must be positive for entities to move.
    #[error("{quantity} must be positive")]
    NonPositiveSpeed {
        /// Name of the offending speed parameter.
        quantity: &'static str,
    },
    /// A session needs at least one life to be playable.
    #[error("lives must be at least 1")]
    NoLives,
}

/// Layout and pacing of the enemy formation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationConfig {
    /// Number of enemy rows spawned per formation.
    pub rows: u32,
    /// Number of enemy columns spawned per formation.
    pub columns: u32,
    /// Width of a single enemy in playfield units.
    pub enemy_width: f32,
    /// Height of a single enemy in playfield units.
    pub enemy_height: f32,
    /// Horizontal gap between adjacent enemies.
    pub horizontal_gap: f32,
    /// Vertical gap between adjacent enemy rows.
    pub vertical_gap: f32,
    /// X coordinate of the formation's top-left enemy at spawn.
    pub origin_x: f32,
    /// Y coordinate of the formation's top-left enemy at spawn.
    pub origin_y: f32,
    /// Point value awarded per row, listed from the top row down.
    pub row_points: Vec<u32>,
    /// Horizontal march speed at level one, in units per second.
    pub base_speed: f32,
    /// Fractional speed increase applied per level beyond the first.
    pub level_speed_step: f32,
    /// Vertical distance the formation drops when it touches an edge.
    pub drop_distance: f32,
}

impl FormationConfig {
    /// Point value awarded for destroying an enemy in the provided row.
    ///
    /// Row zero is the top of the formation. Rows beyond the configured
    /// list award nothing; validation rules this out for live sessions.
    #[must_use]
    pub fn points_for_row(&self, row: u32) -> u32 {
        self.row_points.get(row as usize).copied().unwrap_or(0)
    }

    /// Horizontal span covered by the formation at spawn.
    #[must_use]
    pub fn width(&self) -> f32 {
        if self.columns == 0 {
            return 0.0;
        }
        self.columns as f32 * self.enemy_width + (self.columns - 1) as f32 * self.horizontal_gap
    }

    /// March speed multiplier applied at the provided level.
    ///
    /// Level one marches at the base speed; each further level adds
    /// `level_speed_step` of the base speed.
    #[must_use]
    pub fn level_factor(&self, level: u32) -> f32 {
        1.0 + self.level_speed_step * level.saturating_sub(1) as f32
    }
}

/// Cosmetic particle burst parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Number of particles spawned per destroyed enemy.
    pub burst_size: u32,
    /// Initial particle speed in playfield units per second.
    pub speed: f32,
    /// Life drained per second; particles start with a life of one.
    pub decay_per_sec: f32,
}

/// Complete set of engine parameters for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Width of the playfield in world units.
    pub playfield_width: f32,
    /// Height of the playfield in world units.
    pub playfield_height: f32,
    /// Width of the player ship.
    pub player_width: f32,
    /// Height of the player ship.
    pub player_height: f32,
    /// Horizontal player speed in units per second.
    pub player_speed: f32,
    /// Gap kept between the player and the bottom playfield edge.
    pub player_bottom_margin: f32,
    /// Width of a projectile.
    pub projectile_width: f32,
    /// Height of a projectile.
    pub projectile_height: f32,
    /// Upward projectile speed in units per second.
    pub projectile_speed: f32,
    /// Minimum elapsed time between two successive fire actions, in
    /// milliseconds.
    pub fire_cooldown_ms: u64,
    /// Lives granted at session start.
    pub lives: u32,
    /// Enemy formation layout and pacing.
    pub formation: FormationConfig,
    /// Cosmetic particle parameters.
    pub particles: ParticleConfig,
}

impl SessionConfig {
    /// Fire cooldown expressed as a [`Duration`].
    #[must_use]
    pub const fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }

    /// Y coordinate of the player ship's top edge.
    #[must_use]
    pub const fn player_top(&self) -> f32 {
        self.playfield_height - self.player_height - self.player_bottom_margin
    }

    /// Checks the configuration for values the engine cannot simulate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playfield_width <= 0.0 || self.playfield_height <= 0.0 {
            return Err(ConfigError::InvalidPlayfield {
                width: self.playfield_width,
                height: self.playfield_height,
            });
        }
        if self.player_width > self.playfield_width {
            return Err(ConfigError::PlayerTooWide {
                player_width: self.player_width,
                playfield_width: self.playfield_width,
            });
        }
        if self.formation.rows == 0 || self.formation.columns == 0 {
            return Err(ConfigError::EmptyFormation {
                rows: self.formation.rows,
                columns: self.formation.columns,
            });
        }
        if self.formation.row_points.len() != self.formation.rows as usize {
            return Err(ConfigError::RowPointsMismatch {
                provided: self.formation.row_points.len(),
                rows: self.formation.rows,
            });
        }
        if self.formation.width() >= self.playfield_width {
            return Err(ConfigError::FormationTooWide {
                formation_width: self.formation.width(),
                playfield_width: self.playfield_width,
            });
        }
        if self.player_speed <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed {
                quantity: "player_speed",
            });
        }
        if self.projectile_speed <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed {
                quantity: "projectile_speed",
            });
        }
        if self.formation.base_speed <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed {
                quantity: "formation.base_speed",
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playfield_width: 800.0,
            playfield_height: 600.0,
            player_width: 48.0,
            player_height: 24.0,
            player_speed: 300.0,
            player_bottom_margin: 16.0,
            projectile_width: 4.0,
            projectile_height: 12.0,
            projectile_speed: 420.0,
            fire_cooldown_ms: 250,
            lives: 3,
            formation: FormationConfig {
                rows: 4,
                columns: 8,
                enemy_width: 40.0,
                enemy_height: 28.0,
                horizontal_gap: 16.0,
                vertical_gap: 14.0,
                origin_x: 60.0,
                origin_y: 60.0,
                row_points: vec![400, 300, 200, 100],
                base_speed: 48.0,
                level_speed_step: 0.25,
                drop_distance: 24.0,
            },
            particles: ParticleConfig {
                burst_size: 12,
                speed: 120.0,
                decay_per_sec: 1.6,
            },
        }
    }
}
