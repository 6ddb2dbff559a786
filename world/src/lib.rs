#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Grid Invaders.
//!
//! The [`Session`] owns every transient entity of one arcade run: the
//! player ship, projectiles, the enemy formation, cosmetic particles and
//! the score counters. Adapters and systems mutate it exclusively through
//! [`apply`], which executes one [`Command`] and reports the resulting
//! [`Event`] values; the [`query`] module exposes read-only snapshots.

use std::time::Duration;

use grid_invaders_core::{
    Command, Direction, EnemyId, EnemySprite, Event, MarchDirection, ProjectileId, Rect,
    SessionConfig, SessionPhase,
};

const PARTICLE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Represents the authoritative state of one arcade session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    phase: SessionPhase,
    player_x: f32,
    projectiles: Vec<Projectile>,
    enemies: Vec<Enemy>,
    particles: Vec<Particle>,
    march: MarchDirection,
    score: u32,
    high_score: u32,
    lives: u32,
    level: u32,
    cooldown_remaining: Duration,
    next_projectile_id: u32,
    next_enemy_id: u32,
    rng_state: u64,
}

impl Session {
    /// Creates a session using the default configuration and no persisted
    /// best score. Hosts reconfigure via [`Command::ConfigureSession`].
    #[must_use]
    pub fn new() -> Self {
        let mut session = Self {
            config: SessionConfig::default(),
            phase: SessionPhase::Running,
            player_x: 0.0,
            projectiles: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            march: MarchDirection::Right,
            score: 0,
            high_score: 0,
            lives: 0,
            level: 1,
            cooldown_remaining: Duration::ZERO,
            next_projectile_id: 0,
            next_enemy_id: 0,
            rng_state: PARTICLE_SEED,
        };
        session.reset_run();
        session
    }

    fn reset_run(&mut self) {
        self.phase = SessionPhase::Running;
        self.player_x = (self.config.playfield_width - self.config.player_width) / 2.0;
        self.projectiles.clear();
        self.particles.clear();
        self.score = 0;
        self.lives = self.config.lives;
        self.level = 1;
        self.cooldown_remaining = Duration::ZERO;
        self.next_projectile_id = 0;
        self.rng_state = PARTICLE_SEED;
        self.spawn_formation();
    }

    fn spawn_formation(&mut self) {
        let formation = &self.config.formation;
        self.enemies.clear();
        self.march = MarchDirection::Right;
        for row in 0..formation.rows {
            let points = formation.points_for_row(row);
            let sprite = EnemySprite::for_row(row);
            let y = formation.origin_y + row as f32 * (formation.enemy_height + formation.vertical_gap);
            for column in 0..formation.columns {
                let x = formation.origin_x
                    + column as f32 * (formation.enemy_width + formation.horizontal_gap);
                let id = EnemyId::new(self.next_enemy_id);
                self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
                self.enemies.push(Enemy {
                    id,
                    x,
                    y,
                    points,
                    sprite,
                });
            }
        }
    }

    fn player_rect(&self) -> Rect {
        Rect::new(
            self.player_x,
            self.config.player_top(),
            self.config.player_width,
            self.config.player_height,
        )
    }

    fn enemy_rect(&self, enemy: &Enemy) -> Rect {
        Rect::new(
            enemy.x,
            enemy.y,
            self.config.formation.enemy_width,
            self.config.formation.enemy_height,
        )
    }

    fn projectile_rect(&self, projectile: &Projectile) -> Rect {
        Rect::new(
            projectile.x,
            projectile.y,
            self.config.projectile_width,
            self.config.projectile_height,
        )
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let step = match direction {
            Direction::Left => -self.config.player_speed,
            Direction::Right => self.config.player_speed,
        } * FRAME_STEP_SECS;
        let limit = self.config.playfield_width - self.config.player_width;
        let moved = (self.player_x + step).clamp(0.0, limit);
        if moved != self.player_x {
            self.player_x = moved;
            out_events.push(Event::PlayerMoved { x: moved });
        }
    }

    fn fire_projectile(&mut self, out_events: &mut Vec<Event>) {
        if !self.cooldown_remaining.is_zero() {
            return;
        }
        let x = self.player_rect().center_x() - self.config.projectile_width / 2.0;
        let y = self.config.player_top() - self.config.projectile_height;
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile { id, x, y });
        self.cooldown_remaining = self.config.fire_cooldown();
        out_events.push(Event::ProjectileFired {
            projectile: id,
            x,
            y,
        });
    }

    fn advance_projectiles(&mut self, dt_secs: f32, out_events: &mut Vec<Event>) {
        let travel = self.config.projectile_speed * dt_secs;
        let height = self.config.projectile_height;
        for projectile in &mut self.projectiles {
            projectile.y -= travel;
        }
        let mut expired = Vec::new();
        self.projectiles.retain(|projectile| {
            if projectile.y + height < 0.0 {
                expired.push(projectile.id);
                false
            } else {
                true
            }
        });
        for projectile in expired {
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }

    fn advance_formation(&mut self, dt_secs: f32, out_events: &mut Vec<Event>) {
        if self.enemies.is_empty() {
            return;
        }
        let formation = &self.config.formation;
        let speed = formation.base_speed * formation.level_factor(self.level);
        let travel = self.march.sign() * speed * dt_secs;
        for enemy in &mut self.enemies {
            enemy.x += travel;
        }

        // The edge reaction is formation-wide: one touching enemy reverses
        // and drops the whole grid in the same frame. Only an edge in the
        // current travel direction triggers, so a flipped formation cannot
        // oscillate while it is still overhanging the opposite edge.
        let enemy_width = formation.enemy_width;
        let touched = match self.march {
            MarchDirection::Left => self.enemies.iter().any(|enemy| enemy.x <= 0.0),
            MarchDirection::Right => self
                .enemies
                .iter()
                .any(|enemy| enemy.x + enemy_width >= self.config.playfield_width),
        };
        if touched {
            self.march = self.march.flipped();
            let drop = formation.drop_distance;
            for enemy in &mut self.enemies {
                enemy.y += drop;
            }
            out_events.push(Event::FormationShifted {
                direction: self.march,
            });
        }
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let mut projectile_index = 0;
        while projectile_index < self.projectiles.len() {
            let projectile_rect = self.projectile_rect(&self.projectiles[projectile_index]);
            let hit = self
                .enemies
                .iter()
                .position(|enemy| projectile_rect.overlaps(&self.enemy_rect(enemy)));
            let Some(enemy_index) = hit else {
                projectile_index += 1;
                continue;
            };

            let enemy = self.enemies.remove(enemy_index);
            let _ = self.projectiles.remove(projectile_index);
            let center = self.enemy_rect(&enemy);
            self.score = self.score.saturating_add(enemy.points);
            out_events.push(Event::EnemyDestroyed {
                enemy: enemy.id,
                points: enemy.points,
                center_x: center.center_x(),
                center_y: center.center_y(),
            });
            out_events.push(Event::ScoreChanged { score: self.score });
            if self.score > self.high_score {
                self.high_score = self.score;
                out_events.push(Event::HighScoreChanged {
                    value: self.high_score,
                });
            }
            self.spawn_particle_burst(center.center_x(), center.center_y(), enemy.sprite);
        }
    }

    fn spawn_particle_burst(&mut self, x: f32, y: f32, sprite: EnemySprite) {
        let burst = self.config.particles.burst_size;
        if burst == 0 {
            return;
        }
        let speed = self.config.particles.speed;
        for index in 0..burst {
            let angle = index as f32 / burst as f32 * std::f32::consts::TAU;
            let jitter = 0.5 + (self.next_random() % 1000) as f32 / 1000.0;
            self.particles.push(Particle {
                x,
                y,
                velocity_x: angle.cos() * speed * jitter,
                velocity_y: angle.sin() * speed * jitter,
                life: 1.0,
                sprite,
            });
        }
    }

    fn next_random(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }

    fn check_progression(&mut self, out_events: &mut Vec<Event>) {
        if self.enemies.is_empty() {
            let cleared = self.level;
            self.level = self.level.saturating_add(1);
            out_events.push(Event::FormationCleared { level: cleared });
            self.spawn_formation();
            out_events.push(Event::FormationSpawned {
                level: self.level,
                enemy_count: self.enemies.len() as u32,
            });
            return;
        }

        let player_top = self.config.player_top();
        let enemy_height = self.config.formation.enemy_height;
        // Touching edges are not a breach, matching the collision
        // convention: the formation costs a life only once it has passed
        // the player's top edge.
        let breached = self
            .enemies
            .iter()
            .any(|enemy| enemy.y + enemy_height > player_top);
        if !breached {
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = SessionPhase::GameOver;
            out_events.push(Event::GameOver {
                final_score: self.score,
            });
            return;
        }

        out_events.push(Event::LifeLost {
            remaining: self.lives,
        });
        self.spawn_formation();
        out_events.push(Event::FormationSpawned {
            level: self.level,
            enemy_count: self.enemies.len() as u32,
        });
    }

    fn advance_particles(&mut self, dt_secs: f32) {
        let decay = self.config.particles.decay_per_sec * dt_secs;
        for particle in &mut self.particles {
            particle.x += particle.velocity_x * dt_secs;
            particle.y += particle.velocity_y * dt_secs;
            particle.life -= decay;
        }
        self.particles.retain(|particle| particle.life > 0.0);
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Running {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt });

        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(dt);
        let dt_secs = dt.as_secs_f32();
        self.advance_projectiles(dt_secs, out_events);
        self.advance_formation(dt_secs, out_events);
        self.resolve_collisions(out_events);
        self.check_progression(out_events);
        self.advance_particles(dt_secs);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Nominal frame length used to convert per-frame movement commands into a
/// displacement. Movement commands are issued once per frame, so the player
/// covers `player_speed` units per simulated second at a steady frame rate.
const FRAME_STEP_SECS: f32 = 1.0 / 60.0;

/// Applies the provided command to the session, mutating state
/// deterministically.
///
/// A [`Command::ConfigureSession`] carrying a configuration that fails
/// [`SessionConfig::validate`] is rejected wholesale: the session keeps its
/// previous configuration and no event is emitted. Hosts validate upfront
/// and report the error on their side.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession { config, high_score } => {
            if config.validate().is_err() {
                return;
            }
            session.config = config;
            session.high_score = high_score;
            session.reset_run();
            out_events.push(Event::FormationSpawned {
                level: session.level,
                enemy_count: session.enemies.len() as u32,
            });
        }
        Command::MovePlayer { direction } => {
            if session.phase == SessionPhase::Running {
                session.move_player(direction, out_events);
            }
        }
        Command::FireProjectile => {
            if session.phase == SessionPhase::Running {
                session.fire_projectile(out_events);
            }
        }
        Command::Restart => {
            if session.phase == SessionPhase::GameOver {
                session.reset_run();
                out_events.push(Event::FormationSpawned {
                    level: session.level,
                    enemy_count: session.enemies.len() as u32,
                });
            }
        }
        Command::Tick { dt } => {
            session.tick(dt, out_events);
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use super::Session;
    use grid_invaders_core::{
        EnemyId, EnemySprite, MarchDirection, ProjectileId, SessionConfig, SessionPhase,
    };

    /// Immutable representation of the player ship.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// X coordinate of the player's top-left corner.
        pub x: f32,
        /// Y coordinate of the player's top-left corner.
        pub y: f32,
        /// Width of the player ship.
        pub width: f32,
        /// Height of the player ship.
        pub height: f32,
    }

    /// Immutable representation of a single projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier assigned at launch.
        pub id: ProjectileId,
        /// X coordinate of the projectile's top-left corner.
        pub x: f32,
        /// Y coordinate of the projectile's top-left corner.
        pub y: f32,
        /// Width of the projectile.
        pub width: f32,
        /// Height of the projectile.
        pub height: f32,
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier assigned at spawn.
        pub id: EnemyId,
        /// X coordinate of the enemy's top-left corner.
        pub x: f32,
        /// Y coordinate of the enemy's top-left corner.
        pub y: f32,
        /// Width of the enemy.
        pub width: f32,
        /// Height of the enemy.
        pub height: f32,
        /// Point value awarded on destruction.
        pub points: u32,
        /// Visual variant assigned to the enemy.
        pub sprite: EnemySprite,
    }

    /// Immutable representation of a cosmetic particle.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ParticleSnapshot {
        /// X coordinate of the particle center.
        pub x: f32,
        /// Y coordinate of the particle center.
        pub y: f32,
        /// Remaining life in the range `0.0..=1.0`.
        pub life: f32,
        /// Sprite variant of the enemy that produced the burst.
        pub sprite: EnemySprite,
    }

    /// Score and progression counters surfaced to the host UI.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HudSnapshot {
        /// Current session score.
        pub score: u32,
        /// Best score ever observed, including the persisted value.
        pub high_score: u32,
        /// Current level, starting at one.
        pub level: u32,
        /// Lives remaining.
        pub lives: u32,
    }

    /// Captures the player ship's current bounds.
    #[must_use]
    pub fn player(session: &Session) -> PlayerSnapshot {
        PlayerSnapshot {
            x: session.player_x,
            y: session.config.player_top(),
            width: session.config.player_width,
            height: session.config.player_height,
        }
    }

    /// Captures every live projectile in launch order.
    #[must_use]
    pub fn projectiles(session: &Session) -> Vec<ProjectileSnapshot> {
        session
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                x: projectile.x,
                y: projectile.y,
                width: session.config.projectile_width,
                height: session.config.projectile_height,
            })
            .collect()
    }

    /// Captures every live enemy sorted by identifier.
    #[must_use]
    pub fn enemies(session: &Session) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = session
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                x: enemy.x,
                y: enemy.y,
                width: session.config.formation.enemy_width,
                height: session.config.formation.enemy_height,
                points: enemy.points,
                sprite: enemy.sprite,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures every live cosmetic particle.
    #[must_use]
    pub fn particles(session: &Session) -> Vec<ParticleSnapshot> {
        session
            .particles
            .iter()
            .map(|particle| ParticleSnapshot {
                x: particle.x,
                y: particle.y,
                life: particle.life,
                sprite: particle.sprite,
            })
            .collect()
    }

    /// Captures the score and progression counters.
    #[must_use]
    pub fn hud(session: &Session) -> HudSnapshot {
        HudSnapshot {
            score: session.score,
            high_score: session.high_score,
            level: session.level,
            lives: session.lives,
        }
    }

    /// Reports whether the session is running or finished.
    #[must_use]
    pub fn phase(session: &Session) -> SessionPhase {
        session.phase
    }

    /// Remaining time before another projectile may launch.
    #[must_use]
    pub fn fire_cooldown_remaining(session: &Session) -> Duration {
        session.cooldown_remaining
    }

    /// Shared march direction of the enemy formation.
    #[must_use]
    pub fn march_direction(session: &Session) -> MarchDirection {
        session.march
    }

    /// Provides read-only access to the active configuration.
    #[must_use]
    pub fn config(session: &Session) -> &SessionConfig {
        &session.config
    }
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    x: f32,
    y: f32,
    points: u32,
    sprite: EnemySprite,
}

#[derive(Clone, Copy, Debug)]
struct Particle {
    x: f32,
    y: f32,
    velocity_x: f32,
    velocity_y: f32,
    life: f32,
    sprite: EnemySprite,
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_invaders_core::SessionConfig;

    fn configured_session(config: SessionConfig) -> Session {
        let mut session = Session::new();
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::ConfigureSession {
                config,
                high_score: 0,
            },
            &mut events,
        );
        session
    }

    #[test]
    fn configure_spawns_full_formation() {
        let session = configured_session(SessionConfig::default());
        let enemies = query::enemies(&session);

        assert_eq!(enemies.len(), 32);
        assert_eq!(query::hud(&session).level, 1);
        assert_eq!(query::hud(&session).score, 0);
        assert_eq!(query::march_direction(&session), MarchDirection::Right);
    }

    #[test]
    fn configure_preserves_persisted_high_score() {
        let mut session = Session::new();
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::ConfigureSession {
                config: SessionConfig::default(),
                high_score: 5400,
            },
            &mut events,
        );

        assert_eq!(query::hud(&session).high_score, 5400);
    }

    #[test]
    fn invalid_configs_are_rejected_wholesale() {
        let mut session = configured_session(SessionConfig::default());
        let mut broken = SessionConfig::default();
        broken.formation.rows = 0;

        let mut events = Vec::new();
        apply(
            &mut session,
            Command::ConfigureSession {
                config: broken,
                high_score: 999,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::enemies(&session).len(), 32);
        assert_eq!(query::hud(&session).high_score, 0);
        assert_eq!(query::config(&session).formation.rows, 4);
    }

    #[test]
    fn player_stays_within_playfield_under_sustained_input() {
        let mut session = configured_session(SessionConfig::default());
        let mut events = Vec::new();
        let limit = {
            let config = query::config(&session);
            config.playfield_width - config.player_width
        };

        for _ in 0..10_000 {
            apply(
                &mut session,
                Command::MovePlayer {
                    direction: Direction::Left,
                },
                &mut events,
            );
        }
        assert_eq!(query::player(&session).x, 0.0);

        for _ in 0..10_000 {
            apply(
                &mut session,
                Command::MovePlayer {
                    direction: Direction::Right,
                },
                &mut events,
            );
        }
        assert_eq!(query::player(&session).x, limit);
    }

    #[test]
    fn firing_twice_within_cooldown_launches_one_projectile() {
        let mut session = configured_session(SessionConfig::default());
        let mut events = Vec::new();

        apply(&mut session, Command::FireProjectile, &mut events);
        apply(&mut session, Command::FireProjectile, &mut events);

        assert_eq!(query::projectiles(&session).len(), 1);
        let fired = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn cooldown_elapses_after_configured_duration() {
        let mut session = configured_session(SessionConfig::default());
        let mut events = Vec::new();

        apply(&mut session, Command::FireProjectile, &mut events);
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        apply(&mut session, Command::FireProjectile, &mut events);
        assert_eq!(query::projectiles(&session).len(), 1);

        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(200),
            },
            &mut events,
        );
        apply(&mut session, Command::FireProjectile, &mut events);
        assert_eq!(query::projectiles(&session).len(), 2);
    }

    #[test]
    fn projectile_fired_at_player_center() {
        let mut session = configured_session(SessionConfig::default());
        let mut events = Vec::new();

        apply(&mut session, Command::FireProjectile, &mut events);

        let player = query::player(&session);
        let projectile = query::projectiles(&session)[0];
        let expected = player.x + player.width / 2.0 - projectile.width / 2.0;
        assert_eq!(projectile.x, expected);
        assert_eq!(projectile.y, player.y - projectile.height);
    }

    #[test]
    fn projectiles_expire_past_playfield_top() {
        let mut config = SessionConfig::default();
        // Push the formation aside so nothing intercepts the shot.
        config.formation.columns = 1;
        config.formation.origin_x = 10.0;
        config.formation.base_speed = 0.1;
        let mut session = configured_session(config);
        let mut events = Vec::new();

        apply(&mut session, Command::FireProjectile, &mut events);
        events.clear();
        for _ in 0..400 {
            apply(
                &mut session,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut events,
            );
        }

        assert!(query::projectiles(&session).is_empty());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileExpired { .. })));
    }

    #[test]
    fn formation_reverses_and_drops_as_a_group() {
        let mut session = configured_session(SessionConfig::default());
        let mut events = Vec::new();
        let before = query::enemies(&session);

        // March right until the rightmost enemy reaches the playfield edge.
        let mut shifted = false;
        for _ in 0..10_000 {
            events.clear();
            apply(
                &mut session,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut events,
            );
            if events
                .iter()
                .any(|event| matches!(event, Event::FormationShifted { .. }))
            {
                shifted = true;
                break;
            }
        }
        assert!(shifted, "formation never reached an edge");
        assert_eq!(query::march_direction(&session), MarchDirection::Left);

        let after = query::enemies(&session);
        let drop = query::config(&session).formation.drop_distance;
        assert_eq!(before.len(), after.len());
        for (was, is) in before.iter().zip(after.iter()) {
            assert!(
                (is.y - was.y - drop).abs() < 1e-3,
                "every enemy drops by the configured step"
            );
        }
    }

    #[test]
    fn collision_removes_one_enemy_and_scores_its_points() {
        // A near-stationary formation keeps the shot aligned with its
        // target for the whole flight.
        let mut config = SessionConfig::default();
        config.formation.base_speed = 0.1;
        let mut session = configured_session(config);
        let mut events = Vec::new();

        // Park the player under the bottom-left enemy and fire.
        let target = query::enemies(&session)
            .into_iter()
            .max_by(|a, b| a.y.total_cmp(&b.y).then(b.x.total_cmp(&a.x)))
            .expect("formation is populated");
        assert_eq!(target.points, 100, "bottom row scores the last entry");

        steer_player_under(&mut session, target.x + target.width / 2.0);
        apply(&mut session, Command::FireProjectile, &mut events);

        events.clear();
        let mut destroyed = None;
        for _ in 0..600 {
            apply(
                &mut session,
                Command::Tick {
                    dt: Duration::from_millis(4),
                },
                &mut events,
            );
            if let Some(event) = events
                .iter()
                .find(|event| matches!(event, Event::EnemyDestroyed { .. }))
            {
                destroyed = Some(event.clone());
                break;
            }
        }

        let Some(Event::EnemyDestroyed { points, .. }) = destroyed else {
            panic!("projectile never hit an enemy");
        };
        assert_eq!(points, 100);
        assert_eq!(query::enemies(&session).len(), 31);
        assert!(query::projectiles(&session).is_empty());
        assert_eq!(query::hud(&session).score, 100);
    }

    #[test]
    fn high_score_tracks_maximum_observed_score() {
        let mut session = configured_session(SessionConfig::default());
        session.high_score = 150;

        let mut events = Vec::new();
        session.score = 100;
        session.resolve_collisions(&mut events);
        assert_eq!(query::hud(&session).high_score, 150);

        // Direct scoring below keeps the persisted maximum intact.
        session.score = 140;
        let mut events = Vec::new();
        session.enemies.truncate(1);
        session.projectiles.push(Projectile {
            id: ProjectileId::new(99),
            x: session.enemies[0].x,
            y: session.enemies[0].y,
        });
        session.resolve_collisions(&mut events);

        let hud = query::hud(&session);
        assert_eq!(hud.score, 140 + 400);
        assert_eq!(hud.high_score, 540);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::HighScoreChanged { value: 540 })));
    }

    #[test]
    fn clearing_the_formation_advances_one_level() {
        let mut session = configured_session(SessionConfig::default());
        session.enemies.clear();

        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        let hud = query::hud(&session);
        assert_eq!(hud.level, 2);
        assert_eq!(query::enemies(&session).len(), 32);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::FormationCleared { level: 1 })));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::FormationSpawned {
                level: 2,
                enemy_count: 32,
            }
        )));
    }

    #[test]
    fn formation_speed_scales_with_level() {
        let mut session = configured_session(SessionConfig::default());
        session.level = 3;
        let start = query::enemies(&session)[0].x;

        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );

        let formation = &query::config(&session).formation;
        let expected = formation.base_speed * formation.level_factor(3);
        let travelled = query::enemies(&session)[0].x - start;
        assert!((travelled - expected).abs() < 1e-3);
    }

    #[test]
    fn breach_with_last_life_freezes_the_session() {
        let mut config = SessionConfig::default();
        config.lives = 1;
        let mut session = configured_session(config);

        drop_formation_onto_player(&mut session);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::phase(&session), SessionPhase::GameOver);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. })));

        // Post-game-over ticks must not mutate anything.
        let frozen_enemies = query::enemies(&session);
        let frozen_player = query::player(&session);
        for _ in 0..2 {
            let mut more = Vec::new();
            apply(
                &mut session,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut more,
            );
            assert!(more.is_empty());
        }
        assert_eq!(query::enemies(&session), frozen_enemies);
        assert_eq!(query::player(&session), frozen_player);
    }

    #[test]
    fn formation_touching_the_player_top_is_not_a_breach() {
        let mut session = configured_session(SessionConfig::default());
        let player_top = session.config.player_top();
        let enemy_height = session.config.formation.enemy_height;
        for enemy in &mut session.enemies {
            enemy.y = player_top - enemy_height;
        }

        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::phase(&session), SessionPhase::Running);
        assert_eq!(query::hud(&session).lives, 3);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::LifeLost { .. } | Event::GameOver { .. })));
    }

    #[test]
    fn breach_with_spare_lives_respawns_the_formation() {
        let mut session = configured_session(SessionConfig::default());

        drop_formation_onto_player(&mut session);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        let hud = query::hud(&session);
        assert_eq!(query::phase(&session), SessionPhase::Running);
        assert_eq!(hud.lives, 2);
        assert_eq!(hud.level, 1);
        assert_eq!(query::enemies(&session).len(), 32);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LifeLost { remaining: 2 })));
    }

    #[test]
    fn restart_resets_score_but_keeps_high_score() {
        let mut config = SessionConfig::default();
        config.lives = 1;
        let mut session = configured_session(config);
        session.score = 700;
        session.high_score = 700;

        drop_formation_onto_player(&mut session);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert_eq!(query::phase(&session), SessionPhase::GameOver);

        apply(&mut session, Command::Restart, &mut events);

        let hud = query::hud(&session);
        assert_eq!(query::phase(&session), SessionPhase::Running);
        assert_eq!(hud.score, 0);
        assert_eq!(hud.high_score, 700);
        assert_eq!(query::enemies(&session).len(), 32);
    }

    #[test]
    fn restart_is_ignored_while_running() {
        let mut session = configured_session(SessionConfig::default());
        session.score = 300;

        let mut events = Vec::new();
        apply(&mut session, Command::Restart, &mut events);

        assert_eq!(query::hud(&session).score, 300);
        assert!(events.is_empty());
    }

    #[test]
    fn commands_are_ignored_after_game_over() {
        let mut config = SessionConfig::default();
        config.lives = 1;
        let mut session = configured_session(config);

        drop_formation_onto_player(&mut session);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        let player_before = query::player(&session);

        events.clear();
        apply(
            &mut session,
            Command::MovePlayer {
                direction: Direction::Left,
            },
            &mut events,
        );
        apply(&mut session, Command::FireProjectile, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::player(&session), player_before);
        assert!(query::projectiles(&session).is_empty());
    }

    #[test]
    fn particle_bursts_spawn_and_decay() {
        let mut session = configured_session(SessionConfig::default());
        session.spawn_particle_burst(100.0, 100.0, EnemySprite::Alpha);

        let burst = query::config(&session).particles.burst_size as usize;
        assert_eq!(query::particles(&session).len(), burst);

        let mut events = Vec::new();
        for _ in 0..120 {
            apply(
                &mut session,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut events,
            );
        }
        assert!(query::particles(&session).is_empty());
    }

    fn steer_player_under(session: &mut Session, center_x: f32) {
        let mut events = Vec::new();
        for _ in 0..20_000 {
            let player = query::player(session);
            let player_center = player.x + player.width / 2.0;
            let direction = if (player_center - center_x).abs() < 4.0 {
                return;
            } else if player_center > center_x {
                Direction::Left
            } else {
                Direction::Right
            };
            apply(session, Command::MovePlayer { direction }, &mut events);
        }
        panic!("player never reached the target column");
    }

    fn drop_formation_onto_player(session: &mut Session) {
        let player_top = session.config.player_top();
        let enemy_height = session.config.formation.enemy_height;
        for enemy in &mut session.enemies {
            enemy.y = player_top - enemy_height + 1.0;
        }
    }
}
