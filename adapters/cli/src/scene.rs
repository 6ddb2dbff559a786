use glam::Vec2;
use grid_invaders_core::SessionPhase;
use grid_invaders_rendering::{
    Color, GameOverPresentation, HudPresentation, PlayfieldPresentation, Scene, SceneEnemy,
    SceneParticle, ScenePlayer, SceneProjectile, SpriteKey,
};
use grid_invaders_world::{query, Session};

/// Fill behind the playfield entities.
pub(crate) const PLAYFIELD_BACKGROUND: Color = Color::from_rgb_u8(0x0b, 0x0e, 0x1a);

/// Clear color shown in the letterbox bands outside the playfield.
pub(crate) const CLEAR_COLOR: Color = Color::from_rgb_u8(0x05, 0x06, 0x0c);

const PROJECTILE_COLOR: Color = Color::from_rgb_u8(0xf4, 0xf4, 0xf8);
const PARTICLE_RADIUS: f32 = 3.0;

/// Builds a scene mirroring the session's current state.
pub(crate) fn build(session: &Session) -> Scene {
    let mut scene = Scene::new(
        PlayfieldPresentation::new(0.0, 0.0, PLAYFIELD_BACKGROUND),
        ScenePlayer::new(Vec2::ZERO, Vec2::ZERO),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        HudPresentation {
            score: 0,
            high_score: 0,
            level: 1,
            lives: 0,
        },
        None,
    );
    populate(session, &mut scene);
    scene
}

/// Refreshes every scene channel from the session's read model.
pub(crate) fn populate(session: &Session, scene: &mut Scene) {
    let config = query::config(session);
    scene.playfield = PlayfieldPresentation::new(
        config.playfield_width,
        config.playfield_height,
        PLAYFIELD_BACKGROUND,
    );

    let player = query::player(session);
    scene.player = ScenePlayer::new(
        Vec2::new(player.x, player.y),
        Vec2::new(player.width, player.height),
    );

    scene.enemies.clear();
    scene
        .enemies
        .extend(query::enemies(session).into_iter().map(|enemy| {
            SceneEnemy::new(
                enemy.id,
                Vec2::new(enemy.x, enemy.y),
                Vec2::new(enemy.width, enemy.height),
                SpriteKey::for_enemy(enemy.sprite),
            )
        }));

    scene.projectiles.clear();
    scene
        .projectiles
        .extend(
            query::projectiles(session)
                .into_iter()
                .map(|projectile| {
                    SceneProjectile::new(
                        Vec2::new(projectile.x, projectile.y),
                        Vec2::new(projectile.width, projectile.height),
                        PROJECTILE_COLOR,
                    )
                }),
        );

    scene.particles.clear();
    scene
        .particles
        .extend(query::particles(session).into_iter().map(|particle| {
            SceneParticle::new(
                Vec2::new(particle.x, particle.y),
                PARTICLE_RADIUS,
                particle.life,
                SpriteKey::for_enemy(particle.sprite).placeholder_color(),
            )
        }));

    let hud = query::hud(session);
    scene.hud = HudPresentation {
        score: hud.score,
        high_score: hud.high_score,
        level: hud.level,
        lives: hud.lives,
    };

    scene.game_over = match query::phase(session) {
        SessionPhase::Running => None,
        SessionPhase::GameOver => Some(GameOverPresentation {
            final_score: hud.score,
        }),
    };
}
