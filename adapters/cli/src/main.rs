#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Grid Invaders experience.
//!
//! Hosts the fixed game loop: keyboard input flows through the player-control
//! system into the session, emitted events feed high-score persistence, and
//! the resulting read model is mirrored into the macroquad backend's scene.

mod scene;
mod store;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use grid_invaders_core::{Command, SessionConfig, WINDOW_TITLE};
use grid_invaders_rendering::{Presentation, RenderingBackend};
use grid_invaders_rendering_macroquad::MacroquadBackend;
use grid_invaders_system_high_score::HighScorePersistence;
use grid_invaders_system_player_control::{InputSnapshot, PlayerControl};
use grid_invaders_world::{self as world, query, Session};

use self::store::FileStore;

#[derive(Debug, Parser)]
#[command(name = "grid-invaders", about = "Fixed-formation arcade shooter")]
struct Args {
    /// Path to a TOML session configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// File used to persist the best score across runs.
    #[arg(long, default_value = "high_score.txt")]
    high_score_file: PathBuf,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Render as fast as possible instead of synchronising with the display.
    #[arg(long)]
    no_vsync: bool,

    /// Skip sprite loading and draw placeholder shapes only.
    #[arg(long)]
    no_sprites: bool,
}

/// Entry point for the Grid Invaders command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    let mut persistence = HighScorePersistence::new(FileStore::new(args.high_score_file));
    let high_score = persistence.load_initial();
    log::info!("starting session with persisted high score {high_score}");

    let mut session = Session::new();
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::ConfigureSession { config, high_score },
        &mut events,
    );
    persistence.handle(&events);

    let control = PlayerControl::new();
    let presentation = Presentation::new(WINDOW_TITLE, scene::CLEAR_COLOR, scene::build(&session));

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites);

    backend.run(presentation, move |dt, input, scene_out| {
        let mut commands = Vec::new();
        control.handle(
            InputSnapshot {
                move_left: input.move_left,
                move_right: input.move_right,
                fire: input.fire,
            },
            query::phase(&session),
            &mut commands,
        );
        commands.push(Command::Tick { dt });

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut session, command, &mut events);
        }
        persistence.handle(&events);

        scene::populate(&session, scene_out);
    })
}

fn load_config(path: Option<&std::path::Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    let config: SessionConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse session config at {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid session config at {}", path.display()))?;
    Ok(config)
}
