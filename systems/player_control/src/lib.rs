#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns per-frame input snapshots into player commands.

use grid_invaders_core::{Command, Direction, SessionPhase};

/// Input state sampled by an adapter at the top of one frame.
///
/// Movement keys are level-triggered (held), the fire key is an
/// edge-triggered pulse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Whether the move-left key is held this frame.
    pub move_left: bool,
    /// Whether the move-right key is held this frame.
    pub move_right: bool,
    /// Whether the fire key was pressed this frame.
    pub fire: bool,
}

/// Player control system translating input snapshots into commands.
#[derive(Debug, Default)]
pub struct PlayerControl;

impl PlayerControl {
    /// Creates a new player control system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits the commands implied by the provided input snapshot.
    ///
    /// While the session runs, held movement keys produce one
    /// [`Command::MovePlayer`] per frame (opposing keys cancel) and a fire
    /// pulse produces [`Command::FireProjectile`]; the session itself
    /// enforces the cooldown. After game over the only recognised input is
    /// the fire pulse, which requests a [`Command::Restart`].
    pub fn handle(&self, input: InputSnapshot, phase: SessionPhase, out: &mut Vec<Command>) {
        match phase {
            SessionPhase::Running => {
                match (input.move_left, input.move_right) {
                    (true, false) => out.push(Command::MovePlayer {
                        direction: Direction::Left,
                    }),
                    (false, true) => out.push(Command::MovePlayer {
                        direction: Direction::Right,
                    }),
                    _ => {}
                }
                if input.fire {
                    out.push(Command::FireProjectile);
                }
            }
            SessionPhase::GameOver => {
                if input.fire {
                    out.push(Command::Restart);
                }
            }
        }
    }
}
