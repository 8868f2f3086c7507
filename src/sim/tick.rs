//! Fixed timestep simulation tick
//!
//! One call advances the world by one frame:
//! session input, timers and queued events, controllers, then world
//! resolution.

use super::controller::{DemonController, PlayerController, PlayerInput, ScrollController, autopilot};
use super::events::GameRequest;
use super::state::{GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement/attack keys held this tick
    pub keys: PlayerInput,
    /// Pause toggle
    pub pause: bool,
    /// Start from the menu, or restart after death
    pub start: bool,
    /// Idle/demo mode - the autopilot plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        state.toggle_pause();
    }

    if input.start {
        match state.phase {
            GamePhase::NotRunning => state.start(),
            GamePhase::Ended => state.restart(),
            _ => {}
        }
    }

    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.demons_killed = 0;

    if state.spawn_timer.tick() {
        state.inbox.push(GameRequest::SpawnDemon);
    }
    state.process_inbox();

    let keys = if input.autopilot {
        autopilot(state)
    } else {
        input.keys
    };

    PlayerController::update(state, &keys);
    DemonController::update(state);
    ScrollController::update(state);

    state.resolve();
}
