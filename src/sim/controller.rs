//! Per-tick kinematic update for any agent
//!
//! Horizontal and vertical motion are independent:
//! - Horizontal: intent * speed * dt, accepted or rejected as a whole by the
//!   collision probes
//! - Vertical: grounded/airborne with gravity against the floor plane y = 0

use serde::{Deserialize, Serialize};

use super::agent::{Agent, KinematicState};
use super::collision::is_move_blocked;
use super::obstacle::Obstacle;
use crate::consts::*;
use crate::flatten;

/// Vertical motion tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    /// Downward acceleration magnitude (units/s²)
    pub gravity: f32,
    /// Upward velocity set by a jump
    pub jump_speed: f32,
    /// Most negative vertical velocity allowed
    pub terminal_velocity: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
            terminal_velocity: TERMINAL_VELOCITY,
        }
    }
}

/// Advance an agent by `dt` with default physics
pub fn step<A: Agent + ?Sized>(agent: &A, dt: f32, obstacles: &[Obstacle]) -> KinematicState {
    step_with(agent, dt, obstacles, &Physics::default())
}

/// Advance an agent by `dt`, returning its new kinematic state
///
/// The agent itself is not modified. Non-positive or non-finite `dt` returns
/// the current state unchanged.
pub fn step_with<A: Agent + ?Sized>(
    agent: &A,
    dt: f32,
    obstacles: &[Obstacle],
    physics: &Physics,
) -> KinematicState {
    let current = *agent.kinematics();
    if !(dt > 0.0 && dt.is_finite()) {
        log::trace!("Skipping step with dt={dt}");
        return current;
    }

    let intent = agent.intent();
    let mut next = current;

    let displacement = flatten(intent.horizontal) * agent.speed() * dt;
    let moved = displacement.length_squared() > 0.0
        && !is_move_blocked(
            current.position,
            displacement,
            agent.facing(),
            agent.radius(),
            obstacles,
        );
    if moved {
        next.position += displacement;
        next.velocity.x = displacement.x / dt;
        next.velocity.z = displacement.z / dt;
    } else {
        next.velocity.x = 0.0;
        next.velocity.z = 0.0;
    }

    if agent.uses_vertical() {
        integrate_vertical(&mut next, intent.jump, dt, physics);
    }

    next
}

/// Jump, fall and land against the floor plane
fn integrate_vertical(state: &mut KinematicState, jump: bool, dt: f32, physics: &Physics) {
    if jump && state.on_ground {
        state.velocity.y = physics.jump_speed;
        state.on_ground = false;
    }

    if !state.on_ground {
        state.velocity.y =
            (state.velocity.y - physics.gravity * dt).max(physics.terminal_velocity);
    }
    state.position.y += state.velocity.y * dt;

    if state.position.y <= 0.0 {
        state.position.y = 0.0;
        state.velocity.y = 0.0;
        state.on_ground = true;
    } else {
        // Nothing but the floor supports an agent
        state.on_ground = false;
    }
}

/// Horizontal speed of a state (for host animation)
pub fn ground_speed(state: &KinematicState) -> f32 {
    flatten(state.velocity).length()
}
