//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod agent;
pub mod clock;
pub mod collision;
pub mod controller;
pub mod encounter;
pub mod grid;
pub mod obstacle;
pub mod session;
pub mod spell;
pub mod tick;

pub use agent::{Agent, Enemy, EnemyKind, EntityId, Intent, KinematicState, Player, PlayerInput};
pub use clock::FixedStep;
pub use collision::{RayHit, is_move_blocked, raycast, would_collide};
pub use controller::{Physics, ground_speed, step, step_with};
pub use encounter::{BOSS_NAMES, SpawnBounds, spawn_boss, spawn_enemies};
pub use grid::{Cell, Grid};
pub use obstacle::{Obstacle, ObstacleInstance, instance_buffer, obstacles_from_grid};
pub use session::{RunPhase, Session};
pub use spell::{Projectile, SpellKind};
pub use tick::{TickInput, tick};
