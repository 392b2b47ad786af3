//! Torchlit Depths - simulation core for a first-person dungeon crawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, collision, agents, spells)
//! - `config`: Data-driven tuning and difficulty presets
//! - `error`: Construction-time validation errors
//! - `platform`: Browser bindings consumed by the JavaScript renderer

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use config::{Difficulty, SimConfig};
pub use error::{ConfigError, GenerationError, SaveError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the host frame rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted from the host clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Maze defaults
    pub const MAZE_WIDTH: usize = 20;
    pub const MAZE_HEIGHT: usize = 20;
    pub const WALL_DENSITY: f32 = 0.2;
    /// World units per grid cell
    pub const CELL_SIZE: f32 = 2.0;
    pub const WALL_HEIGHT: f32 = 3.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_RADIUS: f32 = 0.4;
    pub const PLAYER_EYE_HEIGHT: f32 = 1.6;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_MAX_MANA: f32 = 100.0;

    /// Vertical motion (gravity is a magnitude, applied downward)
    pub const GRAVITY: f32 = 9.8;
    pub const JUMP_SPEED: f32 = 5.0;
    pub const TERMINAL_VELOCITY: f32 = -20.0;

    /// Enemies stop steering when this close (squared) to their target
    pub const ARRIVAL_EPSILON_SQ: f32 = 0.1;
    /// Contact damage per second per enemy level
    pub const CONTACT_DPS_PER_LEVEL: f32 = 1.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const PROJECTILE_LIFETIME: f32 = 2.0;
    pub const PROJECTILE_RADIUS: f32 = 0.1;
}

/// Project a vector onto the horizontal (XZ) plane
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit facing vector for a yaw angle (radians, 0 looks down -Z)
#[inline]
pub fn yaw_to_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Right-hand vector for a horizontal forward (forward x up)
#[inline]
pub fn right_of(forward: Vec3) -> Vec3 {
    forward.cross(Vec3::Y).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_zero_looks_down_negative_z() {
        let f = yaw_to_forward(0.0);
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_right_of_forward() {
        // Looking down -Z, right is +X
        let r = right_of(Vec3::NEG_Z);
        assert!((r - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_flatten_drops_y() {
        assert_eq!(flatten(Vec3::new(1.0, 5.0, -2.0)), Vec3::new(1.0, 0.0, -2.0));
    }
}
