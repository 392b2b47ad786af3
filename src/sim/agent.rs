//! Agents: anything the controller moves each tick
//!
//! The controller only needs an agent's kinematic state, radius, speed and
//! intent, so the player and enemies share the `Agent` trait instead of a
//! common struct.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::spell::{Projectile, SpellKind};
use crate::consts::*;
use crate::{flatten, right_of, yaw_to_forward};

/// Stable entity handle within a session
pub type EntityId = u32;

/// Position, velocity and ground contact of a mobile entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
}

impl KinematicState {
    /// At rest on the floor
    pub fn grounded(position: Vec3) -> Self {
        Self {
            position: Vec3::new(position.x, 0.0, position.z),
            velocity: Vec3::ZERO,
            on_ground: true,
        }
    }

    /// At rest in the air (will fall on the next step)
    pub fn airborne(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
        }
    }
}

impl Default for KinematicState {
    fn default() -> Self {
        Self::grounded(Vec3::ZERO)
    }
}

/// Desired motion for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Horizontal direction, length in [0, 1]
    pub horizontal: Vec3,
    /// Jump request (only honoured while grounded)
    pub jump: bool,
}

/// Capabilities the controller needs from a mobile entity
pub trait Agent {
    fn kinematics(&self) -> &KinematicState;

    /// Collision radius against walls
    fn radius(&self) -> f32;

    /// Horizontal speed (units per second)
    fn speed(&self) -> f32;

    fn intent(&self) -> Intent;

    /// Forward of the agent's local frame, used to orient collision probes.
    /// Zero means "use the travel direction".
    fn facing(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Whether gravity and jumping apply to this agent
    fn uses_vertical(&self) -> bool {
        true
    }
}

/// Movement keys and look direction supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// One-shot: cleared by the session once applied
    pub jump: bool,
    /// Horizontal look direction
    pub facing: Vec3,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            jump: false,
            facing: Vec3::NEG_Z,
        }
    }
}

impl PlayerInput {
    /// Combine movement keys into a horizontal direction (length <= 1)
    pub fn horizontal(&self) -> Vec3 {
        let forward = flatten(self.facing).normalize_or_zero();
        let right = right_of(forward);
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        let dir = forward * axis(self.forward, self.back) + right * axis(self.right, self.left);
        // Diagonals are not faster than straight moves
        dir.clamp_length_max(1.0)
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub kinematics: KinematicState,
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub speed: f32,
    pub radius: f32,
    pub eye_height: f32,
    pub selected_spell: SpellKind,
    pub input: PlayerInput,
}

impl Player {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            kinematics: KinematicState::grounded(position),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            mana: PLAYER_MAX_MANA,
            max_mana: PLAYER_MAX_MANA,
            speed: PLAYER_SPEED,
            radius: PLAYER_RADIUS,
            eye_height: PLAYER_EYE_HEIGHT,
            selected_spell: SpellKind::default(),
            input: PlayerInput::default(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    /// Camera position for the host
    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.kinematics.position + Vec3::Y * self.eye_height
    }

    /// Set the look direction from a yaw angle (radians)
    pub fn set_yaw(&mut self, yaw: f32) {
        self.input.facing = yaw_to_forward(yaw);
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Whether there is enough mana for the selected spell
    #[inline]
    pub fn can_cast(&self) -> bool {
        self.mana >= self.selected_spell.mana_cost()
    }

    /// Launch the selected spell along `aim` if there is enough mana
    pub fn cast(&mut self, id: u32, aim: Vec3) -> Option<Projectile> {
        let spell = self.selected_spell;
        if !self.can_cast() {
            log::debug!(
                "Not enough mana for {} ({:.0} < {:.0})",
                spell.as_str(),
                self.mana,
                spell.mana_cost()
            );
            return None;
        }
        let aim = if aim.length_squared() > 0.0 {
            aim
        } else {
            self.input.facing
        };
        self.mana -= spell.mana_cost();
        log::debug!("Cast {} (mana left {:.0})", spell.as_str(), self.mana);
        Some(Projectile::new(id, spell, self.eye_position(), aim))
    }

    /// Back to full health at `position` (the "continue" after a defeat)
    pub fn revive(&mut self, position: Vec3) {
        self.health = self.max_health;
        self.kinematics = KinematicState::grounded(position);
        self.input = PlayerInput {
            facing: self.input.facing,
            ..Default::default()
        };
    }
}

impl Agent for Player {
    fn kinematics(&self) -> &KinematicState {
        &self.kinematics
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn intent(&self) -> Intent {
        Intent {
            horizontal: self.input.horizontal(),
            jump: self.input.jump,
        }
    }

    fn facing(&self) -> Vec3 {
        self.input.facing
    }
}

/// Enemy species
///
/// Base stats per kind (before level scaling):
///
/// | kind        | speed mult | color    |
/// |-------------|-----------:|----------|
/// | skeleton    | 1.00       | 0xffffff |
/// | rat         | 1.30       | 0x888888 |
/// | gnome       | 1.00       | 0xffc0cb |
/// | snake       | 1.10       | 0x00ff00 |
/// | spider      | 1.25       | 0x000000 |
/// | caterpillar | 0.70       | 0xffff00 |
/// | bear        | 0.80       | 0x8b4513 |
/// | dragon      | 1.00       | 0xff0000 |
///
/// Every kind has 50 health per level and a speed of
/// `(1 + 0.1 * level) * speed_mult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Skeleton,
    Rat,
    Gnome,
    Snake,
    Spider,
    Caterpillar,
    Bear,
    Dragon,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Skeleton,
        EnemyKind::Rat,
        EnemyKind::Gnome,
        EnemyKind::Snake,
        EnemyKind::Spider,
        EnemyKind::Caterpillar,
        EnemyKind::Bear,
        EnemyKind::Dragon,
    ];

    /// Kinds that roam the maze as regular encounters
    pub const MINIONS: [EnemyKind; 7] = [
        EnemyKind::Skeleton,
        EnemyKind::Rat,
        EnemyKind::Gnome,
        EnemyKind::Snake,
        EnemyKind::Spider,
        EnemyKind::Caterpillar,
        EnemyKind::Bear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Rat => "rat",
            EnemyKind::Gnome => "gnome",
            EnemyKind::Snake => "snake",
            EnemyKind::Spider => "spider",
            EnemyKind::Caterpillar => "caterpillar",
            EnemyKind::Bear => "bear",
            EnemyKind::Dragon => "dragon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub const HEALTH_PER_LEVEL: f32 = 50.0;

    pub fn speed_multiplier(self) -> f32 {
        match self {
            EnemyKind::Rat => 1.3,
            EnemyKind::Spider => 1.25,
            EnemyKind::Snake => 1.1,
            EnemyKind::Caterpillar => 0.7,
            EnemyKind::Bear => 0.8,
            EnemyKind::Skeleton | EnemyKind::Gnome | EnemyKind::Dragon => 1.0,
        }
    }

    pub fn base_health(self, level: u32) -> f32 {
        Self::HEALTH_PER_LEVEL * level as f32
    }

    pub fn base_speed(self, level: u32) -> f32 {
        (1.0 + 0.1 * level as f32) * self.speed_multiplier()
    }

    /// Body radius (sphere radius, or box half extent for dragons)
    pub fn body_radius(self, level: u32) -> f32 {
        0.5 * level as f32
    }

    /// Body color (0xRRGGBB) for the renderer
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Skeleton => 0xffffff,
            EnemyKind::Rat => 0x888888,
            EnemyKind::Gnome => 0xffc0cb,
            EnemyKind::Snake => 0x00ff00,
            EnemyKind::Spider => 0x000000,
            EnemyKind::Caterpillar => 0xffff00,
            EnemyKind::Bear => 0x8b4513,
            EnemyKind::Dragon => 0xff0000,
        }
    }
}

/// Largest radius an enemy uses against walls, so big bodies still fit
/// through one-cell corridors
pub const ENEMY_MAX_WALL_RADIUS: f32 = 0.9;

/// A hostile agent chasing a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub level: u32,
    pub health: f32,
    pub speed: f32,
    /// Body size for hits, contact and rendering
    pub body_radius: f32,
    pub kinematics: KinematicState,
    /// Entity this enemy chases
    pub target: Option<EntityId>,
    /// Target position resolved at the start of the current tick
    #[serde(skip)]
    pub target_position: Option<Vec3>,
    /// Set for bosses
    pub boss_name: Option<String>,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, level: u32, position: Vec3) -> Self {
        Self {
            id,
            kind,
            level,
            health: kind.base_health(level),
            speed: kind.base_speed(level),
            body_radius: kind.body_radius(level),
            kinematics: KinematicState::grounded(position),
            target: None,
            target_position: None,
            boss_name: None,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        self.boss_name.is_some()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Display name: boss name, else the kind
    pub fn name(&self) -> &str {
        self.boss_name.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Horizontal overlap with a body of `radius` at `point`
    ///
    /// Bodies are upright columns of `body_radius`: height is ignored, so a
    /// spell flying level at eye height still strikes a rat on the floor.
    pub fn touches(&self, point: Vec3, radius: f32) -> bool {
        let reach = self.body_radius + radius;
        flatten(point - self.position()).length_squared() < reach * reach
    }

    /// Horizontal unit vector toward the resolved target, or zero when the
    /// target is unknown or within the arrival epsilon
    pub fn steering(&self) -> Vec3 {
        let Some(target) = self.target_position else {
            return Vec3::ZERO;
        };
        let to_target = flatten(target - self.position());
        if to_target.length_squared() <= ARRIVAL_EPSILON_SQ {
            return Vec3::ZERO;
        }
        to_target.normalize_or_zero()
    }
}

impl Agent for Enemy {
    fn kinematics(&self) -> &KinematicState {
        &self.kinematics
    }

    fn radius(&self) -> f32 {
        self.body_radius.min(ENEMY_MAX_WALL_RADIUS)
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn intent(&self) -> Intent {
        Intent {
            horizontal: self.steering(),
            jump: false,
        }
    }

    fn uses_vertical(&self) -> bool {
        false
    }
}
