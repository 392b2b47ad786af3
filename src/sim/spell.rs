//! Spells and the projectiles they launch

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::raycast;
use super::obstacle::Obstacle;
use crate::consts::*;

/// The player's spell book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpellKind {
    IceCannon,
    #[default]
    FireBall,
    ThunderBolt,
}

impl SpellKind {
    pub const ALL: [SpellKind; 3] = [
        SpellKind::IceCannon,
        SpellKind::FireBall,
        SpellKind::ThunderBolt,
    ];

    pub fn mana_cost(self) -> f32 {
        match self {
            SpellKind::IceCannon => 20.0,
            SpellKind::FireBall => 15.0,
            SpellKind::ThunderBolt => 25.0,
        }
    }

    pub fn damage(self) -> f32 {
        match self {
            SpellKind::IceCannon => 30.0,
            SpellKind::FireBall => 25.0,
            SpellKind::ThunderBolt => 35.0,
        }
    }

    /// Projectile color (0xRRGGBB) for the renderer
    pub fn color(self) -> u32 {
        match self {
            SpellKind::IceCannon => 0x00ffff,
            SpellKind::FireBall => 0xff4500,
            SpellKind::ThunderBolt => 0xffff00,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpellKind::IceCannon => "Ice Cannon",
            SpellKind::FireBall => "Fire Ball",
            SpellKind::ThunderBolt => "Thunder Bolt",
        }
    }

    /// Next spell in the book (wraps)
    pub fn next(self) -> Self {
        match self {
            SpellKind::IceCannon => SpellKind::FireBall,
            SpellKind::FireBall => SpellKind::ThunderBolt,
            SpellKind::ThunderBolt => SpellKind::IceCannon,
        }
    }

    /// Spell by book slot (0-based)
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }
}

/// A spell in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub spell: SpellKind,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds until the projectile fizzles
    pub remaining_lifetime: f32,
}

impl Projectile {
    pub fn new(id: u32, spell: SpellKind, position: Vec3, direction: Vec3) -> Self {
        Self {
            id,
            spell,
            position,
            velocity: direction.normalize_or_zero() * PROJECTILE_SPEED,
            remaining_lifetime: PROJECTILE_LIFETIME,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.remaining_lifetime > 0.0
    }

    /// Move one tick; returns false once the projectile is spent
    ///
    /// A projectile that would reach a wall during this tick stops there and
    /// is spent.
    pub fn advance(&mut self, dt: f32, obstacles: &[Obstacle]) -> bool {
        let travel = self.velocity * dt;
        let dist = travel.length();
        if let Some(hit) = raycast(self.position, travel, dist + PROJECTILE_RADIUS, obstacles) {
            let dir = travel / dist;
            self.position += dir * (hit.distance - PROJECTILE_RADIUS).max(0.0);
            self.remaining_lifetime = 0.0;
            return false;
        }
        self.position += travel;
        self.remaining_lifetime -= dt;
        self.is_alive()
    }
}
