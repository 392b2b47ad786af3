//! Enemy and boss placement
//!
//! Stateless: everything random comes from the caller's RNG so a seeded
//! session always spawns the same encounter.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::{Enemy, EnemyKind, EntityId};
use crate::error::GenerationError;

/// Boss names, one picked per boss
pub const BOSS_NAMES: [&str; 5] = ["Smolder", "Fang", "Ember", "Drako", "Inferno"];

/// Boss stat overrides (independent of difficulty)
pub const BOSS_LEVEL: u32 = 10;
pub const BOSS_HEALTH: f32 = 200.0;
pub const BOSS_SPEED: f32 = 0.5;
/// 1.5 sphere scaled 3x
pub const BOSS_RADIUS: f32 = 4.5;

/// Horizontal spawn area; enemies always stand on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpawnBounds {
    /// Bounds spanning two corners in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Check if a point lies within the horizontal footprint
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    fn validate(&self) -> Result<(), GenerationError> {
        let finite = self.min.is_finite() && self.max.is_finite();
        if !finite || self.min.x > self.max.x || self.min.z > self.max.z {
            return Err(GenerationError::parameter(
                "bounds",
                format!("{:?}..{:?} is not a valid area", self.min, self.max),
            ));
        }
        Ok(())
    }

    /// Uniform floor position inside the bounds
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let x = rng.random_range(self.min.x..=self.max.x);
        let z = rng.random_range(self.min.z..=self.max.z);
        Vec3::new(x, 0.0, z)
    }
}

/// Spawn `count` enemies of `level`, ids counting up from `first_id`
///
/// Each enemy gets a uniform position in `bounds` and a uniform kind from
/// `kinds`; health and speed follow the kind's base table.
pub fn spawn_enemies<R: Rng + ?Sized>(
    count: usize,
    level: u32,
    bounds: &SpawnBounds,
    kinds: &[EnemyKind],
    first_id: EntityId,
    rng: &mut R,
) -> Result<Vec<Enemy>, GenerationError> {
    if level == 0 {
        return Err(GenerationError::parameter("level", "must be at least 1"));
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    if kinds.is_empty() {
        return Err(GenerationError::parameter(
            "kinds",
            "at least one enemy kind is required",
        ));
    }
    bounds.validate()?;

    let enemies: Vec<Enemy> = (0..count)
        .map(|i| {
            let position = bounds.sample(rng);
            let kind = kinds[rng.random_range(0..kinds.len())];
            Enemy::new(first_id + i as EntityId, kind, level, position)
        })
        .collect();

    log::debug!("Spawned {} enemies at level {}", enemies.len(), level);
    Ok(enemies)
}

/// Spawn the level boss
///
/// The name is `name` when given, otherwise drawn from [`BOSS_NAMES`].
pub fn spawn_boss<R: Rng + ?Sized>(
    id: EntityId,
    position: Vec3,
    name: Option<&str>,
    rng: &mut R,
) -> Enemy {
    let name = match name {
        Some(name) => name.to_string(),
        None => BOSS_NAMES[rng.random_range(0..BOSS_NAMES.len())].to_string(),
    };

    let mut boss = Enemy::new(id, EnemyKind::Dragon, BOSS_LEVEL, position);
    boss.health = BOSS_HEALTH;
    boss.speed = BOSS_SPEED;
    boss.body_radius = BOSS_RADIUS;
    log::info!("Boss {} awaits at ({:.1}, {:.1})", name, position.x, position.z);
    boss.boss_name = Some(name);
    boss
}
