//! Level session: the maze, its walls and everything living in it
//!
//! All state that must be persisted to resume a run lives here. The session
//! owns the projectile list; nothing in the simulation is global.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, Enemy, EntityId, Player};
use super::encounter::{SpawnBounds, spawn_boss, spawn_enemies};
use super::grid::Grid;
use super::obstacle::{Obstacle, obstacles_from_grid};
use super::spell::Projectile;
use crate::config::SimConfig;
use crate::error::{GenerationError, SaveError};
use crate::{flatten, yaw_to_forward};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen until unpaused
    Paused,
    /// Player died; waiting for "continue"
    GameOver,
}

/// Complete level state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Level seed for reproducibility
    pub seed: u64,
    pub config: SimConfig,
    pub grid: Grid,
    /// Derived from the grid; rebuilt after loading
    #[serde(skip)]
    pub(super) obstacles: Vec<Obstacle>,
    pub player: Player,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Spells in flight (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    /// Where the player starts and respawns
    pub start_position: Vec3,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: RunPhase,
    /// Enemies slain this run
    pub kills: u32,
    /// Next entity ID
    next_id: EntityId,
}

impl Session {
    /// Build a level from a config and seed
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, GenerationError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);

        let grid = Grid::generate(
            config.maze_width,
            config.maze_height,
            config.wall_density,
            &mut rng,
        )?;
        let obstacles = obstacles_from_grid(&grid, config.cell_size, config.wall_height);

        let (sx, sy) = start_cell(&grid);
        let start_position = Grid::cell_to_world(sx, sy, config.cell_size);

        let mut player = Player::new(1, start_position);
        player.speed = config.player_speed;
        player.radius = config.player_radius;
        player.eye_height = config.eye_height;
        // Face into the maze (+Z)
        player.input.facing = yaw_to_forward(std::f32::consts::PI);

        let mut session = Self {
            seed,
            config,
            grid,
            obstacles,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            start_position,
            time_ticks: 0,
            phase: RunPhase::Playing,
            kills: 0,
            next_id: 2,
        };
        session.spawn_encounter(&mut rng)?;

        log::info!(
            "Level ready: seed {}, {}x{} maze, {} walls, {} enemies",
            seed,
            session.grid.width(),
            session.grid.height(),
            session.obstacles.len(),
            session.enemies.len()
        );
        Ok(session)
    }

    fn spawn_encounter(&mut self, rng: &mut Pcg32) -> Result<(), GenerationError> {
        let cell = self.config.cell_size;
        let (w, h) = (self.grid.width(), self.grid.height());
        let bounds = SpawnBounds::new(
            Grid::cell_to_world(1, 1, cell),
            Grid::cell_to_world(w - 2, h - 2, cell),
        );

        let mut enemies = spawn_enemies(
            self.config.enemy_count,
            self.config.difficulty.enemy_level(),
            &bounds,
            &self.config.enemy_kinds,
            self.next_id,
            rng,
        )?;
        self.next_id += enemies.len() as EntityId;

        if self.config.spawn_boss {
            let lair = self.farthest_open_cell(self.start_position);
            let id = self.next_entity_id();
            enemies.push(spawn_boss(id, lair, self.config.boss_name.as_deref(), rng));
        }

        for enemy in &mut enemies {
            enemy.target = Some(self.player.id);
            let settled = self.settle(enemy);
            enemy.kinematics.position = settled;
        }

        self.enemies = enemies;
        self.normalize_order();
        Ok(())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Wall volumes for collision and rendering
    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Position of any live entity
    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        if id == self.player.id {
            return Some(self.player.position());
        }
        self.enemy(id).map(Enemy::position)
    }

    /// Restore the player after a defeat (the "continue" button)
    pub fn continue_run(&mut self) {
        if self.phase != RunPhase::GameOver {
            return;
        }
        self.player.revive(self.start_position);
        self.phase = RunPhase::Playing;
        log::info!("Run continued at tick {}", self.time_ticks);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// Where an enemy may stand: its spawn point when that is clear of walls
    /// and out of reach of the player start, else the nearest open cell
    /// centre that is
    fn settle(&self, enemy: &Enemy) -> Vec3 {
        let pos = enemy.position();
        let wall_radius = enemy.radius();
        let reach = enemy.body_radius + self.player.radius;
        let clear_of_start =
            |p: Vec3| flatten(p - self.start_position).length_squared() >= reach * reach;
        let clear_of_walls = self
            .obstacles
            .iter()
            .all(|o| o.axis_distance(pos) >= o.radius + wall_radius);
        if clear_of_walls && clear_of_start(pos) {
            return pos;
        }
        self.open_cell_centres()
            .filter(|&c| clear_of_start(c))
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)))
            .unwrap_or(pos)
    }

    fn open_cell_centres(&self) -> impl Iterator<Item = Vec3> + '_ {
        let cell = self.config.cell_size;
        self.grid
            .interior()
            .filter(|&(x, y)| !self.grid.is_wall(x, y))
            .map(move |(x, y)| Grid::cell_to_world(x, y, cell))
    }

    fn farthest_open_cell(&self, from: Vec3) -> Vec3 {
        self.open_cell_centres()
            .max_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
            .unwrap_or_else(|| {
                let (x, y) = self.grid.exits()[1];
                Grid::cell_to_world(x, y, self.config.cell_size)
            })
    }

    /// Serialize for host-side persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a saved session, rebuilding derived wall volumes
    ///
    /// The grid shape is checked while parsing; the embedded config must
    /// still pass validation.
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let mut session: Self = serde_json::from_str(json)?;
        session.config.validate()?;
        session.obstacles =
            obstacles_from_grid(&session.grid, session.config.cell_size, session.config.wall_height);
        session.normalize_order();
        Ok(session)
    }
}

/// First open interior cell in row-major order, else the top exit
fn start_cell(grid: &Grid) -> (usize, usize) {
    grid.interior()
        .find(|&(x, y)| !grid.is_wall(x, y))
        .unwrap_or(grid.exits()[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crate::sim::encounter::BOSS_NAMES;

    #[test]
    fn test_new_session_layout() {
        let session = Session::new(SimConfig::default(), 12345).unwrap();
        assert_eq!(session.phase, RunPhase::Playing);
        assert_eq!(session.grid.width(), 20);
        assert_eq!(session.obstacles().len(), session.grid.wall_count());

        // Regular enemies plus the boss, all chasing the player
        assert_eq!(session.enemies.len(), 8 + 1);
        assert!(session.enemies.iter().all(|e| e.target == Some(session.player.id)));
        let boss = session.boss().unwrap();
        assert!(BOSS_NAMES.contains(&boss.name()));

        // Ids are unique
        let mut ids: Vec<_> = session.enemies.iter().map(|e| e.id).collect();
        ids.push(session.player.id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_player_starts_in_open_cell() {
        let session = Session::new(SimConfig::default(), 99).unwrap();
        let cell = session
            .grid
            .world_to_cell(session.player.position(), session.config.cell_size)
            .unwrap();
        assert!(!session.grid.is_wall(cell.0, cell.1));
        assert_eq!(session.player.position(), session.start_position);
        assert!(session.player.kinematics.on_ground);
    }

    #[test]
    fn test_enemies_clear_of_walls() {
        for seed in 0..10 {
            let session = Session::new(SimConfig::from_preset(Difficulty::Hard), seed).unwrap();
            for enemy in &session.enemies {
                let clear = session
                    .obstacles()
                    .iter()
                    .all(|o| o.axis_distance(enemy.position()) >= o.radius + enemy.radius());
                assert!(clear, "enemy {} spawned inside a wall", enemy.id);
            }
        }
    }

    #[test]
    fn test_enemies_spawn_out_of_reach_of_player() {
        let config = SimConfig {
            maze_width: 7,
            maze_height: 7,
            wall_density: 0.0,
            enemy_count: 40,
            ..SimConfig::from_preset(Difficulty::Hard)
        };
        for seed in 0..5 {
            let session = Session::new(config.clone(), seed).unwrap();
            let start = session.start_position;
            for enemy in &session.enemies {
                assert!(
                    !enemy.touches(start, session.player.radius),
                    "enemy {} starts on the player",
                    enemy.id
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = Session::new(SimConfig::default(), 7).unwrap();
        let b = Session::new(SimConfig::default(), 7).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (x, y) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(x.position(), y.position());
            assert_eq!(x.kind, y.kind);
        }
    }

    #[test]
    fn test_easy_has_no_boss() {
        let session = Session::new(SimConfig::from_preset(Difficulty::Easy), 1).unwrap();
        assert!(session.boss().is_none());
        assert_eq!(session.enemies.len(), 4);

        let loaded = SimConfig::from_json(r#"{ "difficulty": "Easy" }"#).unwrap();
        let session = Session::new(loaded, 1).unwrap();
        assert!(session.boss().is_none());
        assert_eq!(session.enemies.len(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig {
            maze_width: 1,
            ..Default::default()
        };
        assert!(matches!(
            Session::new(config, 0),
            Err(GenerationError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_solid_interior_falls_back_to_exits() {
        let config = SimConfig {
            maze_width: 7,
            maze_height: 7,
            wall_density: 1.0,
            enemy_count: 0,
            ..Default::default()
        };
        let session = Session::new(config, 5).unwrap();
        assert_eq!(session.start_position, Grid::cell_to_world(3, 0, 2.0));
        // Boss falls back to the bottom exit
        assert_eq!(session.boss().unwrap().position(), Grid::cell_to_world(3, 6, 2.0));
    }

    #[test]
    fn test_json_roundtrip_rebuilds_obstacles() {
        let session = Session::new(SimConfig::default(), 31).unwrap();
        let json = session.to_json().unwrap();
        let restored = Session::from_json(&json).unwrap();
        assert_eq!(restored.grid, session.grid);
        assert_eq!(restored.obstacles(), session.obstacles());
        assert_eq!(restored.player.position(), session.player.position());
        assert_eq!(restored.enemies.len(), session.enemies.len());
    }

    #[test]
    fn test_restore_rejects_malformed_saves() {
        let session = Session::new(SimConfig::default(), 31).unwrap();
        let json = session.to_json().unwrap();
        let mut save: serde_json::Value = serde_json::from_str(&json).unwrap();

        let mut short = save.clone();
        short["grid"]["cells"].as_array_mut().unwrap().truncate(10);
        assert!(matches!(
            Session::from_json(&short.to_string()),
            Err(SaveError::Parse(_))
        ));

        save["config"]["cell_size"] = serde_json::json!(0.0);
        assert!(matches!(
            Session::from_json(&save.to_string()),
            Err(SaveError::Invalid(GenerationError::InvalidParameter {
                name: "cell_size",
                ..
            }))
        ));

        assert!(matches!(Session::from_json("{ nope"), Err(SaveError::Parse(_))));
    }

    #[test]
    fn test_position_of() {
        let session = Session::new(SimConfig::default(), 2).unwrap();
        assert_eq!(
            session.position_of(session.player.id),
            Some(session.player.position())
        );
        let first = &session.enemies[0];
        assert_eq!(session.position_of(first.id), Some(first.position()));
        assert_eq!(session.position_of(9999), None);
    }
}
