//! Simulation tuning and difficulty presets
//!
//! Stored as JSON: in LocalStorage on the web, or in the file named by
//! `TORCHLIT_CONFIG` for native runs.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, GenerationError};
use crate::sim::agent::EnemyKind;
use crate::sim::controller::Physics;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "med" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Level scalar applied to regular enemies
    pub fn enemy_level(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Number of regular enemies per level
    pub fn enemy_count(&self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Normal => 8,
            Difficulty::Hard => 14,
        }
    }
}

/// Everything needed to build and run a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub difficulty: Difficulty,

    // === Maze ===
    pub maze_width: usize,
    pub maze_height: usize,
    /// Probability an interior cell is a wall (0.0 - 1.0)
    pub wall_density: f32,
    /// World units per cell
    pub cell_size: f32,
    pub wall_height: f32,

    // === Player ===
    pub player_speed: f32,
    pub player_radius: f32,
    pub eye_height: f32,

    // === Physics ===
    pub gravity: f32,
    pub jump_speed: f32,
    pub terminal_velocity: f32,

    // === Encounter ===
    pub enemy_count: usize,
    pub enemy_kinds: Vec<EnemyKind>,
    pub spawn_boss: bool,
    /// Fixed boss name (random from the pool when unset)
    pub boss_name: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_preset(Difficulty::default())
    }
}

impl SimConfig {
    /// Create a config from a difficulty preset (applies preset defaults)
    pub fn from_preset(difficulty: Difficulty) -> Self {
        Self {
            difficulty,

            maze_width: MAZE_WIDTH,
            maze_height: MAZE_HEIGHT,
            wall_density: WALL_DENSITY,
            cell_size: CELL_SIZE,
            wall_height: WALL_HEIGHT,

            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_RADIUS,
            eye_height: PLAYER_EYE_HEIGHT,

            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
            terminal_velocity: TERMINAL_VELOCITY,

            enemy_count: difficulty.enemy_count(),
            enemy_kinds: EnemyKind::MINIONS.to_vec(),
            // Easy runs have no boss
            spawn_boss: difficulty != Difficulty::Easy,
            boss_name: None,
        }
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.enemy_count = difficulty.enemy_count();
        self.spawn_boss = difficulty != Difficulty::Easy;
    }

    /// Gravity and jump tuning for the controller
    pub fn physics(&self) -> Physics {
        Physics {
            gravity: self.gravity,
            jump_speed: self.jump_speed,
            terminal_velocity: self.terminal_velocity,
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.maze_width < 3 || self.maze_height < 3 {
            return Err(GenerationError::InvalidDimensions {
                width: self.maze_width,
                height: self.maze_height,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(GenerationError::parameter(
                "wall_density",
                format!("{} is outside [0, 1]", self.wall_density),
            ));
        }
        let positive = [
            ("cell_size", self.cell_size),
            ("wall_height", self.wall_height),
            ("player_speed", self.player_speed),
            ("player_radius", self.player_radius),
            ("gravity", self.gravity),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(GenerationError::parameter(name, format!("{value} must be > 0")));
            }
        }
        if self.player_radius >= self.cell_size / 2.0 {
            return Err(GenerationError::parameter(
                "player_radius",
                "player must fit through a one-cell corridor",
            ));
        }
        if !(self.terminal_velocity < 0.0) {
            return Err(GenerationError::parameter(
                "terminal_velocity",
                "must be negative (downward)",
            ));
        }
        if self.enemy_count > 0 && self.enemy_kinds.is_empty() {
            return Err(GenerationError::parameter(
                "enemy_kinds",
                "at least one enemy kind is required",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    ///
    /// Missing fields take defaults; the difficulty-dependent ones
    /// (`enemy_count`, `spawn_boss`) follow the parsed difficulty's preset.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let mut config = Self::deserialize(&value)?;
        let preset = Self::from_preset(config.difficulty);
        if value.get("enemy_count").is_none() {
            config.enemy_count = preset.enemy_count;
        }
        if value.get("spawn_boss").is_none() {
            config.spawn_boss = preset.spawn_boss;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "torchlit_depths_config";

    /// Environment variable naming a native config file
    pub const CONFIG_ENV: &'static str = "TORCHLIT_CONFIG";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {e}"),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Load config from the file named by `TORCHLIT_CONFIG`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            log::info!("Using default config");
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    /// Read and validate a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
