//! Browser bindings
//!
//! The renderer owns the canvas, camera and meshes. Each animation frame it
//! pushes input, calls `frame(dt)` and reads back flat buffers.

use wasm_bindgen::prelude::*;

use super::position_buffer;
use crate::config::SimConfig;
use crate::sim::{
    FixedStep, RunPhase, Session, SpellKind, TickInput, ground_speed, instance_buffer,
};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Torchlit Depths core loaded");
}

/// A running level driven by the JavaScript host
#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    clock: FixedStep,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSession {
    /// Build a level from the stored config; a missing seed uses the clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<WebSession, JsValue> {
        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let config = SimConfig::load();
        let session = Session::new(config, seed).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            session,
            clock: FixedStep::default(),
            input: TickInput::default(),
        })
    }

    /// Restore a session saved with `save()`
    pub fn restore(json: &str) -> Result<WebSession, JsValue> {
        let session = Session::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            session,
            clock: FixedStep::default(),
            input: TickInput::default(),
        })
    }

    pub fn save(&self) -> Result<String, JsValue> {
        self.session
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // === Input ===

    pub fn set_movement(&mut self, forward: bool, back: bool, left: bool, right: bool) {
        self.input.forward = forward;
        self.input.back = back;
        self.input.left = left;
        self.input.right = right;
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.input.yaw = Some(yaw);
    }

    pub fn jump(&mut self) {
        self.input.jump = true;
    }

    pub fn cast(&mut self) {
        self.input.cast = true;
    }

    /// Select a spell by book slot (0-based); unknown slots are ignored
    pub fn select_spell(&mut self, slot: usize) {
        self.input.select_spell = SpellKind::from_slot(slot);
    }

    pub fn next_spell(&mut self) {
        self.input.next_spell = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
        self.clock.reset();
    }

    pub fn continue_run(&mut self) {
        self.input.continue_run = true;
    }

    /// Advance by a frame delta in seconds; returns ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.clock.run(&mut self.session, &mut self.input, dt)
    }

    // === Readback ===

    /// `[x, y, z, half_extent, height]` per wall
    pub fn obstacle_instances(&self) -> Vec<f32> {
        instance_buffer(self.session.obstacles())
    }

    pub fn eye_position(&self) -> Vec<f32> {
        self.session.player.eye_position().to_array().to_vec()
    }

    pub fn player_position(&self) -> Vec<f32> {
        self.session.player.position().to_array().to_vec()
    }

    /// Horizontal speed, for walk bob and footstep timing
    pub fn player_ground_speed(&self) -> f32 {
        ground_speed(&self.session.player.kinematics)
    }

    /// `[x, y, z]` per enemy, in id order
    pub fn enemy_positions(&self) -> Vec<f32> {
        position_buffer(self.session.enemies.iter().map(|e| e.position()))
    }

    /// `[radius, color]` per enemy, in id order
    pub fn enemy_styles(&self) -> Vec<f32> {
        self.session
            .enemies
            .iter()
            .flat_map(|e| [e.body_radius, e.kind.color() as f32])
            .collect()
    }

    /// `[x, y, z]` per projectile
    pub fn projectile_positions(&self) -> Vec<f32> {
        position_buffer(self.session.projectiles.iter().map(|p| p.position))
    }

    pub fn projectile_colors(&self) -> Vec<u32> {
        self.session.projectiles.iter().map(|p| p.spell.color()).collect()
    }

    pub fn health(&self) -> f32 {
        self.session.player.health
    }

    pub fn mana(&self) -> f32 {
        self.session.player.mana
    }

    pub fn selected_spell(&self) -> String {
        self.session.player.selected_spell.as_str().to_string()
    }

    pub fn boss_name(&self) -> Option<String> {
        self.session.boss().map(|b| b.name().to_string())
    }

    pub fn kills(&self) -> u32 {
        self.session.kills
    }

    pub fn phase(&self) -> String {
        match self.session.phase {
            RunPhase::Playing => "playing",
            RunPhase::Paused => "paused",
            RunPhase::GameOver => "game_over",
        }
        .to_string()
    }

    pub fn ascii_map(&self) -> String {
        self.session.grid.to_ascii()
    }
}
