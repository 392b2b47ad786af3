//! Fixed timestep simulation tick
//!
//! Advances a session deterministically: player first, then enemies chasing
//! the player's position from the start of the tick, then spells, then
//! contact damage.

use glam::Vec3;

use super::agent::EntityId;
use super::controller::step_with;
use super::session::{RunPhase, Session};
use super::spell::SpellKind;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Jump (one-shot)
    pub jump: bool,
    /// Look yaw in radians (from mouse/pointer lock)
    pub yaw: Option<f32>,
    /// Cast the selected spell (one-shot)
    pub cast: bool,
    /// Pick a spell directly
    pub select_spell: Option<SpellKind>,
    /// Cycle to the next spell (one-shot)
    pub next_spell: bool,
    /// Pause toggle
    pub pause: bool,
    /// Continue after a defeat
    pub continue_run: bool,
}

impl TickInput {
    /// Clear inputs that must only apply to one tick
    pub fn clear_one_shots(&mut self) {
        self.jump = false;
        self.cast = false;
        self.select_spell = None;
        self.next_spell = false;
        self.pause = false;
        self.continue_run = false;
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match session.phase {
            RunPhase::Playing => {
                session.phase = RunPhase::Paused;
                log::info!("Paused");
                return;
            }
            RunPhase::Paused => {
                session.phase = RunPhase::Playing;
                log::info!("Resumed");
            }
            RunPhase::GameOver => {}
        }
    }

    match session.phase {
        RunPhase::Paused => return,
        RunPhase::GameOver => {
            if input.continue_run {
                session.continue_run();
            }
            return;
        }
        RunPhase::Playing => {}
    }

    if !(dt > 0.0 && dt.is_finite()) {
        log::warn!("Ignoring tick with dt={dt}");
        return;
    }

    session.time_ticks += 1;

    // Enemies chase where the player stood when the tick began
    let player_id = session.player.id;
    let player_snapshot = session.player.position();

    apply_player_input(session, input);

    let physics = session.config.physics();
    let next = step_with(&session.player, dt, &session.obstacles, &physics);
    session.player.kinematics = next;
    // Jump is consumed once applied
    session.player.input.jump = false;

    step_enemies(session, player_id, player_snapshot, dt);
    update_projectiles(session, dt);
    apply_contact_damage(session, dt);
}

fn apply_player_input(session: &mut Session, input: &TickInput) {
    let player = &mut session.player;
    if let Some(yaw) = input.yaw {
        player.set_yaw(yaw);
    }
    player.input.forward = input.forward;
    player.input.back = input.back;
    player.input.left = input.left;
    player.input.right = input.right;
    player.input.jump |= input.jump;

    if let Some(spell) = input.select_spell {
        player.selected_spell = spell;
    } else if input.next_spell {
        player.selected_spell = player.selected_spell.next();
    }

    if input.cast {
        if session.player.can_cast() {
            let id = session.next_entity_id();
            let aim = session.player.input.facing;
            session.projectiles.extend(session.player.cast(id, aim));
        } else {
            log::debug!(
                "Cast ignored: {:.0} mana, {} needs {:.0}",
                session.player.mana,
                session.player.selected_spell.as_str(),
                session.player.selected_spell.mana_cost()
            );
        }
    }
}

fn step_enemies(session: &mut Session, player_id: EntityId, player_snapshot: Vec3, dt: f32) {
    // Resolve every target before anyone moves
    let targets: Vec<Option<Vec3>> = session
        .enemies
        .iter()
        .map(|e| match e.target {
            Some(id) if id == player_id => Some(player_snapshot),
            Some(id) => session.position_of(id),
            None => None,
        })
        .collect();

    let physics = session.config.physics();
    for (enemy, target) in session.enemies.iter_mut().zip(targets) {
        enemy.target_position = target;
        enemy.kinematics = step_with(&*enemy, dt, &session.obstacles, &physics);
    }
}

fn update_projectiles(session: &mut Session, dt: f32) {
    let mut projectiles = std::mem::take(&mut session.projectiles);

    projectiles.retain_mut(|p| {
        if !p.advance(dt, &session.obstacles) {
            return false;
        }
        // First enemy in id order takes the hit
        match session
            .enemies
            .iter_mut()
            .find(|e| e.touches(p.position, PROJECTILE_RADIUS))
        {
            Some(enemy) => {
                enemy.take_damage(p.spell.damage());
                log::debug!(
                    "{} hit {} for {:.0} ({:.0} left)",
                    p.spell.as_str(),
                    enemy.name(),
                    p.spell.damage(),
                    enemy.health
                );
                false
            }
            None => true,
        }
    });
    session.projectiles = projectiles;

    let before = session.enemies.len();
    session.enemies.retain(|e| {
        if e.is_dead() {
            log::info!("{} (id {}) slain", e.name(), e.id);
        }
        !e.is_dead()
    });
    session.kills += (before - session.enemies.len()) as u32;
}

fn apply_contact_damage(session: &mut Session, dt: f32) {
    let player_pos = session.player.position();
    let player_radius = session.player.radius;

    let dps: f32 = session
        .enemies
        .iter()
        .filter(|e| e.touches(player_pos, player_radius))
        .map(|e| {
            let scale = if e.is_boss() { 2.0 } else { 1.0 };
            CONTACT_DPS_PER_LEVEL * e.level as f32 * scale
        })
        .sum();
    if dps <= 0.0 {
        return;
    }

    session.player.take_damage(dps * dt);
    if session.player.is_dead() {
        session.phase = RunPhase::GameOver;
        log::info!(
            "Game over at tick {} ({} enemies slain)",
            session.time_ticks,
            session.kills
        );
    }
}
