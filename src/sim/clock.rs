//! Frame-to-tick conversion
//!
//! Hosts call [`FixedStep::run`] once per rendered frame; the accumulator
//! turns variable frame deltas into whole fixed ticks.

use serde::{Deserialize, Serialize};

use super::session::Session;
use super::tick::{TickInput, tick};
use crate::consts::*;

/// Fixed timestep accumulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    /// Seconds per tick
    pub step: f32,
    /// Most ticks run for a single frame (spiral-of-death guard)
    pub max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Seconds banked toward the next tick
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Interpolation factor between the last two ticks (0..1)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// Drop banked time (after a pause or tab switch)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Bank a frame delta and return how many ticks are due
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !(frame_dt > 0.0 && frame_dt.is_finite()) {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }

    /// Run the ticks due for this frame, clearing one-shot inputs after the
    /// first tick that sees them
    pub fn run(&mut self, session: &mut Session, input: &mut TickInput, frame_dt: f32) -> u32 {
        let substeps = self.advance(frame_dt);
        for _ in 0..substeps {
            tick(session, input, self.step);
            input.clear_one_shots();
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert!((clock.pending() - SIM_DT * 0.1).abs() < 1e-6);
        assert!(clock.alpha() > 0.0 && clock.alpha() < 0.2);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FixedStep::default();
        // A 2 s hitch only banks MAX_FRAME_DT worth of ticks
        let ticks = clock.advance(2.0);
        assert!(ticks <= MAX_SUBSTEPS);
        assert!(ticks as f32 * SIM_DT <= MAX_FRAME_DT + 1e-6);
    }

    #[test]
    fn test_substep_cap() {
        let mut clock = FixedStep::new(0.01, 3);
        assert_eq!(clock.advance(0.1), 3);
        // The rest stays banked
        assert!(clock.pending() > 0.06);
        clock.reset();
        assert_eq!(clock.pending(), 0.0);
    }

    #[test]
    fn test_invalid_frame_dt() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::INFINITY), 0);
        assert_eq!(clock.pending(), 0.0);
    }

    #[test]
    fn test_run_clears_one_shots() {
        let config = SimConfig {
            enemy_count: 0,
            spawn_boss: false,
            ..Default::default()
        };
        let mut session = Session::new(config, 3).unwrap();
        let mut clock = FixedStep::default();
        let mut input = TickInput {
            cast: true,
            forward: true,
            ..Default::default()
        };

        // Several ticks in one frame still cast only once
        let ticks = clock.run(&mut session, &mut input, SIM_DT * 3.5);
        assert_eq!(ticks, 3);
        assert_eq!(session.time_ticks, 3);
        assert!(session.projectiles.len() <= 1);
        assert!(!input.cast);
        // Held keys survive
        assert!(input.forward);
    }
}
