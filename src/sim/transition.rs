//! Eased point-to-point transition
//!
//! Moves an entity from where it is to a target over a fixed number of ticks,
//! following a cosine ease-in/ease-out curve.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cosine S-curve: ease(0) = 0, ease(1) = 1
#[inline]
pub fn ease(u: f32) -> f32 {
    0.5 - 0.5 * (u * std::f32::consts::PI).cos()
}

/// An in-flight transition owned by exactly one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    start: Vec2,
    end: Vec2,
    steps: u32,
    current: u32,
}

impl Transition {
    /// Transition from `start` to `end` over `steps` ticks (at least one)
    pub fn new(start: Vec2, end: Vec2, steps: u32) -> Self {
        Self {
            start,
            end,
            steps: steps.max(1),
            current: 0,
        }
    }

    /// Advance one tick and return the eased position
    pub fn advance(&mut self) -> Vec2 {
        self.current += 1;
        if self.is_finished() {
            return self.end;
        }
        let value = ease(self.current as f32 / self.steps as f32);
        self.start + (self.end - self.start) * value
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::model::step_transition;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert!((ease(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_monotonic() {
        let mut last = ease(0.0);
        for i in 1..=1000 {
            let v = ease(i as f32 / 1000.0);
            assert!(v >= last, "ease decreased at {i}: {v} < {last}");
            last = v;
        }
    }

    #[test]
    fn test_single_step_lands_and_detaches() {
        let end = Vec2::new(0.1234567, -0.7654321);
        let mut slot = Some(Transition::new(Vec2::new(0.3, 0.3), end, 1));
        let mut pos = Vec2::ZERO;

        assert!(step_transition(&mut slot, &mut pos));
        assert_eq!(pos, end);
        assert!(slot.is_none());
        assert!(!step_transition(&mut slot, &mut pos));
    }

    #[test]
    fn test_multi_step_is_eased() {
        let start = Vec2::new(-0.5, 0.0);
        let end = Vec2::new(0.5, 0.0);
        let mut t = Transition::new(start, end, 4);

        let first = t.advance();
        let second = t.advance();
        assert!(first.x > start.x && first.x < second.x);
        // Halfway through the ticks is halfway along the path
        assert!(second.x.abs() < 1e-6);
        t.advance();
        assert!(!t.is_finished());
        assert_eq!(t.advance(), end);
        assert!(t.is_finished());
    }

    #[test]
    fn test_zero_steps_treated_as_one() {
        let mut t = Transition::new(Vec2::ZERO, Vec2::ONE, 0);
        assert_eq!(t.advance(), Vec2::ONE);
        assert!(t.is_finished());
    }
}
