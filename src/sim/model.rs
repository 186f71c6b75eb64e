//! Shared entity contract
//!
//! The player and both kinds of ball expose the same view to the rest of the
//! simulation: a circle with a position, a velocity, an optional transition
//! animation and a per-tick update.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::transition::Transition;

/// Rotation sense around the disc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Stopped,
    CounterClockwise,
    Clockwise,
}

impl Direction {
    /// Signed multiplier applied to angular speed
    pub fn rotation(self) -> f32 {
        match self {
            Direction::Stopped => 0.0,
            Direction::CounterClockwise => -1.0,
            Direction::Clockwise => 1.0,
        }
    }

    /// The opposite rotating direction. Stopped stays stopped.
    pub fn reversed(self) -> Self {
        match self {
            Direction::CounterClockwise => Direction::Clockwise,
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::Stopped => Direction::Stopped,
        }
    }

    /// Stable ordinal used by the compact record codec
    pub fn ordinal(self) -> u8 {
        match self {
            Direction::Stopped => 0,
            Direction::CounterClockwise => 1,
            Direction::Clockwise => 2,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Direction::Stopped),
            1 => Some(Direction::CounterClockwise),
            2 => Some(Direction::Clockwise),
            _ => None,
        }
    }
}

/// Common contract for everything that moves inside the disc
pub trait Model {
    fn radius(&self) -> f32;
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;

    /// Active transition animation, if any
    fn transition(&self) -> Option<&Transition>;

    /// Start animating toward `target` over `ticks` ticks, discarding any
    /// animation already in progress
    fn animate_to(&mut self, target: Vec2, ticks: u32);

    /// Advance one tick. An attached transition replaces the entity's own motion.
    fn update(&mut self);

    fn is_animating(&self) -> bool {
        self.transition().is_some()
    }
}

/// Circle-circle overlap test
#[inline]
pub fn intersects(a: &impl Model, b: &impl Model) -> bool {
    a.position().distance(b.position()) < a.radius() + b.radius()
}

/// Step an entity's animation slot, writing the eased position into `pos`.
///
/// Returns false when no animation is attached. The slot is emptied on the
/// step that reaches the destination.
pub(crate) fn step_transition(slot: &mut Option<Transition>, pos: &mut Vec2) -> bool {
    let Some(transition) = slot.as_mut() else {
        return false;
    };
    *pos = transition.advance();
    if transition.is_finished() {
        *slot = None;
    }
    true
}
