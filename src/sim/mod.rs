//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, timing or platform dependencies

pub mod ball;
pub mod collision;
pub mod model;
pub mod player;
pub mod replay;
pub mod state;
pub mod tick;
pub mod transition;

pub use ball::{Ball, BouncingBall, RevolvingBall};
pub use collision::{repel, repel_all, update_until_hit};
pub use model::{Direction, Model, intersects};
pub use player::{JumpState, Player};
pub use replay::{Frame, RunOutcome, play_scripted, replay_record};
pub use state::{
    BallView, CameraSpin, CustomType, GameEvent, GameMode, GameState, InputFlags, PlayerView,
    Snapshot,
};
pub use tick::tick;
pub use transition::{Transition, ease};
