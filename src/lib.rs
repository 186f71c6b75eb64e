//! Codge - dodge the balls while orbiting a circular arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, balls, collisions, game modes, replay)
//! - `record`: Replay records and the compact input-log codec
//! - `records`: Record book and best-score persistence
//! - `runner`: Real-time fixed-tick scheduler thread
//! - `settings`: Runtime configuration

pub mod record;
pub mod records;
pub mod runner;
pub mod settings;
pub mod sim;

pub use record::{InputKind, Record, RecordError};
pub use records::{RecordBook, RecordStore};
pub use runner::{GameListener, GameLoop, InputHandle};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
///
/// These are fixed rather than configurable: replays only reproduce a run
/// when every constant matches the one the run was recorded with.
pub mod consts {
    /// Fixed simulation rate
    pub const TICKS_PER_SECOND: u32 = 50;
    /// Milliseconds per tick
    pub const SKIP_MILLIS: u64 = 1000 / TICKS_PER_SECOND as u64;
    /// Maximum catch-up ticks per scheduler iteration
    pub const MAX_FRAME_SKIP: u32 = 5;
    /// Duration of the move-to-start animation (500 ms)
    pub const PREPARE_TICKS: u32 = 500 / SKIP_MILLIS as u32;

    /// Tangential speed cap shared by the player and all balls (disc radii per tick)
    pub const SPEED_LIMIT: f32 = 0.033;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 0.1;
    pub const PLAYER_ACCEL: f32 = 0.0017;
    pub const PLAYER_START_THETA: f32 = 90.0;
    /// Vertical speed while the jump is held
    pub const JUMP_SPEED: f32 = 0.03;
    /// Vertical deceleration per tick while falling
    pub const GRAVITY: f32 = 0.0027;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.02;
    pub const BALL_START_THETA: f32 = -90.0;
    /// Balls kept at once; the oldest bouncing ball is evicted past this
    pub const MAX_BALLS: usize = 8;
    /// Index of the first bouncing ball (the two revolving balls come first)
    pub const FIRST_BOUNCING_INDEX: usize = 2;

    /// Spawn schedule
    pub const SPAWN_INTERVAL: u32 = 500;
    pub const FIRST_SPAWN_TICK: u32 = 250;
    /// Minimum angular separation (degrees) between a spawn and the player
    pub const SPAWN_MIN_SEPARATION: f32 = 110.0;
    /// Aims closer than this (degrees) to straight-through-center are redrawn
    pub const SPAWN_AIM_TOLERANCE: f32 = 10.0;
    /// Aim redraws before an imperfect aim is accepted
    pub const SPAWN_AIM_RETRIES: u32 = 10;
    /// Hard cap on spawn angle draws
    pub const SPAWN_MAX_DRAWS: u32 = 64;

    /// Repulsion strength relative to SPEED_LIMIT
    pub const REPULSION_SCALE: f32 = 0.8;
    /// Weight of the previous spin rate in the smoothed average
    pub const SPIN_SMOOTHING: f32 = 0.8;

    /// Camera spin kicks in at 30 s of play if the player never turned
    pub const CAMERA_SPIN_TICK: u32 = 30 * TICKS_PER_SECOND;
    /// Camera spin speed cap (degrees per tick)
    pub const CAMERA_SPIN_LIMIT: f32 = 1.8;
    pub const CAMERA_SPIN_ACCEL: f32 = 0.05;
    /// Per-tick chance the camera reverses
    pub const CAMERA_SPIN_FLIP_CHANCE: f64 = 0.03;
}

/// Wrap an angle in degrees to [-180, 180)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    // fmod is exact, so far-out values lose nothing before the loops below
    let mut angle = if angle.abs() >= 3600.0 {
        angle % 360.0
    } else {
        angle
    };
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Add a delta to an angle, wrapping the result
#[inline]
pub fn angle_add(angle: f32, delta: f32) -> f32 {
    wrap_angle(angle + delta)
}

/// Unsigned shortest distance between two angles, in [0, 180]
#[inline]
pub fn angle_distance(a: f32, b: f32) -> f32 {
    let delta = wrap_angle(a - b).abs();
    delta.min(360.0 - delta)
}

/// Convert polar (r, theta in degrees) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    let theta = theta.to_radians();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading of a vector in degrees
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}
