//! Game state and core simulation types
//!
//! Everything the tick function reads or writes lives here, including the
//! one-shot input flags the UI sets and the events the tick leaves behind.

use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, RevolvingBall};
use super::model::{Direction, Model};
use super::player::Player;
use crate::consts::*;
use crate::record::Record;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Idle between runs, waiting for a start direction
    #[default]
    Ready,
    /// Everything gliding to the start layout
    Preparing,
    /// Active gameplay
    Playing,
}

/// One-shot input flags. Each is cleared when consumed; setting one that is
/// already pending has no further effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags {
    pub start_direction: Option<Direction>,
    pub turn: bool,
    pub jump_on: bool,
    pub jump_off: bool,
    pub kill_self: bool,
}

impl InputFlags {
    /// Drop pending gameplay inputs, keeping a pending start direction
    pub fn clear_gameplay(&mut self) {
        self.turn = false;
        self.jump_on = false;
        self.jump_off = false;
        self.kill_self = false;
    }
}

/// Customization slot the UI wants highlighted. Passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomType {
    PlayerBaseColor,
    PlayerPatternColor,
    PlayerPatternShape,
    BallColor,
}

/// Things that happened during a tick, drained by the runner
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A start direction was accepted; the start animation is running
    Prepared(Direction),
    /// Gameplay began
    Started {
        seed: i64,
        direction: Direction,
        replay: bool,
    },
    PlayerTurned(Direction),
    BallSpawned { theta: f32, vector: f32 },
    GameOver { score: u32, replay: bool },
    NewBestScore(u32),
    /// A live run ended and its record is ready to store
    RecordFinished(Record),
}

/// Camera spin state (cosmetic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraSpin {
    pub direction: Direction,
    /// Degrees per tick
    pub speed: f32,
    /// Accumulated rotation (degrees)
    pub rotation: f32,
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: GameMode,
    pub ticks: u32,
    pub player: PlayerView,
    pub balls: Vec<BallView>,
    pub score: u32,
    pub best_score: u32,
    pub first_play: bool,
    pub replaying: bool,
    pub highlighted: Option<CustomType>,
    pub camera_rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    /// Ticks since the current run started (keeps counting while Ready)
    pub ticks: u32,
    pub score: u32,
    pub best_score: u32,
    /// True until the first run starts
    pub first_play: bool,
    /// Global pause. Never holds back live gameplay.
    pub paused: bool,
    pub input: InputFlags,
    pub player: Player,
    /// Balls in spawn order; the two revolving balls come first
    pub balls: Vec<Ball>,
    pub camera: CameraSpin,
    pub highlighted: Option<CustomType>,

    /// Record being written (live) or played back (replay)
    pub record: Option<Record>,
    pub replaying: bool,
    /// Next record entry to inject during replay
    pub replay_cursor: usize,

    pub(crate) game_over_pending: bool,
    pub(crate) start_pending: bool,
    pub(crate) start_direction: Direction,
    pub(crate) have_turned: bool,
    /// Spawn stream; reseeded at the start of every run
    pub(crate) rng: Pcg32,
    /// Cosmetic stream for the camera spin
    pub(crate) spin_rng: Pcg32,
    /// Source of seeds for live runs
    seeds: Pcg32,
    requested_seed: Option<i64>,
    events: Vec<GameEvent>,
}

/// Salt separating the camera stream from the spawn stream
const SPIN_STREAM_SALT: u64 = 0x5350_494E;

impl GameState {
    /// Idle state with the player knocked loose, as after a finished run.
    ///
    /// `seed` drives the seeds handed to live runs; `best_score` comes from
    /// whatever stores records.
    pub fn new(seed: u64, best_score: u32) -> Self {
        let mut state = Self {
            mode: GameMode::Ready,
            ticks: 0,
            score: 0,
            best_score,
            first_play: true,
            paused: false,
            input: InputFlags::default(),
            player: Player::new(),
            balls: Vec::new(),
            camera: CameraSpin::default(),
            highlighted: None,
            record: None,
            replaying: false,
            replay_cursor: 0,
            game_over_pending: false,
            start_pending: false,
            start_direction: Direction::Stopped,
            have_turned: false,
            rng: Pcg32::seed_from_u64(seed),
            spin_rng: Pcg32::seed_from_u64(seed ^ SPIN_STREAM_SALT),
            seeds: Pcg32::seed_from_u64(seed),
            requested_seed: None,
            events: Vec::new(),
        };
        state.reset_run(Direction::Stopped);
        state.player.set_free(true);
        state
    }

    /// Clear per-run state and lay out the start configuration
    pub(crate) fn reset_run(&mut self, direction: Direction) {
        self.ticks = 0;
        self.score = 0;
        self.input = InputFlags::default();
        self.player.initialize(direction);
        self.balls.clear();
        self.balls
            .push(RevolvingBall::new(BALL_START_THETA, Direction::CounterClockwise).into());
        self.balls
            .push(RevolvingBall::new(BALL_START_THETA, Direction::Clockwise).into());
        self.have_turned = false;
        self.camera = CameraSpin::default();
    }

    /// Reseed the spawn stream for a run
    pub(crate) fn reseed(&mut self, seed: i64) {
        self.rng = Pcg32::seed_from_u64(seed as u64);
        self.spin_rng = Pcg32::seed_from_u64(seed as u64 ^ SPIN_STREAM_SALT);
    }

    /// Seed for the next live run
    pub(crate) fn next_seed(&mut self) -> i64 {
        self.requested_seed
            .take()
            .unwrap_or_else(|| self.seeds.next_u64() as i64)
    }

    /// Force the seed of the next live run
    pub fn request_seed(&mut self, seed: i64) {
        self.requested_seed = Some(seed);
    }

    /// Queue a replay of `record`. Only accepted while Ready.
    pub fn start_replay(&mut self, record: Record) -> bool {
        if self.mode != GameMode::Ready || self.start_pending {
            log::warn!("Replay refused: a run is in progress ({:?})", self.mode);
            return false;
        }
        if !record.is_ordered() {
            log::warn!("Replay record has out-of-order ticks; late entries will be skipped");
        }
        self.input.start_direction = Some(record.first_direction);
        self.record = Some(record);
        self.replaying = true;
        self.replay_cursor = 0;
        true
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            ticks: self.ticks,
            player: PlayerView {
                pos: self.player.position(),
                angle: self.player.angle,
                radius: self.player.radius(),
            },
            balls: self
                .balls
                .iter()
                .map(|ball| BallView {
                    pos: ball.position(),
                    radius: ball.radius(),
                })
                .collect(),
            score: self.score,
            best_score: self.best_score,
            first_play: self.first_play,
            replaying: self.replaying,
            highlighted: self.highlighted,
            camera_rotation: self.camera.rotation,
        }
    }
}
