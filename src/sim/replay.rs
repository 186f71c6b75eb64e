//! Record playback
//!
//! During a replay the record's inputs are fed back into the input flags on
//! exactly the ticks they were consumed on originally. Combined with the
//! reseeded spawn stream this reproduces the run tick for tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::model::{Direction, Model};
use super::state::{GameEvent, GameMode, GameState, InputFlags};
use super::tick::tick;
use crate::record::{InputEntry, InputKind, Record};

/// Feed every record entry due on the current tick into the input flags.
///
/// Only runs while Playing. Live inputs are dropped first so nothing outside
/// the record can steer a replay. Entries behind the current tick can no
/// longer be honored and are skipped.
pub(crate) fn inject_recorded_inputs(state: &mut GameState) {
    if state.mode != GameMode::Playing {
        return;
    }
    state.input.clear_gameplay();

    let Some(record) = state.record.as_ref() else {
        return;
    };
    while let Some(entry) = record.inputs.get(state.replay_cursor) {
        if entry.tick > state.ticks {
            break;
        }
        state.replay_cursor += 1;
        if entry.tick < state.ticks {
            log::warn!(
                "Skipping stale replay input {} at tick {}",
                entry,
                state.ticks
            );
            continue;
        }
        apply_input(&mut state.input, entry.kind);
    }
}

fn apply_input(flags: &mut InputFlags, kind: InputKind) {
    match kind {
        InputKind::Turn => flags.turn = true,
        InputKind::JumpOn => flags.jump_on = true,
        InputKind::JumpOff => flags.jump_off = true,
        InputKind::KillSelf => flags.kill_self = true,
    }
}

/// Positions after one Playing tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u32,
    pub player: Vec2,
    pub balls: Vec<Vec2>,
}

/// What a headless run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Score at game over, or at the tick limit
    pub score: u32,
    /// True when the run reached game over within the limit
    pub finished: bool,
    /// `(theta, vector)` of every spawn, in order
    pub spawns: Vec<(f32, f32)>,
    pub trace: Vec<Frame>,
    /// The record a live run produced
    pub record: Option<Record>,
}

impl RunOutcome {
    fn observe(&mut self, state: &mut GameState) -> bool {
        if state.mode == GameMode::Playing {
            self.score = state.score;
            self.trace.push(Frame {
                tick: state.ticks,
                player: state.player.position(),
                balls: state.balls.iter().map(|ball| ball.position()).collect(),
            });
        }
        let mut over = false;
        for event in state.drain_events() {
            match event {
                GameEvent::BallSpawned { theta, vector } => self.spawns.push((theta, vector)),
                GameEvent::GameOver { score, .. } => {
                    self.score = score;
                    self.finished = true;
                    over = true;
                }
                GameEvent::RecordFinished(record) => self.record = Some(record),
                _ => {}
            }
        }
        over
    }
}

/// Replay `record` headlessly for at most `max_ticks` scheduler iterations
pub fn replay_record(record: &Record, max_ticks: u32) -> RunOutcome {
    let mut state = GameState::new(0, 0);
    let mut outcome = RunOutcome::default();
    if !state.start_replay(record.clone()) {
        return outcome;
    }
    for _ in 0..max_ticks {
        tick(&mut state);
        if outcome.observe(&mut state) {
            break;
        }
    }
    outcome
}

/// Play a live run headlessly, setting inputs from `script` on the listed
/// Playing ticks.
///
/// Script ticks start at 1, the first tick after gameplay begins. The
/// record the run produces comes back in the outcome.
pub fn play_scripted(
    seed: i64,
    direction: Direction,
    script: &[InputEntry],
    max_ticks: u32,
) -> RunOutcome {
    let mut state = GameState::new(seed as u64, 0);
    state.request_seed(seed);
    state.input.start_direction = Some(direction);

    let mut outcome = RunOutcome::default();
    for _ in 0..max_ticks {
        if state.mode == GameMode::Playing {
            for entry in script.iter().filter(|entry| entry.tick == state.ticks) {
                apply_input(&mut state.input, entry.kind);
            }
        }
        tick(&mut state);
        if outcome.observe(&mut state) {
            break;
        }
    }
    outcome
}
