//! Fixed timestep simulation tick
//!
//! One call is one iteration of the scheduler's catch-up loop: finish any
//! pending mode switch, feed recorded inputs when replaying, consume the
//! input flags, then advance the world unless paused.

use rand::Rng;

use super::ball::{BouncingBall, RevolvingBall};
use super::collision::{repel_all, update_until_hit};
use super::model::{Direction, Model};
use super::player::Player;
use super::replay::inject_recorded_inputs;
use super::state::{GameEvent, GameMode, GameState};
use crate::consts::*;
use crate::record::{InputKind, Record};
use crate::{angle_add, angle_distance, heading};

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState) {
    if state.start_pending {
        start_play(state);
    }
    if state.game_over_pending {
        game_over(state);
    }

    // Pause only holds back the idle animation and replays, never live play
    let live_play = state.mode == GameMode::Playing && !state.replaying;
    let advancing = live_play || !state.paused;
    // Recorded inputs belong to the tick they were logged on; a held replay
    // must leave them queued
    if state.replaying && !advancing {
        return;
    }

    if state.replaying {
        inject_recorded_inputs(state);
    }
    process_input(state);

    if advancing {
        state.ticks += 1;
        update(state);
        if state.mode == GameMode::Playing {
            state.score += 1;
        }
    }
}

fn process_input(state: &mut GameState) {
    match state.mode {
        GameMode::Ready => {
            if let Some(direction) = state.input.start_direction.take() {
                if direction == Direction::Stopped {
                    log::warn!("Ignoring start without a direction");
                } else {
                    prepare(state, direction);
                }
            }
        }
        GameMode::Playing => {
            if std::mem::take(&mut state.input.turn) {
                state.player.turn();
                state.have_turned = true;
                state.emit(GameEvent::PlayerTurned(state.player.direction));
                record_input(state, InputKind::Turn);
            }

            // A pending jump-off waits for a tick without a jump-on
            if std::mem::take(&mut state.input.jump_on) {
                state.player.jumping = true;
                record_input(state, InputKind::JumpOn);
            } else if std::mem::take(&mut state.input.jump_off) {
                state.player.jumping = false;
                record_input(state, InputKind::JumpOff);
            }

            if std::mem::take(&mut state.input.kill_self) {
                state.game_over_pending = true;
                record_input(state, InputKind::KillSelf);
            }
        }
        GameMode::Preparing => {}
    }
}

fn record_input(state: &mut GameState, kind: InputKind) {
    if state.replaying {
        return;
    }
    if let Some(record) = state.record.as_mut() {
        record.push_input(state.ticks, kind);
    }
}

/// Glide everything to the start layout
fn prepare(state: &mut GameState, direction: Direction) {
    state.mode = GameMode::Preparing;
    state.start_direction = direction;
    state.emit(GameEvent::Prepared(direction));

    let player_start = Player::new().position();
    state.player.animate_to(player_start, PREPARE_TICKS);

    let mut parked = RevolvingBall::new(BALL_START_THETA, Direction::Stopped);
    parked.update();
    let ball_start = parked.position();
    for ball in &mut state.balls {
        ball.animate_to(ball_start, PREPARE_TICKS);
    }
}

fn start_play(state: &mut GameState) {
    state.start_pending = false;
    state.mode = GameMode::Playing;

    let direction = state.start_direction;
    state.reset_run(direction);

    let replay_seed = if state.replaying {
        state.record.as_ref().map(|record| record.seed)
    } else {
        None
    };
    let seed = match replay_seed {
        Some(seed) => seed,
        None => {
            // A replay without a record cannot be followed; run it live
            state.replaying = false;
            let seed = state.next_seed();
            state.record = Some(Record::new(seed, direction));
            seed
        }
    };
    state.reseed(seed);
    state.first_play = false;

    log::info!(
        "Run started: seed={} direction={:?} replay={}",
        seed,
        direction,
        state.replaying
    );
    state.emit(GameEvent::Started {
        seed,
        direction,
        replay: state.replaying,
    });
}

fn game_over(state: &mut GameState) {
    state.game_over_pending = false;
    state.mode = GameMode::Ready;
    state.player.set_free(true);

    let score = state.score;
    let replay = state.replaying;
    log::info!("Game over: score={} replay={}", score, replay);
    state.emit(GameEvent::GameOver { score, replay });

    if replay {
        state.replaying = false;
        state.record = None;
        state.replay_cursor = 0;
        return;
    }

    if score > state.best_score {
        state.best_score = score;
        state.emit(GameEvent::NewBestScore(score));
    }
    if let Some(mut record) = state.record.take() {
        record.score = score;
        state.emit(GameEvent::RecordFinished(record));
    }
}

/// Per-tick world update: camera, player, spawns, balls, collisions
fn update(state: &mut GameState) {
    let playing = state.mode == GameMode::Playing;

    if playing && state.ticks == CAMERA_SPIN_TICK && !state.have_turned {
        state.camera.direction = state.player.direction;
        state.camera.speed = state.camera.direction.rotation() * CAMERA_SPIN_LIMIT;
    }
    update_camera(state);

    state.player.update();
    if state.mode == GameMode::Preparing && !state.player.is_animating() {
        state.start_pending = true;
    }

    let spawning = matches!(state.mode, GameMode::Playing | GameMode::Ready);
    if spawning
        && (state.ticks == FIRST_SPAWN_TICK || state.ticks % SPAWN_INTERVAL == 0)
    {
        spawn_ball(state);
        if state.balls.len() > MAX_BALLS {
            state.balls.remove(FIRST_BOUNCING_INDEX);
        }
    }

    if playing {
        if let Some(index) = update_until_hit(&state.player, &mut state.balls) {
            log::debug!("Ball {} hit the player at tick {}", index, state.ticks);
            state.game_over_pending = true;
        }
    } else {
        for ball in &mut state.balls {
            ball.update();
        }
    }

    if state.player.is_free() {
        repel_all(&mut state.player, &state.balls);
    }

    if playing && !world_is_finite(state) {
        log::error!("Non-finite position at tick {}; ending run", state.ticks);
        state.game_over_pending = true;
    }
}

fn world_is_finite(state: &GameState) -> bool {
    state.player.position().is_finite()
        && state.balls.iter().all(|ball| ball.position().is_finite())
}

fn update_camera(state: &mut GameState) {
    let camera = &mut state.camera;
    if camera.direction == Direction::Stopped {
        return;
    }
    if state.spin_rng.random::<f64>() < CAMERA_SPIN_FLIP_CHANCE {
        camera.direction = camera.direction.reversed();
    } else {
        camera.speed = (camera.speed + camera.direction.rotation() * CAMERA_SPIN_ACCEL)
            .clamp(-CAMERA_SPIN_LIMIT, CAMERA_SPIN_LIMIT);
    }
    camera.rotation = angle_add(camera.rotation, camera.speed);
}

/// Add a bouncing ball on the rim, away from the player and aimed at them
fn spawn_ball(state: &mut GameState) {
    let rng = &mut state.rng;
    let (theta, vector) = pick_spawn(&state.player, || {
        (rng.random::<f64>() * 360.0 - 180.0) as f32
    });
    log::debug!(
        "Spawned ball at tick {}: theta={:.2} vector={:.2}",
        state.ticks,
        theta,
        vector
    );
    state.balls.push(BouncingBall::new(theta, vector).into());
    state.emit(GameEvent::BallSpawned { theta, vector });
}

/// Choose `(theta, vector)` for a spawn from rim angles produced by `draw`.
///
/// Angles too close to the player are redrawn, up to `SPAWN_MAX_DRAWS`
/// draws in total. A ball that would pass straight through the center is
/// redrawn until the `SPAWN_AIM_RETRIES`th aim, which is taken as is.
fn pick_spawn(player: &Player, mut draw: impl FnMut() -> f32) -> (f32, f32) {
    let mut draws = 0;
    let mut aims = 0;
    loop {
        let theta = draw();
        draws += 1;
        if angle_distance(theta, player.theta) < SPAWN_MIN_SEPARATION && draws < SPAWN_MAX_DRAWS {
            continue;
        }

        let rim = BouncingBall::new(theta, 0.0).position();
        let vector = heading(player.position() - rim);
        aims += 1;
        if angle_distance(angle_add(theta, 180.0), vector) < SPAWN_AIM_TOLERANCE
            && aims < SPAWN_AIM_RETRIES
        {
            continue;
        }
        return (theta, vector);
    }
}
