//! Codge entry point
//!
//! Headless native driver for the simulation:
//! - `demo`: play a scripted run, replay its record and compare
//! - `replay <file>`: replay a record stored as JSON or in the compact form
//! - `live <secs>`: run the real-time loop with a simple autopilot

use std::fs;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use codge::record::{InputEntry, InputKind, Record, RecordError};
use codge::records::{RecordBook, RecordStore, now_millis};
use codge::runner::{GameListener, GameLoop};
use codge::settings::Settings;
use codge::sim::{Direction, GameMode, Snapshot, play_scripted, replay_record};

/// Settings file read at startup when present
const SETTINGS_FILE: &str = "codge.json";
/// Upper bound for headless runs (20 minutes of play)
const MAX_HEADLESS_TICKS: u32 = 60_000;

fn main() -> ExitCode {
    let loaded = Settings::read(SETTINGS_FILE);
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_filter.as_str()),
    )
    .init();
    log::info!("Codge (native) starting...");
    if let Err(err) = &loaded {
        log::info!("Using default settings ({}: {})", SETTINGS_FILE, err);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("demo") => demo(),
        Some("replay") => match args.get(1) {
            Some(path) => replay_file(path),
            None => usage(),
        },
        Some("live") => {
            let secs = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
            live(&settings, secs);
            Ok(())
        }
        Some(_) => usage(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn usage() -> Result<(), RecordError> {
    eprintln!("usage: codge [demo | replay <file> | live <secs>]");
    Ok(())
}

fn demo() -> Result<(), RecordError> {
    let script = [
        InputEntry { tick: 40, kind: InputKind::Turn },
        InputEntry { tick: 41, kind: InputKind::JumpOn },
        InputEntry { tick: 70, kind: InputKind::JumpOff },
    ];
    let live = play_scripted(12345, Direction::CounterClockwise, &script, MAX_HEADLESS_TICKS);
    println!("Live run: score {} with {} spawns", live.score, live.spawns.len());

    let Some(record) = live.record.as_ref() else {
        println!("Run did not finish within {} ticks", MAX_HEADLESS_TICKS);
        return Ok(());
    };
    println!("Record: {}", record.to_compact());

    let replay = replay_record(record, MAX_HEADLESS_TICKS);
    let matches = replay.score == live.score
        && replay.spawns == live.spawns
        && replay.trace == live.trace;
    println!(
        "Replay: score {} ({})",
        replay.score,
        if matches { "identical" } else { "DIVERGED" }
    );
    Ok(())
}

fn replay_file(path: &str) -> Result<(), RecordError> {
    let text = fs::read_to_string(path)?;
    let record = if text.trim_start().starts_with('{') {
        Record::from_json(&text)?
    } else {
        Record::from_compact(&text)?
    };

    let outcome = replay_record(&record, MAX_HEADLESS_TICKS);
    println!(
        "Replayed seed {}: score {} (recorded {}), {} spawns, finished: {}",
        record.seed,
        outcome.score,
        record.score,
        outcome.spawns.len(),
        outcome.finished
    );
    if outcome.finished && outcome.score != record.score {
        log::warn!("Replay score differs from the recorded score");
    }
    Ok(())
}

/// Prints state changes to stdout
struct Console {
    score: u32,
}

impl GameListener for Console {
    fn on_prepare(&mut self, direction: Direction) {
        println!("Preparing ({:?})", direction);
    }

    fn on_game_over(&mut self) {
        println!("Game over at score {}", self.score);
    }

    fn on_player_turn(&mut self, direction: Direction) {
        log::debug!("Turned {:?}", direction);
    }

    fn on_redraw(&mut self, snapshot: &Snapshot) {
        self.score = snapshot.score;
    }
}

fn live(settings: &Settings, secs: u64) {
    let store: Box<dyn RecordStore> = match &settings.records_path {
        Some(path) => Box::new(RecordBook::open(path)),
        None => Box::new(RecordBook::new()),
    };
    let seed = now_millis() as u64;
    let mut game = GameLoop::new(
        settings,
        seed,
        store,
        Box::new(Console { score: 0 }),
    );
    let input = game.input();
    game.resume();

    // Autopilot: start whenever idle, turn every couple of seconds
    let step = Duration::from_millis(100);
    let mut direction = Direction::Clockwise;
    for i in 0..secs * 10 {
        let snapshot = input.snapshot();
        match snapshot.mode {
            GameMode::Ready => {
                if input.start(direction) {
                    direction = direction.reversed();
                }
            }
            GameMode::Playing if i % 20 == 0 => input.turn(),
            _ => {}
        }
        thread::sleep(step);
    }
    game.pause();

    let best = game.with_store(|store| store.best_score());
    println!("Best score this session: {}", best);
}
