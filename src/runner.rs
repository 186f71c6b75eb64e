//! Real-time scheduler
//!
//! Runs the simulation on its own thread at a fixed 50 Hz, catching up with
//! a bounded number of extra ticks when it falls behind. Inputs arrive from
//! other threads through an [`InputHandle`], which only ever sets flags; the
//! sim thread consumes them at the next tick. Callbacks fire on the sim
//! thread after the state lock is released.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::consts::SKIP_MILLIS;
use crate::record::Record;
use crate::records::{RecordStore, now_millis};
use crate::settings::Settings;
use crate::sim::{CustomType, Direction, GameEvent, GameMode, GameState, Snapshot, tick};

/// Callbacks invoked on the sim thread
pub trait GameListener: Send {
    fn on_prepare(&mut self, _direction: Direction) {}
    fn on_game_over(&mut self) {}
    fn on_player_turn(&mut self, _direction: Direction) {}
    /// Called once per scheduler iteration that changed the state
    fn on_redraw(&mut self, _snapshot: &Snapshot) {}
}

type SharedListener = Arc<Mutex<Box<dyn GameListener>>>;
type SharedStore = Arc<Mutex<Box<dyn RecordStore>>>;

struct Shared {
    state: Mutex<GameState>,
    running: AtomicBool,
}

/// Cloneable input side of a running game
#[derive(Clone)]
pub struct InputHandle {
    shared: Arc<Shared>,
}

impl InputHandle {
    /// Request a new run. Ignored unless the game is idle.
    pub fn start(&self, direction: Direction) -> bool {
        let mut state = self.shared.state.lock();
        if state.mode != GameMode::Ready || state.replaying {
            return false;
        }
        state.input.start_direction = Some(direction);
        true
    }

    pub fn turn(&self) {
        self.gameplay(|state| state.input.turn = true);
    }

    pub fn jump_on(&self) {
        self.gameplay(|state| state.input.jump_on = true);
    }

    pub fn jump_off(&self) {
        self.gameplay(|state| state.input.jump_off = true);
    }

    pub fn kill_self(&self) {
        self.gameplay(|state| state.input.kill_self = true);
    }

    /// Live inputs have no say in a replay
    fn gameplay(&self, set: impl FnOnce(&mut GameState)) {
        let mut state = self.shared.state.lock();
        if !state.replaying {
            set(&mut state);
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.state.lock().paused = paused;
    }

    pub fn highlight(&self, custom: Option<CustomType>) {
        self.shared.state.lock().highlighted = custom;
    }

    pub fn request_seed(&self, seed: i64) {
        self.shared.state.lock().request_seed(seed);
    }

    pub fn start_replay(&self, record: Record) -> bool {
        self.shared.state.lock().start_replay(record)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.state.lock().snapshot()
    }
}

/// Owns the sim thread
pub struct GameLoop {
    shared: Arc<Shared>,
    listener: SharedListener,
    store: SharedStore,
    max_frame_skip: u32,
    thread: Option<JoinHandle<()>>,
}

impl GameLoop {
    /// Build an idle game. Nothing runs until [`GameLoop::resume`].
    pub fn new(
        settings: &Settings,
        seed: u64,
        store: Box<dyn RecordStore>,
        listener: Box<dyn GameListener>,
    ) -> Self {
        let mut state = GameState::new(seed, store.best_score());
        state.paused = settings.start_paused;
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                running: AtomicBool::new(false),
            }),
            listener: Arc::new(Mutex::new(listener)),
            store: Arc::new(Mutex::new(store)),
            max_frame_skip: settings.max_frame_skip.max(1),
            thread: None,
        }
    }

    pub fn input(&self) -> InputHandle {
        InputHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Start the sim thread. Any previous thread is fully stopped first.
    pub fn resume(&mut self) {
        self.pause();
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let listener = Arc::clone(&self.listener);
        let store = Arc::clone(&self.store);
        let max_frame_skip = self.max_frame_skip;
        self.thread = Some(thread::spawn(move || {
            run(&shared, &listener, &store, max_frame_skip);
        }));
        log::debug!("Sim thread started");
    }

    /// Stop the sim thread and wait for it to exit
    pub fn pause(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Sim thread panicked");
            }
            log::debug!("Sim thread stopped");
        }
    }

    /// Run `f` against the record store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut dyn RecordStore) -> R) -> R {
        let mut store = self.store.lock();
        f(&mut **store)
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.pause();
    }
}

fn run(shared: &Shared, listener: &SharedListener, store: &SharedStore, max_frame_skip: u32) {
    let period = Duration::from_millis(SKIP_MILLIS);
    let mut next = Instant::now();

    while shared.running.load(Ordering::Acquire) {
        let (events, redraw) = {
            let mut state = shared.state.lock();
            let ticks = state.ticks;
            let mode = state.mode;

            let mut frames = 0;
            loop {
                tick(&mut state);
                next += period;
                frames += 1;
                if frames >= max_frame_skip || Instant::now() < next {
                    break;
                }
            }

            let events = state.drain_events();
            let changed = state.ticks != ticks || state.mode != mode || !events.is_empty();
            (events, changed.then(|| state.snapshot()))
        };

        dispatch(events, listener, store);
        if let Some(snapshot) = redraw {
            listener.lock().on_redraw(&snapshot);
        }

        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else if now - next > period * max_frame_skip {
            // Too far behind to catch up; drop the backlog
            next = now;
        }
    }
}

fn dispatch(events: Vec<GameEvent>, listener: &SharedListener, store: &SharedStore) {
    for event in events {
        match event {
            GameEvent::Prepared(direction) => listener.lock().on_prepare(direction),
            GameEvent::PlayerTurned(direction) => listener.lock().on_player_turn(direction),
            GameEvent::GameOver { .. } => listener.lock().on_game_over(),
            GameEvent::NewBestScore(score) => store.lock().submit_best_score(score),
            GameEvent::RecordFinished(mut record) => {
                record.recorded_at = now_millis();
                if let Some(rank) = store.lock().insert(record) {
                    log::info!("Record stored at rank {}", rank);
                }
            }
            GameEvent::Started { .. } | GameEvent::BallSpawned { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordBook;

    #[derive(Default)]
    struct Calls {
        prepared: Vec<Direction>,
        game_overs: usize,
        redraws: usize,
    }

    struct Recorder(Arc<Mutex<Calls>>);

    impl GameListener for Recorder {
        fn on_prepare(&mut self, direction: Direction) {
            self.0.lock().prepared.push(direction);
        }

        fn on_game_over(&mut self) {
            self.0.lock().game_overs += 1;
        }

        fn on_redraw(&mut self, _snapshot: &Snapshot) {
            self.0.lock().redraws += 1;
        }
    }

    fn wait_for(limit: Duration, done: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    fn game(calls: &Arc<Mutex<Calls>>) -> GameLoop {
        GameLoop::new(
            &Settings::default(),
            7,
            Box::new(RecordBook::new()),
            Box::new(Recorder(Arc::clone(calls))),
        )
    }

    #[test]
    fn test_full_session_on_thread() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let mut game = game(&calls);
        let input = game.input();
        game.resume();

        assert!(input.start(Direction::Clockwise));
        assert!(wait_for(Duration::from_secs(5), || {
            input.snapshot().mode == GameMode::Playing
        }));
        input.kill_self();
        assert!(wait_for(Duration::from_secs(5), || calls.lock().game_overs == 1));
        game.pause();

        assert!(!game.is_running());
        let calls = calls.lock();
        assert_eq!(calls.prepared, vec![Direction::Clockwise]);
        assert!(calls.redraws > 0);

        game.with_store(|store| {
            assert!(store.best_score() > 0);
        });
    }

    #[test]
    fn test_resume_replaces_running_thread() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let mut game = game(&calls);
        game.resume();
        game.resume();
        assert!(game.is_running());
        game.pause();
        assert!(!game.is_running());
        // Pausing twice is harmless
        game.pause();
    }

    #[test]
    fn test_start_refused_while_busy() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let game = game(&calls);
        let input = game.input();
        assert!(input.start_replay(Record::new(1, Direction::Clockwise)));
        assert!(!input.start(Direction::CounterClockwise));
    }

    #[test]
    fn test_live_inputs_dropped_during_replay() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let game = game(&calls);
        let input = game.input();
        input.start_replay(Record::new(1, Direction::Clockwise));
        input.turn();
        input.kill_self();
        let state = game.shared.state.lock();
        assert!(!state.input.turn);
        assert!(!state.input.kill_self);
    }

    #[test]
    fn test_paused_idle_loop_does_not_redraw() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let settings = Settings {
            start_paused: true,
            ..Default::default()
        };
        let mut game = GameLoop::new(
            &settings,
            3,
            Box::new(RecordBook::new()),
            Box::new(Recorder(Arc::clone(&calls))),
        );
        game.resume();
        thread::sleep(Duration::from_millis(100));
        game.pause();
        assert_eq!(calls.lock().redraws, 0);
        assert_eq!(game.input().snapshot().ticks, 0);
    }
}
