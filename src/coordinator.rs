//! Turn coordination between the human front-end and the CPU seats.
//!
//! One coarse mutex guards the whole [`Game`]. Human moves arrive on the
//! caller's thread through [`TurnCoordinator::submit_human_move`]; CPU seats
//! are played by a background worker started with [`TurnCoordinator::start`].
//! The worker sleeps through each CPU's thinking time outside the lock and
//! takes it only to apply a fully validated turn.
//!
//! Observers are notified after the lock is released, with an owned
//! [`TableSnapshot`] in which the turn pointer already names the next player.
//! Deliveries are serialized and ordered by [`TableSnapshot::revision`]; a
//! snapshot older than one already delivered is dropped.
//!
//! ```
//! use fifty_counter::agents::BotProfile;
//! use fifty_counter::cards::parse_cards;
//! use fifty_counter::coordinator::TurnCoordinator;
//! use fifty_counter::game::Game;
//!
//! let hands = vec![parse_cards("5s 9c").unwrap(), parse_cards("Kd 3h").unwrap()];
//! let game = Game::rigged(hands, Some("8h".parse().unwrap()), 30).unwrap();
//! let mut coordinator = TurnCoordinator::new(game, BotProfile::instant());
//!
//! coordinator.submit_human_move("5s".parse().unwrap()).unwrap();
//! assert_eq!(coordinator.snapshot().current, 1);
//!
//! let step = coordinator.play_cpu_turn().unwrap();
//! assert_eq!(step.table.table_sum, 25);
//! assert_eq!(step.table.current, 0);
//! ```

use crate::agents::{BotProfile, GreedyBot, PlayerAgent, TurnAction};
use crate::cards::Card;
use crate::config::{ConfigError, TableConfig};
use crate::game::{Game, MoveError, MoveOutcome, TurnRecord};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// History records carried in each snapshot.
const RECENT_EVENTS: usize = 8;

/// Public view of one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SeatView {
    pub name: String,
    pub human: bool,
    pub eliminated: bool,
    pub hand: Vec<Card>,
}

/// Owned copy of the table, detached from the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TableSnapshot {
    pub seats: Vec<SeatView>,
    pub current: usize,
    pub last_played: Option<Card>,
    pub table_sum: i32,
    pub deck_len: usize,
    pub discard_len: usize,
    pub winner: Option<usize>,
    /// Latest history records, oldest first.
    pub recent: Vec<TurnRecord>,
    /// [`Game::revision`] at capture time.
    pub revision: u64,
}

impl TableSnapshot {
    pub fn capture(game: &Game) -> Self {
        let seats = game
            .players()
            .iter()
            .map(|p| SeatView {
                name: p.name().to_string(),
                human: p.is_human(),
                eliminated: p.is_eliminated(),
                hand: p.hand().snapshot(),
            })
            .collect();
        Self {
            seats,
            current: game.current(),
            last_played: game.last_played(),
            table_sum: game.table_sum(),
            deck_len: game.deck_len(),
            discard_len: game.discard_len(),
            winner: game.winner_seat(),
            recent: game.history_recent(RECENT_EVENTS),
            revision: game.revision(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// The human seat is to move and the game is still running.
    pub fn is_human_turn(&self) -> bool {
        !self.is_finished() && self.seats.get(self.current).is_some_and(|s| s.human)
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.and_then(|w| self.seats.get(w)).map(|s| s.name.as_str())
    }

    /// Whether this snapshot shows an earlier table state than `other`.
    pub fn is_older_than(&self, other: &TableSnapshot) -> bool {
        self.revision < other.revision
    }

    pub fn human_hand(&self) -> &[Card] {
        self.seats.iter().find(|s| s.human).map(|s| s.hand.as_slice()).unwrap_or(&[])
    }
}

/// Receives table updates. Callbacks run on whichever thread applied the
/// turn, one delivery at a time, and must not block for long. They must not
/// call back into [`TurnCoordinator::submit_human_move`] or
/// [`TurnCoordinator::play_cpu_turn`].
pub trait TurnObserver: Send + Sync {
    /// After every applied turn.
    fn on_refresh(&self, _table: &TableSnapshot) {}
    /// Once per game, when a single player remains.
    fn on_winner(&self, _table: &TableSnapshot) {}
    /// When the turn lands on the human seat.
    fn on_human_turn(&self, _table: &TableSnapshot) {}
}

/// One CPU turn as applied by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CpuStep {
    pub seat: usize,
    /// `None` when the agent's move was rejected and the seat was passed.
    pub action: Option<TurnAction>,
    pub table: TableSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Finished,
    HumanTurn,
    CpuTurn(usize),
}

impl Phase {
    fn of(game: &Game) -> Self {
        if game.has_winner() {
            Phase::Finished
        } else if game.current_player().is_human() {
            Phase::HumanTurn
        } else {
            Phase::CpuTurn(game.current())
        }
    }
}

/// Stop flag plus a condition variable used to cut waits short.
#[derive(Debug, Default)]
struct TurnSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl TurnSignal {
    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    fn nudge(&self) {
        self.wake.notify_all();
    }

    /// Sleep the whole of `delay` unless stopped. Returns the stop flag.
    fn pause(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut stopped = self.stopped.lock();
        while !*stopped {
            if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }

    /// Wait for a nudge, a stop, or `timeout`. Returns the stop flag.
    fn idle(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            let _ = self.wake.wait_for(&mut stopped, timeout);
        }
        *stopped
    }
}

struct Shared {
    game: Mutex<Game>,
    signal: TurnSignal,
    observers: RwLock<Vec<Arc<dyn TurnObserver>>>,
    // Revision of the last snapshot handed out; held for the whole delivery
    delivered: Mutex<Option<u64>>,
    winner_announced: AtomicBool,
}

impl Shared {
    fn observers(&self) -> Vec<Arc<dyn TurnObserver>> {
        self.observers.read().clone()
    }

    fn publish(&self, table: &TableSnapshot) {
        let mut delivered = self.delivered.lock();
        if delivered.is_some_and(|rev| rev >= table.revision) {
            debug!(revision = table.revision, "dropping stale snapshot");
            return;
        }
        *delivered = Some(table.revision);
        let observers = self.observers();
        for o in &observers {
            o.on_refresh(table);
        }
        if table.is_finished() {
            self.announce_winner(table, &observers);
        } else if table.is_human_turn() {
            for o in &observers {
                o.on_human_turn(table);
            }
        }
    }

    fn announce_winner(&self, table: &TableSnapshot, observers: &[Arc<dyn TurnObserver>]) {
        if self.winner_announced.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(winner = table.winner_name().unwrap_or("?"), "announcing winner");
        for o in observers {
            o.on_winner(table);
        }
    }
}

/// Drives a [`Game`] with one human seat and a background CPU worker.
pub struct TurnCoordinator {
    shared: Arc<Shared>,
    bot: Option<GreedyBot>,
    idle_poll: Duration,
    worker: Option<JoinHandle<()>>,
}

impl fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("idle_poll", &self.idle_poll)
            .field("running", &self.is_running())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl TurnCoordinator {
    /// Take ownership of `game`. A human seat that is stuck at this point is
    /// eliminated right away.
    pub fn new(mut game: Game, profile: BotProfile) -> Self {
        settle_turn(&mut game);
        Self {
            shared: Arc::new(Shared {
                game: Mutex::new(game),
                signal: TurnSignal::default(),
                observers: RwLock::new(Vec::new()),
                delivered: Mutex::new(None),
                winner_announced: AtomicBool::new(false),
            }),
            bot: Some(GreedyBot::new(profile)),
            idle_poll: Duration::from_millis(TableConfig::default().idle_poll_ms),
            worker: None,
        }
    }

    /// Deal a fresh game from `config`.
    pub fn from_config(config: &TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let game = match config.seed {
            Some(seed) => Game::with_seed(config.players, seed),
            None => Game::new(config.players),
        };
        Ok(Self::new(game, config.bot_profile()).with_idle_poll(config.idle_poll()))
    }

    /// How long the worker waits between checks while the human is to move.
    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn add_observer(&self, observer: Arc<dyn TurnObserver>) {
        self.shared.observers.write().push(observer);
    }

    /// Spawn the CPU worker. Starting twice is a no-op.
    pub fn start(&mut self) -> io::Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let Some(bot) = self.bot.take() else {
            return Ok(());
        };
        let shared = Arc::clone(&self.shared);
        let idle_poll = self.idle_poll;
        let handle = thread::Builder::new()
            .name("cpu-turns".to_string())
            .spawn(move || cpu_worker(shared, bot, idle_poll))?;
        self.worker = Some(handle);
        Ok(())
    }

    /// Whether the worker thread has been started and has not exited.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Play `card` for the human seat and pass the turn on.
    ///
    /// Fails with [`MoveError::WrongTurn`] when a CPU is to move and with
    /// [`MoveError::GameOver`] once a winner exists. A rejected card leaves
    /// the turn with the human.
    pub fn submit_human_move(&self, card: Card) -> Result<MoveOutcome, MoveError> {
        let (outcome, table) = {
            let mut game = self.shared.game.lock();
            match Phase::of(&game) {
                Phase::Finished => return Err(MoveError::GameOver),
                Phase::CpuTurn(current) => return Err(MoveError::WrongTurn { current }),
                Phase::HumanTurn => {}
            }
            let outcome = game.apply_move(card).map_err(|err| {
                debug!(%card, %err, "human move rejected");
                err
            })?;
            game.next_turn();
            settle_turn(&mut game);
            (outcome, TableSnapshot::capture(&game))
        };
        self.shared.publish(&table);
        self.shared.signal.nudge();
        Ok(outcome)
    }

    /// Play one CPU turn on the caller's thread, without the thinking delay.
    ///
    /// Returns `None` when the worker owns the CPU seats, when the human is
    /// to move, or once the game is over.
    pub fn play_cpu_turn(&mut self) -> Option<CpuStep> {
        let bot = self.bot.as_mut()?;
        let step = cpu_step(&self.shared, bot)?;
        self.shared.publish(&step.table);
        Some(step)
    }

    /// Ask the worker to exit. It finishes the turn it is applying, if any.
    pub fn request_stop(&self) {
        self.shared.signal.stop();
    }

    /// Wait for the worker to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("cpu worker panicked");
            }
        }
    }

    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(&self.shared.game.lock())
    }

    /// Run `f` with the game locked. Keep `f` short: the worker waits on it.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.shared.game.lock())
    }

    pub fn is_finished(&self) -> bool {
        self.shared.game.lock().has_winner()
    }
}

impl Drop for TurnCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

// A human with nothing playable cannot act, so the turn skips past them.
// CPU seats handle this themselves inside their turn.
fn settle_turn(game: &mut Game) {
    while !game.has_winner() && game.current_player().is_human() {
        let seat = game.current();
        if !game.eliminate_if_stuck(seat) {
            break;
        }
        debug!(seat, "human eliminated at turn start");
        game.next_turn();
    }
}

fn cpu_step(shared: &Shared, bot: &mut GreedyBot) -> Option<CpuStep> {
    let mut game = shared.game.lock();
    let Phase::CpuTurn(seat) = Phase::of(&game) else {
        return None;
    };
    let action = match bot.on_turn(&mut *game, seat) {
        Ok(action) => action,
        Err(err) => {
            warn!(seat, %err, "cpu turn failed, passing");
            None
        }
    };
    game.next_turn();
    settle_turn(&mut game);
    Some(CpuStep { seat, action, table: TableSnapshot::capture(&game) })
}

fn cpu_worker(shared: Arc<Shared>, mut bot: GreedyBot, idle_poll: Duration) {
    info!("cpu worker started");
    while !shared.signal.is_stopped() {
        let phase = Phase::of(&shared.game.lock());
        match phase {
            Phase::Finished => {
                let table = TableSnapshot::capture(&shared.game.lock());
                shared.publish(&table);
                break;
            }
            Phase::HumanTurn => {
                if shared.signal.idle(idle_poll) {
                    break;
                }
                continue;
            }
            Phase::CpuTurn(seat) => {
                let delay = bot.think_time();
                debug!(seat, delay_ms = delay.as_millis() as u64, "cpu thinking");
                if shared.signal.pause(delay) {
                    break;
                }
            }
        }
        if let Some(step) = cpu_step(&shared, &mut bot) {
            shared.publish(&step.table);
        }
    }
    info!("cpu worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::game::TurnEvent;

    #[derive(Default)]
    struct Recorder {
        refreshes: Mutex<Vec<TableSnapshot>>,
        winners: Mutex<Vec<Option<usize>>>,
        human_turns: Mutex<usize>,
    }

    impl TurnObserver for Recorder {
        fn on_refresh(&self, table: &TableSnapshot) {
            self.refreshes.lock().push(table.clone());
        }
        fn on_winner(&self, table: &TableSnapshot) {
            self.winners.lock().push(table.winner);
        }
        fn on_human_turn(&self, _table: &TableSnapshot) {
            *self.human_turns.lock() += 1;
        }
    }

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn rig(hands: &[&str], sum: i32) -> Game {
        let hands = hands.iter().map(|h| parse_cards(h).unwrap()).collect();
        Game::rigged(hands, Some(card("8h")), sum).unwrap()
    }

    fn coordinator(game: Game) -> (TurnCoordinator, Arc<Recorder>) {
        let c = TurnCoordinator::new(game, BotProfile::instant());
        let recorder = Arc::new(Recorder::default());
        c.add_observer(recorder.clone());
        (c, recorder)
    }

    #[test]
    fn stuck_human_is_eliminated_on_construction() {
        let (c, _) = coordinator(rig(&["6c 7c", "Jd 9d"], 45));
        assert!(c.is_finished());
        let table = c.snapshot();
        assert!(table.seats[0].eliminated);
        assert_eq!(table.winner, Some(1));
    }

    #[test]
    fn human_move_hands_turn_to_cpu() {
        let (c, recorder) = coordinator(rig(&["5s 2c", "Jd 9d"], 20));
        let outcome = c.submit_human_move(card("5s")).unwrap();
        assert_eq!(outcome.table_sum, 25);
        let seen = recorder.refreshes.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].current, 1);
        assert_eq!(seen[0].last_played, Some(card("5s")));
    }

    #[test]
    fn rejects_moves_out_of_turn() {
        let (c, _) = coordinator(rig(&["5s 2c", "Jd 9d"], 20));
        c.submit_human_move(card("5s")).unwrap();
        assert_eq!(c.submit_human_move(card("2c")), Err(MoveError::WrongTurn { current: 1 }));
    }

    #[test]
    fn rejected_card_keeps_turn_with_human() {
        let (c, recorder) = coordinator(rig(&["6s 2c", "Jd 9d"], 45));
        let err = c.submit_human_move(card("6s")).unwrap_err();
        assert_eq!(err, MoveError::ExceedsLimit { card: card("6s"), sum: 45 });
        assert_eq!(c.snapshot().current, 0);
        assert!(recorder.refreshes.lock().is_empty());
        assert!(c.submit_human_move(card("2c")).is_ok());
    }

    #[test]
    fn cpu_step_notifies_human_turn() {
        let (mut c, recorder) = coordinator(rig(&["5s 2c", "Jd 9d"], 20));
        c.submit_human_move(card("5s")).unwrap();
        let step = c.play_cpu_turn().unwrap();
        assert_eq!(step.seat, 1);
        assert!(matches!(step.action, Some(TurnAction::Played(o)) if o.played == card("Jd")));
        assert_eq!(step.table.current, 0);
        assert_eq!(*recorder.human_turns.lock(), 1);
        assert!(c.play_cpu_turn().is_none());
    }

    #[test]
    fn stuck_cpu_hands_victory_once() {
        // Human plays 5s to reach 50; the CPU then holds nothing playable.
        let (mut c, recorder) = coordinator(rig(&["5s 2c", "8d 7d"], 45));
        c.submit_human_move(card("5s")).unwrap();
        let step = c.play_cpu_turn().unwrap();
        assert_eq!(step.action, Some(TurnAction::Eliminated));
        assert_eq!(step.table.winner, Some(0));
        assert_eq!(step.table.winner_name(), Some("You"));
        assert_eq!(*recorder.winners.lock(), vec![Some(0)]);
        assert!(c.play_cpu_turn().is_none());
        assert_eq!(c.submit_human_move(card("2c")), Err(MoveError::GameOver));
        assert_eq!(recorder.winners.lock().len(), 1);
    }

    #[test]
    fn human_stuck_after_cpu_move_is_skipped() {
        // 9c keeps the sum at 45, the CPU's 5s brings it to 50 and the human
        // is left with 7c 8c and a drawn 2c.
        let (mut c, recorder) = coordinator(rig(&["9c 7c 8c", "5s"], 45));
        c.submit_human_move(card("9c")).unwrap();
        let step = c.play_cpu_turn().unwrap();
        assert_eq!(step.table.table_sum, 50);
        assert!(step.table.seats[0].eliminated);
        assert_eq!(step.table.winner, Some(1));
        assert!(step
            .table
            .recent
            .iter()
            .any(|r| r.seat == 0 && matches!(r.event, TurnEvent::Eliminated { returned: 3 })));
        assert_eq!(*recorder.human_turns.lock(), 0);
        assert_eq!(*recorder.winners.lock(), vec![Some(1)]);
    }

    #[test]
    fn stale_snapshot_is_not_delivered() {
        let (c, recorder) = coordinator(rig(&["5s 2c", "Jd 9d"], 20));
        let before = c.snapshot();
        c.submit_human_move(card("5s")).unwrap();
        c.shared.publish(&before);
        let seen = recorder.refreshes.lock();
        assert_eq!(seen.len(), 1);
        assert!(before.is_older_than(&seen[0]));
        assert_eq!(seen[0].current, 1);
    }

    #[test]
    fn pause_returns_early_on_stop() {
        let signal = Arc::new(TurnSignal::default());
        let remote = Arc::clone(&signal);
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.stop();
        });
        let started = Instant::now();
        assert!(signal.pause(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();
    }

    #[test]
    fn pause_runs_to_deadline_without_stop() {
        let signal = TurnSignal::default();
        let started = Instant::now();
        assert!(!signal.pause(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
