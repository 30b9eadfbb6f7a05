use fifty_counter::agents::BotProfile;
use fifty_counter::cards::{parse_cards, Card};
use fifty_counter::coordinator::{TableSnapshot, TurnCoordinator, TurnObserver};
use fifty_counter::game::{Game, MoveError};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
enum Note {
    Refresh(TableSnapshot),
    Winner(Option<usize>),
    HumanTurn,
}

struct Forward(Mutex<Sender<Note>>);

impl TurnObserver for Forward {
    fn on_refresh(&self, table: &TableSnapshot) {
        let _ = self.0.lock().send(Note::Refresh(table.clone()));
    }
    fn on_winner(&self, table: &TableSnapshot) {
        let _ = self.0.lock().send(Note::Winner(table.winner));
    }
    fn on_human_turn(&self, _table: &TableSnapshot) {
        let _ = self.0.lock().send(Note::HumanTurn);
    }
}

const WAIT: Duration = Duration::from_secs(5);

fn card(s: &str) -> Card {
    s.parse().unwrap()
}

fn rig(hands: &[&str], sum: i32) -> Game {
    let hands = hands.iter().map(|h| parse_cards(h).unwrap()).collect();
    Game::rigged(hands, Some(card("8h")), sum).unwrap()
}

fn watched(game: Game, profile: BotProfile) -> (TurnCoordinator, Receiver<Note>) {
    let c = TurnCoordinator::new(game, profile).with_idle_poll(Duration::from_millis(5));
    let (tx, rx) = mpsc::channel();
    c.add_observer(Arc::new(Forward(Mutex::new(tx))));
    (c, rx)
}

fn wait_for<F: Fn(&Note) -> bool>(rx: &Receiver<Note>, pred: F) -> Note {
    let deadline = Instant::now() + WAIT;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let note = rx.recv_timeout(left).expect("expected notification did not arrive");
        if pred(&note) {
            return note;
        }
    }
}

#[test]
fn worker_plays_cpu_and_hands_turn_back() {
    let (mut c, rx) = watched(rig(&["5s 2c", "Jd 9d"], 20), BotProfile::instant());
    c.start().unwrap();
    c.submit_human_move(card("5s")).unwrap();
    wait_for(&rx, |n| matches!(n, Note::HumanTurn));
    let table = c.snapshot();
    assert_eq!(table.current, 0);
    assert_eq!(table.table_sum, 15);
    assert_eq!(table.last_played, Some(card("Jd")));
    c.stop();
    assert!(!c.is_running());
}

#[test]
fn snapshot_names_next_player() {
    let (c, rx) = watched(rig(&["5s 2c", "Jd 9d"], 20), BotProfile::instant());
    c.submit_human_move(card("5s")).unwrap();
    match wait_for(&rx, |n| matches!(n, Note::Refresh(_))) {
        Note::Refresh(table) => {
            assert_eq!(table.current, 1);
            assert_eq!(table.table_sum, 25);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn human_cannot_act_during_cpu_turn() {
    let (mut c, _rx) =
        watched(rig(&["5s 2c", "Jd 9d"], 20), BotProfile::with_delay(30_000, 30_000));
    c.submit_human_move(card("5s")).unwrap();
    c.start().unwrap();
    assert_eq!(c.submit_human_move(card("2c")), Err(MoveError::WrongTurn { current: 1 }));
}

// Holds up delivery of the snapshot where the CPU is to move, so the worker
// finishes its turn while the human's refresh is still being delivered.
struct SlowWhileCpuMoves(Forward);

impl TurnObserver for SlowWhileCpuMoves {
    fn on_refresh(&self, table: &TableSnapshot) {
        if table.current == 1 {
            thread::sleep(Duration::from_millis(20));
        }
        self.0.on_refresh(table);
    }
    fn on_human_turn(&self, table: &TableSnapshot) {
        self.0.on_human_turn(table);
    }
}

#[test]
fn refreshes_arrive_in_table_order() {
    for _ in 0..20 {
        let mut c = TurnCoordinator::new(rig(&["5s 2c", "Jd 9d"], 20), BotProfile::instant())
            .with_idle_poll(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel();
        c.add_observer(Arc::new(SlowWhileCpuMoves(Forward(Mutex::new(tx)))));
        c.start().unwrap();
        c.submit_human_move(card("5s")).unwrap();
        let mut notes = Vec::new();
        while !matches!(notes.last(), Some(Note::HumanTurn)) {
            notes.push(rx.recv_timeout(WAIT).expect("cpu turn was not reported"));
        }
        c.stop();
        notes.extend(rx.try_iter());

        let refreshes: Vec<TableSnapshot> = notes
            .into_iter()
            .filter_map(|n| match n {
                Note::Refresh(table) => Some(table),
                _ => None,
            })
            .collect();
        let last = refreshes.last().expect("at least one refresh");
        assert_eq!(*last, c.snapshot());
        assert!(refreshes.windows(2).all(|w| w[0].is_older_than(&w[1])));
    }
}

#[test]
fn stop_interrupts_thinking_delay() {
    let (mut c, _rx) =
        watched(rig(&["5s 2c", "Jd 9d"], 20), BotProfile::with_delay(30_000, 30_000));
    c.submit_human_move(card("5s")).unwrap();
    c.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    let started = Instant::now();
    c.stop();
    assert!(started.elapsed() < Duration::from_secs(2));
    let table = c.snapshot();
    assert_eq!(table.current, 1, "the cpu never got to act");
    assert_eq!(table.table_sum, 25);
}

#[test]
fn stuck_cpu_gives_human_the_win() {
    let (mut c, rx) = watched(rig(&["5s 2c", "8d 7d"], 45), BotProfile::instant());
    c.start().unwrap();
    c.submit_human_move(card("5s")).unwrap();
    let note = wait_for(&rx, |n| matches!(n, Note::Winner(_)));
    assert!(matches!(note, Note::Winner(Some(0))));
    c.join();
    assert!(c.is_finished());
    assert!(rx.try_iter().all(|n| !matches!(n, Note::Winner(_))), "winner announced once");
}

#[test]
fn game_lost_before_start_is_announced() {
    let (mut c, rx) = watched(rig(&["6c 7c", "Jd 9d"], 45), BotProfile::instant());
    assert!(c.is_finished());
    c.start().unwrap();
    let note = wait_for(&rx, |n| matches!(n, Note::Winner(_)));
    assert!(matches!(note, Note::Winner(Some(1))));
}

#[test]
fn cards_are_conserved_under_the_worker() {
    let (mut c, rx) = watched(Game::with_seed(4, 21), BotProfile::instant());
    c.start().unwrap();
    for _ in 0..200 {
        let table = c.snapshot();
        if table.is_finished() || table.seats[0].eliminated {
            break;
        }
        if table.is_human_turn() {
            let choice = c.with_game(|g| g.cpu_choose_card(0));
            if let Some(choice) = choice {
                c.submit_human_move(choice).unwrap();
            }
        } else {
            let _ = rx.recv_timeout(Duration::from_millis(20));
        }
        c.with_game(|g| {
            assert_eq!(g.total_cards(), 52);
            assert!(g.table_sum() <= 50);
        });
    }
    c.stop();
}
