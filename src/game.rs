use crate::cards::{Card, MAX_SUM};
use crate::deck::Deck;
use crate::hand::Hand;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Cards dealt to each player at the start of a game.
pub const HAND_SIZE: usize = 4;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
/// Seat of the human player; every other seat is a CPU.
pub const HUMAN_SEAT: usize = 0;
/// Turn records kept per game; older ones are dropped.
pub const HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameStatus {
    InProgress,
    Finished,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MoveError {
    #[error("{card} would take the table past 50 (sum is {sum})")]
    ExceedsLimit { card: Card, sum: i32 },
    #[error("{card} is not in the current player's hand")]
    NotInHand { card: Card },
    #[error("not your turn: seat {current} is playing")]
    WrongTurn { current: usize },
    #[error("the game is already over")]
    GameOver,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetupError {
    #[error("player count must be between 2 and 4, got {0}")]
    PlayerCount(usize),
    #[error("card dealt twice: {0}")]
    DuplicateCard(Card),
    #[error("table sum {0} exceeds 50")]
    SumOutOfRange(i32),
}

/// What happened at a seat, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TurnEvent {
    Played { card: Card, value: i32, sum: i32 },
    Drew { card: Card },
    Refilled { cards: usize },
    Eliminated { returned: usize },
}

impl TurnEvent {
    pub fn label(self) -> &'static str {
        match self {
            TurnEvent::Played { .. } => "Play",
            TurnEvent::Drew { .. } => "Draw",
            TurnEvent::Refilled { .. } => "Refill",
            TurnEvent::Eliminated { .. } => "Out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TurnRecord {
    pub seat: usize,
    pub event: TurnEvent,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct MoveOutcome {
    /// Table sum after the card was applied.
    pub table_sum: i32,
    /// The card now visible on the table.
    pub played: Card,
    /// Replacement card, absent when both piles were empty.
    pub drawn: Option<Card>,
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Player {
    pub(crate) name: String,
    pub(crate) human: bool,
    pub(crate) hand: Hand,
    pub(crate) eliminated: bool,
}

impl Player {
    fn for_seat(seat: usize) -> Self {
        let (name, human) =
            if seat == HUMAN_SEAT { ("You".into(), true) } else { (format!("CPU{seat}"), false) };
        Self { name, human, hand: Hand::new(), eliminated: false }
    }

    /// Returns the player's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    /// Whether any held card fits under the limit at `sum`.
    pub fn has_playable(&self, sum: i32) -> bool {
        self.hand.playable(sum).next().is_some()
    }
}

/// Authoritative state of one fifty-counter session.
///
/// The deck, the discard pile, the visible card and every hand together
/// always hold exactly the 52 canonical cards.
#[derive(Debug)]
#[non_exhaustive]
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) current: usize,
    pub(crate) deck: Deck,
    /// Previously visible cards; the last element is the most recent.
    pub(crate) discard: Vec<Card>,
    pub(crate) last_played: Option<Card>,
    pub(crate) table_sum: i32,
    rng: ChaCha8Rng,
    history: VecDeque<TurnRecord>,
    // Bumped on every state change, never reset
    revision: u64,
}

impl Game {
    /// Deal a new game for `num_players` (clamped to 2..=4) with a random seed.
    pub fn new(num_players: usize) -> Self {
        let seed: u64 = rand::rng().random();
        Self::with_seed(num_players, seed)
    }

    /// Deal a new game whose shuffles are reproducible from `seed`.
    ///
    /// ```
    /// use fifty_counter::game::Game;
    ///
    /// let game = Game::with_seed(2, 7);
    /// assert_eq!(game.players().len(), 2);
    /// assert_eq!(game.deck_len(), 52 - 8 - 1);
    /// ```
    pub fn with_seed(num_players: usize, seed: u64) -> Self {
        let mut game = Self {
            players: Vec::new(),
            current: HUMAN_SEAT,
            deck: Deck::default(),
            discard: Vec::new(),
            last_played: None,
            table_sum: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            revision: 0,
        };
        game.start_game(num_players);
        game
    }

    /// Build a game from explicit hands and visible card.
    ///
    /// The deck holds the remaining canonical cards in standard order, which
    /// makes draws predictable. Seat 0 is the human and plays first.
    pub fn rigged(
        hands: Vec<Vec<Card>>,
        table: Option<Card>,
        table_sum: i32,
    ) -> Result<Self, SetupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&hands.len()) {
            return Err(SetupError::PlayerCount(hands.len()));
        }
        if table_sum > MAX_SUM {
            return Err(SetupError::SumOutOfRange(table_sum));
        }
        let mut deck = Deck::standard();
        let mut players = Vec::with_capacity(hands.len());
        for (seat, cards) in hands.into_iter().enumerate() {
            let mut player = Player::for_seat(seat);
            for card in cards {
                if !deck.take(card) {
                    return Err(SetupError::DuplicateCard(card));
                }
                player.hand.add(card);
            }
            players.push(player);
        }
        if let Some(card) = table {
            if !deck.take(card) {
                return Err(SetupError::DuplicateCard(card));
            }
        }
        Ok(Self {
            players,
            current: HUMAN_SEAT,
            deck,
            discard: Vec::new(),
            last_played: table,
            table_sum,
            rng: ChaCha8Rng::seed_from_u64(0),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            revision: 0,
        })
    }

    /// Reset to a freshly dealt game, reusing this game's RNG stream.
    pub fn start_game(&mut self, num_players: usize) {
        let n = num_players.clamp(MIN_PLAYERS, MAX_PLAYERS);
        self.players = (0..n).map(Player::for_seat).collect();
        self.deck = Deck::shuffled(&mut self.rng);
        self.discard.clear();
        self.last_played = None;
        self.table_sum = 0;
        self.current = HUMAN_SEAT;
        self.history.clear();
        self.revision += 1;

        self.deal_hands();
        self.last_played = self.deck.draw();
        self.table_sum = self.last_played.map(|c| c.value_when_played(0)).unwrap_or(0);
        debug!(
            players = n,
            table = ?self.last_played,
            sum = self.table_sum,
            "game started"
        );
    }

    // One card to every player per round, HAND_SIZE rounds.
    fn deal_hands(&mut self) {
        for _ in 0..HAND_SIZE {
            for p in &mut self.players {
                if let Some(card) = self.deck.draw() {
                    p.hand.add(card);
                }
            }
        }
    }

    /// Returns a reference to the players, in seat order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    /// Returns the seat whose turn it is
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    /// Returns the card visible on the table
    pub fn last_played(&self) -> Option<Card> {
        self.last_played
    }

    pub fn table_sum(&self) -> i32 {
        self.table_sum
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Discarded cards, oldest first.
    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| !p.eliminated).count()
    }

    pub fn has_winner(&self) -> bool {
        self.active_count() == 1
    }

    pub fn status(&self) -> GameStatus {
        if self.has_winner() {
            GameStatus::Finished
        } else {
            GameStatus::InProgress
        }
    }

    pub fn winner_seat(&self) -> Option<usize> {
        if !self.has_winner() {
            return None;
        }
        self.players.iter().position(|p| !p.eliminated)
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner_seat().map(|seat| &self.players[seat])
    }

    pub fn is_playable(&self, card: Card) -> bool {
        card.is_playable(self.table_sum)
    }

    pub fn has_playable(&self, seat: usize) -> bool {
        self.players.get(seat).is_some_and(|p| p.has_playable(self.table_sum))
    }

    /// Every card the game currently accounts for; 52 whenever the game is consistent.
    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + usize::from(self.last_played.is_some())
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// The latest [`HISTORY_LIMIT`] turn records, oldest first.
    pub fn history(&self) -> &VecDeque<TurnRecord> {
        &self.history
    }

    pub fn history_recent(&self, n: usize) -> Vec<TurnRecord> {
        let start = self.history.len().saturating_sub(n);
        self.history.range(start..).copied().collect()
    }

    /// Counter that grows with every change to the table. Later states
    /// always carry a larger value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Play `card` for the current player.
    ///
    /// The move is validated completely before anything changes: a rejected
    /// move leaves the game exactly as it was. The turn does not advance.
    pub fn apply_move(&mut self, card: Card) -> Result<MoveOutcome, MoveError> {
        if self.has_winner() {
            return Err(MoveError::GameOver);
        }
        let sum_before = self.table_sum;
        if !card.is_playable(sum_before) {
            return Err(MoveError::ExceedsLimit { card, sum: sum_before });
        }
        let seat = self.current;
        if !self.players[seat].hand.contains(card) {
            return Err(MoveError::NotInHand { card });
        }

        if let Some(prev) = self.last_played.replace(card) {
            self.discard.push(prev);
        }
        let value = card.value_when_played(sum_before);
        self.table_sum = sum_before + value;
        self.players[seat].hand.remove(card);
        self.record(seat, TurnEvent::Played { card, value, sum: self.table_sum });
        debug!(seat, %card, value, sum = self.table_sum, "card played");

        self.refill_if_needed();
        let drawn = self.draw_for(seat);
        Ok(MoveOutcome { table_sum: self.table_sum, played: card, drawn })
    }

    /// Shuffle the discard pile under the deck once the deck has run out.
    ///
    /// The visible card stays on the table. Returns how many cards moved.
    pub fn refill_if_needed(&mut self) -> usize {
        if !self.deck.is_empty() || self.discard.is_empty() {
            return 0;
        }
        let mut pool = std::mem::take(&mut self.discard);
        pool.shuffle(&mut self.rng);
        let moved = pool.len();
        self.deck.extend_bottom(pool);
        self.record(self.current, TurnEvent::Refilled { cards: moved });
        debug!(cards = moved, "deck refilled from discard pile");
        moved
    }

    fn draw_for(&mut self, seat: usize) -> Option<Card> {
        let card = self.deck.draw()?;
        self.players[seat].hand.add(card);
        self.record(seat, TurnEvent::Drew { card });
        Some(card)
    }

    /// Eliminate `seat` if none of its cards can be played.
    ///
    /// The hand goes to the bottom of the deck in hand order. Returns whether
    /// the player was eliminated by this call.
    pub fn eliminate_if_stuck(&mut self, seat: usize) -> bool {
        if self.has_winner() {
            return false;
        }
        let sum = self.table_sum;
        let Some(player) = self.players.get_mut(seat) else {
            return false;
        };
        if player.eliminated || player.has_playable(sum) {
            return false;
        }
        let returned = player.hand.take_all();
        player.eliminated = true;
        info!(seat, player = %player.name, sum, returned = returned.len(), "player eliminated");

        let count = returned.len();
        self.deck.extend_bottom(returned);
        self.record(seat, TurnEvent::Eliminated { returned: count });
        if let Some(winner) = self.winner() {
            info!(winner = %winner.name, "game finished");
        }
        true
    }

    /// Move to the next seat still in the game. Does nothing once there is a winner.
    pub fn next_turn(&mut self) {
        if self.has_winner() || self.players.is_empty() {
            return;
        }
        let n = self.players.len();
        for step in 1..=n {
            let idx = (self.current + step) % n;
            if !self.players[idx].eliminated {
                self.current = idx;
                self.revision += 1;
                return;
            }
        }
    }

    /// Greedy defensive choice: the playable card leaving the lowest sum.
    ///
    /// Resulting sum and delta order the same way, so ties fall back to hand
    /// order. `None` means the seat is stuck.
    pub fn cpu_choose_card(&self, seat: usize) -> Option<Card> {
        let player = self.players.get(seat)?;
        if player.eliminated {
            return None;
        }
        let sum = self.table_sum;
        player.hand.playable(sum).min_by_key(|c| c.value_when_played(sum))
    }

    fn record(&mut self, seat: usize, event: TurnEvent) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(TurnRecord { seat, event });
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn rig(hands: &[&str], table: &str, sum: i32) -> Game {
        let table = if table.is_empty() { None } else { Some(card(table)) };
        Game::rigged(hands.iter().map(|h| cards(h)).collect(), table, sum).unwrap()
    }

    #[test]
    fn two_player_deal_shape() {
        let g = Game::with_seed(2, 11);
        assert_eq!(g.players.len(), 2);
        assert!(g.players[0].is_human());
        assert!(!g.players[1].is_human());
        assert!(g.players.iter().all(|p| p.hand.len() == HAND_SIZE));
        assert_eq!(g.deck.len(), 43);
        let table = g.last_played.unwrap();
        assert_eq!(g.table_sum, table.value_when_played(0));
        assert_eq!(g.current, HUMAN_SEAT);
        assert_eq!(g.total_cards(), 52);
    }

    #[test]
    fn deal_is_round_major() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let order: Vec<Card> = Deck::shuffled(&mut rng).iter().collect();
        let g = Game::with_seed(2, 9);
        assert_eq!(g.players[0].hand.snapshot(), vec![order[0], order[2], order[4], order[6]]);
        assert_eq!(g.players[1].hand.snapshot(), vec![order[1], order[3], order[5], order[7]]);
        assert_eq!(g.last_played, Some(order[8]));
    }

    #[test]
    fn player_count_is_clamped() {
        assert_eq!(Game::with_seed(1, 1).players.len(), 2);
        assert_eq!(Game::with_seed(9, 1).players.len(), 4);
        let g = Game::with_seed(4, 1);
        assert_eq!(g.players[3].name(), "CPU3");
        assert_eq!(g.deck.len(), 52 - 16 - 1);
    }

    #[test]
    fn rigged_rejects_bad_layouts() {
        let dup = Game::rigged(vec![cards("As 2c"), cards("As")], None, 0);
        assert!(matches!(dup, Err(SetupError::DuplicateCard(_))));
        let solo = Game::rigged(vec![cards("As")], None, 0);
        assert!(matches!(solo, Err(SetupError::PlayerCount(1))));
        let table_dup = Game::rigged(vec![cards("As"), cards("2c")], Some(card("2c")), 0);
        assert!(matches!(table_dup, Err(SetupError::DuplicateCard(_))));
        let high = Game::rigged(vec![cards("As"), cards("2c")], None, 51);
        assert!(matches!(high, Err(SetupError::SumOutOfRange(51))));
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut g = rig(&["6s 2c", "3d 4d"], "8h", 45);
        let hand_before = g.players[0].hand.snapshot();
        let deck_before: Vec<Card> = g.deck.iter().collect();

        assert_eq!(
            g.apply_move(card("6s")),
            Err(MoveError::ExceedsLimit { card: card("6s"), sum: 45 })
        );
        assert_eq!(g.apply_move(card("3d")), Err(MoveError::NotInHand { card: card("3d") }));

        assert_eq!(g.players[0].hand.snapshot(), hand_before);
        assert_eq!(g.deck.iter().collect::<Vec<_>>(), deck_before);
        assert_eq!(g.table_sum, 45);
        assert_eq!(g.last_played, Some(card("8h")));
        assert!(g.discard.is_empty());
        assert!(g.history.is_empty());
    }

    #[test]
    fn limit_is_checked_before_membership() {
        let mut g = rig(&["2c", "9d"], "8h", 49);
        // not held and too big: the limit wins
        assert!(matches!(g.apply_move(card("5s")), Err(MoveError::ExceedsLimit { .. })));
    }

    #[test]
    fn accepted_move_discards_previous_card_and_draws() {
        let mut g = rig(&["5s 2c", "3d 4d"], "8h", 20);
        let top = g.deck.top();
        let out = g.apply_move(card("5s")).unwrap();

        assert_eq!(out.table_sum, 25);
        assert_eq!(out.played, card("5s"));
        assert_eq!(out.drawn, top);
        assert_eq!(g.last_played, Some(card("5s")));
        assert_eq!(g.discard, vec![card("8h")]);
        assert!(!g.players[0].hand.contains(card("5s")));
        assert_eq!(g.players[0].hand.len(), 2);
        assert_eq!(g.current, 0, "apply_move does not advance the turn");
        assert_eq!(g.total_cards(), 52);
    }

    #[test]
    fn ace_value_uses_sum_before_the_card() {
        let mut g = rig(&["Ah", "3d"], "8h", 40);
        g.apply_move(card("Ah")).unwrap();
        assert_eq!(g.table_sum, 50);

        let mut g = rig(&["Ah", "3d"], "8h", 45);
        g.apply_move(card("Ah")).unwrap();
        assert_eq!(g.table_sum, 46);
    }

    #[test]
    fn refill_shuffles_discard_under_empty_deck_and_keeps_visible_card() {
        let mut g = rig(&["Ks 2c", "3d 4d"], "8h", 30);
        let rest = g.deck.draw_n(g.deck.len());
        g.discard.extend(rest);
        assert!(g.deck.is_empty());

        let out = g.apply_move(card("Ks")).unwrap();
        assert_eq!(g.last_played, Some(card("Ks")));
        assert!(!g.deck.contains(card("Ks")));
        assert!(g.discard.is_empty());
        assert!(out.drawn.is_some());
        assert_eq!(g.total_cards(), 52);
        assert!(g
            .history
            .iter()
            .any(|r| matches!(r.event, TurnEvent::Refilled { cards: 48 })));
    }

    #[test]
    fn refill_is_noop_while_deck_has_cards() {
        let mut g = rig(&["Ks", "3d"], "8h", 30);
        g.discard.push(g.deck.draw().unwrap());
        assert_eq!(g.refill_if_needed(), 0);
        assert_eq!(g.discard.len(), 1);
    }

    #[test]
    fn hand_shrinks_when_nothing_left_to_draw() {
        let mut g = rig(&["Ks 2c", "3d"], "", 30);
        let rest = g.deck.draw_n(g.deck.len());
        for c in rest {
            g.players[1].hand.add(c);
        }
        let out = g.apply_move(card("Ks")).unwrap();
        assert_eq!(out.drawn, None);
        assert_eq!(g.players[0].hand.len(), 1);
        assert_eq!(g.total_cards(), 52);
    }

    #[test]
    fn stuck_player_returns_hand_to_deck_bottom_in_order() {
        let mut g = rig(&["7s 2c 10d", "Jd 4d"], "8h", 49);
        let before = g.deck.len();

        assert!(g.eliminate_if_stuck(0));
        let p = &g.players[0];
        assert!(p.is_eliminated());
        assert!(p.hand.is_empty());
        let deck: Vec<Card> = g.deck.iter().collect();
        assert_eq!(deck.len(), before + 3);
        assert_eq!(&deck[before..], cards("7s 2c 10d").as_slice());
        assert_eq!(g.total_cards(), 52);
    }

    #[test]
    fn eliminate_is_noop_with_a_playable_card_or_twice() {
        let mut g = rig(&["7s 9c", "5d 4d", "Qh"], "8h", 47);
        assert!(!g.eliminate_if_stuck(0), "nine is playable");
        assert!(g.eliminate_if_stuck(1));
        assert!(!g.eliminate_if_stuck(1), "already out");
        assert!(!g.eliminate_if_stuck(7), "no such seat");
    }

    #[test]
    fn winner_only_after_third_elimination() {
        let mut g = rig(&["Jc", "2d 3d", "4h 5h", "6c 7c"], "8h", 50);
        assert!(!g.has_winner());
        assert!(g.eliminate_if_stuck(1));
        assert!(!g.has_winner());
        assert!(g.eliminate_if_stuck(2));
        assert!(!g.has_winner());
        assert_eq!(g.status(), GameStatus::InProgress);
        assert!(g.eliminate_if_stuck(3));
        assert!(g.has_winner());
        assert_eq!(g.status(), GameStatus::Finished);
        assert_eq!(g.winner_seat(), Some(0));
        assert_eq!(g.winner().map(|p| p.name()), Some("You"));
    }

    #[test]
    fn finished_game_refuses_further_changes() {
        let mut g = rig(&["Jc", "2d 3d"], "8h", 50);
        assert!(g.eliminate_if_stuck(1));
        let cur = g.current;
        g.next_turn();
        assert_eq!(g.current, cur);
        assert_eq!(g.apply_move(card("Jc")), Err(MoveError::GameOver));
        assert!(!g.eliminate_if_stuck(0));
    }

    #[test]
    fn next_turn_skips_eliminated_and_wraps() {
        let mut g = rig(&["Jc", "2d 3d", "Qh", "Kd"], "8h", 50);
        assert!(g.eliminate_if_stuck(1));
        g.next_turn();
        assert_eq!(g.current, 2);
        g.next_turn();
        assert_eq!(g.current, 3);
        g.next_turn();
        assert_eq!(g.current, 0);
    }

    #[test]
    fn cpu_picks_card_leaving_lowest_sum() {
        let g = rig(&["2c", "5s Kd 9c Ah"], "8h", 30);
        assert_eq!(g.cpu_choose_card(1), Some(card("Kd")));

        let g = rig(&["2c", "5s 9c 3h"], "8h", 30);
        assert_eq!(g.cpu_choose_card(1), Some(card("9c")));

        // equal deltas keep hand order
        let g = rig(&["2c", "Qs Kd Jh"], "8h", 30);
        assert_eq!(g.cpu_choose_card(1), Some(card("Qs")));
    }

    #[test]
    fn cpu_choice_is_repeatable_and_none_when_stuck() {
        let g = rig(&["2c", "7s 4d Ah 6c"], "8h", 44);
        let first = g.cpu_choose_card(1);
        assert_eq!(first, Some(card("Ah")));
        for _ in 0..10 {
            assert_eq!(g.cpu_choose_card(1), first);
        }

        let g = rig(&["2c", "7s 4d"], "8h", 47);
        assert_eq!(g.cpu_choose_card(1), None);
    }

    #[test]
    fn history_tracks_play_and_draw() {
        let mut g = rig(&["5s", "3d"], "8h", 20);
        g.apply_move(card("5s")).unwrap();
        let recent = g.history_recent(5);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].event, TurnEvent::Played { card: card("5s"), value: 5, sum: 25 });
        assert!(matches!(recent[1].event, TurnEvent::Drew { .. }));
        assert_eq!(recent[1].event.label(), "Draw");
        assert_eq!(g.history_recent(1).len(), 1);
    }

    #[test]
    fn history_drops_oldest_past_limit() {
        let mut g = rig(&["5s", "3d"], "8h", 20);
        for i in 0..HISTORY_LIMIT + 10 {
            g.record(1, TurnEvent::Refilled { cards: i });
        }
        assert_eq!(g.history().len(), HISTORY_LIMIT);
        assert_eq!(g.history().front().map(|r| r.event), Some(TurnEvent::Refilled { cards: 10 }));
        let last = g.history_recent(1);
        assert_eq!(last[0].event, TurnEvent::Refilled { cards: HISTORY_LIMIT + 9 });
    }

    #[test]
    fn revision_grows_with_every_change() {
        let mut g = rig(&["5s 6s", "3d"], "8h", 45);
        let start = g.revision();
        assert!(g.apply_move(card("6s")).is_err());
        assert_eq!(g.revision(), start);
        g.apply_move(card("5s")).unwrap();
        let played = g.revision();
        assert!(played > start);
        g.next_turn();
        assert!(g.revision() > played);
        let before_restart = g.revision();
        g.start_game(2);
        assert!(g.revision() > before_restart);
    }
}
