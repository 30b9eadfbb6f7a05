// Engine API boundary. Agents, the turn coordinator and front-ends drive a
// game through this trait instead of reaching into `Game` internals. Players
// are addressed by seat index.

use crate::cards::Card;
use crate::game::{MoveError, MoveOutcome, Player};

pub trait GameEngine {
    // Session lifecycle
    fn start_game(&mut self, num_players: usize);

    // Mutations
    fn apply_move(&mut self, card: Card) -> Result<MoveOutcome, MoveError>;
    fn next_turn(&mut self);
    fn eliminate_if_stuck(&mut self, seat: usize) -> bool;

    // Queries
    fn current(&self) -> usize;
    fn current_player(&self) -> &Player;
    fn players(&self) -> &[Player];
    fn last_played(&self) -> Option<Card>;
    fn table_sum(&self) -> i32;
    fn is_playable(&self, card: Card) -> bool;
    fn cpu_choose_card(&self, seat: usize) -> Option<Card>;
    fn has_winner(&self) -> bool;
    fn winner(&self) -> Option<&Player>;
}

impl GameEngine for crate::game::Game {
    fn start_game(&mut self, num_players: usize) {
        self.start_game(num_players);
    }

    fn apply_move(&mut self, card: Card) -> Result<MoveOutcome, MoveError> {
        self.apply_move(card)
    }
    fn next_turn(&mut self) {
        self.next_turn();
    }
    fn eliminate_if_stuck(&mut self, seat: usize) -> bool {
        self.eliminate_if_stuck(seat)
    }

    fn current(&self) -> usize {
        self.current()
    }
    fn current_player(&self) -> &Player {
        self.current_player()
    }
    fn players(&self) -> &[Player] {
        self.players()
    }
    fn last_played(&self) -> Option<Card> {
        self.last_played()
    }
    fn table_sum(&self) -> i32 {
        self.table_sum()
    }
    fn is_playable(&self, card: Card) -> bool {
        self.is_playable(card)
    }
    fn cpu_choose_card(&self, seat: usize) -> Option<Card> {
        self.cpu_choose_card(seat)
    }
    fn has_winner(&self) -> bool {
        self.has_winner()
    }
    fn winner(&self) -> Option<&Player> {
        self.winner()
    }
}
