//! fifty-counter: a shedding card game where the table sum may never pass 50.
//!
//! Goals:
//! - Engine that never lets a rejected move change state
//! - Every one of the 52 cards accounted for at all times
//! - CPU seats played on a background thread, one human seat in the foreground
//!
//! ## Quick start: play a card
//! ```
//! use fifty_counter::cards::{parse_cards, Card, Rank, Suit};
//! use fifty_counter::game::Game;
//!
//! let hands = vec![parse_cards("Ah Kd 5s 2c").unwrap(), parse_cards("9c 3h 4d 7s").unwrap()];
//! let mut game = Game::rigged(hands, Some("8h".parse().unwrap()), 35).unwrap();
//!
//! // An Ace counts 10 while the sum stays within 50.
//! let outcome = game.apply_move(Card::new(Rank::Ace, Suit::Hearts)).unwrap();
//! assert_eq!(outcome.table_sum, 45);
//!
//! game.next_turn();
//! assert_eq!(game.cpu_choose_card(1), Some("9c".parse().unwrap()));
//! ```
//!
//! ## TUI
//! Run the interactive TUI with:
//! ```sh
//! cargo run --bin fifty-counter
//! ```

pub mod agents;
pub mod cards;
pub mod config;
pub mod coordinator;
pub mod deck;
pub mod engine;
pub mod game;
pub mod hand;
pub mod tui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
