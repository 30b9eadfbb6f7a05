//! Agents: seat controllers that act for a player when it is their turn.
//!
//! The turn coordinator owns the lock and the turn pointer; an agent only
//! decides and applies the move for its seat. Agents never advance the turn.

use crate::engine::GameEngine;
use crate::game::{MoveError, MoveOutcome};

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Cpu,
}

/// What an agent did with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TurnAction {
    Played(MoveOutcome),
    Eliminated,
}

/// A seat controller that can act for a player when it is their turn.
pub trait PlayerAgent {
    /// Called when `seat` should act. `Ok(None)` means nothing happened.
    fn on_turn(
        &mut self,
        engine: &mut dyn GameEngine,
        seat: usize,
    ) -> Result<Option<TurnAction>, MoveError>;
    /// The kind of this agent (human, CPU).
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }
}

mod bots;

pub use bots::{BotProfile, GreedyBot};
