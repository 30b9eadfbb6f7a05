use crate::engine::GameEngine;
use crate::game::MoveError;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::time::Duration;
use tracing::{debug, warn};

use super::{AgentKind, PlayerAgent, TurnAction};

/// Timing configuration for a CPU player.
///
/// The card choice itself is deterministic; the RNG only spreads the
/// simulated thinking time between `min_delay_ms` and `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct BotProfile {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rng_seed: Option<u64>,
}

impl BotProfile {
    /// A profile that acts without any thinking delay.
    pub fn instant() -> Self {
        Self::with_delay(0, 0)
    }

    pub fn with_delay(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self { min_delay_ms, max_delay_ms, rng_seed: None }
    }

    /// Set a deterministic RNG seed for reproducible delays.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::with_delay(2000, 4000)
    }
}

/// CPU player using the greedy defensive heuristic.
#[derive(Debug)]
pub struct GreedyBot {
    profile: BotProfile,
    rng: StdRng,
}

impl GreedyBot {
    pub fn new(profile: BotProfile) -> Self {
        let rng = match profile.rng_seed {
            Some(v) => StdRng::seed_from_u64(v),
            None => {
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                StdRng::from_seed(seed)
            }
        };
        Self { profile, rng }
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    /// How long to pause before the next CPU move.
    pub fn think_time(&mut self) -> Duration {
        let min = self.profile.min_delay_ms;
        let max = self.profile.max_delay_ms.max(min);
        if max == min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(self.rng.random_range(min..=max))
    }
}

impl Default for GreedyBot {
    fn default() -> Self {
        Self::new(BotProfile::default())
    }
}

impl PlayerAgent for GreedyBot {
    fn kind(&self) -> AgentKind {
        AgentKind::Cpu
    }

    fn on_turn(
        &mut self,
        engine: &mut dyn GameEngine,
        seat: usize,
    ) -> Result<Option<TurnAction>, MoveError> {
        if engine.has_winner() || engine.current() != seat {
            return Ok(None);
        }
        let Some(card) = engine.cpu_choose_card(seat) else {
            debug!(seat, sum = engine.table_sum(), "cpu has no playable card");
            return Ok(engine.eliminate_if_stuck(seat).then_some(TurnAction::Eliminated));
        };
        match engine.apply_move(card) {
            Ok(outcome) => Ok(Some(TurnAction::Played(outcome))),
            Err(err) => {
                warn!(seat, %card, %err, "cpu choice rejected");
                if engine.eliminate_if_stuck(seat) {
                    Ok(Some(TurnAction::Eliminated))
                } else {
                    Err(err)
                }
            }
        }
    }
}
