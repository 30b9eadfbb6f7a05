use crate::agents::BotProfile;
use crate::game::{MAX_PLAYERS, MIN_PLAYERS};
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("player count must be between 2 and 4, got {0}")]
    PlayerCount(usize),
    #[error("cpu delay range is inverted: min {min} ms > max {max} ms")]
    DelayRange { min: u64, max: u64 },
    #[error("idle poll interval must be non-zero")]
    IdlePoll,
}

/// Settings for one table: who sits down and how the CPUs pace themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TableConfig {
    pub players: usize,
    /// Seed for deck shuffles and CPU delays; random when absent.
    pub seed: Option<u64>,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// How often the CPU worker re-checks the table while the human thinks.
    pub idle_poll_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { players: 2, seed: None, min_delay_ms: 2000, max_delay_ms: 4000, idle_poll_ms: 100 }
    }
}

impl TableConfig {
    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_delay(mut self, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.min_delay_ms = min_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::PlayerCount(self.players));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::DelayRange { min: self.min_delay_ms, max: self.max_delay_ms });
        }
        if self.idle_poll_ms == 0 {
            return Err(ConfigError::IdlePoll);
        }
        Ok(())
    }

    pub fn bot_profile(&self) -> BotProfile {
        let profile = BotProfile::with_delay(self.min_delay_ms, self.max_delay_ms);
        match self.seed {
            Some(seed) => profile.with_seed(seed),
            None => profile,
        }
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.bot_profile(), BotProfile::with_delay(2000, 4000));
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = TableConfig::default().with_players(5);
        assert_eq!(cfg.validate(), Err(ConfigError::PlayerCount(5)));
        let cfg = TableConfig::default().with_delay(10, 5);
        assert_eq!(cfg.validate(), Err(ConfigError::DelayRange { min: 10, max: 5 }));
        let mut cfg = TableConfig::default();
        cfg.idle_poll_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::IdlePoll));
    }

    #[test]
    fn seed_reaches_bot_profile() {
        let cfg = TableConfig::default().with_seed(3);
        assert_eq!(cfg.bot_profile().rng_seed, Some(3));
    }
}
