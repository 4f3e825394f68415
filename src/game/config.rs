//! Game configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Round timer behavior, derived from the sign of
/// [`GameConfig::round_timeout_millis`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerMode {
    /// Positive timeout: the round ends when the countdown expires.
    Countdown(Duration),
    /// Zero timeout: an elapsed-time display with no deadline; the round
    /// ends when no set remains on the table.
    Elapsed,
    /// Negative timeout: no timer at all; the coordinator suspends until a
    /// player completes a selection, and the round ends only when no set
    /// remains on the table.
    Untimed,
}

/// Errors detected when validating a [`GameConfig`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("need at least one player")]
    NoPlayers,
    #[error("human count {humans} exceeds player count {players}")]
    TooManyHumans { humans: usize, players: usize },
    #[error("set size must be at least 1")]
    ZeroSetSize,
    #[error("table size {table_size} cannot hold a set of {set_size}")]
    TableTooSmall { table_size: usize, set_size: usize },
    #[error("deck size {deck_size} cannot fill a set of {set_size}")]
    DeckTooSmall { deck_size: usize, set_size: usize },
    #[error("tick interval must be at least 1ms")]
    ZeroTick,
    #[error("expected {players} player names, got {names}")]
    NameCountMismatch { players: usize, names: usize },
    #[error("rules expect sets of {rules}, config says {config}")]
    RulesMismatch { rules: usize, config: usize },
}

/// Immutable game configuration, fixed at startup.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameConfig {
    /// Total number of players.
    pub players: usize,

    /// Number of human-driven players. Players `0..humans` accept only
    /// external input; players `humans..players` get a stimulus task that
    /// synthesizes key presses.
    pub humans: usize,

    /// Display names, one per player. Empty means `player-N` defaults.
    pub player_names: Vec<String>,

    /// Number of grid slots on the table.
    pub table_size: usize,

    /// Number of distinct card identities in the deck.
    pub deck_size: usize,

    /// Cards required to form a set (K).
    pub set_size: usize,

    /// Artificial latency per card placement/removal, in milliseconds.
    pub place_delay_millis: u64,

    /// Round length in milliseconds. Positive = countdown, zero =
    /// elapsed-time display, negative = untimed/manual.
    pub round_timeout_millis: i64,

    /// Countdown remainder below which the display carries a warning flag.
    pub warning_millis: u64,

    /// Freeze duration after a valid set, in milliseconds.
    pub point_freeze_millis: u64,

    /// Freeze duration after an invalid set, in milliseconds.
    pub penalty_freeze_millis: u64,

    /// Whether the coordinator emits solvable-set hints after dealing.
    pub hints: bool,

    /// Coordinator round-tick and freeze-display cadence, in milliseconds.
    /// This bounds how long a completed selection can wait before a drain
    /// pass picks it up.
    pub tick_millis: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 2,
            humans: 0,
            player_names: Vec::new(),
            table_size: 12,
            deck_size: 81,
            set_size: 3,
            place_delay_millis: 0,
            round_timeout_millis: 60_000,
            warning_millis: 10_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            hints: false,
            tick_millis: 10,
        }
    }
}

impl GameConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.humans > self.players {
            return Err(ConfigError::TooManyHumans {
                humans: self.humans,
                players: self.players,
            });
        }
        if self.set_size == 0 {
            return Err(ConfigError::ZeroSetSize);
        }
        if self.table_size < self.set_size {
            return Err(ConfigError::TableTooSmall {
                table_size: self.table_size,
                set_size: self.set_size,
            });
        }
        if self.deck_size < self.set_size {
            return Err(ConfigError::DeckTooSmall {
                deck_size: self.deck_size,
                set_size: self.set_size,
            });
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !self.player_names.is_empty() && self.player_names.len() != self.players {
            return Err(ConfigError::NameCountMismatch {
                players: self.players,
                names: self.player_names.len(),
            });
        }
        Ok(())
    }

    /// Timer mode for this configuration.
    #[must_use]
    pub fn timer_mode(&self) -> TimerMode {
        match self.round_timeout_millis {
            t if t > 0 => TimerMode::Countdown(Duration::from_millis(t as u64)),
            0 => TimerMode::Elapsed,
            _ => TimerMode::Untimed,
        }
    }

    /// Display name for a player.
    #[must_use]
    pub fn player_name(&self, player: usize) -> String {
        self.player_names
            .get(player)
            .cloned()
            .unwrap_or_else(|| format!("player-{player}"))
    }

    /// Whether a player is human-driven (no stimulus task).
    #[must_use]
    pub fn is_human(&self, player: usize) -> bool {
        player < self.humans
    }

    #[must_use]
    pub fn place_delay(&self) -> Duration {
        Duration::from_millis(self.place_delay_millis)
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    #[must_use]
    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.warning_millis)
    }

    #[must_use]
    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    #[must_use]
    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn timer_mode_follows_timeout_sign() {
        let mut config = GameConfig::default();
        config.round_timeout_millis = 30_000;
        assert_eq!(
            config.timer_mode(),
            TimerMode::Countdown(Duration::from_secs(30))
        );
        config.round_timeout_millis = 0;
        assert_eq!(config.timer_mode(), TimerMode::Elapsed);
        config.round_timeout_millis = -1;
        assert_eq!(config.timer_mode(), TimerMode::Untimed);
    }

    #[test]
    fn rejects_table_smaller_than_set() {
        let config = GameConfig {
            table_size: 2,
            set_size: 3,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TableTooSmall {
                table_size: 2,
                set_size: 3
            })
        );
    }

    #[test]
    fn rejects_more_humans_than_players() {
        let config = GameConfig {
            players: 2,
            humans: 3,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_partial_name_list() {
        let config = GameConfig {
            players: 3,
            player_names: vec!["ada".into()],
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NameCountMismatch {
                players: 3,
                names: 1
            })
        );
    }

    #[test]
    fn player_names_fall_back_to_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.player_name(1), "player-1");
    }
}
