//! Core game engine: shared table state, actors, and session wiring.
//!
//! This module implements:
//! - `Table`: the single-critical-section shared state (cards + tokens)
//! - `PlayerActor`: one task per participant, plus stimulus tasks for
//!   non-human players
//! - `Coordinator`: dealing, round timing, and FIFO adjudication
//! - `GameSession`: channel fabric and actor spawning

pub mod config;
pub mod coordinator;
pub mod entities;
pub mod player;
pub mod rules;
pub mod session;
pub mod table;
pub mod timer;
pub mod ui;

pub use config::{ConfigError, GameConfig, TimerMode};
pub use entities::{CardId, Deck, PlayerId, Scoreboard, SlotId, Verdict};
pub use player::PlayerHandle;
pub use rules::{FeatureRules, SetRules};
pub use session::{GameHandle, GameSession};
pub use table::{Table, Toggle};
pub use ui::{UiEvent, UiSender};
