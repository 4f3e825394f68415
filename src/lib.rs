//! # Speedset
//!
//! A real-time, multi-actor card-matching game engine: several independent
//! player actors race to mark valid sets of cards on a shared table while a
//! coordinator actor deals, keeps the round clock, and adjudicates.
//!
//! ## Architecture
//!
//! Every actor is a tokio task. The only globally shared mutable state is
//! the [`Table`](game::Table), protected by one exclusive critical section
//! spanning both the slot↔card bijection and every player's token set.
//! Coordination is done with role-specific channels instead of broadcast
//! wake-ups:
//!
//! - players push their own id onto a FIFO **verification queue** the
//!   moment their K-th token lands (still inside the table's lock);
//! - the coordinator drains that queue between round ticks and answers each
//!   player on its private **verdict channel** (point, penalty, or
//!   discarded-as-stale);
//! - termination cascades through watch channels: external request →
//!   coordinator → players → stimulus tasks, with the coordinator joining
//!   everything before it exits.
//!
//! Set validity itself is a boundary: the engine consults a
//! [`SetRules`](game::SetRules) implementation and pushes one-way
//! [`UiEvent`](game::UiEvent)s to whatever presentation layer is attached.
//!
//! ## Example
//!
//! ```no_run
//! use speedset::{FeatureRules, GameConfig, GameSession, ui};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (ui_tx, mut events) = ui::channel();
//!     let game = GameSession::spawn(
//!         GameConfig::default(),
//!         Arc::new(FeatureRules::default()),
//!         ui_tx,
//!     )
//!     .expect("valid config");
//!
//!     tokio::spawn(async move { while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }});
//!
//!     game.join().await;
//! }
//! ```

/// Core game logic, actors, and session wiring.
pub mod game;
pub use game::{
    CardId, ConfigError, Deck, FeatureRules, GameConfig, GameHandle, GameSession, PlayerHandle,
    PlayerId, Scoreboard, SetRules, SlotId, Table, TimerMode, Toggle, UiEvent, UiSender, Verdict,
    ui,
};
