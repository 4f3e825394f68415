//! Game session wiring.
//!
//! [`GameSession::spawn`] builds the shared table, the channel fabric, and
//! one task per actor, then hands back a [`GameHandle`] for feeding human
//! input, requesting termination, and joining the finished game.

use super::{
    config::{ConfigError, GameConfig},
    coordinator::Coordinator,
    entities::{Scoreboard, SlotId},
    player::{PlayerActor, PlayerHandle},
    rules::SetRules,
    table::Table,
    ui::UiSender,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

/// Handle to a running game.
pub struct GameHandle {
    players: Vec<PlayerHandle>,
    scoreboard: Scoreboard,
    ctrl_tx: watch::Sender<bool>,
    coordinator: JoinHandle<()>,
}

impl GameHandle {
    /// Input handles, one per player. Pressing keys for non-human players
    /// works too; their stimulus shares the same queue.
    #[must_use]
    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    /// Offer a key press for a player. See [`PlayerHandle::key_press`].
    pub fn key_press(&self, player: usize, slot: SlotId) -> bool {
        self.players[player].key_press(slot)
    }

    /// Current score snapshot, indexed by player id.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.scoreboard.snapshot()
    }

    /// Request termination. The coordinator short-circuits at its next loop
    /// boundary, announces winners, and stops every actor.
    pub fn terminate(&self) {
        self.ctrl_tx.send_replace(true);
    }

    /// Whether the coordinator has fully shut down.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.coordinator.is_finished()
    }

    /// Wait for the game to conclude. Every player and stimulus task has
    /// exited once this returns.
    pub async fn join(self) {
        let _ = self.coordinator.await;
    }
}

/// Factory for running games.
pub struct GameSession;

impl GameSession {
    /// Validate the configuration and spawn the coordinator, the players,
    /// and their stimulus tasks onto the current tokio runtime.
    pub fn spawn(
        config: GameConfig,
        rules: Arc<dyn SetRules>,
        ui: UiSender,
    ) -> Result<GameHandle, ConfigError> {
        config.validate()?;
        if rules.set_size() != config.set_size {
            return Err(ConfigError::RulesMismatch {
                rules: rules.set_size(),
                config: config.set_size,
            });
        }

        let scoreboard = Scoreboard::new(config.players);
        let (verify_tx, verify_rx) = mpsc::unbounded_channel();
        let (ctrl_tx, ctrl_rx) = watch::channel(false);
        let (player_shutdown, _) = watch::channel(false);

        let table = Arc::new(Table::new(
            config.table_size,
            config.deck_size,
            config.players,
            config.set_size,
            config.place_delay(),
            verify_tx,
            ui.clone(),
        ));

        let mut handles = Vec::with_capacity(config.players);
        let mut verdict_txs = Vec::with_capacity(config.players);
        let mut tasks = Vec::with_capacity(config.players);
        for id in 0..config.players {
            let (actor, handle, verdict_tx) = PlayerActor::new(
                id,
                &config,
                Arc::clone(&table),
                scoreboard.clone(),
                ui.clone(),
                player_shutdown.subscribe(),
            );
            handles.push(handle);
            verdict_txs.push(verdict_tx);
            tasks.push(tokio::spawn(actor.run()));
        }

        let coordinator = Coordinator::new(
            config,
            rules,
            table,
            scoreboard.clone(),
            ui,
            verify_rx,
            verdict_txs,
            ctrl_rx,
            player_shutdown,
            tasks,
        );
        let coordinator = tokio::spawn(coordinator.run());

        Ok(GameHandle {
            players: handles,
            scoreboard,
            ctrl_tx,
            coordinator,
        })
    }
}
