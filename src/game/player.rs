//! Player actor.
//!
//! One task per participant. The actor owns a bounded input queue of
//! candidate slots, applies accepted items to the table under its critical
//! section (toggle semantics), and runs a small state machine: Idle →
//! AwaitingVerification → (PointFreeze | PenaltyFreeze) → Idle. Non-human
//! players get a companion stimulus task that synthesizes uniformly random
//! key presses into the same queue.

use super::{
    config::GameConfig,
    entities::{PlayerId, Scoreboard, SlotId, Verdict},
    table::{Table, Toggle},
    ui::UiSender,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::Instant,
};

/// Handle for feeding input to a player.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    id: PlayerId,
    input_tx: mpsc::Sender<SlotId>,
}

impl PlayerHandle {
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Offer a key press. Returns false if the bounded queue is full or the
    /// player has terminated; dropped input is an expected race.
    pub fn key_press(&self, slot: SlotId) -> bool {
        self.input_tx.try_send(slot).is_ok()
    }
}

/// A single player's actor state.
pub(crate) struct PlayerActor {
    id: PlayerId,
    name: String,
    human: bool,
    table: Arc<Table>,
    scoreboard: Scoreboard,
    ui: UiSender,
    input_rx: mpsc::Receiver<SlotId>,
    /// Kept so the stimulus task can share the same bounded queue.
    input_tx: mpsc::Sender<SlotId>,
    verdict_rx: mpsc::UnboundedReceiver<Verdict>,
    shutdown: watch::Receiver<bool>,
    point_freeze: Duration,
    penalty_freeze: Duration,
    tick: Duration,
}

impl PlayerActor {
    /// Build the actor plus its input handle and the coordinator's verdict
    /// sender.
    pub(crate) fn new(
        id: PlayerId,
        config: &GameConfig,
        table: Arc<Table>,
        scoreboard: Scoreboard,
        ui: UiSender,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, PlayerHandle, mpsc::UnboundedSender<Verdict>) {
        let (input_tx, input_rx) = mpsc::channel(config.set_size);
        let (verdict_tx, verdict_rx) = mpsc::unbounded_channel();
        let actor = Self {
            id,
            name: config.player_name(id),
            human: config.is_human(id),
            table,
            scoreboard,
            ui,
            input_rx,
            input_tx: input_tx.clone(),
            verdict_rx,
            shutdown,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
            tick: config.tick(),
        };
        let handle = PlayerHandle { id, input_tx };
        (actor, handle, verdict_tx)
    }

    /// Main player loop. Runs until the shutdown signal fires.
    pub(crate) async fn run(mut self) {
        log::info!("player {} ({}) starting", self.id, self.name);

        let stimulus = if self.human {
            None
        } else {
            Some(self.spawn_stimulus())
        };

        loop {
            self.ui.set_freeze(self.id, 0);
            let slot = tokio::select! {
                _ = self.shutdown.wait_for(|stop| *stop) => break,
                slot = self.input_rx.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };

            if self.table.toggle_token(self.id, slot).await == Toggle::SelectionComplete
                && !self.await_verdict().await
            {
                break;
            }
        }

        if let Some(handle) = stimulus {
            let _ = handle.await;
        }
        log::info!("player {} ({}) terminated", self.id, self.name);
    }

    /// Block until the coordinator delivers this player's outcome. Returns
    /// false if the game terminated instead.
    async fn await_verdict(&mut self) -> bool {
        let verdict = tokio::select! {
            _ = self.shutdown.wait_for(|stop| *stop) => return false,
            verdict = self.verdict_rx.recv() => match verdict {
                Some(verdict) => verdict,
                None => return false,
            },
        };
        match verdict {
            Verdict::Point => self.point().await,
            Verdict::Penalty => self.penalty().await,
            // Stale selection: no score, no freeze, back to Idle.
            Verdict::Discarded => {}
        }
        true
    }

    async fn point(&mut self) {
        let score = self.scoreboard.award(self.id);
        log::debug!("player {} scored, now {score}", self.id);
        self.ui.set_score(self.id, score);
        self.freeze(self.point_freeze).await;
    }

    async fn penalty(&mut self) {
        log::debug!("player {} penalized", self.id);
        // An invalid selection is wiped; the player restarts from zero
        // tokens after the freeze.
        self.table.clear_selection(self.id).await;
        self.freeze(self.penalty_freeze).await;
    }

    /// Timed, non-interruptible freeze with a freeze-remaining display at
    /// the configured tick. Input buffered before or during the freeze is
    /// discarded.
    async fn freeze(&mut self, duration: Duration) {
        self.clear_input();
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline || *self.shutdown.borrow() {
                break;
            }
            let remaining = deadline - now;
            self.ui.set_freeze(self.id, remaining.as_millis() as u64);
            tokio::select! {
                _ = tokio::time::sleep(remaining.min(self.tick)) => {}
                _ = self.shutdown.changed() => {}
            }
        }
        self.ui.set_freeze(self.id, 0);
        self.clear_input();
    }

    fn clear_input(&mut self) {
        while self.input_rx.try_recv().is_ok() {}
    }

    fn spawn_stimulus(&self) -> JoinHandle<()> {
        let id = self.id;
        let table = Arc::clone(&self.table);
        let input_tx = self.input_tx.clone();
        let shutdown = self.shutdown.clone();
        let pause = self.tick;
        tokio::spawn(run_stimulus(id, table, input_tx, shutdown, pause))
    }
}

/// Synthetic input source for a non-human player: repeatedly presses a
/// uniformly random occupied slot. Backpressure comes from the bounded
/// input queue; a full queue just drops the press.
async fn run_stimulus(
    id: PlayerId,
    table: Arc<Table>,
    input_tx: mpsc::Sender<SlotId>,
    mut shutdown: watch::Receiver<bool>,
    pause: Duration,
) {
    log::debug!("stimulus for player {id} starting");
    while !*shutdown.borrow() {
        if let Some(slot) = table.random_occupied_slot().await {
            let _ = input_tx.try_send(slot);
        }
        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = shutdown.changed() => {}
        }
    }
    log::debug!("stimulus for player {id} terminated");
}
