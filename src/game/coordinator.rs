//! Coordinator actor.
//!
//! Owns the deck, the round timer, and the adjudication loop. The round
//! state machine is: deal cards → run the round (tick, drain the
//! verification queue FIFO, remove matched cards, replenish) → collect the
//! table back into the deck → redeal, until no set remains anywhere or an
//! external stop arrives. Terminates every player actor (and transitively
//! every stimulus task) and waits for them before exiting.

use super::{
    config::{GameConfig, TimerMode},
    entities::{CardId, Deck, PlayerId, Scoreboard, Verdict},
    rules::SetRules,
    table::Table,
    timer::RoundTimer,
    ui::UiSender,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

pub(crate) struct Coordinator {
    config: GameConfig,
    rules: Arc<dyn SetRules>,
    table: Arc<Table>,
    deck: Deck,
    timer: RoundTimer,
    scoreboard: Scoreboard,
    ui: UiSender,
    /// FIFO hand-off from players; this is the only reader.
    verify_rx: mpsc::UnboundedReceiver<PlayerId>,
    /// Targeted wake channel per player.
    verdict_txs: Vec<mpsc::UnboundedSender<Verdict>>,
    /// External termination request.
    ctrl: watch::Receiver<bool>,
    /// Cascade stop signal owned by the coordinator.
    player_shutdown: watch::Sender<bool>,
    players: Vec<JoinHandle<()>>,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: GameConfig,
        rules: Arc<dyn SetRules>,
        table: Arc<Table>,
        scoreboard: Scoreboard,
        ui: UiSender,
        verify_rx: mpsc::UnboundedReceiver<PlayerId>,
        verdict_txs: Vec<mpsc::UnboundedSender<Verdict>>,
        ctrl: watch::Receiver<bool>,
        player_shutdown: watch::Sender<bool>,
        players: Vec<JoinHandle<()>>,
    ) -> Self {
        let deck = Deck::new(config.deck_size);
        let timer = RoundTimer::new(config.timer_mode(), config.warning());
        Self {
            config,
            rules,
            table,
            deck,
            timer,
            scoreboard,
            ui,
            verify_rx,
            verdict_txs,
            ctrl,
            player_shutdown,
            players,
        }
    }

    /// Main coordinator loop: rounds until termination, then winners, then
    /// cascade shutdown.
    pub(crate) async fn run(mut self) {
        log::info!("coordinator starting");

        while !self.should_finish() {
            self.deal().await;
            self.round_loop().await;
            self.timer.publish(&self.ui);
            self.table.collect_into_deck(&mut self.deck).await;
            if self.terminated() {
                break;
            }
        }

        self.announce_winners();
        self.shutdown_players().await;
        log::info!("coordinator terminated");
    }

    fn terminated(&self) -> bool {
        *self.ctrl.borrow()
    }

    /// Game over when externally stopped, or when no set can ever be formed
    /// again. At round boundaries the table has been collected, so the deck
    /// is the universe of live cards.
    fn should_finish(&self) -> bool {
        self.terminated() || !self.rules.has_set(self.deck.cards())
    }

    /// Fill the table from the shuffled deck; a non-empty deal resets the
    /// round clock and emits hints when configured.
    async fn deal(&mut self) {
        let placed = self.table.fill_from_deck(&mut self.deck).await;
        if placed > 0 {
            log::debug!("dealt {placed} cards, {} left in deck", self.deck.len());
            self.timer.reset();
            self.timer.publish(&self.ui);
            self.emit_hints().await;
        }
    }

    /// The running-round loop: suspend, refresh the display, drain the
    /// verification queue, remove matched cards, replenish.
    async fn round_loop(&mut self) {
        loop {
            if self.terminated() || self.round_over().await {
                return;
            }

            let first = match self.timer.mode() {
                // No timer: suspend until a player completes a selection.
                TimerMode::Untimed => {
                    tokio::select! {
                        _ = self.ctrl.wait_for(|stop| *stop) => return,
                        player = self.verify_rx.recv() => match player {
                            Some(player) => Some(player),
                            None => return,
                        },
                    }
                }
                // Countdown or elapsed display: a short bounded tick.
                TimerMode::Countdown(_) | TimerMode::Elapsed => {
                    tokio::select! {
                        _ = self.ctrl.wait_for(|stop| *stop) => return,
                        _ = tokio::time::sleep(self.config.tick()) => None,
                    }
                }
            };

            // Display refresh happens outside the table lock.
            self.timer.publish(&self.ui);

            let matched = self.drain(first).await;
            if !matched.is_empty() {
                self.table.remove_cards(&matched).await;
            }
            self.deal().await;
        }
    }

    /// Round exit conditions: countdown expiry; with no deadline, set
    /// exhaustion on the table; and in any mode, an exhausted deck with a
    /// setless table.
    async fn round_over(&mut self) -> bool {
        if self.timer.expired() {
            return true;
        }
        match self.timer.mode() {
            TimerMode::Countdown(_) => {
                if self.deck.is_empty() {
                    let cards = self.table.cards_on_table().await;
                    return !self.rules.has_set(&cards);
                }
                false
            }
            TimerMode::Elapsed | TimerMode::Untimed => {
                let cards = self.table.cards_on_table().await;
                !self.rules.has_set(&cards)
            }
        }
    }

    /// One adjudication pass: judge queued players strictly in enqueue
    /// order. A card consumed by an earlier valid set in this pass makes any
    /// later selection referencing it stale — discarded, no judgement, but
    /// the player is still woken. Returns the cards to remove.
    async fn drain(&mut self, first: Option<PlayerId>) -> Vec<CardId> {
        let mut matched: Vec<CardId> = Vec::new();
        let mut next = first;
        loop {
            let player = match next.take() {
                Some(player) => player,
                None => match self.verify_rx.try_recv() {
                    Ok(player) => player,
                    Err(_) => break,
                },
            };

            let selection = self.table.selection_of(player).await;
            let cards: Vec<CardId> = selection.iter().map(|(_, card)| *card).collect();

            let verdict = if cards.len() < self.rules.set_size()
                || cards.iter().any(|card| matched.contains(card))
            {
                Verdict::Discarded
            } else if self.rules.is_valid_set(&cards) {
                matched.extend(cards);
                Verdict::Point
            } else {
                Verdict::Penalty
            };

            log::debug!("player {player} judged: {verdict:?}");
            // A closed channel means the player already terminated.
            let _ = self.verdict_txs[player].send(verdict);
        }
        matched
    }

    /// Report every currently-solvable set to the presentation layer.
    async fn emit_hints(&self) {
        if !self.config.hints {
            return;
        }
        let cards = self.table.cards_on_table().await;
        for set in self.rules.enumerate_sets(&cards, usize::MAX) {
            let mut slots = Vec::with_capacity(set.len());
            for card in set {
                if let Some(slot) = self.table.card_to_slot(card).await {
                    slots.push(slot);
                }
            }
            slots.sort_unstable();
            log::info!("hint: set at slots {slots:?}");
            self.ui.hint(slots);
        }
    }

    fn announce_winners(&self) {
        let winners = self.scoreboard.leaders();
        log::info!("winners: {winners:?}");
        self.ui.announce_winners(winners);
    }

    /// Stop every player actor and wait for each (players join their own
    /// stimulus tasks), so no actor outlives the game.
    async fn shutdown_players(&mut self) {
        let _ = self.player_shutdown.send(true);
        for handle in self.players.drain(..) {
            let _ = handle.await;
        }
    }
}
