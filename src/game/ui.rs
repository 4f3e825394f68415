//! One-way event stream to the presentation layer.
//!
//! The engine pushes display updates through a [`UiSender`] and never reads
//! anything back. A headless game simply drops the receiving end; sends to a
//! closed channel are ignored.

use super::entities::{CardId, PlayerId, SlotId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Display updates emitted by the engine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UiEvent {
    /// A card landed in a slot.
    CardPlaced { card: CardId, slot: SlotId },
    /// A slot was emptied.
    CardRemoved { slot: SlotId },
    /// Every token on a slot was cleared (precedes its `CardRemoved`).
    TokensCleared { slot: SlotId },
    /// A player placed a token.
    TokenPlaced { player: PlayerId, slot: SlotId },
    /// A player removed a token.
    TokenRemoved { player: PlayerId, slot: SlotId },
    /// A player's score changed.
    ScoreUpdated { player: PlayerId, score: u32 },
    /// Freeze time left for a player; zero means unfrozen.
    FreezeRemaining { player: PlayerId, millis: u64 },
    /// Countdown display refresh. `warn` is set inside the warning window.
    Countdown { remaining_millis: u64, warn: bool },
    /// Elapsed-time display refresh.
    Elapsed { millis: u64 },
    /// A currently-solvable set, by slot, emitted only when hints are on.
    Hint { slots: Vec<SlotId> },
    /// Final standings: every player tied at the maximum score.
    Winners { players: Vec<PlayerId> },
}

/// Cloneable sending half of the presentation stream.
#[derive(Clone, Debug)]
pub struct UiSender {
    sender: mpsc::UnboundedSender<UiEvent>,
}

/// Create a presentation stream. Keep the receiver to render events, or
/// drop it to run headless.
#[must_use]
pub fn channel() -> (UiSender, mpsc::UnboundedReceiver<UiEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UiSender { sender }, receiver)
}

impl UiSender {
    fn emit(&self, event: UiEvent) {
        // The presentation layer going away is not the engine's problem.
        let _ = self.sender.send(event);
    }

    pub fn place_card(&self, card: CardId, slot: SlotId) {
        self.emit(UiEvent::CardPlaced { card, slot });
    }

    pub fn remove_card(&self, slot: SlotId) {
        self.emit(UiEvent::CardRemoved { slot });
    }

    pub fn clear_tokens(&self, slot: SlotId) {
        self.emit(UiEvent::TokensCleared { slot });
    }

    pub fn place_token(&self, player: PlayerId, slot: SlotId) {
        self.emit(UiEvent::TokenPlaced { player, slot });
    }

    pub fn remove_token(&self, player: PlayerId, slot: SlotId) {
        self.emit(UiEvent::TokenRemoved { player, slot });
    }

    pub fn set_score(&self, player: PlayerId, score: u32) {
        self.emit(UiEvent::ScoreUpdated { player, score });
    }

    pub fn set_freeze(&self, player: PlayerId, millis: u64) {
        self.emit(UiEvent::FreezeRemaining { player, millis });
    }

    pub fn set_countdown(&self, remaining_millis: u64, warn: bool) {
        self.emit(UiEvent::Countdown {
            remaining_millis,
            warn,
        });
    }

    pub fn set_elapsed(&self, millis: u64) {
        self.emit(UiEvent::Elapsed { millis });
    }

    pub fn hint(&self, slots: Vec<SlotId>) {
        self.emit(UiEvent::Hint { slots });
    }

    pub fn announce_winners(&self, players: Vec<PlayerId>) {
        self.emit(UiEvent::Winners { players });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (ui, mut rx) = channel();
        ui.place_card(7, 2);
        ui.set_score(0, 1);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::CardPlaced { card: 7, slot: 2 });
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::ScoreUpdated { player: 0, score: 1 }
        );
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (ui, rx) = channel();
        drop(rx);
        ui.remove_card(0);
        ui.announce_winners(vec![0]);
    }
}
