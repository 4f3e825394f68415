//! Shared table state.
//!
//! The table owns the slot↔card bijection, every player's token set, and the
//! pool of empty slots, all behind one exclusive lock. Card mutations and
//! token mutations share that lock because they must never interleave: a
//! coordinator removing a card atomically purges every token on its slot,
//! and a player can never place a token on a slot mid-removal.
//!
//! A player completing its K-th token is enqueued on the verification
//! channel while the lock is still held, so token state and queue order can
//! never disagree.

use super::{
    entities::{CardId, Deck, PlayerId, SlotId},
    ui::UiSender,
};
use rand::{rng, seq::IndexedRandom, seq::SliceRandom};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// What a toggle application did, observed by the player actor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Toggle {
    /// A token was placed; the selection is still short of K.
    Placed,
    /// A token was placed, the selection reached K, and the player was
    /// enqueued for verification.
    SelectionComplete,
    /// An existing token on that slot was removed.
    Removed,
    /// Nothing happened: empty slot, or the player is at capacity. Expected
    /// races, not faults.
    Ignored,
}

#[derive(Debug)]
struct TableInner {
    slot_to_card: Vec<Option<CardId>>,
    card_to_slot: Vec<Option<SlotId>>,
    /// Token slots per player; never longer than `set_size`.
    tokens: Vec<Vec<SlotId>>,
    free_slots: Vec<SlotId>,
}

impl TableInner {
    fn occupied(&self, slot: SlotId) -> bool {
        self.slot_to_card[slot].is_some()
    }
}

/// The shared table. All mutators and token operations run inside one
/// exclusive critical section; the artificial placement delay is incurred
/// while it is held, matching the original placement semantics.
#[derive(Debug)]
pub struct Table {
    inner: Mutex<TableInner>,
    set_size: usize,
    place_delay: Duration,
    verify_tx: mpsc::UnboundedSender<PlayerId>,
    ui: UiSender,
}

impl Table {
    #[must_use]
    pub fn new(
        table_size: usize,
        deck_size: usize,
        players: usize,
        set_size: usize,
        place_delay: Duration,
        verify_tx: mpsc::UnboundedSender<PlayerId>,
        ui: UiSender,
    ) -> Self {
        Self {
            inner: Mutex::new(TableInner {
                slot_to_card: vec![None; table_size],
                card_to_slot: vec![None; deck_size],
                tokens: (0..players).map(|_| Vec::with_capacity(set_size)).collect(),
                free_slots: (0..table_size).collect(),
            }),
            set_size,
            place_delay,
            verify_tx,
            ui,
        }
    }

    /// Required selection size (K).
    #[must_use]
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Place a card in a slot. No-op if the slot is already occupied.
    pub async fn place_card(&self, card: CardId, slot: SlotId) {
        let mut t = self.inner.lock().await;
        self.place_card_locked(&mut t, card, slot).await;
    }

    async fn place_card_locked(&self, t: &mut TableInner, card: CardId, slot: SlotId) {
        if t.occupied(slot) {
            return;
        }
        tokio::time::sleep(self.place_delay).await;
        t.slot_to_card[slot] = Some(card);
        t.card_to_slot[card] = Some(slot);
        t.free_slots.retain(|s| *s != slot);
        self.ui.place_card(card, slot);
    }

    /// Remove the card in a slot, purging every player's token on that slot
    /// in the same atomic step. No-op if the slot is already empty.
    pub async fn remove_card(&self, slot: SlotId) {
        let mut t = self.inner.lock().await;
        self.remove_card_locked(&mut t, slot).await;
    }

    async fn remove_card_locked(&self, t: &mut TableInner, slot: SlotId) {
        let Some(card) = t.slot_to_card[slot] else {
            return;
        };
        tokio::time::sleep(self.place_delay).await;
        for tokens in &mut t.tokens {
            tokens.retain(|s| *s != slot);
        }
        t.slot_to_card[slot] = None;
        t.card_to_slot[card] = None;
        t.free_slots.push(slot);
        self.ui.clear_tokens(slot);
        self.ui.remove_card(slot);
    }

    /// Remove a batch of cards (by id) in one critical section.
    pub async fn remove_cards(&self, cards: &[CardId]) {
        let mut t = self.inner.lock().await;
        for card in cards {
            if let Some(slot) = t.card_to_slot[*card] {
                self.remove_card_locked(&mut t, slot).await;
            }
        }
    }

    /// Place a token for a player. Silently rejected if the slot is empty,
    /// the player already holds a token there, or the player is at capacity.
    /// Reaching capacity enqueues the player for verification before the
    /// lock is released.
    pub async fn place_token(&self, player: PlayerId, slot: SlotId) -> Toggle {
        let mut t = self.inner.lock().await;
        self.place_token_locked(&mut t, player, slot)
    }

    fn place_token_locked(&self, t: &mut TableInner, player: PlayerId, slot: SlotId) -> Toggle {
        if !t.occupied(slot)
            || t.tokens[player].contains(&slot)
            || t.tokens[player].len() == self.set_size
        {
            return Toggle::Ignored;
        }
        t.tokens[player].push(slot);
        self.ui.place_token(player, slot);
        if t.tokens[player].len() == self.set_size {
            // Enqueue under the same critical section as the token update so
            // FIFO order agrees with token state.
            let _ = self.verify_tx.send(player);
            Toggle::SelectionComplete
        } else {
            Toggle::Placed
        }
    }

    /// Remove a player's token from a slot. Returns true iff one was there.
    pub async fn remove_token(&self, player: PlayerId, slot: SlotId) -> bool {
        let mut t = self.inner.lock().await;
        self.remove_token_locked(&mut t, player, slot)
    }

    fn remove_token_locked(&self, t: &mut TableInner, player: PlayerId, slot: SlotId) -> bool {
        let before = t.tokens[player].len();
        t.tokens[player].retain(|s| *s != slot);
        if t.tokens[player].len() < before {
            self.ui.remove_token(player, slot);
            true
        } else {
            false
        }
    }

    /// Apply an accepted input item: toggle-off if the player already holds
    /// a token on the slot, toggle-on otherwise.
    pub async fn toggle_token(&self, player: PlayerId, slot: SlotId) -> Toggle {
        let mut t = self.inner.lock().await;
        if t.tokens[player].contains(&slot) {
            self.remove_token_locked(&mut t, player, slot);
            Toggle::Removed
        } else {
            self.place_token_locked(&mut t, player, slot)
        }
    }

    /// Remove every token a player holds, in one critical section.
    pub async fn clear_selection(&self, player: PlayerId) {
        let mut t = self.inner.lock().await;
        let slots = std::mem::take(&mut t.tokens[player]);
        for slot in slots {
            self.ui.remove_token(player, slot);
        }
    }

    /// The player's current selection as (slot, card) pairs.
    pub async fn selection_of(&self, player: PlayerId) -> Vec<(SlotId, CardId)> {
        let t = self.inner.lock().await;
        t.tokens[player]
            .iter()
            .filter_map(|slot| t.slot_to_card[*slot].map(|card| (*slot, card)))
            .collect()
    }

    pub async fn slot_to_card(&self, slot: SlotId) -> Option<CardId> {
        self.inner.lock().await.slot_to_card[slot]
    }

    pub async fn card_to_slot(&self, card: CardId) -> Option<SlotId> {
        self.inner.lock().await.card_to_slot[card]
    }

    /// Number of cards currently on the table.
    pub async fn count_cards(&self) -> usize {
        let t = self.inner.lock().await;
        t.slot_to_card.iter().flatten().count()
    }

    /// Cards currently on the table, in slot order.
    pub async fn cards_on_table(&self) -> Vec<CardId> {
        let t = self.inner.lock().await;
        t.slot_to_card.iter().flatten().copied().collect()
    }

    /// Currently occupied slots, in ascending order.
    pub async fn occupied_slots(&self) -> Vec<SlotId> {
        let t = self.inner.lock().await;
        (0..t.slot_to_card.len()).filter(|s| t.occupied(*s)).collect()
    }

    /// An arbitrary free slot, if any.
    pub async fn random_free_slot(&self) -> Option<SlotId> {
        let t = self.inner.lock().await;
        t.free_slots.choose(&mut rng()).copied()
    }

    /// A uniformly random occupied slot, for the stimulus actors.
    pub async fn random_occupied_slot(&self) -> Option<SlotId> {
        let t = self.inner.lock().await;
        let occupied: Vec<SlotId> = (0..t.slot_to_card.len()).filter(|s| t.occupied(*s)).collect();
        occupied.choose(&mut rng()).copied()
    }

    /// Fill every free slot from the deck, choosing free slots at random,
    /// until the table is full or the deck runs out. One critical section
    /// for the whole deal. Returns the number of cards placed.
    pub async fn fill_from_deck(&self, deck: &mut Deck) -> usize {
        deck.shuffle();
        let mut placed = 0;
        let mut t = self.inner.lock().await;
        loop {
            let Some(slot) = t.free_slots.choose(&mut rng()).copied() else {
                break;
            };
            let Some(card) = deck.draw() else {
                break;
            };
            self.place_card_locked(&mut t, card, slot).await;
            placed += 1;
        }
        placed
    }

    /// Return every remaining table card to the deck in random order and
    /// clear the table. One critical section for the whole collection.
    pub async fn collect_into_deck(&self, deck: &mut Deck) -> usize {
        let mut t = self.inner.lock().await;
        let mut cards: Vec<CardId> = t.slot_to_card.iter().flatten().copied().collect();
        cards.shuffle(&mut rng());
        let collected = cards.len();
        for card in cards {
            if let Some(slot) = t.card_to_slot[card] {
                self.remove_card_locked(&mut t, slot).await;
            }
            deck.put_back(card);
        }
        collected
    }
}
