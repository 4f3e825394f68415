use rand::{rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

/// Card identity within a fixed-size deck (`0..deck_size`).
pub type CardId = usize;

/// Grid position on the table (`0..table_size`).
pub type SlotId = usize;

/// Player identity (`0..players`).
pub type PlayerId = usize;

/// Outcome the coordinator delivers to a player whose selection was drained
/// from the verification queue.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Verdict {
    /// The selection was a valid set. Worth one point and a point freeze.
    Point,
    /// The selection was not a valid set. Worth a penalty freeze.
    Penalty,
    /// The selection went stale before it was judged (a card it referenced
    /// was consumed by an earlier entry in the same pass, or its tokens were
    /// purged by a card removal). No score change, no freeze.
    Discarded,
}

/// The dealer's pool of not-yet-placed cards.
///
/// Shrinks as cards are dealt onto the table and grows again when a round
/// ends and the remaining table cards are returned. Cards matched into a
/// valid set never come back.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<CardId>,
}

impl Deck {
    #[must_use]
    pub fn new(deck_size: usize) -> Self {
        Self {
            cards: (0..deck_size).collect(),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rng());
    }

    /// Deal one card off the top, if any remain.
    pub fn draw(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    /// Return a card collected from the table at round end.
    pub fn put_back(&mut self, card: CardId) {
        self.cards.push(card);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// The cards still in the pool, in their current order.
    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }
}

/// Monotonic per-player scores, shared between the player actors (each
/// increments only its own cell) and the coordinator (reads all cells once,
/// at winner announcement).
#[derive(Clone, Debug)]
pub struct Scoreboard {
    scores: Arc<Vec<AtomicU32>>,
}

impl Scoreboard {
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            scores: Arc::new((0..players).map(|_| AtomicU32::new(0)).collect()),
        }
    }

    /// Award a point and return the new score.
    pub fn award(&self, player: PlayerId) -> u32 {
        self.scores[player].fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> u32 {
        self.scores[player].load(Ordering::SeqCst)
    }

    /// Snapshot of all scores, indexed by player id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u32> {
        self.scores
            .iter()
            .map(|s| s.load(Ordering::SeqCst))
            .collect()
    }

    /// Ids of every player tied at the maximum score.
    #[must_use]
    pub fn leaders(&self) -> Vec<PlayerId> {
        let scores = self.snapshot();
        let best = scores.iter().copied().max().unwrap_or(0);
        scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == best)
            .map(|(id, _)| id)
            .collect()
    }
}
