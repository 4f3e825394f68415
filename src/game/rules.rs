//! Set evaluation boundary.
//!
//! The engine never decides validity itself; it consults a [`SetRules`]
//! implementation both for win/loss adjudication and for the "no set
//! remains" termination checks. [`FeatureRules`] is the stock evaluator for
//! the classic feature-matching rule.

use super::entities::CardId;

/// Pure evaluator deciding whether K cards form a valid set, and
/// enumerating the valid sets hiding in a collection of cards.
pub trait SetRules: Send + Sync {
    /// Number of cards per set (K).
    fn set_size(&self) -> usize;

    /// Whether these cards form a valid set. Must be pure. Slices whose
    /// length differs from [`set_size`](Self::set_size) are never valid.
    fn is_valid_set(&self, cards: &[CardId]) -> bool;

    /// Up to `limit` valid K-card sets drawn from `cards`.
    fn enumerate_sets(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>>;

    /// Whether at least one valid set exists within `cards`.
    fn has_set(&self, cards: &[CardId]) -> bool {
        !self.enumerate_sets(cards, 1).is_empty()
    }
}

/// The classic rule: each card encodes `feature_count` features with
/// `feature_size` possible values each (card id read as a base
/// `feature_size` number). A group of `feature_size` cards is a set iff,
/// for every feature, the values are either all equal or all distinct.
#[derive(Clone, Copy, Debug)]
pub struct FeatureRules {
    feature_count: usize,
    feature_size: usize,
}

impl FeatureRules {
    #[must_use]
    pub fn new(feature_count: usize, feature_size: usize) -> Self {
        Self {
            feature_count,
            feature_size,
        }
    }

    /// Full deck size for this rule family (`feature_size ^ feature_count`).
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.feature_size.pow(self.feature_count as u32)
    }

    fn feature(&self, card: CardId, index: usize) -> usize {
        card / self.feature_size.pow(index as u32) % self.feature_size
    }
}

impl Default for FeatureRules {
    /// The standard 81-card game: 4 features, 3 values each.
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl SetRules for FeatureRules {
    fn set_size(&self) -> usize {
        self.feature_size
    }

    fn is_valid_set(&self, cards: &[CardId]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }
        // Physical decks hold one copy of each card.
        for (i, card) in cards.iter().enumerate() {
            if cards[i + 1..].contains(card) {
                return false;
            }
        }
        (0..self.feature_count).all(|feature| {
            let mut values: Vec<usize> = cards.iter().map(|c| self.feature(*c, feature)).collect();
            values.sort_unstable();
            let all_same = values.iter().all(|v| *v == values[0]);
            values.dedup();
            all_same || values.len() == cards.len()
        })
    }

    fn enumerate_sets(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        let mut found = Vec::new();
        let mut current = Vec::with_capacity(self.feature_size);
        self.search(cards, 0, &mut current, limit, &mut found);
        found
    }
}

impl FeatureRules {
    fn search(
        &self,
        cards: &[CardId],
        from: usize,
        current: &mut Vec<CardId>,
        limit: usize,
        found: &mut Vec<Vec<CardId>>,
    ) {
        if found.len() >= limit {
            return;
        }
        if current.len() == self.feature_size {
            if self.is_valid_set(current) {
                found.push(current.clone());
            }
            return;
        }
        for i in from..cards.len() {
            current.push(cards[i]);
            self.search(cards, i + 1, current, limit, found);
            current.pop();
            if found.len() >= limit {
                return;
            }
        }
    }
}
