//! Property-based tests for the stock feature-matching evaluator.

use proptest::prelude::*;
use speedset::{CardId, FeatureRules, SetRules};

proptest! {
    #[test]
    fn enumerated_sets_are_valid_and_drawn_from_input(
        cards in proptest::collection::hash_set(0usize..81, 0..15)
    ) {
        let cards: Vec<CardId> = cards.into_iter().collect();
        let rules = FeatureRules::default();
        for set in rules.enumerate_sets(&cards, usize::MAX) {
            prop_assert_eq!(set.len(), 3);
            prop_assert!(set.iter().all(|c| cards.contains(c)));
            prop_assert!(rules.is_valid_set(&set));
        }
    }

    #[test]
    fn validity_is_order_independent(a in 0usize..81, b in 0usize..81, c in 0usize..81) {
        let rules = FeatureRules::default();
        let valid = rules.is_valid_set(&[a, b, c]);
        prop_assert_eq!(valid, rules.is_valid_set(&[c, a, b]));
        prop_assert_eq!(valid, rules.is_valid_set(&[b, c, a]));
    }

    #[test]
    fn has_set_agrees_with_enumeration(
        cards in proptest::collection::hash_set(0usize..81, 0..12)
    ) {
        let cards: Vec<CardId> = cards.into_iter().collect();
        let rules = FeatureRules::default();
        prop_assert_eq!(
            rules.has_set(&cards),
            !rules.enumerate_sets(&cards, usize::MAX).is_empty()
        );
    }

    #[test]
    fn any_two_cards_have_exactly_one_completion(a in 0usize..81, b in 0usize..81) {
        prop_assume!(a != b);
        let rules = FeatureRules::default();
        let completions: Vec<CardId> = (0..81)
            .filter(|c| rules.is_valid_set(&[a, b, *c]))
            .collect();
        // The defining property of the classic rule: every pair of distinct
        // cards is completed by exactly one third card.
        prop_assert_eq!(completions.len(), 1);
    }
}
