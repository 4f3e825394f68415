//! End-to-end tests for the engine: real actors on a real runtime, driven
//! through the public handle and observed through the presentation stream.

use anyhow::Result;
use speedset::{
    CardId, FeatureRules, GameConfig, GameHandle, GameSession, SetRules, UiEvent, ui,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedReceiver;

/// Evaluator where any three distinct cards match.
struct AnyTriple;

impl SetRules for AnyTriple {
    fn set_size(&self) -> usize {
        3
    }

    fn is_valid_set(&self, cards: &[CardId]) -> bool {
        cards.len() == 3 && cards[0] != cards[1] && cards[1] != cards[2] && cards[0] != cards[2]
    }

    fn enumerate_sets(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        if limit > 0 && cards.len() >= 3 {
            vec![cards[..3].to_vec()]
        } else {
            Vec::new()
        }
    }
}

/// Evaluator where a match requires three distinct even cards.
struct EvenTriple;

impl SetRules for EvenTriple {
    fn set_size(&self) -> usize {
        3
    }

    fn is_valid_set(&self, cards: &[CardId]) -> bool {
        AnyTriple.is_valid_set(cards) && cards.iter().all(|c| c % 2 == 0)
    }

    fn enumerate_sets(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        let evens: Vec<CardId> = cards.iter().copied().filter(|c| c % 2 == 0).collect();
        if limit > 0 && evens.len() >= 3 {
            vec![evens[..3].to_vec()]
        } else {
            Vec::new()
        }
    }
}

/// Evaluator where nothing ever matches.
struct NoTriple;

impl SetRules for NoTriple {
    fn set_size(&self) -> usize {
        3
    }

    fn is_valid_set(&self, _cards: &[CardId]) -> bool {
        false
    }

    fn enumerate_sets(&self, _cards: &[CardId], _limit: usize) -> Vec<Vec<CardId>> {
        Vec::new()
    }
}

fn untimed_config(players: usize, humans: usize) -> GameConfig {
    GameConfig {
        players,
        humans,
        table_size: 9,
        deck_size: 12,
        set_size: 3,
        round_timeout_millis: -1,
        point_freeze_millis: 50,
        penalty_freeze_millis: 200,
        tick_millis: 10,
        ..GameConfig::default()
    }
}

async fn next_matching(
    events: &mut UnboundedReceiver<UiEvent>,
    pred: impl Fn(&UiEvent) -> bool,
) -> UiEvent {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = events.recv().await.expect("ui stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for ui event")
}

/// Drain placement events until `count` slots are filled; returns slot→card.
async fn await_deal(
    events: &mut UnboundedReceiver<UiEvent>,
    count: usize,
) -> HashMap<usize, CardId> {
    let mut layout = HashMap::new();
    while layout.len() < count {
        if let UiEvent::CardPlaced { card, slot } =
            next_matching(events, |e| matches!(e, UiEvent::CardPlaced { .. })).await
        {
            layout.insert(slot, card);
        }
    }
    layout
}

async fn shut_down(game: GameHandle) {
    game.terminate();
    tokio::time::timeout(Duration::from_secs(5), game.join())
        .await
        .expect("actors failed to shut down");
}

#[tokio::test]
async fn valid_set_scores_once_and_table_refills() -> Result<()> {
    let (ui_tx, mut events) = ui::channel();
    let game = GameSession::spawn(untimed_config(1, 1), Arc::new(AnyTriple), ui_tx)?;

    // Initial deal: 9 of 12 cards on the table.
    await_deal(&mut events, 9).await;

    for slot in [0, 1, 2] {
        assert!(game.key_press(0, slot));
    }

    // Exactly one point, the three matched slots empty out, and the deck
    // refills them; the table never exceeds its size. Score and removal
    // events race, so track them in one pass.
    let mut occupied: i64 = 9;
    let mut removed = 0;
    let mut replaced = 0;
    let mut scored = false;
    while replaced < 3 || !scored {
        let event = next_matching(&mut events, |e| {
            matches!(
                e,
                UiEvent::CardPlaced { .. }
                    | UiEvent::CardRemoved { .. }
                    | UiEvent::ScoreUpdated { .. }
            )
        })
        .await;
        match event {
            UiEvent::CardRemoved { .. } => {
                removed += 1;
                occupied -= 1;
            }
            UiEvent::CardPlaced { .. } => {
                replaced += 1;
                occupied += 1;
            }
            UiEvent::ScoreUpdated { player, score } => {
                assert_eq!((player, score), (0, 1));
                scored = true;
            }
            _ => unreachable!(),
        }
        assert!(occupied <= 9, "table exceeded its size");
    }
    assert_eq!(removed, 3);
    assert_eq!(occupied, 9);
    assert_eq!(game.scores(), vec![1]);

    shut_down(game).await;
    Ok(())
}

#[tokio::test]
async fn invalid_set_penalizes_without_scoring() -> Result<()> {
    let (ui_tx, mut events) = ui::channel();
    let game = GameSession::spawn(untimed_config(1, 1), Arc::new(EvenTriple), ui_tx)?;

    let layout = await_deal(&mut events, 9).await;

    // Pick three slots that include an odd card, so the evaluator refuses.
    let odd_slot = *layout
        .iter()
        .find(|(_, card)| *card % 2 == 1)
        .map(|(slot, _)| slot)
        .expect("9 of 12 cards on the table always include an odd one");
    let mut slots = vec![odd_slot];
    slots.extend(layout.keys().copied().filter(|s| *s != odd_slot).take(2));
    for slot in &slots {
        assert!(game.key_press(0, *slot));
    }

    // The selection is wiped before the freeze starts: all three tokens
    // come back off.
    let mut cleared = Vec::new();
    while cleared.len() < 3 {
        if let UiEvent::TokenRemoved { slot, .. } =
            next_matching(&mut events, |e| matches!(e, UiEvent::TokenRemoved { .. })).await
        {
            cleared.push(slot);
        }
    }
    cleared.sort_unstable();
    slots.sort_unstable();
    assert_eq!(cleared, slots);

    // One penalty-freeze period, no score change.
    let frozen = next_matching(&mut events, |e| {
        matches!(e, UiEvent::FreezeRemaining { player: 0, millis } if *millis > 0)
    })
    .await;
    if let UiEvent::FreezeRemaining { millis, .. } = frozen {
        assert!(millis <= 200);
    }
    next_matching(
        &mut events,
        |e| matches!(e, UiEvent::FreezeRemaining { player: 0, millis: 0 }),
    )
    .await;
    assert_eq!(game.scores(), vec![0]);

    shut_down(game).await;
    Ok(())
}

#[tokio::test]
async fn later_request_sharing_a_card_is_discarded() -> Result<()> {
    let (ui_tx, mut events) = ui::channel();
    // Countdown mode with a slow tick: both players complete their
    // selections inside one drain interval, so a single pass judges both.
    let config = GameConfig {
        round_timeout_millis: 60_000,
        tick_millis: 300,
        ..untimed_config(2, 2)
    };
    let game = GameSession::spawn(config, Arc::new(AnyTriple), ui_tx)?;

    await_deal(&mut events, 9).await;

    // Player 0 first, then player 1 overlapping on slot 2.
    for slot in [0, 1, 2] {
        assert!(game.key_press(0, slot));
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    for slot in [2, 3, 4] {
        assert!(game.key_press(1, slot));
    }

    next_matching(
        &mut events,
        |e| matches!(e, UiEvent::ScoreUpdated { player: 0, score: 1 }),
    )
    .await;

    // Give the pass time to finish, then check player 1 was discarded:
    // no score, no freeze.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(game.scores(), vec![1, 0]);
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, UiEvent::ScoreUpdated { player: 1, .. }),
            "discarded player must not score"
        );
        assert!(
            !matches!(event, UiEvent::FreezeRemaining { player: 1, millis } if millis > 0),
            "discarded player must not freeze"
        );
    }

    shut_down(game).await;
    Ok(())
}

#[tokio::test]
async fn set_exhaustion_finishes_and_ties_everyone() {
    let (ui_tx, mut events) = ui::channel();
    // Nothing ever matches, so no set exists anywhere: the coordinator
    // goes straight to announcing winners, all tied at zero.
    let game = GameSession::spawn(untimed_config(2, 2), Arc::new(NoTriple), ui_tx).unwrap();

    let winners = next_matching(&mut events, |e| matches!(e, UiEvent::Winners { .. })).await;
    assert_eq!(
        winners,
        UiEvent::Winners {
            players: vec![0, 1]
        }
    );

    tokio::time::timeout(Duration::from_secs(5), game.join())
        .await
        .expect("game should conclude on its own");
}

#[tokio::test]
async fn exhausting_the_deck_ends_the_game() {
    let (ui_tx, mut events) = ui::channel();
    // Only one dealable set in the whole game: after the player claims it
    // the deck and table are both spent.
    let config = GameConfig {
        deck_size: 3,
        ..untimed_config(1, 1)
    };
    let game = GameSession::spawn(config, Arc::new(AnyTriple), ui_tx).unwrap();

    let layout = await_deal(&mut events, 3).await;
    for slot in layout.keys() {
        assert!(game.key_press(0, *slot));
    }

    let winners = next_matching(&mut events, |e| matches!(e, UiEvent::Winners { .. })).await;
    assert_eq!(winners, UiEvent::Winners { players: vec![0] });
    assert_eq!(game.scores(), vec![1]);

    tokio::time::timeout(Duration::from_secs(5), game.join())
        .await
        .expect("game should conclude on its own");
}

#[tokio::test]
async fn stimulus_players_score_unattended() {
    let (ui_tx, _events) = ui::channel();
    let config = GameConfig {
        point_freeze_millis: 10,
        penalty_freeze_millis: 10,
        tick_millis: 5,
        ..untimed_config(1, 0)
    };
    let game = GameSession::spawn(config, Arc::new(AnyTriple), ui_tx).unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        while game.scores()[0] == 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("stimulus-driven player never scored");

    shut_down(game).await;
}

#[tokio::test]
async fn termination_request_stops_every_actor() {
    let (ui_tx, mut events) = ui::channel();
    let config = GameConfig {
        players: 3,
        humans: 0,
        round_timeout_millis: 60_000,
        ..GameConfig::default()
    };
    let game = GameSession::spawn(config, Arc::new(FeatureRules::default()), ui_tx).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    game.terminate();
    tokio::time::timeout(Duration::from_secs(5), game.join())
        .await
        .expect("cascade shutdown should join every actor");

    // Winners are still announced on external termination.
    next_matching(&mut events, |e| matches!(e, UiEvent::Winners { .. })).await;
}

#[tokio::test]
async fn mismatched_rules_are_rejected_at_spawn() {
    let (ui_tx, _events) = ui::channel();
    let config = GameConfig {
        set_size: 4,
        ..GameConfig::default()
    };
    assert!(GameSession::spawn(config, Arc::new(AnyTriple), ui_tx).is_err());
}
