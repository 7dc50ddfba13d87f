//! Property-based tests using proptest
//!
//! Random review sessions against a deck: cards are never lost or
//! duplicated, pools stay disjoint, and the scheduler is deterministic.

use chrono::Duration;
use flash_core::{Deck, DeckError, Grade, Pool};
use flash_e2e_tests::{TestClock, TestDataFactory};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Review(Pool, Grade),
    ReviewCard(usize, Grade),
    Sweep,
    Wait(i64),
    SkipFailed,
    Delete(usize),
}

fn pool_strategy() -> impl Strategy<Value = Pool> {
    prop_oneof![Just(Pool::New), Just(Pool::Failed), Just(Pool::Due), Just(Pool::Scheduled)]
}

fn grade_strategy() -> impl Strategy<Value = Grade> {
    prop_oneof![Just(Grade::Bad), Just(Grade::Medium), Just(Grade::Good)]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (pool_strategy(), grade_strategy()).prop_map(|(p, g)| Action::Review(p, g)),
        2 => (any::<usize>(), grade_strategy()).prop_map(|(i, g)| Action::ReviewCard(i, g)),
        2 => Just(Action::Sweep),
        2 => (1i64..200).prop_map(Action::Wait),
        1 => Just(Action::SkipFailed),
        1 => any::<usize>().prop_map(Action::Delete),
    ]
}

/// Run `actions` and check the pool invariants after every step
fn run_session(deck_size: usize, actions: &[Action]) -> Result<Deck, TestCaseError> {
    let mut clock = TestClock::new();
    let mut deck = TestDataFactory::create_deck("prop", deck_size);
    let mut expected_size = deck_size;

    for action in actions {
        let before = deck.check_total_size();
        match action {
            Action::Review(pool, grade) => {
                let expected_empty = deck.pool_len(*pool) == 0;
                match deck.review_next(*pool, *grade, clock.now()) {
                    Ok(outcome) => {
                        prop_assert!(!expected_empty);
                        prop_assert_eq!(outcome.pool == Pool::Failed, !grade.is_pass());
                        prop_assert_eq!(deck.pool_of(outcome.card_id), Some(outcome.pool));
                    }
                    Err(err) => {
                        prop_assert!(expected_empty);
                        prop_assert_eq!(err, DeckError::EmptyPool(*pool));
                    }
                }
            }
            Action::ReviewCard(pick, grade) => {
                let ids: Vec<_> = deck.cards().map(|(_, card)| card.id).collect();
                if let Some(id) = ids.get(pick % ids.len().max(1)) {
                    let outcome = deck.review_card(*id, *grade, clock.now()).unwrap();
                    prop_assert_eq!(outcome.card_id, *id);
                }
            }
            Action::Sweep => {
                let now = clock.now();
                let promoted = deck.check_repetitions(now);
                prop_assert!(deck.next_due().is_none_or(|due| due > now));
                prop_assert!(promoted <= before);
            }
            Action::Wait(hours) => {
                clock.advance(Duration::hours(*hours));
            }
            Action::SkipFailed => {
                let result = deck.skip_failed();
                prop_assert_eq!(result.is_ok(), deck.pool_len(Pool::Failed) > 0);
            }
            Action::Delete(pick) => {
                let ids: Vec<_> = deck.cards().map(|(_, card)| card.id).collect();
                if let Some(id) = ids.get(pick % ids.len().max(1)) {
                    deck.delete_card(*id).unwrap();
                    expected_size -= 1;
                }
            }
        }

        prop_assert_eq!(deck.check_total_size(), expected_size);
        prop_assert!(deck.is_consistent());
    }

    Ok(deck)
}

proptest! {
    #[test]
    fn test_random_sessions_keep_pools_disjoint(
        deck_size in 0usize..20,
        actions in prop::collection::vec(action_strategy(), 0..120)
    ) {
        run_session(deck_size, &actions)?;
    }

    #[test]
    fn test_snapshot_restore_mid_session(
        deck_size in 1usize..15,
        actions in prop::collection::vec(action_strategy(), 0..60)
    ) {
        let deck = run_session(deck_size, &actions)?;
        let restored = Deck::try_from(deck.snapshot()).unwrap();
        prop_assert_eq!(restored.snapshot(), deck.snapshot());
        prop_assert!(restored.is_consistent());
    }

    #[test]
    fn test_sessions_are_deterministic(
        deck_size in 1usize..10,
        actions in prop::collection::vec(action_strategy(), 0..60)
    ) {
        let first = run_session(deck_size, &actions)?;
        let second = run_session(deck_size, &actions)?;
        let pools = |deck: &Deck| -> Vec<(Pool, String, u32)> {
            deck.cards()
                .map(|(pool, card)| (pool, card.front.clone(), card.repetition))
                .collect()
        };
        prop_assert_eq!(pools(&first), pools(&second));
    }
}
