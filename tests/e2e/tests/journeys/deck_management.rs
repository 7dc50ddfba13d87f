//! Journey: creating, renaming, listing, exporting and deleting decks, and
//! editing cards by identity.

use chrono::Duration;
use flash_core::{Deck, DeckSnapshot, DeckStore, Grade, Pool, StorageError};
use flash_e2e_tests::{TestClock, TestDataFactory, TestStoreManager};

#[test]
fn test_deck_lifecycle() {
    let mut db = TestStoreManager::new_temp();
    db.store.create("verbs").unwrap();
    db.store.create("animals").unwrap();
    assert!(matches!(
        db.store.create("verbs"),
        Err(StorageError::DeckExists(_))
    ));

    assert_eq!(db.store.list_names().unwrap(), vec!["animals", "verbs"]);

    db.store.rename("verbs", "spanish verbs").unwrap();
    db.reopen();
    assert_eq!(db.store.list_names().unwrap(), vec!["animals", "spanish verbs"]);
    assert_eq!(db.store.load("spanish verbs").unwrap().name(), "spanish verbs");

    assert!(db.store.delete("animals").unwrap());
    assert!(matches!(
        db.store.load("animals"),
        Err(StorageError::DeckNotFound(_))
    ));
    assert_eq!(db.deck_count(), 1);
}

#[test]
fn test_rename_keeps_cards_and_schedule() {
    let db = TestStoreManager::new_temp();
    let now = TestClock::new().now();
    let deck = TestDataFactory::create_mixed_deck("before", now);
    db.store.save("before", &deck).unwrap();

    db.store.rename("before", "after").unwrap();

    let renamed = db.store.load("after").unwrap();
    let mut expected = deck.snapshot();
    expected.name = "after".to_string();
    assert_eq!(renamed.snapshot(), expected);
}

#[test]
fn test_deck_list_counts() {
    let db = TestStoreManager::new_temp();
    let now = TestClock::new().now();
    db.store
        .save("mixed", &TestDataFactory::create_mixed_deck("mixed", now))
        .unwrap();
    db.store.create("empty").unwrap();

    let summaries = db.store.summaries(now).unwrap();
    assert_eq!(summaries.len(), 2);

    let empty = &summaries[0];
    assert_eq!((empty.name.as_str(), empty.total, empty.due), ("empty", 0, 0));

    // 2 in the due pool plus the scheduled card that came due at now - 6h
    let mixed = &summaries[1];
    assert_eq!(mixed.total, 10);
    assert_eq!(mixed.due, 3);
    assert_eq!(mixed.next_due, Some(now + Duration::hours(21)));
}

#[test]
fn test_export_and_restore_as_copy() {
    let db = TestStoreManager::new_temp();
    let now = TestClock::new().now();
    let deck = TestDataFactory::create_mixed_deck("original", now);
    db.store.save("original", &deck).unwrap();

    let json = serde_json::to_string(&db.store.load("original").unwrap().snapshot()).unwrap();
    let mut snapshot: DeckSnapshot = serde_json::from_str(&json).unwrap();
    snapshot.name = "copy".to_string();
    let copy = Deck::try_from(snapshot).unwrap();
    db.store.save("copy", &copy).unwrap();

    let original = db.store.load("original").unwrap();
    let restored = db.store.load("copy").unwrap();
    assert_eq!(restored.check_total_size(), original.check_total_size());
    assert_eq!(
        restored.scheduled_cards().map(|(at, c)| (at, c.id)).collect::<Vec<_>>(),
        original.scheduled_cards().map(|(at, c)| (at, c.id)).collect::<Vec<_>>()
    );

    // The two decks are independent
    db.store.delete("original").unwrap();
    assert_eq!(db.store.load("copy").unwrap().check_total_size(), 10);
}

#[test]
fn test_edit_and_delete_by_identity() {
    let db = TestStoreManager::new_temp();
    let now = TestClock::new().now();
    let mut deck = Deck::new("dupes");
    let first = deck.add_card("same", "label").unwrap();
    let second = deck.add_card("same", "label").unwrap();
    deck.review_next(Pool::New, Grade::Good, now).unwrap();
    db.store.save("dupes", &deck).unwrap();

    let mut deck = db.store.load("dupes").unwrap();
    deck.edit_card(first, "edited", "label").unwrap();
    deck.delete_card(second).unwrap();
    db.store.save("dupes", &deck).unwrap();

    let deck = db.store.load("dupes").unwrap();
    assert_eq!(deck.check_total_size(), 1);
    let card = deck.card(first).unwrap();
    assert_eq!(card.front, "edited");
    assert_eq!(card.repetition, 1);
    assert_eq!(deck.pool_of(first), Some(Pool::Scheduled));
}

#[test]
fn test_import_two_sided_skips_existing() {
    let db = TestStoreManager::new_temp();
    let mut deck = db.store.create("capitals").unwrap();
    deck.add_two_sided("France", "Paris").unwrap();

    let pairs = vec![("France", "Paris"), ("Italy", "Rome"), ("Peru", "Lima")];
    assert_eq!(deck.import_pairs(pairs.clone(), true), 4);
    assert_eq!(deck.import_pairs(pairs, true), 0);
    db.store.save("capitals", &deck).unwrap();

    let deck = db.store.load("capitals").unwrap();
    assert_eq!(deck.check_total_size(), 6);
    let rome = deck.find_by_labels("Rome", "Italy").unwrap();
    assert_eq!(deck.card(rome).unwrap().other_side("Rome"), Some("Italy"));
}
