use std::collections::{BTreeSet, HashSet};

use context_bank::bank::{mask_word, BankError, ContextBank, ErrorKind};
use context_bank::store::{ContextTable, InMemoryTable, StoreError};
use context_bank::types::{ContextRecord, ContextWindow, DisplayRecord, Example, ExampleId};

fn id(raw: u64) -> ExampleId {
    ExampleId::new(raw).unwrap()
}

fn record(word: &str, left: &str, right: &str, freq: u64) -> ContextRecord {
    let mut r = ContextRecord::new(word, left, right);
    r.frequency = Some(freq);
    r
}

/// ids 1-4 belong to "fox", 5 to "dog", 6 to "fox" again.
fn fixture() -> InMemoryTable {
    InMemoryTable::from_records(vec![
        record("fox", "the quick brown", "jumps over", 5),
        record("fox", "a sly red", "ran off into the woods", 5),
        record("fox", "", "", 5),
        record("fox", "one lonely", "barked", 5),
        record("dog", "the lazy", "slept", 1),
        record("fox", "yet another", "appeared", 5),
    ])
}

fn bank(window: ContextWindow) -> ContextBank<InMemoryTable> {
    ContextBank::new(fixture(), window, '#')
}

fn ids_of(records: &[DisplayRecord]) -> Vec<u64> {
    records.iter().map(|r| r.id.get()).collect()
}

#[test]
fn single_row_store_masks_and_truncates() {
    let table =
        InMemoryTable::from_records(vec![record("fox", "the quick brown", "jumps over", 3)]);
    let bank = ContextBank::new(table, ContextWindow::from_window_size(3), '#');

    let partition = bank.read_examples_for_word(Some("fox"), &[id(1)], true).unwrap();
    assert_eq!(
        partition.displayed,
        vec![DisplayRecord {
            id: id(1),
            left: "brown".into(),
            word: "###".into(),
            right: "jumps".into(),
        }]
    );
    assert!(partition.new_examples.is_empty());
}

#[test]
fn invariant_displayed_follows_caller_order() {
    let bank = bank(ContextWindow::full());
    let partition = bank
        .read_examples_for_word(Some("fox"), &[id(4), id(1), id(6)], true)
        .unwrap();
    assert_eq!(ids_of(&partition.displayed), vec![4, 1, 6]);

    let mut new_ids = ids_of(&partition.new_examples);
    new_ids.sort();
    assert_eq!(new_ids, vec![2, 3]);
}

#[test]
fn invariant_new_examples_set_is_stable_across_calls() {
    let bank = bank(ContextWindow::full());
    let expected: BTreeSet<u64> = [1, 3, 4, 6].into_iter().collect();
    for _ in 0..20 {
        let partition = bank.read_examples_for_word(Some("fox"), &[id(2)], true).unwrap();
        let set: BTreeSet<u64> = ids_of(&partition.new_examples).into_iter().collect();
        assert_eq!(set, expected);
        assert_eq!(partition.new_examples.len(), 4);
    }
}

#[test]
fn invariant_new_examples_are_reshuffled_on_every_call() {
    let table = InMemoryTable::from_records(
        (0..8).map(|i| record("fox", &format!("left {i}"), &format!("right {i}"), 8)),
    );
    let bank = ContextBank::new(table, ContextWindow::full(), '#');

    let mut orders = HashSet::new();
    for _ in 0..50 {
        let partition = bank.read_examples_for_word(Some("fox"), &[id(1)], true).unwrap();
        assert_eq!(ids_of(&partition.displayed), vec![1]);
        orders.insert(ids_of(&partition.new_examples));
    }
    assert!(orders.len() > 1, "new examples came back in one fixed order");
}

#[test]
fn displayed_ids_of_other_words_are_skipped() {
    let bank = bank(ContextWindow::full());
    let partition = bank
        .read_examples_for_word(Some("fox"), &[id(5), id(2), id(99)], false)
        .unwrap();
    assert_eq!(ids_of(&partition.displayed), vec![2]);
    assert_eq!(partition.new_examples.len(), 4);
}

#[test]
fn word_is_derived_from_first_displayed_id() {
    let bank = bank(ContextWindow::full());
    let partition = bank.read_examples_for_word(None, &[id(5)], false).unwrap();
    assert_eq!(ids_of(&partition.displayed), vec![5]);
    assert_eq!(partition.displayed[0].word, "dog");
    assert!(partition.new_examples.is_empty());
}

#[test]
fn absent_word_and_no_displayed_ids_is_invalid() {
    let bank = bank(ContextWindow::full());
    let err = bank.read_examples_for_word(None, &[], true).unwrap_err();
    assert!(matches!(err, BankError::InvalidArgument(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn unknown_word_or_id_is_not_found() {
    let bank = bank(ContextWindow::full());

    let err = bank.read_examples_for_word(Some("cat"), &[], true).unwrap_err();
    assert!(matches!(err, BankError::WordNotFound(ref w) if w == "cat"));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = bank.read_examples_for_word(None, &[id(42)], true).unwrap_err();
    assert!(matches!(err, BankError::IdNotFound(missing) if missing == id(42)));

    let err = bank.identify_word_from_id(id(7)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn masking_hides_every_character_and_reveal_is_verbatim() {
    let bank = bank(ContextWindow::full());

    let hidden = bank.read_examples_for_word(Some("fox"), &[], true).unwrap();
    for r in &hidden.new_examples {
        assert_eq!(r.word, "###");
    }

    let shown = bank.read_examples_for_word(Some("fox"), &[], false).unwrap();
    for r in &shown.new_examples {
        assert_eq!(r.word, "fox");
    }

    for word in ["a", "őzike", "tündérrózsa"] {
        let masked = mask_word(word, '*');
        assert_eq!(masked.chars().count(), word.chars().count());
        assert!(masked.chars().all(|c| c == '*'));
    }
}

#[test]
fn invariant_truncation_keeps_tokens_next_to_the_word() {
    let bank = bank(ContextWindow::sides(2, 3));
    let partition = bank
        .read_examples_for_word(Some("fox"), &[id(1), id(2), id(3), id(4)], false)
        .unwrap();
    let by_id: Vec<(&str, &str)> = partition
        .displayed
        .iter()
        .map(|r| (r.left.as_str(), r.right.as_str()))
        .collect();
    assert_eq!(
        by_id,
        vec![
            ("quick brown", "jumps over"),
            ("sly red", "ran off into"),
            ("", ""),
            ("one lonely", "barked"),
        ]
    );
}

#[test]
fn identify_returns_word_and_frequency() {
    let bank = bank(ContextWindow::full());
    let info = bank.identify_word_from_id(id(5)).unwrap();
    assert_eq!(info.word, "dog");
    assert_eq!(info.frequency, Some(1));
}

#[test]
fn duplicate_id_is_corrupt_not_missing() {
    let example = |word: &str| Example {
        id: id(1),
        left: "l".into(),
        word: word.into(),
        right: "r".into(),
        frequency: None,
    };
    let table = InMemoryTable::new(vec![example("fox"), example("dog")]);
    let bank = ContextBank::new(table, ContextWindow::full(), '#');

    let err = bank.identify_word_from_id(id(1)).unwrap_err();
    assert!(matches!(err, BankError::Corrupt { rows: 2, .. }));
    assert_eq!(err.kind(), ErrorKind::Corrupt);
}

#[test]
fn random_example_is_masked_and_in_range() {
    let bank = bank(ContextWindow::sides(1, 1));
    for _ in 0..50 {
        let records = bank.select_one_random_example().unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert!((1..=6).contains(&r.id.get()));
        assert!(r.word.chars().all(|c| c == '#'));
        assert!(r.left.split(' ').count() <= 1);
    }
}

#[test]
fn random_word_is_in_clear() {
    let bank = bank(ContextWindow::full());
    for _ in 0..20 {
        let info = bank.select_random_word().unwrap();
        assert!(info.word == "fox" || info.word == "dog");
    }
}

#[test]
fn empty_store_is_not_found_rather_than_a_panic() {
    let bank = ContextBank::new(InMemoryTable::default(), ContextWindow::full(), '#');

    let err = bank.select_one_random_example().unwrap_err();
    assert!(matches!(err, BankError::EmptyStore));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(matches!(bank.select_random_word(), Err(BankError::EmptyStore)));
}

struct FailingTable;

impl ContextTable for FailingTable {
    fn rows_with_id(&self, _id: ExampleId) -> Result<Vec<Example>, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn rows_with_word(&self, _word: &str) -> Result<Vec<Example>, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn row_count(&self) -> Result<u64, StoreError> {
        Ok(3)
    }
}

#[test]
fn store_failures_pass_through_with_context() {
    let bank = ContextBank::new(FailingTable, ContextWindow::full(), '#');

    let err = bank.identify_word_from_id(id(2)).unwrap_err();
    match &err {
        BankError::Store { context, source } => {
            assert!(context.contains("id 2"), "context was {context:?}");
            assert!(matches!(source, StoreError::Poisoned));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Store);

    let err = bank.read_examples_for_word(Some("fox"), &[], true).unwrap_err();
    assert!(matches!(err, BankError::Store { ref context, .. } if context.contains("fox")));
}

#[test]
fn bank_can_be_shared_between_threads() {
    let bank = bank(ContextWindow::from_window_size(5));
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let partition = bank.read_examples_for_word(Some("fox"), &[id(1)], true).unwrap();
                assert_eq!(partition.displayed.len(), 1);
                assert_eq!(partition.new_examples.len(), 4);
            });
        }
    });
}

#[test]
fn display_record_serializes_in_field_order() {
    let record = DisplayRecord {
        id: id(1),
        left: "brown".into(),
        word: "###".into(),
        right: "jumps".into(),
    };
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(json, r####"{"id":1,"left":"brown","word":"###","right":"jumps"}"####);
}
