use std::sync::{Arc, Mutex};

use bucketwise_core::api::RuleEngine;
use bucketwise_core::config::Config;
use bucketwise_core::events::{ChangeEvent, ChangeListener};
use bucketwise_core::rules::{CandidateRule, RuleDraft, TransactionRecord};
use bucketwise_core::storage::JsonStorage;
use bucketwise_core::transactions::InMemoryTransactions;
use chrono::NaiveDate;
use tempfile::TempDir;

fn engine_with_temp_dir() -> (RuleEngine, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let storage =
        Arc::new(JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage"));
    let engine = RuleEngine::open(storage, "household", Config::default()).expect("engine");
    (engine, temp)
}

fn txn(id: u64, description: &str, amount: f64, day: u32) -> TransactionRecord {
    let date = NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
    TransactionRecord::new(id, description, amount, date)
}

#[derive(Default)]
struct EventRecorder {
    seen: Mutex<Vec<ChangeEvent>>,
}

impl ChangeListener for EventRecorder {
    fn on_change(&self, event: &ChangeEvent) {
        self.seen.lock().unwrap().push(event.clone());
    }
}

#[test]
fn amount_filtered_rule_wins_over_generic_for_small_amounts() {
    let (engine, _guard) = engine_with_temp_dir();
    engine
        .create_rule(&RuleDraft::new("netflix", 5).with_priority(500))
        .unwrap();
    engine
        .create_rule(
            &RuleDraft::new("netflix", 7)
                .with_amounts(Some(0.0), Some(20.0))
                .with_priority(1),
        )
        .unwrap();

    let mut store = InMemoryTransactions::new(vec![
        txn(1, "NETFLIX.COM", -15.0, 3),
        txn(2, "NETFLIX.COM", -200.0, 4),
    ]);
    let reader = store.clone();
    engine.run(&reader, &mut store, false).unwrap();

    assert_eq!(store.record(1).unwrap().bucket_id, Some(7));
    assert_eq!(store.record(2).unwrap().bucket_id, Some(5));
}

#[test]
fn verified_transactions_survive_a_default_run() {
    let (engine, _guard) = engine_with_temp_dir();
    engine.create_rule(&RuleDraft::new("netflix", 5)).unwrap();

    let mut corrected = txn(1, "NETFLIX.COM", -15.0, 3);
    corrected.verified = true;
    corrected.bucket_id = Some(42);
    let mut store = InMemoryTransactions::new(vec![corrected]);

    let outcome = engine.run(&store.clone(), &mut store, false).unwrap();
    assert_eq!(outcome.mutated, 0);
    assert_eq!(store.record(1).unwrap().bucket_id, Some(42));

    let outcome = engine.run(&store.clone(), &mut store, true).unwrap();
    assert_eq!(outcome.mutated, 1);
    assert_eq!(store.record(1).unwrap().bucket_id, Some(5));
}

#[test]
fn mark_for_review_rules_leave_transactions_unverified() {
    let (engine, _guard) = engine_with_temp_dir();
    let mut review = RuleDraft::new("zelle", 8);
    review.mark_for_review = true;
    engine.create_rule(&review).unwrap();
    engine.create_rule(&RuleDraft::new("netflix", 5)).unwrap();

    let mut store = InMemoryTransactions::new(vec![
        txn(1, "ZELLE TO MUM", -400.0, 2),
        txn(2, "NETFLIX.COM", -15.0, 3),
    ]);
    engine.run(&store.clone(), &mut store, false).unwrap();

    assert!(!store.record(1).unwrap().verified);
    assert!(store.record(2).unwrap().verified);
}

#[test]
fn second_run_with_default_policy_mutates_nothing() {
    let (engine, _guard) = engine_with_temp_dir();
    engine.create_rule(&RuleDraft::new("netflix", 5)).unwrap();
    let mut store = InMemoryTransactions::new(vec![
        txn(1, "NETFLIX.COM", -15.0, 3),
        txn(2, "NETFLIX.COM", -19.0, 8),
    ]);

    let first = engine.run(&store.clone(), &mut store, false).unwrap();
    assert_eq!(first.mutated, 2);

    let second = engine.run(&store.clone(), &mut store, false).unwrap();
    assert_eq!(second.mutated, 0);
}

#[test]
fn preview_count_matches_isolated_apply_count() {
    let (engine, _guard) = engine_with_temp_dir();
    let store = InMemoryTransactions::new(vec![
        txn(1, "NETFLIX.COM", -15.0, 1),
        txn(2, "NETFLIX.COM", -200.0, 2),
        txn(3, "WOOLWORTHS", -80.0, 3),
        txn(4, "NETFLIX REFUND", 15.0, 4),
    ]);

    let candidate = CandidateRule::from_input("netflix", None, None).unwrap();
    let report = engine.preview(&candidate, &store, None).unwrap();

    // Apply only that rule through a fresh engine and compare.
    let (isolated, _guard2) = engine_with_temp_dir();
    isolated.create_rule(&RuleDraft::new("netflix", 5)).unwrap();
    let mut writable = store.clone();
    let outcome = isolated.run(&store, &mut writable, false).unwrap();

    assert_eq!(report.match_count, outcome.mutated);
}

#[test]
fn preview_leaves_the_corpus_untouched_and_handles_empty() {
    let (engine, _guard) = engine_with_temp_dir();
    let store = InMemoryTransactions::new(Vec::new());
    let candidate = CandidateRule::from_input("netflix", None, None).unwrap();
    let report = engine.preview(&candidate, &store, None).unwrap();
    assert_eq!(report.match_count, 0);
    assert!(report.sample.is_empty());
}

#[test]
fn preview_sample_respects_configured_limit() {
    let (engine, _guard) = engine_with_temp_dir();
    let records: Vec<TransactionRecord> = (1..=15)
        .map(|id| txn(id, "NETFLIX.COM", -15.0, (id % 27 + 1) as u32))
        .collect();
    let store = InMemoryTransactions::new(records);
    let candidate = CandidateRule::from_input("netflix", None, None).unwrap();

    let report = engine.preview(&candidate, &store, None).unwrap();
    assert_eq!(report.match_count, 15);
    assert_eq!(report.sample.len(), Config::default().preview_sample_limit);

    let report = engine.preview(&candidate, &store, Some(3)).unwrap();
    assert_eq!(report.sample.len(), 3);
}

#[test]
fn runs_and_rule_mutations_emit_change_events() {
    let temp = TempDir::new().expect("temp dir");
    let storage =
        Arc::new(JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage"));
    let mut engine = RuleEngine::open(storage, "household", Config::default()).expect("engine");
    let recorder = Arc::new(EventRecorder::default());
    engine.subscribe(recorder.clone());

    engine.create_rule(&RuleDraft::new("netflix", 5)).unwrap();
    let mut store = InMemoryTransactions::new(vec![txn(1, "NETFLIX.COM", -15.0, 3)]);
    engine.run(&store.clone(), &mut store, false).unwrap();

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[
            ChangeEvent::RulesChanged {
                rulebook: "household".into()
            },
            ChangeEvent::TransactionsChanged { mutated: 1 },
        ]
    );
}

#[test]
fn write_failures_surface_in_the_outcome_without_aborting() {
    let (engine, _guard) = engine_with_temp_dir();
    engine.create_rule(&RuleDraft::new("netflix", 5)).unwrap();
    let mut store = InMemoryTransactions::new(vec![
        txn(1, "NETFLIX.COM", -15.0, 3),
        txn(2, "NETFLIX.COM", -19.0, 8),
    ])
    .reject_writes_for([2]);

    let outcome = engine.run(&store.clone(), &mut store, false).unwrap();
    assert_eq!(outcome.mutated, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].transaction_id, 2);
    assert_eq!(store.record(1).unwrap().bucket_id, Some(5));
}
