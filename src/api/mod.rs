//! Stable, public-facing surface that wraps the rule services.
//!
//! `RuleEngine` is what a transport layer (HTTP handlers, automation jobs,
//! an embedding host) talks to: one method per request shape. It owns the
//! rulebook behind a lock so store mutations are atomic relative to runs,
//! persists after every mutation, serializes bulk runs, and emits change
//! events for whatever caching layer sits above.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::{preview, runner, PreviewReport, RunOutcome};
use crate::errors::EngineError;
use crate::events::{ChangeEvent, ChangeListener, ChangeNotifier};
use crate::rules::{BulkDeleteOutcome, CandidateRule, Rule, RuleBook, RuleDraft};
use crate::storage::RuleStorage;
use crate::transactions::{TransactionReader, TransactionWriter};

pub struct RuleEngine {
    name: String,
    config: Config,
    rules: RwLock<RuleBook>,
    storage: Arc<dyn RuleStorage>,
    notifier: ChangeNotifier,
    run_active: AtomicBool,
}

impl RuleEngine {
    /// Opens the named rulebook, creating an empty one on first use.
    pub fn open(
        storage: Arc<dyn RuleStorage>,
        name: impl Into<String>,
        config: Config,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        let book = storage.load_or_default(&name)?;
        info!(rulebook = %name, rules = book.rule_count(), "rulebook opened");
        Ok(Self {
            name,
            config,
            rules: RwLock::new(book),
            storage,
            notifier: ChangeNotifier::new(),
            run_active: AtomicBool::new(false),
        })
    }

    /// Registers a listener for rule/transaction change events. Call during
    /// setup, before the engine is shared.
    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.notifier.subscribe(listener);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the rules in persisted order.
    pub fn rules(&self) -> Result<Vec<Rule>, EngineError> {
        Ok(self.read_book()?.rules.clone())
    }

    pub fn create_rule(&self, draft: &RuleDraft) -> Result<Rule, EngineError> {
        let rule = {
            let mut book = self.write_book()?;
            let rule = book.create(draft, self.config.priority_step)?;
            self.storage.save(&book, &self.name)?;
            rule
        };
        info!(rulebook = %self.name, rule = %rule.id, "rule created");
        self.emit_rules_changed();
        Ok(rule)
    }

    pub fn update_rule(&self, id: Uuid, draft: &RuleDraft) -> Result<Rule, EngineError> {
        let rule = {
            let mut book = self.write_book()?;
            let rule = book.update(id, draft)?;
            self.storage.save(&book, &self.name)?;
            rule
        };
        self.emit_rules_changed();
        Ok(rule)
    }

    pub fn delete_rule(&self, id: Uuid) -> Result<Uuid, EngineError> {
        {
            let mut book = self.write_book()?;
            book.delete(id)?;
            self.storage.save(&book, &self.name)?;
        }
        self.emit_rules_changed();
        Ok(id)
    }

    pub fn bulk_delete(&self, ids: &[Uuid]) -> Result<BulkDeleteOutcome, EngineError> {
        let outcome = {
            let mut book = self.write_book()?;
            let outcome = book.bulk_delete(ids);
            if !outcome.deleted.is_empty() {
                self.storage.save(&book, &self.name)?;
            }
            outcome
        };
        if !outcome.deleted.is_empty() {
            self.emit_rules_changed();
        }
        Ok(outcome)
    }

    pub fn reorder(&self, ids: &[Uuid]) -> Result<(), EngineError> {
        {
            let mut book = self.write_book()?;
            book.reorder(ids)?;
            self.storage.save(&book, &self.name)?;
        }
        self.emit_rules_changed();
        Ok(())
    }

    /// Dry run of one candidate rule against the corpus. Read-only; may run
    /// concurrently with anything, including a bulk run.
    pub fn preview(
        &self,
        candidate: &CandidateRule,
        reader: &dyn TransactionReader,
        limit: Option<usize>,
    ) -> Result<PreviewReport, EngineError> {
        let limit = limit.unwrap_or(self.config.preview_sample_limit);
        preview(candidate, reader, limit)
    }

    /// Applies the full rule set across the corpus. At most one run may be
    /// in flight per rulebook; a second call is rejected, not queued. The
    /// run evaluates a snapshot of the rules, so a concurrent reorder is
    /// observed either entirely or not at all.
    pub fn run(
        &self,
        reader: &dyn TransactionReader,
        writer: &mut dyn TransactionWriter,
        overwrite_verified: bool,
    ) -> Result<RunOutcome, EngineError> {
        let _permit = RunPermit::acquire(&self.run_active)?;
        let snapshot = self.read_book()?.rules.clone();
        let outcome = runner::run(&snapshot, reader, writer, overwrite_verified)?;
        self.notifier.emit(ChangeEvent::TransactionsChanged {
            mutated: outcome.mutated,
        });
        Ok(outcome)
    }

    fn emit_rules_changed(&self) {
        self.notifier.emit(ChangeEvent::RulesChanged {
            rulebook: self.name.clone(),
        });
    }

    fn read_book(&self) -> Result<RwLockReadGuard<'_, RuleBook>, EngineError> {
        self.rules
            .read()
            .map_err(|_| EngineError::Storage("rulebook lock poisoned".into()))
    }

    fn write_book(&self) -> Result<RwLockWriteGuard<'_, RuleBook>, EngineError> {
        self.rules
            .write()
            .map_err(|_| EngineError::Storage("rulebook lock poisoned".into()))
    }
}

/// Guard enforcing at-most-one bulk run per engine. Releases on drop, also
/// on the error path.
struct RunPermit<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunPermit<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, EngineError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::RunInProgress);
        }
        Ok(Self { flag })
    }
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_permit_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let permit = RunPermit::acquire(&flag).expect("first acquire");
        assert!(matches!(
            RunPermit::acquire(&flag),
            Err(EngineError::RunInProgress)
        ));
        drop(permit);
        assert!(RunPermit::acquire(&flag).is_ok());
    }
}
