//! Explicit change notifications. The web client this engine was carved out
//! of invalidated its query cache as a fetch-library side effect; here the
//! engine emits a typed event after every rule mutation and bulk run, and
//! whatever caching layer hosts it subscribes a listener.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A change the engine performed that consumers may need to react to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The rule set of the named rulebook changed (create/update/delete/
    /// bulk-delete/reorder).
    RulesChanged { rulebook: String },
    /// A bulk run finished and mutated `mutated` transactions.
    TransactionsChanged { mutated: usize },
}

/// Receives engine change events. Implementations must be cheap; emission
/// happens synchronously on the mutating call path.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Fan-out of [`ChangeEvent`]s to registered listeners.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: ChangeEvent) {
        debug!(?event, listeners = self.listeners.len(), "change event");
        for listener in &self.listeners {
            listener.on_change(&event);
        }
    }
}
