//! Decision observation.
//!
//! Observers are notified with structured grant/deny facts after each
//! checkpoint resolves, decoupled from the evaluation path. Notification
//! is fire-and-forget: an observer can neither block nor alter a
//! decision, and its failures are isolated by the engine.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use warden_core::types::DecisionFact;

/// Notification hook invoked with each resolved grant or denial.
///
/// Not invoked for not-applicable outcomes: observers only hear about
/// members that a policy actually governs.
pub trait DecisionObserver: Send + Sync {
    /// Observe one resolved decision.
    fn notify(&self, fact: &DecisionFact);
}

/// An observer that reports decisions through the ambient logging layer.
///
/// Grants are routine and logged at debug; denials at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDecisionObserver;

impl DecisionObserver for TracingDecisionObserver {
    fn notify(&self, fact: &DecisionFact) {
        if fact.granted {
            debug!(member = %fact.member, checkpoint = %fact.checkpoint, "access granted");
        } else {
            warn!(
                member = %fact.member,
                checkpoint = %fact.checkpoint,
                justification = %fact.justification,
                "access denied"
            );
        }
    }
}

/// A bounded in-memory log of decision facts.
///
/// Keeps the most recent facts up to a configured capacity. Useful for
/// diagnostics and for asserting on decisions in tests.
#[derive(Clone)]
pub struct DecisionLog {
    entries: Arc<Mutex<VecDeque<DecisionFact>>>,
    max_entries: usize,
}

impl DecisionLog {
    /// Create a log keeping at most `max_entries` facts.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries,
        }
    }

    /// All recorded facts, oldest first.
    pub fn facts(&self) -> Vec<DecisionFact> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Recorded denial facts, oldest first.
    pub fn denied_facts(&self) -> Vec<DecisionFact> {
        self.entries
            .lock()
            .iter()
            .filter(|fact| !fact.granted)
            .cloned()
            .collect()
    }

    /// Drop all recorded facts.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for DecisionLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl DecisionObserver for DecisionLog {
    fn notify(&self, fact: &DecisionFact) {
        let mut entries = self.entries.lock();
        entries.push_back(fact.clone());
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }
}
