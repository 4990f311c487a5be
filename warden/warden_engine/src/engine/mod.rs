//! The decision engine.
//!
//! Orchestrates lookup, context construction, evaluation, and outcome
//! classification for both checkpoints. The same pipeline is exposed under
//! two execution disciplines: a blocking path for parallel worker threads
//! and a cooperative path for a suspension-capable scheduler. Both share
//! the locator, the cache, and the classification rules, so identical
//! inputs produce identical decisions.

pub mod observer;

pub use observer::{DecisionLog, DecisionObserver, TracingDecisionObserver};

use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};

use warden_core::error::{AuthError, EvalError, Result};
use warden_core::types::{Checkpoint, Decision, DecisionFact, MemberId};

use crate::cache::CompiledPolicyCache;
use crate::context::{EvaluationContext, IdentitySupplier, Invocation};
use crate::model::CompiledPolicy;

/// The per-invocation authorization decision engine.
pub struct DecisionEngine {
    cache: Arc<CompiledPolicyCache>,
    observers: Vec<Arc<dyn DecisionObserver>>,
}

impl DecisionEngine {
    /// Create an engine over the given policy cache.
    pub fn new(cache: Arc<CompiledPolicyCache>) -> Self {
        Self {
            cache,
            observers: Vec::new(),
        }
    }

    /// Attach a decision observer, builder style.
    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The shared policy cache.
    pub fn cache(&self) -> &Arc<CompiledPolicyCache> {
        &self.cache
    }

    /// Evaluate the pre-call policy for an invocation, blocking
    /// discipline.
    ///
    /// Returns `NotApplicable` when no policy governs the member; callers
    /// must treat that as "no restriction".
    pub fn check_before(
        &self,
        invocation: &Invocation,
        identity: IdentitySupplier,
    ) -> Result<Decision> {
        let Some(policy) = self.prepare(invocation, Checkpoint::Before)? else {
            return Ok(Decision::NotApplicable);
        };

        let ctx = EvaluationContext::for_invocation(invocation, identity, None);
        let value = policy
            .expression()
            .evaluate(&ctx)
            .map_err(|source| Self::evaluation_error(&invocation.member, source))?;

        self.conclude(&invocation.member, Checkpoint::Before, value)
    }

    /// Evaluate the post-call policy for an invocation with its return
    /// value visible, blocking discipline.
    pub fn check_after(
        &self,
        invocation: &Invocation,
        identity: IdentitySupplier,
        return_value: Value,
    ) -> Result<Decision> {
        let Some(policy) = self.prepare(invocation, Checkpoint::After)? else {
            return Ok(Decision::NotApplicable);
        };

        let ctx = EvaluationContext::for_invocation(invocation, identity, Some(return_value));
        let value = policy
            .expression()
            .evaluate(&ctx)
            .map_err(|source| Self::evaluation_error(&invocation.member, source))?;

        self.conclude(&invocation.member, Checkpoint::After, value)
    }

    /// Evaluate the pre-call policy, cooperative discipline.
    ///
    /// Suspends only inside the expression's own asynchronous evaluation
    /// (and, transitively, identity resolution). The cache lookup and
    /// classification never suspend, and no lock is held across the
    /// suspension point.
    pub async fn check_before_async(
        &self,
        invocation: &Invocation,
        identity: IdentitySupplier,
    ) -> Result<Decision> {
        let Some(policy) = self.prepare(invocation, Checkpoint::Before)? else {
            return Ok(Decision::NotApplicable);
        };

        let ctx = EvaluationContext::for_invocation(invocation, identity, None);
        let value = policy
            .expression()
            .evaluate_async(&ctx)
            .await
            .map_err(|source| Self::evaluation_error(&invocation.member, source))?;

        self.conclude(&invocation.member, Checkpoint::Before, value)
    }

    /// Evaluate the post-call policy, cooperative discipline.
    pub async fn check_after_async(
        &self,
        invocation: &Invocation,
        identity: IdentitySupplier,
        return_value: Value,
    ) -> Result<Decision> {
        let Some(policy) = self.prepare(invocation, Checkpoint::After)? else {
            return Ok(Decision::NotApplicable);
        };

        let ctx = EvaluationContext::for_invocation(invocation, identity, Some(return_value));
        let value = policy
            .expression()
            .evaluate_async(&ctx)
            .await
            .map_err(|source| Self::evaluation_error(&invocation.member, source))?;

        self.conclude(&invocation.member, Checkpoint::After, value)
    }

    /// Resolve the compiled policy for a checkpoint. Shared by both
    /// disciplines; never suspends.
    fn prepare(
        &self,
        invocation: &Invocation,
        checkpoint: Checkpoint,
    ) -> Result<Option<Arc<CompiledPolicy>>> {
        self.cache
            .get_or_compile(&invocation.member, &invocation.runtime_type, checkpoint)
    }

    /// Classify the expression value and notify observers.
    fn conclude(
        &self,
        member: &MemberId,
        checkpoint: Checkpoint,
        value: Value,
    ) -> Result<Decision> {
        let decision = classify(member, value)?;
        trace!(member = %member, %checkpoint, %decision, "policy evaluated");
        self.notify(member, checkpoint, &decision);
        Ok(decision)
    }

    /// Notify observers of a resolved decision, fire-and-forget.
    ///
    /// Observer failures are isolated and logged; they must never
    /// propagate back into the call path or alter the decision.
    fn notify(&self, member: &MemberId, checkpoint: Checkpoint, decision: &Decision) {
        let Some(fact) = DecisionFact::capture(member, checkpoint, decision) else {
            return;
        };

        for observer in &self.observers {
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.notify(&fact)));
            if outcome.is_err() {
                warn!(member = %fact.member, %checkpoint, "decision observer panicked; ignoring");
            }
        }
    }

    fn evaluation_error(member: &MemberId, source: EvalError) -> AuthError {
        AuthError::Evaluation {
            member: member.clone(),
            source,
        }
    }
}

/// Classify an expression value into a decision.
///
/// Booleans grant or deny directly. A decision object carries its own
/// boolean `granted` flag and is kept whole as the justification. Any
/// other value is an evaluation fault, never coerced into a denial.
fn classify(member: &MemberId, value: Value) -> Result<Decision> {
    match value {
        Value::Bool(true) => Ok(Decision::granted(true)),
        Value::Bool(false) => Ok(Decision::denied(false)),
        Value::Null => Ok(Decision::denied(Value::Null)),
        Value::Object(fields) => match fields.get("granted").and_then(Value::as_bool) {
            Some(true) => Ok(Decision::Granted {
                justification: Value::Object(fields),
            }),
            Some(false) => Ok(Decision::Denied {
                justification: Value::Object(fields),
            }),
            None => Err(AuthError::Evaluation {
                member: member.clone(),
                source: EvalError::new("decision object is missing a boolean `granted` field"),
            }),
        },
        other => Err(AuthError::Evaluation {
            member: member.clone(),
            source: EvalError::new(format!("expression produced a non-decision value: {other}")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member() -> MemberId {
        MemberId::new("acme.Billing", "invoice(id)")
    }

    #[test]
    fn test_classify_booleans() {
        assert_eq!(
            classify(&member(), Value::Bool(true)).unwrap(),
            Decision::granted(true)
        );
        assert_eq!(
            classify(&member(), Value::Bool(false)).unwrap(),
            Decision::denied(false)
        );
    }

    #[test]
    fn test_classify_null_denies() {
        assert_eq!(
            classify(&member(), Value::Null).unwrap(),
            Decision::denied(Value::Null)
        );
    }

    #[test]
    fn test_classify_decision_object() {
        let value = json!({ "granted": false, "reason": "outside business hours" });
        let decision = classify(&member(), value.clone()).unwrap();
        assert!(decision.is_denied());
        assert_eq!(decision.justification(), Some(&value));
    }

    #[test]
    fn test_classify_rejects_non_decision_values() {
        let err = classify(&member(), json!(42)).unwrap_err();
        assert!(matches!(err, AuthError::Evaluation { .. }));
        assert!(!err.is_denial());

        let err = classify(&member(), json!({ "reason": "no flag" })).unwrap_err();
        assert!(matches!(err, AuthError::Evaluation { .. }));
    }
}
