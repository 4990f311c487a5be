//! Denial handling.
//!
//! When a policy denies access, a handler decides what happens to the call:
//! the default raises an access-denied signal, while a caller-registered
//! handler may substitute a replacement value, turning the denial into a
//! degraded-but-successful outcome. Handlers are resolved exactly once per
//! member, at compile time, through the component registry.
//!
//! Handlers only ever see denied decisions. Configuration, parse, and
//! evaluation errors are raised before any handler runs, so a handler can
//! never convert them into a silent grant.

pub mod registry;

pub use registry::{ComponentRegistry, HandlerRegistry, RegistryError};

use serde_json::Value;
use std::sync::Arc;

use warden_core::error::{AuthError, EvalError, Result};
use warden_core::types::{Checkpoint, Decision};

use crate::cache::CompiledPolicyCache;
use crate::context::Invocation;

/// A pluggable strategy invoked when a decision is denied.
pub trait DeniedHandler: Send + Sync {
    /// Handle a denied invocation.
    ///
    /// Returning `Ok` substitutes the value for the call's result;
    /// returning `Err` re-signals the denial.
    fn handle(&self, invocation: &Invocation, decision: &Decision) -> Result<Value>;
}

impl std::fmt::Debug for dyn DeniedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DeniedHandler")
    }
}

/// The default denial strategy: fail with an access-denied signal.
///
/// Never substitutes a value. This is the safe default and is used whenever
/// a policy declares no handler reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowingDeniedHandler;

impl DeniedHandler for ThrowingDeniedHandler {
    fn handle(&self, invocation: &Invocation, decision: &Decision) -> Result<Value> {
        Err(AuthError::AccessDenied {
            member: invocation.member.clone(),
            justification: decision
                .justification()
                .cloned()
                .unwrap_or(Value::Bool(false)),
        })
    }
}

/// Resolves and invokes the denial strategy for a denied decision.
///
/// The concrete handler lives on the cached compiled policy, so repeated
/// denials of the same member never re-resolve it.
pub struct DenialHandlerResolver {
    cache: Arc<CompiledPolicyCache>,
}

impl DenialHandlerResolver {
    /// Create a resolver over the given policy cache.
    pub fn new(cache: Arc<CompiledPolicyCache>) -> Self {
        Self { cache }
    }

    /// Invoke the denial strategy for a denied decision.
    ///
    /// Only denied decisions are handled. Passing a granted or
    /// not-applicable decision is a wiring mistake in the interception
    /// layer and fails without invoking any handler, so a granted call can
    /// never surface as access denied.
    ///
    /// A denial implies the member's policy was already compiled, so the
    /// handler lookup is a cache hit.
    pub fn handle_denied(
        &self,
        invocation: &Invocation,
        checkpoint: Checkpoint,
        decision: &Decision,
    ) -> Result<Value> {
        if !decision.is_denied() {
            return Err(AuthError::Evaluation {
                member: invocation.member.clone(),
                source: EvalError::new(format!(
                    "denial handling requested for a decision that was {decision}"
                )),
            });
        }

        let handler = match self.cache.get_or_compile(
            &invocation.member,
            &invocation.runtime_type,
            checkpoint,
        )? {
            Some(policy) => policy.denied_handler().clone(),
            None => self.cache.default_handler(),
        };

        handler.handle(invocation, decision)
    }
}
