//! # Warden Engine
//!
//! `warden_engine` is an expression-based, per-invocation authorization
//! decision engine for method-level access control. For every intercepted
//! call it determines whether a declarative policy applies to that exact
//! member, evaluates the policy against a lazily-supplied identity and
//! call context, and decides what happens to the call and its result when
//! the policy denies access.
//!
//! Key concepts:
//!
//! 1. **Policy Location**: declarations are found by an ordered chain
//!    lookup over a pre-indexed type hierarchy, respecting override and
//!    meta-policy (template) resolution.
//!
//! 2. **Compiled Policy Cache**: each member's policy is compiled at most
//!    once, even under concurrent first use; members without a policy are
//!    cached as tombstones.
//!
//! 3. **Dual Discipline**: every checkpoint is evaluable from a blocking
//!    caller and from a cooperative, suspension-capable caller, producing
//!    identical decisions for identical inputs.
//!
//! 4. **Denial Handling**: a denied decision either fails with an
//!    access-denied signal (the default) or is handed to a registered
//!    handler that may substitute a replacement value.
//!
//! The expression language itself is a black box behind the
//! [`expr::ExpressionLanguage`] boundary; the engine only compiles and
//! evaluates.

pub mod cache;
pub mod context;
pub mod denial;
pub mod engine;
pub mod expr;
pub mod locate;
pub mod model;
pub mod source;

// Re-export key types and traits for convenience
pub use cache::CompiledPolicyCache;
pub use context::{EvaluationContext, IdentitySource, IdentitySupplier, Invocation};
pub use denial::{
    ComponentRegistry, DeniedHandler, DenialHandlerResolver, HandlerRegistry,
    ThrowingDeniedHandler,
};
pub use engine::{DecisionEngine, DecisionLog, DecisionObserver, TracingDecisionObserver};
pub use expr::{CompiledExpression, ExpressionLanguage};
pub use locate::PolicyLocator;
pub use model::{CompiledPolicy, DeclaredPolicy, HandlerRef, PolicyDeclaration, TemplateDefaults};
pub use source::{HierarchyIndex, PolicySource, TypeMeta};
