//! # Warden Core
//!
//! `warden_core` provides the fundamental building blocks for the Warden
//! method-authorization engine. This includes the error taxonomy, member
//! identities, caller identities, and decision types shared by every
//! component of the system.
//!
//! ## Core Principles
//!
//! 1. **Declarative Policies**: Access rules are expressions attached to
//!    callable members. The engine decides; it never defines the expression
//!    language itself.
//!
//! 2. **Deterministic Failures**: Configuration mistakes and malformed
//!    expressions fail the same way on every call to the affected member.
//!    They are never downgraded to an access denial.
//!
//! 3. **Lazy Identity**: Resolving "who is calling" can be expensive, so the
//!    caller identity is supplied lazily and only forced when a policy
//!    actually dereferences it.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Warden components
//! - **types**: Member identities, caller identities, and decisions

pub mod error;
pub mod types;

// Re-export key types for convenience
pub use error::{AuthError, ConfigError, EvalError, ParseError, Result};
pub use types::{Checkpoint, Decision, DecisionFact, Identity, MemberId};
