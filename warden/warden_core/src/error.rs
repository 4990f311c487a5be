//! Error types for the Warden authorization engine.
//!
//! The taxonomy separates four concerns that must never be confused with
//! one another:
//!
//! - `ConfigError`: static misconfiguration (ambiguous declarations,
//!   unresolvable denial handlers). Fatal and deterministic.
//! - `ParseError`: malformed policy expression text. Fatal at first
//!   compilation and replayed identically from the cache afterwards.
//! - `EvalError`: the expression raised a fault against a valid context.
//!   A per-call outcome, reported distinctly from a denial.
//! - `AccessDenied`: the expected outcome of a denying policy with no
//!   substituting handler. User-visible and by design.
//!
//! Observer failures are not part of this taxonomy; they are isolated and
//! logged, never propagated into the call path.

use serde_json::Value;
use thiserror::Error;

use crate::types::MemberId;

/// Root error type for the Warden system.
///
/// `Clone` is required because configuration and parse failures are cached
/// per member and replayed verbatim on every subsequent call.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Static misconfiguration of policy declarations or denial handlers
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The policy expression attached to a member failed to parse
    #[error("policy expression for {member} failed to parse: {source}")]
    Parse {
        /// The member whose policy is malformed
        member: MemberId,

        /// The parser's diagnostic
        source: ParseError,
    },

    /// The policy expression raised a fault while evaluating
    #[error("policy evaluation for {member} failed: {source}")]
    Evaluation {
        /// The member whose policy faulted
        member: MemberId,

        /// The evaluator's diagnostic
        source: EvalError,
    },

    /// A policy evaluated to a denying decision and no handler substituted
    /// a replacement value
    #[error("access denied for {member}")]
    AccessDenied {
        /// The member the caller was denied access to
        member: MemberId,

        /// The denying expression's justification value
        justification: Value,
    },
}

impl AuthError {
    /// Whether this error is the ordinary access-denied outcome rather
    /// than a bug or misconfiguration.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Errors caused by invalid policy configuration.
///
/// These surface immediately at first use of the affected member, are never
/// retried, and are never silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two independent declarations of the same policy kind were found at
    /// equal specificity (e.g. on two unrelated interfaces)
    #[error("ambiguous policy declarations for {member}: found on both {first_site} and {second_site}")]
    AmbiguousDeclaration {
        /// The member being located
        member: MemberId,

        /// First declaration site
        first_site: String,

        /// Second, independent declaration site
        second_site: String,
    },

    /// No component is registered for the requested denial handler type
    #[error("no denial handler registered for type {0}")]
    HandlerNotFound(String),

    /// More than one component is registered for the requested denial
    /// handler type
    #[error("expected a single denial handler for type {handler_type}, found {candidates}")]
    HandlerAmbiguous {
        /// The requested handler type
        handler_type: String,

        /// How many candidates matched
        candidates: usize,
    },

    /// A meta-policy template referenced a placeholder with no matching
    /// attribute at the declaration site
    #[error("unknown template placeholder {{{placeholder}}} in policy for {member}")]
    UnknownPlaceholder {
        /// The member whose declaration carries the template
        member: MemberId,

        /// The placeholder name that could not be substituted
        placeholder: String,
    },
}

/// A policy expression could not be parsed.
///
/// Produced by the expression subsystem's `compile` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The parser's diagnostic message
    pub message: String,
}

impl ParseError {
    /// Create a new parse error with the given diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A compiled policy expression raised a fault during evaluation.
///
/// Produced by the expression subsystem's `evaluate` operation. Distinct
/// from a denial: coercing evaluation faults into "access denied" would
/// mask bugs as security failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    /// The evaluator's diagnostic message
    pub message: String,
}

impl EvalError {
    /// Create a new evaluation error with the given diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type used throughout the Warden system.
pub type Result<T> = std::result::Result<T, AuthError>;
