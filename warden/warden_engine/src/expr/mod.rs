//! Expression subsystem boundary.
//!
//! The engine does not define an expression language. It requires exactly
//! two capabilities from whichever language is plugged in: compile a string
//! into an evaluable policy, and evaluate a compiled policy against a typed
//! context. Evaluation comes in a blocking and a cooperative flavor; the
//! cooperative one defaults to the blocking body since most languages are
//! synchronous.

use async_trait::async_trait;
use serde_json::Value;

use warden_core::error::{EvalError, ParseError};

use crate::context::EvaluationContext;

/// A pluggable expression language.
pub trait ExpressionLanguage: Send + Sync {
    /// Compile raw expression text into an evaluable form.
    fn compile(&self, text: &str) -> Result<Box<dyn CompiledExpression>, ParseError>;
}

/// An expression compiled for repeated evaluation.
///
/// Implementations must be pure with respect to the context: evaluating the
/// same expression against the same context twice produces the same value.
#[async_trait]
pub trait CompiledExpression: Send + Sync {
    /// Evaluate against the given context, blocking discipline.
    fn evaluate(&self, ctx: &EvaluationContext) -> Result<Value, EvalError>;

    /// Evaluate against the given context, cooperative discipline.
    ///
    /// Languages whose evaluation is itself asynchronous override this;
    /// the default delegates to the blocking body, which must not suspend.
    async fn evaluate_async(&self, ctx: &EvaluationContext) -> Result<Value, EvalError> {
        self.evaluate(ctx)
    }
}
