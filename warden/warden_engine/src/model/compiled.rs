//! Compiled policies.
//!
//! A `CompiledPolicy` pairs a declared policy's expression, parsed into its
//! evaluable form, with its fully resolved denial handler. Each instance is
//! owned by the cache entry for its member identity and lives for the rest
//! of the process; policies are static configuration with no invalidation.

use std::fmt;
use std::sync::Arc;

use warden_core::types::{Checkpoint, MemberId};

use crate::denial::DeniedHandler;
use crate::expr::CompiledExpression;

/// A declared policy in evaluable form.
pub struct CompiledPolicy {
    /// The member this policy governs
    pub member: MemberId,

    /// The checkpoint this policy applies at
    pub checkpoint: Checkpoint,

    /// The expanded expression text the expression was compiled from
    pub source_text: String,

    expression: Box<dyn CompiledExpression>,
    denied_handler: Arc<dyn DeniedHandler>,
}

impl CompiledPolicy {
    /// Create a compiled policy.
    pub fn new(
        member: MemberId,
        checkpoint: Checkpoint,
        source_text: impl Into<String>,
        expression: Box<dyn CompiledExpression>,
        denied_handler: Arc<dyn DeniedHandler>,
    ) -> Self {
        Self {
            member,
            checkpoint,
            source_text: source_text.into(),
            expression,
            denied_handler,
        }
    }

    /// The evaluable expression.
    pub fn expression(&self) -> &dyn CompiledExpression {
        self.expression.as_ref()
    }

    /// The denial handler resolved for this policy.
    pub fn denied_handler(&self) -> &Arc<dyn DeniedHandler> {
        &self.denied_handler
    }
}

impl fmt::Debug for CompiledPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPolicy")
            .field("member", &self.member)
            .field("checkpoint", &self.checkpoint)
            .field("source_text", &self.source_text)
            .finish_non_exhaustive()
    }
}
