//! Policy declarations.
//!
//! A `PolicyDeclaration` is the raw, annotation-equivalent rule attached to
//! a method at a declaration site: expression text, an optional denial
//! handler type, and optional template attributes. A `DeclaredPolicy` is
//! the result of locating one for a concrete member, with meta-policy
//! placeholders already expanded. Both are immutable after discovery.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warden_core::types::{Checkpoint, MemberId};

/// A raw policy declaration as attached to a method or type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDeclaration {
    /// The policy expression text, possibly containing `{placeholder}`
    /// template references
    pub expression: String,

    /// Optional denial handler type to resolve through the component
    /// registry
    pub handler_type: Option<String>,

    /// Attribute values used to expand template placeholders
    pub template_args: BTreeMap<String, String>,
}

impl PolicyDeclaration {
    /// Create a declaration with the given expression text.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            handler_type: None,
            template_args: BTreeMap::new(),
        }
    }

    /// Attach a denial handler type, builder style.
    pub fn with_handler(mut self, handler_type: impl Into<String>) -> Self {
        self.handler_type = Some(handler_type.into());
        self
    }

    /// Attach a template attribute, builder style.
    pub fn with_template_arg(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.template_args.insert(name.into(), value.into());
        self
    }
}

/// Reference to a denial-handling strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerRef {
    /// The default strategy: fail with an access-denied signal
    Default,

    /// A named handler resolved exactly once through the component
    /// registry
    Named(String),
}

/// A located policy for a concrete member, ready for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPolicy {
    /// The member this policy governs
    pub member: MemberId,

    /// The checkpoint this policy applies at
    pub checkpoint: Checkpoint,

    /// The expression text with template placeholders expanded
    pub expression: String,

    /// How a denial of this policy is handled
    pub handler: HandlerRef,

    /// The type whose declaration won the search
    pub declared_on: String,
}
