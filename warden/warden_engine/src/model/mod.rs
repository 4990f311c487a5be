//! Policy model.
//!
//! This module defines the declarative policy types: raw declarations as
//! found at an annotation site, located and template-expanded policies,
//! and the compiled form owned by the policy cache.

pub mod compiled;
pub mod declaration;
pub mod template;

pub use compiled::CompiledPolicy;
pub use declaration::{DeclaredPolicy, HandlerRef, PolicyDeclaration};
pub use template::TemplateDefaults;
