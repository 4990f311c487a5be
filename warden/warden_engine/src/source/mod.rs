//! Declarative policy sources.
//!
//! A policy source replaces live reflection: it answers what is declared
//! directly at an exact (type, signature) site and describes the shape of
//! the type hierarchy, so the locator can run its ordered chain lookup
//! over a statically known description instead of scanning metadata per
//! call.

pub mod hierarchy;

pub use hierarchy::{HierarchyIndex, TypeMeta};

use warden_core::types::Checkpoint;

use crate::model::PolicyDeclaration;

/// Introspection capability the locator queries.
///
/// All answers must be stable for the life of the process; policies are
/// static configuration.
pub trait PolicySource: Send + Sync {
    /// The declaration sitting directly on the given type's method, if
    /// any. No inheritance is applied here; walking the hierarchy is the
    /// locator's job.
    fn declaration(
        &self,
        type_name: &str,
        signature: &str,
        checkpoint: Checkpoint,
    ) -> Option<PolicyDeclaration>;

    /// The direct superclass of the given type.
    fn superclass(&self, type_name: &str) -> Option<String>;

    /// The interfaces the given type directly implements or extends.
    fn interfaces(&self, type_name: &str) -> Vec<String>;

    /// The concrete implementing type behind a proxy or interface view,
    /// when the given runtime type is not itself the concrete one.
    fn concrete_type(&self, type_name: &str) -> Option<String>;
}
