//! In-memory hierarchy index.
//!
//! This module provides the pre-indexed hierarchy description the locator
//! searches: an arena of type metadata registered up front, in place of
//! live reflection over a class graph.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use warden_core::types::Checkpoint;

use super::PolicySource;
use crate::model::PolicyDeclaration;

/// Metadata for one type in the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct TypeMeta {
    name: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    view_of: Option<String>,
    methods: HashMap<String, MethodPolicies>,
}

#[derive(Debug, Clone, Default)]
struct MethodPolicies {
    before: Option<PolicyDeclaration>,
    after: Option<PolicyDeclaration>,
}

impl TypeMeta {
    /// Describe a new type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record the direct superclass, builder style.
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Record a directly implemented interface, builder style.
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Mark this type as a proxy or interface view of a concrete type.
    ///
    /// Calls arriving on a view are located against the concrete type.
    pub fn view_of(mut self, concrete: impl Into<String>) -> Self {
        self.view_of = Some(concrete.into());
        self
    }

    /// Attach a pre-call policy declaration to a method, builder style.
    pub fn before_policy(
        mut self,
        signature: impl Into<String>,
        declaration: PolicyDeclaration,
    ) -> Self {
        self.methods
            .entry(signature.into())
            .or_default()
            .before = Some(declaration);
        self
    }

    /// Attach a post-call policy declaration to a method, builder style.
    pub fn after_policy(
        mut self,
        signature: impl Into<String>,
        declaration: PolicyDeclaration,
    ) -> Self {
        self.methods
            .entry(signature.into())
            .or_default()
            .after = Some(declaration);
        self
    }
}

/// An in-memory arena of type metadata.
#[derive(Clone, Default)]
pub struct HierarchyIndex {
    types: Arc<DashMap<String, TypeMeta>>,
}

impl HierarchyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Re-registering a name replaces its metadata.
    pub fn register(&self, meta: TypeMeta) {
        self.types.insert(meta.name.clone(), meta);
    }
}

impl PolicySource for HierarchyIndex {
    fn declaration(
        &self,
        type_name: &str,
        signature: &str,
        checkpoint: Checkpoint,
    ) -> Option<PolicyDeclaration> {
        let meta = self.types.get(type_name)?;
        let method = meta.methods.get(signature)?;
        match checkpoint {
            Checkpoint::Before => method.before.clone(),
            Checkpoint::After => method.after.clone(),
        }
    }

    fn superclass(&self, type_name: &str) -> Option<String> {
        self.types.get(type_name)?.superclass.clone()
    }

    fn interfaces(&self, type_name: &str) -> Vec<String> {
        match self.types.get(type_name) {
            Some(meta) => meta.interfaces.clone(),
            None => Vec::new(),
        }
    }

    fn concrete_type(&self, type_name: &str) -> Option<String> {
        self.types.get(type_name)?.view_of.clone()
    }
}
