//! Handler component registry.
//!
//! The registry stands in for a DI container: an explicit registration map
//! from handler type to instances, passed into the engine at construction.
//! Resolution demands exactly one candidate; zero or several is a
//! configuration error, not an authorization denial.

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use warden_core::error::ConfigError;

use super::DeniedHandler;

/// Errors raised while resolving a handler component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No component is registered for the handler type
    #[error("no component registered for handler type {0}")]
    NotFound(String),

    /// More than one component is registered for the handler type
    #[error("expected a single component for handler type {handler_type}, found {candidates}")]
    Ambiguous {
        /// The requested handler type
        handler_type: String,

        /// How many candidates matched
        candidates: usize,
    },
}

impl From<RegistryError> for ConfigError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(handler_type) => ConfigError::HandlerNotFound(handler_type),
            RegistryError::Ambiguous {
                handler_type,
                candidates,
            } => ConfigError::HandlerAmbiguous {
                handler_type,
                candidates,
            },
        }
    }
}

/// Resolves named handler components.
pub trait ComponentRegistry: Send + Sync {
    /// Resolve the single component registered for the handler type.
    fn resolve_single(
        &self,
        handler_type: &str,
    ) -> Result<Arc<dyn DeniedHandler>, RegistryError>;
}

/// An in-memory component registry.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<DashMap<String, Vec<Arc<dyn DeniedHandler>>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler instance under a handler type.
    ///
    /// Registering a second instance under the same type makes that type
    /// ambiguous and unresolvable.
    pub fn register(&self, handler_type: impl Into<String>, handler: Arc<dyn DeniedHandler>) {
        self.handlers
            .entry(handler_type.into())
            .or_default()
            .push(handler);
    }
}

impl ComponentRegistry for HandlerRegistry {
    fn resolve_single(
        &self,
        handler_type: &str,
    ) -> Result<Arc<dyn DeniedHandler>, RegistryError> {
        let candidates = match self.handlers.get(handler_type) {
            Some(entry) => entry.clone(),
            None => return Err(RegistryError::NotFound(handler_type.to_string())),
        };

        match candidates.len() {
            1 => Ok(candidates[0].clone()),
            0 => Err(RegistryError::NotFound(handler_type.to_string())),
            n => Err(RegistryError::Ambiguous {
                handler_type: handler_type.to_string(),
                candidates: n,
            }),
        }
    }
}
