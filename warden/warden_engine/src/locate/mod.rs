//! Policy location.
//!
//! Given a callable member and the runtime type a call arrived on, the
//! locator finds the single applicable declaration. The search order is
//! fixed and first-found wins:
//!
//! 1. the method declared directly on the most specific type,
//! 2. the interfaces of that type, scanned level by level (direct
//!    interfaces before their super-interfaces),
//! 3. each ancestor up the superclass chain, applying the same two probes.
//!
//! Two independent declarations at the same interface level are a
//! configuration error, never a silent pick. Meta-policy templates are
//! expanded here, once, at discovery time.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

use warden_core::error::Result;
use warden_core::types::{Checkpoint, MemberId};

use crate::model::template;
use crate::model::{DeclaredPolicy, HandlerRef, PolicyDeclaration, TemplateDefaults};
use crate::source::PolicySource;

/// Finds the applicable policy declaration for a member.
pub struct PolicyLocator {
    source: Arc<dyn PolicySource>,
    template_defaults: Option<TemplateDefaults>,
}

impl PolicyLocator {
    /// Create a locator over the given policy source.
    ///
    /// Templates are not resolved unless defaults are configured.
    pub fn new(source: Arc<dyn PolicySource>) -> Self {
        Self {
            source,
            template_defaults: None,
        }
    }

    /// Enable meta-policy template resolution, builder style.
    pub fn with_template_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.template_defaults = Some(defaults);
        self
    }

    /// Find the single applicable declaration for the member, or `None`
    /// when nothing in the chain declares a policy at this checkpoint.
    pub fn locate(
        &self,
        member: &MemberId,
        runtime_type: &str,
        checkpoint: Checkpoint,
    ) -> Result<Option<DeclaredPolicy>> {
        // A call may arrive through a proxy or interface view; substitute
        // the concrete implementing type for accurate declaration lookup.
        let most_specific = self
            .source
            .concrete_type(runtime_type)
            .unwrap_or_else(|| runtime_type.to_string());

        let mut current = Some(most_specific);
        while let Some(type_name) = current {
            if let Some(declaration) =
                self.source
                    .declaration(&type_name, &member.signature, checkpoint)
            {
                trace!(member = %member, site = %type_name, "policy declared on class");
                return self
                    .admit(member, checkpoint, &type_name, declaration)
                    .map(Some);
            }

            if let Some((site, declaration)) =
                self.interface_declaration(member, &type_name, checkpoint)?
            {
                trace!(member = %member, site = %site, "policy declared on interface");
                return self.admit(member, checkpoint, &site, declaration).map(Some);
            }

            current = self.source.superclass(&type_name);
        }

        Ok(None)
    }

    /// Scan the interface closure of a type, level by level.
    ///
    /// The front-most level that declares wins; two independent
    /// declarations at that level are ambiguous. A diamond reaching the
    /// same interface twice counts once.
    fn interface_declaration(
        &self,
        member: &MemberId,
        type_name: &str,
        checkpoint: Checkpoint,
    ) -> Result<Option<(String, PolicyDeclaration)>> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut level = self.source.interfaces(type_name);
        level.retain(|name| visited.insert(name.clone()));

        while !level.is_empty() {
            let mut found: Vec<(String, PolicyDeclaration)> = Vec::new();
            for interface in &level {
                if let Some(declaration) =
                    self.source
                        .declaration(interface, &member.signature, checkpoint)
                {
                    found.push((interface.clone(), declaration));
                }
            }

            match found.len() {
                0 => {}
                1 => {
                    let (site, declaration) = found.remove(0);
                    return Ok(Some((site, declaration)));
                }
                _ => {
                    return Err(warden_core::error::ConfigError::AmbiguousDeclaration {
                        member: member.clone(),
                        first_site: found[0].0.clone(),
                        second_site: found[1].0.clone(),
                    }
                    .into())
                }
            }

            let mut next = Vec::new();
            for interface in &level {
                for parent in self.source.interfaces(interface) {
                    if visited.insert(parent.clone()) {
                        next.push(parent);
                    }
                }
            }
            level = next;
        }

        Ok(None)
    }

    /// Expand templates and package the winning declaration.
    fn admit(
        &self,
        member: &MemberId,
        checkpoint: Checkpoint,
        site: &str,
        declaration: PolicyDeclaration,
    ) -> Result<DeclaredPolicy> {
        let expression = match self.template_defaults {
            Some(defaults) => template::expand(
                member,
                &declaration.expression,
                &declaration.template_args,
                defaults,
            )?,
            None => declaration.expression,
        };

        let handler = match declaration.handler_type {
            Some(handler_type) => HandlerRef::Named(handler_type),
            None => HandlerRef::Default,
        };

        Ok(DeclaredPolicy {
            member: member.clone(),
            checkpoint,
            expression,
            handler,
            declared_on: site.to_string(),
        })
    }
}
