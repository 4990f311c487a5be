//! Caller identity.
//!
//! An `Identity` is what a policy expression sees when it dereferences
//! "who is calling". Pre-call checks may run before any identity has been
//! established at all; forcing the supplier at that point yields the
//! well-defined anonymous identity rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The identity a call is made under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Name of the authenticated principal
    pub principal: String,

    /// Roles granted to the principal
    pub roles: BTreeSet<String>,

    /// Whether this identity was established by authentication
    pub authenticated: bool,
}

impl Identity {
    /// Create an authenticated identity with the given principal and roles.
    pub fn new<I, S>(principal: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal: principal.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            authenticated: true,
        }
    }

    /// The "no identity established" value.
    ///
    /// Returned when an identity supplier is forced before authentication
    /// has happened. Carries no roles.
    pub fn anonymous() -> Self {
        Self {
            principal: "anonymous".to_string(),
            roles: BTreeSet::new(),
            authenticated: false,
        }
    }

    /// Whether the principal holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Whether this is the anonymous, unauthenticated identity.
    pub fn is_anonymous(&self) -> bool {
        !self.authenticated
    }

    /// Add a role to this identity, builder style.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.principal)
    }
}
