//! Lazy identity supply.
//!
//! Resolving "who is calling" may be expensive or may require state not yet
//! established at the checkpoint, so the engine stores the supplier
//! un-forced and defers resolution until a policy expression actually
//! dereferences it. A supplier forced before authentication yields the
//! anonymous identity rather than failing.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use warden_core::types::Identity;

/// A source of the caller identity.
///
/// The blocking resolution must not suspend. Sources whose resolution is
/// itself asynchronous override `resolve_async`; the default delegates to
/// the blocking body.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Resolve the caller identity, blocking discipline.
    fn resolve(&self) -> Identity;

    /// Resolve the caller identity, cooperative discipline.
    async fn resolve_async(&self) -> Identity {
        self.resolve()
    }
}

struct FnIdentitySource<F>(F);

impl<F> IdentitySource for FnIdentitySource<F>
where
    F: Fn() -> Identity + Send + Sync,
{
    fn resolve(&self) -> Identity {
        (self.0)()
    }
}

/// An un-forced holder for the caller identity.
///
/// Created per call and owned by the evaluation context. The identity is
/// resolved at most once; repeated dereferences observe the same value.
pub struct IdentitySupplier {
    source: Arc<dyn IdentitySource>,
    resolved: OnceCell<Identity>,
}

impl IdentitySupplier {
    /// Create a supplier backed by the given source.
    pub fn from_source(source: Arc<dyn IdentitySource>) -> Self {
        Self {
            source,
            resolved: OnceCell::new(),
        }
    }

    /// Create a supplier backed by a closure.
    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn() -> Identity + Send + Sync + 'static,
    {
        Self::from_source(Arc::new(FnIdentitySource(resolver)))
    }

    /// Create a supplier for an already-established identity.
    pub fn of(identity: Identity) -> Self {
        Self::from_fn(move || identity.clone())
    }

    /// Create a supplier for a call with no identity established.
    pub fn anonymous() -> Self {
        Self::from_fn(Identity::anonymous)
    }

    /// Force the supplier, blocking discipline.
    pub fn get(&self) -> &Identity {
        self.resolved.get_or_init(|| self.source.resolve())
    }

    /// Force the supplier, cooperative discipline.
    ///
    /// Suspends on the source's asynchronous resolution instead of blocking
    /// the carrier thread. The context is confined to a single call frame,
    /// so the resolve-then-store sequence is not racy.
    pub async fn get_async(&self) -> &Identity {
        if let Some(identity) = self.resolved.get() {
            return identity;
        }
        let identity = self.source.resolve_async().await;
        self.resolved.get_or_init(|| identity)
    }

    /// Whether the identity has been resolved yet.
    pub fn forced(&self) -> bool {
        self.resolved.get().is_some()
    }
}
