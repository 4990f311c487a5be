//! Compiled policy cache.
//!
//! Maps a member identity to its resolved, compiled policy. Compilation
//! runs at most once per (member, checkpoint) even under concurrent first
//! access: all callers either observe the single compiled result or wait
//! briefly until it is available, never a partially-initialized entry.
//!
//! Members with no policy anywhere in their chain are cached as an
//! explicit tombstone, so repeated calls are O(1) lookups rather than
//! repeated locator scans. Configuration and parse failures are cached as
//! permanent failures and replayed identically. The cache has no eviction:
//! policies are static configuration for the life of the process.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

use warden_core::error::{AuthError, Result};
use warden_core::types::{Checkpoint, MemberId};

use crate::denial::{ComponentRegistry, DeniedHandler, ThrowingDeniedHandler};
use crate::expr::ExpressionLanguage;
use crate::locate::PolicyLocator;
use crate::model::{CompiledPolicy, HandlerRef};

/// A fully resolved cache entry.
///
/// `Absent` is the tombstone for members with no policy; `Failed` replays
/// the same deterministic error on every call.
enum CacheEntry {
    Absent,
    Compiled(Arc<CompiledPolicy>),
    Failed(AuthError),
}

/// Process-lifetime cache of compiled policies, keyed by member identity
/// and checkpoint.
pub struct CompiledPolicyCache {
    locator: PolicyLocator,
    language: Arc<dyn ExpressionLanguage>,
    registry: Arc<dyn ComponentRegistry>,
    default_handler: Arc<dyn DeniedHandler>,
    entries: DashMap<(MemberId, Checkpoint), Arc<OnceCell<CacheEntry>>>,
}

impl CompiledPolicyCache {
    /// Create a cache over the given locator, expression language, and
    /// handler registry.
    pub fn new(
        locator: PolicyLocator,
        language: Arc<dyn ExpressionLanguage>,
        registry: Arc<dyn ComponentRegistry>,
    ) -> Self {
        Self {
            locator,
            language,
            registry,
            default_handler: Arc::new(ThrowingDeniedHandler),
            entries: DashMap::new(),
        }
    }

    /// The compiled policy for the member at the checkpoint, or `None`
    /// when no policy governs it.
    ///
    /// The first caller for a never-before-seen key runs the full
    /// locate-compile-resolve sequence; concurrent callers for the same
    /// key block on that one initialization. The critical section never
    /// suspends, so it is safe under both execution disciplines.
    pub fn get_or_compile(
        &self,
        member: &MemberId,
        runtime_type: &str,
        checkpoint: Checkpoint,
    ) -> Result<Option<Arc<CompiledPolicy>>> {
        let cell = self
            .entries
            .entry((member.clone(), checkpoint))
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let entry = cell.get_or_init(|| self.resolve(member, runtime_type, checkpoint));

        match entry {
            CacheEntry::Absent => Ok(None),
            CacheEntry::Compiled(policy) => Ok(Some(policy.clone())),
            CacheEntry::Failed(err) => Err(err.clone()),
        }
    }

    /// The default denial handler shared by all policies without a
    /// handler reference.
    pub fn default_handler(&self) -> Arc<dyn DeniedHandler> {
        self.default_handler.clone()
    }

    /// How many members have been probed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no member has been probed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locate, compile, and resolve the handler for one member. Runs at
    /// most once per key.
    fn resolve(
        &self,
        member: &MemberId,
        runtime_type: &str,
        checkpoint: Checkpoint,
    ) -> CacheEntry {
        let declared = match self.locator.locate(member, runtime_type, checkpoint) {
            Ok(Some(declared)) => declared,
            Ok(None) => {
                debug!(member = %member, %checkpoint, "no policy declared; caching tombstone");
                return CacheEntry::Absent;
            }
            Err(err) => return CacheEntry::Failed(err),
        };

        let expression = match self.language.compile(&declared.expression) {
            Ok(expression) => expression,
            Err(source) => {
                return CacheEntry::Failed(AuthError::Parse {
                    member: member.clone(),
                    source,
                })
            }
        };

        let denied_handler = match &declared.handler {
            HandlerRef::Default => self.default_handler.clone(),
            HandlerRef::Named(handler_type) => match self.registry.resolve_single(handler_type) {
                Ok(handler) => handler,
                Err(err) => {
                    return CacheEntry::Failed(AuthError::Configuration(err.into()));
                }
            },
        };

        debug!(member = %member, %checkpoint, site = %declared.declared_on, "compiled policy");
        CacheEntry::Compiled(Arc::new(CompiledPolicy::new(
            member.clone(),
            checkpoint,
            declared.expression,
            expression,
            denied_handler,
        )))
    }
}
