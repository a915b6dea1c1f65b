//! Dynamically bound button actions
//!
//! A hook is an action created while rendering a view, addressed by a short
//! random id carried in a `t=hook` route. Hooks close over arbitrary state,
//! so they live server-side; only the id travels in the button payload.
//!
//! There is no implicit cleanup. A hook stays registered until the view that
//! created it unregisters it (directly, or by owning it through
//! [`HookRegistry::register_for`] and being closed). An opt-in age sweep is
//! available for deployments that prefer bounded memory over stale buttons.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::future::Future;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use super::{CallbackContext, Route, RoutingError, ViewKey};

/// Default id length in random bytes (16 hex chars on the wire)
pub const DEFAULT_ID_BYTES: usize = 8;

/// Action bound to a rendered button
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`Hook`]
pub struct FnHook<F>(F);

#[async_trait]
impl<F, Fut> Hook for FnHook<F>
where
    F: Fn(Route, CallbackContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn call(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        (self.0)(route.clone(), ctx.clone()).await
    }
}

/// Wrap an async closure as a hook
pub fn hook_fn<F, Fut>(f: F) -> FnHook<F>
where
    F: Fn(Route, CallbackContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnHook(f)
}

struct HookEntry {
    created_at: DateTime<Utc>,
    owner: Option<ViewKey>,
    handler: Arc<dyn Hook>,
}

/// Process-wide table of hooks keyed by id
pub struct HookRegistry {
    id_bytes: usize,
    hooks: Mutex<HashMap<String, HookEntry>>,
}

impl HookRegistry {
    pub fn new(id_bytes: usize) -> Self {
        Self {
            id_bytes: id_bytes.max(1),
            hooks: Mutex::new(HashMap::new()),
        }
    }

    fn hooks(&self) -> MutexGuard<'_, HashMap<String, HookEntry>> {
        self.hooks.lock()
    }

    fn generate_id(&self) -> String {
        let mut buf = vec![0u8; self.id_bytes];
        rand::thread_rng().fill_bytes(&mut buf);
        hex::encode(buf)
    }

    fn insert(&self, owner: Option<ViewKey>, handler: Arc<dyn Hook>) -> String {
        let mut hooks = self.hooks();
        // Re-roll on the (astronomically rare) collision while holding the lock
        let id = loop {
            let id = self.generate_id();
            if !hooks.contains_key(&id) {
                break id;
            }
        };
        hooks.insert(
            id.clone(),
            HookEntry {
                created_at: Utc::now(),
                owner,
                handler,
            },
        );
        tracing::trace!(hook_id = %id, owner = ?owner, "hook registered");
        id
    }

    /// Register a hook the caller will unregister explicitly
    pub fn register(&self, handler: impl Hook + 'static) -> String {
        self.insert(None, Arc::new(handler))
    }

    /// Register a hook released together with `owner`'s view
    pub fn register_for(&self, owner: ViewKey, handler: impl Hook + 'static) -> String {
        self.insert(Some(owner), Arc::new(handler))
    }

    /// Attach an already registered hook to a view.
    ///
    /// Needed when the hook was created before the hosting message existed.
    /// Returns false for unknown ids.
    pub fn adopt(&self, id: &str, owner: ViewKey) -> bool {
        match self.hooks().get_mut(id) {
            Some(entry) => {
                entry.owner = Some(owner);
                true
            }
            None => false,
        }
    }

    /// Remove a hook. Unknown ids are ignored.
    pub fn unregister(&self, id: &str) {
        if self.hooks().remove(id).is_some() {
            tracing::trace!(hook_id = %id, "hook unregistered");
        }
    }

    pub fn lookup(&self, id: &str) -> Result<Arc<dyn Hook>, RoutingError> {
        self.hooks()
            .get(id)
            .map(|entry| entry.handler.clone())
            .ok_or_else(|| RoutingError::UnknownHook { id: id.to_string() })
    }

    pub fn created_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.hooks().get(id).map(|entry| entry.created_at)
    }

    /// Drop every hook owned by the view, returning how many were removed
    pub fn release_view(&self, owner: ViewKey) -> usize {
        let mut hooks = self.hooks();
        let before = hooks.len();
        hooks.retain(|_, entry| entry.owner != Some(owner));
        before - hooks.len()
    }

    /// Drop hooks created before `cutoff`
    pub fn evict_created_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut hooks = self.hooks();
        let before = hooks.len();
        hooks.retain(|_, entry| entry.created_at >= cutoff);
        before - hooks.len()
    }

    /// Drop hooks older than `max_age`
    pub fn evict_older_than(&self, max_age: chrono::Duration) -> usize {
        self.evict_created_before(Utc::now() - max_age)
    }

    pub fn len(&self) -> usize {
        self.hooks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ID_BYTES)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("id_bytes", &self.id_bytes)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn noop() -> impl Hook {
        hook_fn(|_, _| async { anyhow::Ok(()) })
    }

    #[test]
    fn test_ten_thousand_distinct_ids() {
        let registry = HookRegistry::default();
        let ids: HashSet<String> = (0..10_000).map(|_| registry.register(noop())).collect();
        assert_eq!(ids.len(), 10_000);
        assert_eq!(registry.len(), 10_000);
        assert!(ids.iter().all(|id| id.len() == 16));
    }

    #[test]
    fn test_unregister_then_lookup() {
        let registry = HookRegistry::default();
        let id = registry.register(noop());
        assert!(registry.lookup(&id).is_ok());

        registry.unregister(&id);
        assert!(matches!(
            registry.lookup(&id),
            Err(RoutingError::UnknownHook { id: missing }) if missing == id
        ));

        // Second unregister is a no-op
        registry.unregister(&id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_view_only_drops_owned_hooks() {
        let registry = HookRegistry::default();
        let view = ViewKey::new(1, 10);
        let other = ViewKey::new(1, 11);

        let owned = registry.register_for(view, noop());
        let adopted = registry.register(noop());
        assert!(registry.adopt(&adopted, view));
        let foreign = registry.register_for(other, noop());
        let free = registry.register(noop());

        assert_eq!(registry.release_view(view), 2);
        assert!(registry.lookup(&owned).is_err());
        assert!(registry.lookup(&adopted).is_err());
        assert!(registry.lookup(&foreign).is_ok());
        assert!(registry.lookup(&free).is_ok());
        assert!(!registry.adopt("missing", view));
    }

    #[test]
    fn test_eviction_by_age() {
        let registry = HookRegistry::default();
        let id = registry.register(noop());
        let created = registry.created_at(&id).unwrap();

        assert_eq!(registry.evict_created_before(created), 0);
        assert_eq!(registry.evict_older_than(chrono::Duration::hours(1)), 0);
        assert_eq!(
            registry.evict_created_before(created + chrono::Duration::seconds(1)),
            1
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_custom_id_length() {
        let registry = HookRegistry::new(4);
        assert_eq!(registry.register(noop()).len(), 8);
    }
}
