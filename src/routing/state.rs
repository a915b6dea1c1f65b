//! Shared routing state
//!
//! Groups the mutable tables behind one context object so the dispatcher
//! (and tests) get an explicit, isolated instance instead of globals.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

use super::{HookRegistry, NavigationStack, PageStacks, ViewKey};

/// Serializes events addressed to the same view
type ViewGate = Arc<tokio::sync::Mutex<()>>;

/// Exclusive turn on one view, held across one whole event.
///
/// The gate leaves the table when the last turn ends and nobody is queued
/// behind it, so closing a view never splits its waiters across two gates.
pub struct ViewTurn<'a> {
    state: &'a RouterState,
    key: ViewKey,
    gate: ViewGate,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ViewTurn<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut gates = self.state.gates.lock();
        // Clones are only taken under this lock: the table and `self` are the last two
        let idle = gates
            .get(&self.key)
            .is_some_and(|gate| Arc::ptr_eq(gate, &self.gate))
            && Arc::strong_count(&self.gate) == 2;
        if idle {
            gates.remove(&self.key);
        }
    }
}

impl std::fmt::Debug for ViewTurn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewTurn").field("key", &self.key).finish()
    }
}

#[derive(Debug)]
pub struct RouterState {
    pub hooks: HookRegistry,
    pub navigation: NavigationStack,
    pub pages: PageStacks,
    gates: Mutex<HashMap<ViewKey, ViewGate>>,
}

impl RouterState {
    pub fn new(hook_id_bytes: usize) -> Self {
        Self {
            hooks: HookRegistry::new(hook_id_bytes),
            navigation: NavigationStack::new(),
            pages: PageStacks::new(),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for this view's turn. Events on other views are not affected.
    pub async fn enter(&self, key: ViewKey) -> ViewTurn<'_> {
        let gate = self.gates.lock().entry(key).or_default().clone();
        let guard = gate.clone().lock_owned().await;
        ViewTurn {
            state: self,
            key,
            gate,
            guard: Some(guard),
        }
    }

    /// Release everything the view holds: history, page controllers and
    /// owned hooks. Returns the number of hooks released.
    pub fn close_view(&self, key: ViewKey) -> usize {
        self.navigation.clear(key);
        self.pages.remove_stack(key);
        let released = self.hooks.release_view(key);
        tracing::debug!(%key, released_hooks = released, "view state released");
        released
    }

    /// Number of views with an event in progress or queued
    pub fn open_gates(&self) -> usize {
        self.gates.lock().len()
    }

    /// Periodically evict hooks older than `ttl`.
    ///
    /// The task holds only a weak reference and stops once the state is
    /// dropped. Returns `None` when `ttl` cannot be represented.
    pub fn spawn_hook_sweeper(
        self: &Arc<Self>,
        ttl: Duration,
        every: Duration,
    ) -> Option<tokio::task::JoinHandle<()>> {
        let Ok(max_age) = chrono::Duration::from_std(ttl) else {
            tracing::warn!(?ttl, "hook ttl out of range, sweeper disabled");
            return None;
        };
        let weak = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let evicted = state.hooks.evict_older_than(max_age);
                if evicted > 0 {
                    tracing::info!(evicted, remaining = state.hooks.len(), "expired hooks evicted");
                }
            }
        }))
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new(super::hooks::DEFAULT_ID_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{hook_fn, Route};

    #[test]
    fn test_close_view_releases_all_tables() {
        let state = RouterState::default();
        let key = ViewKey::new(3, 9);
        let other = ViewKey::new(3, 10);

        state.navigation.push(key, &Route::new("a"));
        state.navigation.push(other, &Route::new("b"));
        state.pages.create_page(key, 5, 2, None).unwrap();
        state
            .hooks
            .register_for(key, hook_fn(|_, _| async { anyhow::Ok(()) }));

        assert_eq!(state.close_view(key), 1);
        assert_eq!(state.navigation.depth(key), 0);
        assert_eq!(state.pages.depth(key), 0);
        assert!(state.hooks.is_empty());
        assert_eq!(state.navigation.depth(other), 1);
    }

    #[tokio::test]
    async fn test_turns_are_exclusive_per_view() {
        let state = RouterState::default();
        let key = ViewKey::new(1, 1);
        let turn = state.enter(key).await;

        let blocked = tokio::time::timeout(Duration::from_millis(20), state.enter(key)).await;
        assert!(blocked.is_err());
        // Other views are independent
        let other = state.enter(ViewKey::new(1, 2)).await;
        assert_eq!(state.open_gates(), 2);

        drop(other);
        drop(turn);
        assert_eq!(state.open_gates(), 0);
    }

    #[tokio::test]
    async fn test_close_view_keeps_gate_until_turn_ends() {
        let state = Arc::new(RouterState::default());
        let key = ViewKey::new(1, 1);
        let turn = state.enter(key).await;

        let waiter = tokio::spawn({
            let state = state.clone();
            async move {
                let _turn = state.enter(key).await;
            }
        });
        // Closing from inside the running event must not hand out a second gate
        state.close_view(key);
        assert_eq!(state.open_gates(), 1);
        let blocked = tokio::time::timeout(Duration::from_millis(20), state.enter(key)).await;
        assert!(blocked.is_err());
        assert!(!waiter.is_finished());

        drop(turn);
        waiter.await.unwrap();
        assert_eq!(state.open_gates(), 0);
        let _again = state.enter(key).await;
    }

    #[tokio::test]
    async fn test_sweeper_evicts_old_hooks_and_stops_with_state() {
        let state = Arc::new(RouterState::default());
        state
            .hooks
            .register(hook_fn(|_, _| async { anyhow::Ok(()) }));

        let sweeper = state
            .spawn_hook_sweeper(Duration::from_millis(1), Duration::from_millis(10))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(state.hooks.is_empty());

        drop(state);
        tokio::time::timeout(Duration::from_secs(1), sweeper)
            .await
            .unwrap()
            .unwrap();
    }
}
