//! Per-view back history
//!
//! Each view keeps a stack of encoded routes; the top entry is the route
//! currently displayed. Going back pops two levels: the current route, then
//! the one before it, which is returned and re-pushed by the dispatcher once
//! it is displayed again. Meta routes (paging, hooks, close) never enter
//! history.

use std::collections::HashMap;
use parking_lot::{Mutex, MutexGuard};

use super::{PageStacks, Route, RoutingError, ViewKey};

type Stacks = HashMap<ViewKey, Vec<String>>;

#[derive(Debug, Default)]
pub struct NavigationStack {
    stacks: Mutex<Stacks>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn stacks(&self) -> MutexGuard<'_, Stacks> {
        self.stacks.lock()
    }

    fn push_locked(stacks: &mut Stacks, key: ViewKey, route: &Route) -> bool {
        if route.is_meta() {
            return false;
        }
        stacks.entry(key).or_default().push(route.encode());
        true
    }

    fn pop_locked(
        stacks: &mut Stacks,
        key: ViewKey,
        remove_page: bool,
        pages: &PageStacks,
    ) -> Result<Route, RoutingError> {
        let depth = stacks.get(&key).map_or(0, Vec::len);
        if depth < 2 {
            return Err(RoutingError::StaleNavigationState { depth });
        }
        let stack = stacks
            .get_mut(&key)
            .ok_or(RoutingError::StaleNavigationState { depth })?;
        stack.pop();
        let previous = stack
            .pop()
            .ok_or(RoutingError::StaleNavigationState { depth })?;
        if stack.is_empty() {
            stacks.remove(&key);
        }
        if remove_page {
            pages.pop(key);
        }
        Route::decode(&previous)
    }

    /// Record `route` as the view's current route. Meta routes are skipped;
    /// the return value says whether anything was pushed.
    pub fn push(&self, key: ViewKey, route: &Route) -> bool {
        Self::push_locked(&mut self.stacks(), key, route)
    }

    /// Route active before the current one.
    ///
    /// Pops the current top and the entry below it, returning the latter.
    /// With `remove_page`, the view's top page controller is discarded as
    /// well. Fails without touching anything when fewer than two entries
    /// exist.
    pub fn pop_to_previous(
        &self,
        key: ViewKey,
        remove_page: bool,
        pages: &PageStacks,
    ) -> Result<Route, RoutingError> {
        Self::pop_locked(&mut self.stacks(), key, remove_page, pages)
    }

    /// Resolve a clicked route against history in one critical section:
    /// a back sentinel is replaced by the previous route, then the
    /// resulting route is pushed unless it is meta.
    pub fn advance(
        &self,
        key: ViewKey,
        route: Route,
        pages: &PageStacks,
    ) -> Result<Route, RoutingError> {
        let mut stacks = self.stacks();
        let route = if route.is_back() {
            let remove_page = route.remove_page();
            Self::pop_locked(&mut stacks, key, remove_page, pages)?
        } else {
            route
        };
        Self::push_locked(&mut stacks, key, &route);
        Ok(route)
    }

    /// Currently displayed route, if any
    pub fn peek(&self, key: ViewKey) -> Option<Route> {
        let token = self.stacks().get(&key)?.last()?.clone();
        Route::decode(&token).ok()
    }

    pub fn depth(&self, key: ViewKey) -> usize {
        self.stacks().get(&key).map_or(0, Vec::len)
    }

    /// Whether a back button would lead anywhere
    pub fn can_go_back(&self, key: ViewKey) -> bool {
        self.depth(key) > 1
    }

    /// Forget the view's history (the view was closed)
    pub fn clear(&self, key: ViewKey) {
        self.stacks().remove(&key);
    }

    /// Number of views with history
    pub fn len(&self) -> usize {
        self.stacks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
