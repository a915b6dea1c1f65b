//! Named view components
//!
//! A component owns one family of views (a calendar year grid, a catalog
//! page, ...) and is addressed by the `t=` tag of a route. Components are
//! registered once at startup; the registry is frozen afterwards and read
//! concurrently without locking.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{CallbackContext, Dispatcher, Route};
use crate::transport::{MessageRef, Target};

/// Contract implemented by every routable component
#[async_trait]
pub trait Component: Send + Sync {
    /// Originate a new view at `target`.
    ///
    /// Returns the created message, or `None` when the component only
    /// reacts to clicks on existing views.
    async fn initialize(
        &self,
        _route: &Route,
        _target: &Target,
        _dispatcher: &Dispatcher,
    ) -> anyhow::Result<Option<MessageRef>> {
        Ok(None)
    }

    /// Process a click against an existing view
    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()>;
}

/// Immutable map from type tag to component
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    pub fn builder() -> ComponentRegistryBuilder {
        ComponentRegistryBuilder::default()
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Component>> {
        self.components.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.components.contains_key(kind)
    }

    /// Registered type tags, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

/// Startup-time registration of components
#[derive(Default)]
pub struct ComponentRegistryBuilder {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistryBuilder {
    /// Register `component` under `name`. A second registration under the
    /// same name replaces the first.
    pub fn register(mut self, name: impl Into<String>, component: impl Component + 'static) -> Self {
        let name = name.into();
        if self
            .components
            .insert(name.clone(), Arc::new(component))
            .is_some()
        {
            tracing::warn!(component = %name, "component registered twice, keeping the last one");
        }
        self
    }

    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            components: self.components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    #[async_trait]
    impl Component for Nothing {
        async fn handle(&self, _route: &Route, _ctx: &CallbackContext) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_registers_by_name() {
        let registry = ComponentRegistry::builder()
            .register("years", Nothing)
            .register("months", Nothing)
            .build();

        assert_eq!(registry.names(), vec!["months", "years"]);
        assert!(registry.contains("years"));
        assert!(registry.get("days").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let registry = ComponentRegistry::builder()
            .register("a", Nothing)
            .register("a", Nothing)
            .build();
        assert_eq!(registry.len(), 1);
    }
}
