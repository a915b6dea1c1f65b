//! Callback dispatcher
//!
//! Single entry point for button clicks. For every [`CallbackEvent`]:
//!
//! ```text
//! acknowledge → no-op? → decode → hook?  ──────────────→ Hook::call
//!                                   └→ back / push (NavigationStack::advance)
//!                                        → ComponentRegistry → Component::handle
//! ```
//!
//! A malformed token, an unknown hook id or a navigation stack too shallow
//! to go back all mean the view outlived its state (restart, closed view,
//! stale client). Those clicks delete the message and release whatever
//! state is left for it. Clicks for unregistered component types are
//! dropped without any visible effect. A handler failing because the
//! clicked message no longer exists releases the view's state the same way.
//! Every other error, transport failures included, is returned to the
//! caller.

use std::sync::Arc;

use super::components::ComponentRegistry;
use super::hooks::Hook;
use super::route::HOOK_ID_ARG;
use super::{Route, RouterState, RoutingError, ViewKey};
use crate::config::RoutingConfig;
use crate::transport::{is_message_gone, CallbackEvent, MessageRef, Target, Transport, UserId};

/// Outcome of one dispatched click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No-op button; acknowledged only
    Skipped,
    /// A registered hook ran
    Hook,
    /// The component registered for `kind` handled the click
    Handled { kind: String },
    /// No component is registered for `kind`; nothing happened
    Ignored { kind: String },
    /// The view's state was gone; its message was deleted
    Stale(RoutingError),
    /// The clicked message no longer exists; its state was released
    Gone,
}

/// Everything a hook or component needs to react to a click
#[derive(Clone)]
pub struct CallbackContext {
    pub dispatcher: Dispatcher,
    /// Message hosting the clicked button
    pub message: MessageRef,
    pub from: UserId,
}

impl CallbackContext {
    pub fn key(&self) -> ViewKey {
        self.message.key()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.dispatcher.transport()
    }

    pub fn state(&self) -> &RouterState {
        self.dispatcher.state()
    }
}

enum Resolved {
    Hook(Route, Arc<dyn Hook>),
    Component(Route),
}

/// Routes clicks to hooks and components. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<RouterState>,
    components: Arc<ComponentRegistry>,
    transport: Arc<dyn Transport>,
    config: Arc<RoutingConfig>,
}

impl Dispatcher {
    pub fn new(
        state: Arc<RouterState>,
        components: ComponentRegistry,
        transport: Arc<dyn Transport>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            state,
            components: Arc::new(components),
            transport,
            config: Arc::new(config),
        }
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Handle one button click
    #[tracing::instrument(
        name = "dispatch",
        skip_all,
        fields(chat_id = event.message.chat_id, message_id = event.message.message_id)
    )]
    pub async fn dispatch(&self, event: CallbackEvent) -> anyhow::Result<Dispatch> {
        // Always acknowledge, whatever happens next
        self.transport.answer_callback(&event.id).await?;

        if event.data == self.config.noop_token {
            return Ok(Dispatch::Skipped);
        }

        let key = event.message.key();
        let _turn = self.state.enter(key).await;

        let ctx = CallbackContext {
            dispatcher: self.clone(),
            message: event.message,
            from: event.from,
        };

        let outcome = match self.resolve(&event.data, key) {
            Ok(Resolved::Hook(route, hook)) => {
                tracing::debug!(hook_id = route.arg(HOOK_ID_ARG), "running hook");
                hook.call(&route, &ctx).await.map(|()| Dispatch::Hook)
            }
            Ok(Resolved::Component(route)) => self.handle_component(route, &ctx).await,
            Err(err) => return self.discard_stale(event.message, err).await,
        };

        match outcome {
            Err(err) if is_message_gone(&err, event.message) => {
                tracing::warn!(error = %err, "message is gone, releasing view state");
                self.state.close_view(key);
                Ok(Dispatch::Gone)
            }
            outcome => outcome,
        }
    }

    fn resolve(&self, data: &str, key: ViewKey) -> Result<Resolved, RoutingError> {
        let route = Route::decode(data)?;

        if route.is_hook() {
            let id = route.arg(HOOK_ID_ARG).unwrap_or_default();
            let hook = self.state.hooks.lookup(id)?;
            return Ok(Resolved::Hook(route, hook));
        }

        let route = self
            .state
            .navigation
            .advance(key, route, &self.state.pages)?;
        Ok(Resolved::Component(route))
    }

    async fn handle_component(
        &self,
        route: Route,
        ctx: &CallbackContext,
    ) -> anyhow::Result<Dispatch> {
        let Some(component) = self.components.get(&route.kind) else {
            // Stray or late clicks for unknown types are tolerated
            tracing::debug!(route = %route, "no component registered, ignoring");
            return Ok(Dispatch::Ignored { kind: route.kind });
        };
        tracing::debug!(route = %route, "handling");
        component.handle(&route, ctx).await?;
        Ok(Dispatch::Handled { kind: route.kind })
    }

    async fn discard_stale(
        &self,
        message: MessageRef,
        err: RoutingError,
    ) -> anyhow::Result<Dispatch> {
        tracing::warn!(error = %err, "view state is gone, deleting message");
        self.state.close_view(message.key());
        match self.transport.delete_message(message).await {
            Ok(()) => {}
            Err(gone) if is_message_gone(&gone, message) => {
                tracing::debug!("message already deleted");
            }
            Err(other) => return Err(other),
        }
        Ok(Dispatch::Stale(err))
    }

    /// Originate a new view for `route` at `target`.
    ///
    /// Returns whether the component created a message. The route becomes
    /// the first history entry of that message unless it is meta.
    pub async fn send_component(&self, route: &Route, target: &Target) -> anyhow::Result<bool> {
        let Some(component) = self.components.get(&route.kind) else {
            tracing::debug!(route = %route, "no component registered, nothing sent");
            return Ok(false);
        };
        match component.initialize(route, target, self).await? {
            Some(message) => {
                self.state.navigation.push(message.key(), route);
                tracing::debug!(route = %route, %message, "view created");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show `route` on an existing view from code (not from a click).
    ///
    /// Pushes the route unless it is meta, then lets its component handle
    /// it. Returns false when no component is registered for the route.
    /// Safe to call from hooks and components: it does not take the view's
    /// turn lock.
    pub async fn navigate_to(
        &self,
        route: &Route,
        message: MessageRef,
        from: UserId,
    ) -> anyhow::Result<bool> {
        let Some(component) = self.components.get(&route.kind) else {
            return Ok(false);
        };
        self.state.navigation.push(message.key(), route);
        let ctx = CallbackContext {
            dispatcher: self.clone(),
            message,
            from,
        };
        component.handle(route, &ctx).await?;
        Ok(true)
    }

    /// Release every piece of state held for the view
    pub fn close_view(&self, key: ViewKey) -> usize {
        self.state.close_view(key)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state)
            .field("components", &self.components)
            .field("config", &self.config)
            .finish()
    }
}
