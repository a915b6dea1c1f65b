//! Button construction helpers
//!
//! Every button produced here carries an encoded route. Tokens longer than
//! the configured payload limit are still produced (the platform is the
//! final judge) but logged, since they usually mean too many route args.

use super::hooks::Hook;
use super::route::HOOK_ID_ARG;
use super::{Args, Dispatcher, Route, ViewKey};
use crate::transport::{Button, Keyboard};

/// Button bound to a freshly registered hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookButton {
    pub button: Button,
    /// Id to pass to [`super::HookRegistry::unregister`] once the button is gone
    pub hook_id: String,
}

impl Dispatcher {
    /// Button carrying `route`
    pub fn button(&self, text: impl Into<String>, route: &Route) -> Button {
        let button = Button::route(text, route);
        let limit = self.config().max_payload_bytes;
        if button.payload.len() > limit {
            tracing::warn!(
                route = %route,
                bytes = button.payload.len(),
                limit,
                "route token exceeds payload limit"
            );
        }
        button
    }

    /// Inert button (spacer or label)
    pub fn noop_button(&self, text: impl Into<String>) -> Button {
        Button::new(text, self.config().noop_token.clone())
    }

    /// Button returning to the previous route of the same view
    pub fn back_button(&self, title: impl Into<String>, remove_page: bool) -> Button {
        self.button(title, &Route::back(remove_page))
    }

    /// Button closing the view
    pub fn close_button(&self, title: impl Into<String>) -> Button {
        self.button(title, &Route::close())
    }

    /// Trailing row with back (when there is history) and close buttons
    pub fn back_and_close_rows(
        &self,
        key: ViewKey,
        back_title: impl Into<String>,
        remove_page: bool,
        close_title: impl Into<String>,
    ) -> Keyboard {
        let mut row = Vec::with_capacity(2);
        if self.state().navigation.can_go_back(key) {
            row.push(self.back_button(back_title, remove_page));
        }
        row.push(self.close_button(close_title));
        vec![row]
    }

    /// Register `hook` and return a button invoking it.
    ///
    /// With an `owner`, the hook is released when that view closes;
    /// otherwise the caller unregisters `hook_id` itself. `extra` args are
    /// carried in the token and visible to the hook as route args.
    pub fn hook_button(
        &self,
        title: impl Into<String>,
        owner: Option<ViewKey>,
        hook: impl Hook + 'static,
        extra: Args,
    ) -> HookButton {
        let hooks = &self.state().hooks;
        let hook_id = match owner {
            Some(key) => hooks.register_for(key, hook),
            None => hooks.register(hook),
        };
        let mut route = Route::hook(hook_id.clone());
        for (key, value) in extra {
            // Reserved args stay under our control
            if key != HOOK_ID_ARG {
                route.args.insert(key, value);
            }
        }
        HookButton {
            button: self.button(title, &route),
            hook_id,
        }
    }
}
