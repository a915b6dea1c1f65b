//! Callback routing middleware
//!
//! Every inline button carries a short route token. When a button is
//! clicked, the [`Dispatcher`] decodes the token and hands it to either a
//! dynamically registered hook or a named component, keeping per-view
//! navigation history and pagination cursors along the way.
//!
//! # Architecture
//!
//! ```text
//! CallbackEvent → Dispatcher ─┬→ HookRegistry   (t=hook, by id)
//!                             └→ NavigationStack → ComponentRegistry
//!                                   (back / push)     (by type tag)
//! ```
//!
//! All mutable state lives in one [`RouterState`] shared through `Arc`.
//! Nothing expires on its own: whatever closes a view releases its state
//! through [`Dispatcher::close_view`].

use std::fmt;

pub mod buttons;
pub mod components;
pub mod dispatcher;
mod error;
pub mod hooks;
pub mod navigation;
pub mod pages;
pub mod route;
pub mod state;

pub use buttons::HookButton;
pub use components::{Component, ComponentRegistry, ComponentRegistryBuilder};
pub use dispatcher::{CallbackContext, Dispatch, Dispatcher};
pub use error::RoutingError;
pub use hooks::{hook_fn, Hook, HookRegistry};
pub use navigation::NavigationStack;
pub use pages::{lock_page, PageController, PageStacks, SharedPage};
pub use route::{Args, Route};
pub use state::RouterState;

/// Identity of a rendered view: the message hosting the buttons
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ViewKey {
    pub chat_id: i64,
    pub message_id: i32,
}

impl ViewKey {
    pub const fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}
