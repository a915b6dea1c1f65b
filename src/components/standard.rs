//! Built-in `standard` component
//!
//! Handles routes every view can use regardless of which component drew it.
//! Today that is `/close`: delete the view's message and drop all state the
//! router holds for it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::messages::MessageRouter;
use crate::routing::route::CLOSE_PATH;
use crate::routing::{CallbackContext, Component, Route};

/// Component registered under [`crate::routing::route::STANDARD_KIND`]
#[derive(Debug, Default, Clone)]
pub struct StandardComponent {
    messages: Option<Arc<MessageRouter>>,
}

impl StandardComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also drop the clicking user's pending message hook on close, so a
    /// form closed mid-way stops capturing their text
    pub fn with_messages(messages: Arc<MessageRouter>) -> Self {
        Self {
            messages: Some(messages),
        }
    }

    async fn close(&self, ctx: &CallbackContext) -> anyhow::Result<()> {
        ctx.dispatcher.close_view(ctx.key());
        if let Some(messages) = &self.messages {
            messages.unregister_hook(ctx.message.chat_id, ctx.from);
        }
        ctx.transport().delete_message(ctx.message).await?;
        tracing::debug!(message = %ctx.message, "view closed");
        Ok(())
    }
}

#[async_trait]
impl Component for StandardComponent {
    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        match route.path() {
            CLOSE_PATH => self.close(ctx).await,
            other => anyhow::bail!("standard component has no path {other:?}"),
        }
    }
}
