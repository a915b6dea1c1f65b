//! Messaging platform contract
//!
//! The routing core never talks to a network itself. Whatever receives
//! platform updates implements [`Transport`] and feeds callback clicks into
//! the dispatcher as [`CallbackEvent`]s.

use async_trait::async_trait;
use std::fmt;

use crate::routing::{Route, ViewKey};

pub mod memory;

pub use memory::{MemoryTransport, SentMessage, TransportCall};

/// Address of a sent message
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

impl MessageRef {
    pub const fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }

    /// Routing state key of the view hosted by this message
    pub fn key(&self) -> ViewKey {
        ViewKey::new(self.chat_id, self.message_id)
    }
}

impl From<MessageRef> for ViewKey {
    fn from(msg: MessageRef) -> Self {
        msg.key()
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}

/// Where a new view is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub chat_id: i64,
    /// Forum topic, when the chat has them
    pub thread_id: Option<i32>,
}

impl Target {
    pub const fn chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            thread_id: None,
        }
    }
}

/// User who triggered an event
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A click on an inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Platform id used to acknowledge the click
    pub id: String,
    /// Raw button payload
    pub data: String,
    /// Message hosting the clicked button
    pub message: MessageRef,
    pub from: UserId,
}

/// Inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    /// Callback payload sent back when clicked
    pub payload: String,
}

impl Button {
    pub fn new(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payload: payload.into(),
        }
    }

    /// Button carrying an encoded route
    pub fn route(text: impl Into<String>, route: &Route) -> Self {
        Self::new(text, route.encode())
    }
}

/// The addressed message no longer exists on the platform.
///
/// Transports return it (possibly wrapped in context) so the dispatcher can
/// tell a deleted view apart from a real delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("message {0} not found")]
pub struct MessageGone(pub MessageRef);

/// Whether `err` reports that `message` is gone
pub fn is_message_gone(err: &anyhow::Error, message: MessageRef) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<MessageGone>())
        .any(|gone| gone.0 == message)
}

/// Rows of inline buttons
pub type Keyboard = Vec<Vec<Button>>;

/// Outbound messaging operations
#[async_trait]
pub trait Transport: Send + Sync {
    /// Acknowledge a callback click (stops the client's loading spinner)
    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()>;

    async fn send_message(
        &self,
        target: &Target,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<MessageRef>;

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()>;

    async fn edit_keyboard(
        &self,
        message: MessageRef,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()>;

    async fn delete_message(&self, message: MessageRef) -> anyhow::Result<()>;
}
