//! In-memory transport
//!
//! Keeps sent messages in a map and records every call in order. Backs the
//! console demo and the dispatcher tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicI32, Ordering};
use parking_lot::Mutex;

use super::{Keyboard, MessageGone, MessageRef, Target, Transport};

/// Current content of a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl SentMessage {
    /// Find a button by its label
    pub fn button(&self, text: &str) -> Option<&super::Button> {
        self.keyboard
            .iter()
            .flatten()
            .flatten()
            .find(|button| button.text == text)
    }

    /// Buttons in reading order
    pub fn buttons(&self) -> Vec<&super::Button> {
        self.keyboard.iter().flatten().flatten().collect()
    }
}

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Answer(String),
    Send(MessageRef),
    Edit(MessageRef),
    EditKeyboard(MessageRef),
    Delete(MessageRef),
}

#[derive(Debug)]
pub struct MemoryTransport {
    next_message_id: AtomicI32,
    messages: Mutex<BTreeMap<MessageRef, SentMessage>>,
    calls: Mutex<Vec<TransportCall>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI32::new(1),
            messages: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().push(call);
    }

    pub fn message(&self, message: MessageRef) -> Option<SentMessage> {
        self.messages.lock().get(&message).cloned()
    }

    /// Messages still present, oldest first
    pub fn messages_in(&self, chat_id: i64) -> Vec<(MessageRef, SentMessage)> {
        self.messages
            .lock()
            .iter()
            .filter(|(msg, _)| msg.chat_id == chat_id)
            .map(|(msg, sent)| (*msg, sent.clone()))
            .collect()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    /// Number of acknowledged callbacks
    pub fn answered(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Answer(_)))
            .count()
    }

    /// Render a message as plain text, numbering buttons in reading order
    pub fn render(&self, message: MessageRef) -> Option<String> {
        let sent = self.message(message)?;
        let mut out = format!("[{}] {}\n", message, sent.text);
        let mut index = 0;
        for row in sent.keyboard.iter().flatten() {
            let labels: Vec<String> = row
                .iter()
                .map(|button| {
                    index += 1;
                    format!("{}:{}", index, button.text)
                })
                .collect();
            let _ = writeln!(out, "  {}", labels.join("  "));
        }
        Some(out)
    }

    fn update(&self, message: MessageRef, f: impl FnOnce(&mut SentMessage)) -> anyhow::Result<()> {
        let mut messages = self.messages.lock();
        let sent = messages.get_mut(&message).ok_or(MessageGone(message))?;
        f(sent);
        Ok(())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()> {
        self.record(TransportCall::Answer(callback_id.to_string()));
        Ok(())
    }

    async fn send_message(
        &self,
        target: &Target,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<MessageRef> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        let message = MessageRef::new(target.chat_id, message_id);
        self.messages.lock().insert(
            message,
            SentMessage {
                text: text.to_string(),
                keyboard: keyboard.cloned(),
            },
        );
        self.record(TransportCall::Send(message));
        Ok(message)
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()> {
        self.update(message, |sent| {
            sent.text = text.to_string();
            sent.keyboard = keyboard.cloned();
        })?;
        self.record(TransportCall::Edit(message));
        Ok(())
    }

    async fn edit_keyboard(
        &self,
        message: MessageRef,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()> {
        self.update(message, |sent| sent.keyboard = keyboard.cloned())?;
        self.record(TransportCall::EditKeyboard(message));
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> anyhow::Result<()> {
        self.messages
            .lock()
            .remove(&message)
            .ok_or(MessageGone(message))?;
        self.record(TransportCall::Delete(message));
        Ok(())
    }
}
