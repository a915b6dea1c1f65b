//! Plain text message routing
//!
//! Text messages are routed in priority order:
//!
//! 1. a message hook registered for the (chat, user) pair, e.g. a form
//!    waiting for the user's next answer
//! 2. a `/command` handler, by lowercase command name
//! 3. a reply-keyboard button handler, by exact button text
//!
//! Commands and reply buttons are fixed at startup. Message hooks come and
//! go at runtime and stay in place until explicitly unregistered.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::future::Future;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use crate::routing::Dispatcher;
use crate::transport::{MessageRef, Target, UserId};

/// An incoming text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message: MessageRef,
    pub thread_id: Option<i32>,
    pub from: UserId,
    pub text: String,
}

impl IncomingMessage {
    /// Where replies to this message go
    pub fn target(&self) -> Target {
        Target {
            chat_id: self.message.chat_id,
            thread_id: self.thread_id,
        }
    }
}

/// A `/command arg1 arg2` message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercase command name without the leading slash
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Recognize a command. `/Start@my_bot now` parses as `start` with
    /// args `["now"]`.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            args: parts.map(str::to_string).collect(),
        })
    }
}

/// What a handler gets to work with
#[derive(Clone)]
pub struct MessageContext {
    pub dispatcher: Dispatcher,
    pub router: Arc<MessageRouter>,
    pub message: IncomingMessage,
}

/// Handler for commands, reply buttons and message hooks
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, ctx: &MessageContext) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`MessageHandler`]
pub struct FnMessageHandler<F>(F);

#[async_trait]
impl<F, Fut> MessageHandler for FnMessageHandler<F>
where
    F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: &MessageContext) -> anyhow::Result<()> {
        (self.0)(ctx.clone()).await
    }
}

/// Wrap an async closure as a message handler
pub fn message_fn<F, Fut>(f: F) -> FnMessageHandler<F>
where
    F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnMessageHandler(f)
}

/// How a message was routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Hook,
    Command(String),
    ReplyButton(String),
    Unhandled,
}

type HookKey = (i64, UserId);

pub struct MessageRouter {
    commands: HashMap<String, Arc<dyn MessageHandler>>,
    reply_buttons: IndexMap<String, Arc<dyn MessageHandler>>,
    hooks: Mutex<HashMap<HookKey, Arc<dyn MessageHandler>>>,
}

impl MessageRouter {
    pub fn builder() -> MessageRouterBuilder {
        MessageRouterBuilder::default()
    }

    fn hooks(&self) -> MutexGuard<'_, HashMap<HookKey, Arc<dyn MessageHandler>>> {
        self.hooks.lock()
    }

    /// Route `message` to the first matching handler
    pub async fn handle(
        self: &Arc<Self>,
        message: IncomingMessage,
        dispatcher: &Dispatcher,
    ) -> anyhow::Result<Routed> {
        let hook = self
            .hooks()
            .get(&(message.message.chat_id, message.from))
            .cloned();

        let (handler, routed) = if let Some(hook) = hook {
            (hook, Routed::Hook)
        } else if let Some((handler, name)) = Command::parse(&message.text)
            .and_then(|cmd| Some((self.commands.get(&cmd.name)?.clone(), cmd.name)))
        {
            (handler, Routed::Command(name))
        } else if let Some(handler) = self.reply_buttons.get(&message.text) {
            (handler.clone(), Routed::ReplyButton(message.text.clone()))
        } else {
            tracing::debug!(
                chat_id = message.message.chat_id,
                user = %message.from,
                "no handler for message"
            );
            return Ok(Routed::Unhandled);
        };

        tracing::debug!(
            chat_id = message.message.chat_id,
            user = %message.from,
            routed = ?routed,
            "handling message"
        );
        let ctx = MessageContext {
            dispatcher: dispatcher.clone(),
            router: Arc::clone(self),
            message,
        };
        handler.handle(&ctx).await?;
        Ok(routed)
    }

    /// Capture the next messages of `user` in `chat_id`. Replaces any hook
    /// already registered for the pair.
    pub fn register_hook(&self, chat_id: i64, user: UserId, handler: impl MessageHandler + 'static) {
        self.hooks().insert((chat_id, user), Arc::new(handler));
    }

    /// Returns whether a hook was registered
    pub fn unregister_hook(&self, chat_id: i64, user: UserId) -> bool {
        self.hooks().remove(&(chat_id, user)).is_some()
    }

    pub fn has_hook(&self, chat_id: i64, user: UserId) -> bool {
        self.hooks().contains_key(&(chat_id, user))
    }

    /// Reply button labels, in registration order
    pub fn reply_buttons(&self) -> Vec<&str> {
        self.reply_buttons.keys().map(String::as_str).collect()
    }

    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("commands", &self.commands())
            .field("reply_buttons", &self.reply_buttons())
            .field("hooks", &self.hooks().len())
            .finish()
    }
}

#[derive(Default)]
pub struct MessageRouterBuilder {
    commands: HashMap<String, Arc<dyn MessageHandler>>,
    reply_buttons: IndexMap<String, Arc<dyn MessageHandler>>,
}

impl MessageRouterBuilder {
    /// Handle `/name`. Names are case-insensitive.
    pub fn command(mut self, name: &str, handler: impl MessageHandler + 'static) -> Self {
        self.commands
            .insert(name.trim_start_matches('/').to_lowercase(), Arc::new(handler));
        self
    }

    /// Handle messages whose text is exactly `text`
    pub fn reply_button(mut self, text: impl Into<String>, handler: impl MessageHandler + 'static) -> Self {
        self.reply_buttons.insert(text.into(), Arc::new(handler));
        self
    }

    pub fn build(self) -> MessageRouter {
        MessageRouter {
            commands: self.commands,
            reply_buttons: self.reply_buttons,
            hooks: Mutex::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::routing::{ComponentRegistry, RouterState};
    use crate::transport::MemoryTransport;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(RouterState::default()),
            ComponentRegistry::default(),
            Arc::new(MemoryTransport::new()),
            RoutingConfig::default(),
        )
    }

    fn text(chat_id: i64, user: i64, text: &str) -> IncomingMessage {
        IncomingMessage {
            message: MessageRef::new(chat_id, 1),
            thread_id: None,
            from: UserId(user),
            text: text.to_string(),
        }
    }

    fn ok() -> impl MessageHandler {
        message_fn(|_| async { anyhow::Ok(()) })
    }

    #[test]
    fn test_command_parse() {
        let cmd = Command::parse("/Start@demo_bot now  later").unwrap();
        assert_eq!(cmd.name, "start");
        assert_eq!(cmd.args, vec!["now", "later"]);

        assert_eq!(Command::parse("/help").unwrap().args.len(), 0);
        assert!(Command::parse("hello").is_none());
        assert!(Command::parse("/").is_none());
    }

    #[tokio::test]
    async fn test_routing_priority() {
        let router = Arc::new(
            MessageRouter::builder()
                .command("start", ok())
                .reply_button("Calendar", ok())
                .build(),
        );
        let d = dispatcher();

        assert_eq!(
            router.handle(text(1, 2, "/START"), &d).await.unwrap(),
            Routed::Command("start".into())
        );
        assert_eq!(
            router.handle(text(1, 2, "Calendar"), &d).await.unwrap(),
            Routed::ReplyButton("Calendar".into())
        );
        assert_eq!(
            router.handle(text(1, 2, "calendar"), &d).await.unwrap(),
            Routed::Unhandled
        );
        assert_eq!(
            router.handle(text(1, 2, "/unknown"), &d).await.unwrap(),
            Routed::Unhandled
        );

        // A hook shadows commands for that chat and user only
        router.register_hook(1, UserId(2), ok());
        assert_eq!(router.handle(text(1, 2, "/start"), &d).await.unwrap(), Routed::Hook);
        assert_eq!(
            router.handle(text(1, 3, "/start"), &d).await.unwrap(),
            Routed::Command("start".into())
        );

        assert!(router.unregister_hook(1, UserId(2)));
        assert!(!router.unregister_hook(1, UserId(2)));
        assert_eq!(
            router.handle(text(1, 2, "/start"), &d).await.unwrap(),
            Routed::Command("start".into())
        );
    }

    #[tokio::test]
    async fn test_hook_can_unregister_itself() {
        let router = Arc::new(MessageRouter::builder().build());
        router.register_hook(
            5,
            UserId(5),
            message_fn(|ctx| async move {
                let msg = &ctx.message;
                ctx.router.unregister_hook(msg.message.chat_id, msg.from);
                anyhow::Ok(())
            }),
        );

        let d = dispatcher();
        assert_eq!(router.handle(text(5, 5, "first"), &d).await.unwrap(), Routed::Hook);
        assert!(!router.has_hook(5, UserId(5)));
        assert_eq!(router.handle(text(5, 5, "second"), &d).await.unwrap(), Routed::Unhandled);
    }

    #[test]
    fn test_reply_buttons_keep_order() {
        let router = MessageRouter::builder()
            .reply_button("Calendar", ok())
            .reply_button("Name", ok())
            .command("/start", ok())
            .build();
        assert_eq!(router.reply_buttons(), vec!["Calendar", "Name"]);
        assert_eq!(router.commands(), vec!["start"]);
    }
}
