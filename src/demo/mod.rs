//! Demo bot wired to the in-memory transport
//!
//! Registers the calendar picker, the catalog, the name form and the
//! standard close component, then exposes the two things a platform adapter would feed in:
//! button clicks and text messages. The console front-end drives it from
//! stdin.

use chrono::Datelike;
use std::sync::Arc;

use async_trait::async_trait;

use crate::components::StandardComponent;
use crate::config::{Config, RoutingConfig};
use crate::messages::{message_fn, IncomingMessage, MessageContext, MessageHandler, MessageRouter, Routed};
use crate::routing::route::STANDARD_KIND;
use crate::routing::{ComponentRegistry, Dispatch, Dispatcher, Route, RouterState};
use crate::transport::{CallbackEvent, MemoryTransport, MessageRef, Transport, UserId};

pub mod calendar;
pub mod catalog;
pub mod console;
pub mod name_form;

use calendar::{DaysComponent, MonthsComponent, YearsComponent, DAYS, MONTHS, YEARS};
use catalog::{MediaComponent, TypesComponent, MEDIA, TYPES};
use name_form::NameForm;

/// Reply button opening the calendar
pub const CALENDAR_BUTTON: &str = "Calendar";
/// Reply button opening the catalog
pub const CATALOG_BUTTON: &str = "Catalog";
/// Reply button starting the name form
pub const NAME_BUTTON: &str = "Full name";

/// Opens the date picker on a 2x3 grid starting at the current year
#[derive(Debug, Default)]
struct OpenCalendar;

#[async_trait]
impl MessageHandler for OpenCalendar {
    async fn handle(&self, ctx: &MessageContext) -> anyhow::Result<()> {
        let year = chrono::Local::now().year();
        ctx.dispatcher
            .send_component(&calendar::years_route(year, 2, 3), &ctx.message.target())
            .await?;
        Ok(())
    }
}

/// Opens the first page of the catalog
#[derive(Debug, Default)]
struct OpenCatalog;

#[async_trait]
impl MessageHandler for OpenCatalog {
    async fn handle(&self, ctx: &MessageContext) -> anyhow::Result<()> {
        ctx.dispatcher
            .send_component(&Route::new(TYPES).with_path("/"), &ctx.message.target())
            .await?;
        Ok(())
    }
}

/// Everything the demo bot consists of
#[derive(Debug, Clone)]
pub struct DemoApp {
    pub dispatcher: Dispatcher,
    pub messages: Arc<MessageRouter>,
    pub transport: Arc<MemoryTransport>,
}

impl DemoApp {
    pub fn new(config: &Config) -> Self {
        Self::with_state(
            Arc::new(RouterState::new(config.routing.hook_id_bytes)),
            config.routing.clone(),
        )
    }

    pub fn with_state(state: Arc<RouterState>, routing: RoutingConfig) -> Self {
        let messages = Arc::new(
            MessageRouter::builder()
                .command(
                    "start",
                    message_fn(|ctx| async move {
                        let text = format!(
                            "Pick a demo: {}",
                            ctx.router.reply_buttons().join(" | ")
                        );
                        ctx.dispatcher
                            .transport()
                            .send_message(&ctx.message.target(), &text, None)
                            .await?;
                        anyhow::Ok(())
                    }),
                )
                .command("calendar", OpenCalendar)
                .command("catalog", OpenCatalog)
                .command("name", NameForm)
                .reply_button(CALENDAR_BUTTON, OpenCalendar)
                .reply_button(CATALOG_BUTTON, OpenCatalog)
                .reply_button(NAME_BUTTON, NameForm)
                .build(),
        );

        let components = ComponentRegistry::builder()
            .register(STANDARD_KIND, StandardComponent::with_messages(messages.clone()))
            .register(YEARS, YearsComponent)
            .register(MONTHS, MonthsComponent)
            .register(DAYS, DaysComponent)
            .register(TYPES, TypesComponent)
            .register(MEDIA, MediaComponent)
            .build();

        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = Dispatcher::new(state, components, transport.clone(), routing);

        Self {
            dispatcher,
            messages,
            transport,
        }
    }

    /// Click button `index` (1-based, reading order) on `message`.
    ///
    /// Returns `None` when the message or button does not exist. The click
    /// is dispatched on its own task, as a platform adapter would.
    pub async fn click(
        &self,
        message: MessageRef,
        index: usize,
        from: UserId,
    ) -> anyhow::Result<Option<Dispatch>> {
        let Some(payload) = self.transport.message(message).and_then(|sent| {
            sent.buttons()
                .get(index.checked_sub(1)?)
                .map(|button| button.payload.clone())
        }) else {
            return Ok(None);
        };

        let event = CallbackEvent {
            id: format!("{message}:{index}"),
            data: payload,
            message,
            from,
        };
        let dispatcher = self.dispatcher.clone();
        let outcome = tokio::spawn(async move { dispatcher.dispatch(event).await }).await??;
        Ok(Some(outcome))
    }

    /// Deliver a text message from the user
    pub async fn say(&self, message: IncomingMessage) -> anyhow::Result<Routed> {
        self.messages.handle(message, &self.dispatcher).await
    }

    /// Newest message in `chat_id` that has buttons
    pub fn latest_view(&self, chat_id: i64) -> Option<MessageRef> {
        self.transport
            .messages_in(chat_id)
            .into_iter()
            .rev()
            .find(|(_, sent)| sent.keyboard.is_some())
            .map(|(message, _)| message)
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
