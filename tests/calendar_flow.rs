//! End-to-end navigation through the calendar picker over the in-memory
//! transport: open, drill down, go back.

use std::sync::Arc;

use inline_nav::components::StandardComponent;
use inline_nav::config::RoutingConfig;
use inline_nav::demo::calendar::{years_route, MonthsComponent, YearsComponent, MONTHS, YEARS};
use inline_nav::routing::route::STANDARD_KIND;
use inline_nav::routing::{ComponentRegistry, Dispatch, Dispatcher, Route, RouterState, RoutingError};
use inline_nav::transport::{CallbackEvent, MemoryTransport, MessageRef, Target, UserId};

struct Bot {
    dispatcher: Dispatcher,
    transport: Arc<MemoryTransport>,
}

impl Bot {
    fn new() -> Self {
        let transport = Arc::new(MemoryTransport::new());
        let components = ComponentRegistry::builder()
            .register(YEARS, YearsComponent)
            .register(MONTHS, MonthsComponent)
            .register(STANDARD_KIND, StandardComponent::new())
            .build();
        let dispatcher = Dispatcher::new(
            Arc::new(RouterState::default()),
            components,
            transport.clone(),
            RoutingConfig::default(),
        );
        Self {
            dispatcher,
            transport,
        }
    }

    fn payload(&self, message: MessageRef, label: &str) -> String {
        self.transport
            .message(message)
            .and_then(|sent| sent.button(label).map(|b| b.payload.clone()))
            .unwrap_or_else(|| panic!("no button {label:?} on {message}"))
    }

    async fn click(&self, message: MessageRef, label: &str) -> Dispatch {
        let data = self.payload(message, label);
        self.dispatcher
            .dispatch(CallbackEvent {
                id: format!("cb-{label}"),
                data,
                message,
                from: UserId(77),
            })
            .await
            .unwrap()
    }

    fn depth(&self, message: MessageRef) -> usize {
        self.dispatcher.state().navigation.depth(message.key())
    }
}

#[tokio::test]
async fn test_years_to_months_and_back() {
    let bot = Bot::new();
    let opening = years_route(2024, 2, 3);

    let sent = bot
        .dispatcher
        .send_component(&opening, &Target::chat(10))
        .await
        .unwrap();
    assert!(sent);
    let (view, first) = bot.transport.messages_in(10).remove(0);
    assert_eq!(first.text, "Select year");
    assert_eq!(bot.depth(view), 1);

    // The year button carries a historical months route
    let months = Route::decode(&bot.payload(view, "2024")).unwrap();
    assert_eq!(months.kind, MONTHS);
    assert_eq!(months.path(), "/");
    assert_eq!(months.arg("year"), Some("2024"));
    assert_eq!(months.arg("month"), Some("1"));
    assert_eq!(months.arg("rows"), Some("2"));
    assert_eq!(months.arg("columns"), Some("2"));
    assert!(!months.is_meta());

    assert_eq!(bot.click(view, "2024").await, Dispatch::Handled { kind: MONTHS.into() });
    assert_eq!(bot.depth(view), 2);
    assert_eq!(bot.transport.message(view).unwrap().text, "Select month");

    // Paging within months is meta and leaves history alone
    bot.click(view, ">>").await;
    assert_eq!(bot.depth(view), 2);

    // Back is titled with the year and restores the exact opening route
    assert_eq!(bot.click(view, "2024").await, Dispatch::Handled { kind: YEARS.into() });
    assert_eq!(bot.depth(view), 1);
    assert_eq!(bot.dispatcher.state().navigation.peek(view.key()), Some(opening));
    assert_eq!(bot.transport.message(view).unwrap().text, "Select year");
}

#[tokio::test]
async fn test_year_paging_is_not_history() {
    let bot = Bot::new();
    bot.dispatcher
        .send_component(&years_route(2024, 2, 3), &Target::chat(10))
        .await
        .unwrap();
    let view = bot.transport.messages_in(10)[0].0;

    bot.click(view, ">>").await;
    bot.click(view, ">>").await;
    assert_eq!(bot.depth(view), 1);
    assert!(bot.transport.message(view).unwrap().button("2036").is_some());

    // Spacers are acknowledged and skipped
    assert_eq!(bot.click(view, " ").await, Dispatch::Skipped);
}

#[tokio::test]
async fn test_close_then_stale_click() {
    let bot = Bot::new();
    bot.dispatcher
        .send_component(&years_route(2024, 2, 3), &Target::chat(10))
        .await
        .unwrap();
    let view = bot.transport.messages_in(10)[0].0;
    let back = bot.dispatcher.back_button("back", false).payload;
    let year = bot.payload(view, "2024");

    assert_eq!(
        bot.click(view, "Close").await,
        Dispatch::Handled { kind: STANDARD_KIND.into() }
    );
    assert!(bot.transport.messages_in(10).is_empty());
    assert!(bot.dispatcher.state().navigation.is_empty());

    // A late back click from a client still showing the old view
    let outcome = bot
        .dispatcher
        .dispatch(CallbackEvent {
            id: "late".into(),
            data: back,
            message: view,
            from: UserId(77),
        })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Stale(RoutingError::StaleNavigationState { depth: 0 })
    );
    assert_eq!(bot.depth(view), 0);

    // A late forward click pushes history, then the edit finds no message
    let outcome = bot
        .dispatcher
        .dispatch(CallbackEvent {
            id: "late-year".into(),
            data: year,
            message: view,
            from: UserId(77),
        })
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Gone);
    assert_eq!(bot.depth(view), 0);
    assert!(bot.dispatcher.state().navigation.is_empty());
    assert_eq!(bot.dispatcher.state().open_gates(), 0);

    let second = bot
        .dispatcher
        .send_component(&years_route(2024, 2, 3), &Target::chat(10))
        .await
        .unwrap();
    assert!(second);
    let fresh = bot.transport.messages_in(10)[0].0;
    assert_eq!(
        bot.dispatcher
            .dispatch(CallbackEvent {
                id: "early-back".into(),
                data: Route::back(false).encode(),
                message: fresh,
                from: UserId(77),
            })
            .await
            .unwrap(),
        Dispatch::Stale(RoutingError::StaleNavigationState { depth: 1 })
    );
}
