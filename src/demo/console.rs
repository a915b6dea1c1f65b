//! Console front-end for the demo bot
//!
//! Each stdin line is either a console command or a text message sent to
//! the bot as the demo user:
//!
//! ```text
//! 3            click button 3 on the newest view
//! 5 2          click button 2 on message 5
//! show         print every message in the chat
//! quit         leave
//! /start       anything else is a text message
//! ```

use tokio::io::{AsyncBufReadExt, BufReader};

use super::DemoApp;
use crate::messages::{IncomingMessage, Routed};
use crate::routing::Dispatch;
use crate::transport::{MessageRef, UserId};

pub const DEMO_CHAT: i64 = 1;
pub const DEMO_USER: UserId = UserId(1);

/// Ids for user-sent messages, far from the transport's own
const USER_MESSAGE_BASE: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Show,
    Click {
        message: Option<i32>,
        button: usize,
    },
    Text(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => return Self::Empty,
            "q" | "quit" | "exit" => return Self::Quit,
            "show" | "ls" => return Self::Show,
            _ => {}
        }

        let numbers: Option<Vec<usize>> = line.split_whitespace().map(|s| s.parse().ok()).collect();
        match numbers.as_deref() {
            Some([button]) => Self::Click {
                message: None,
                button: *button,
            },
            Some([message, button]) => match i32::try_from(*message) {
                Ok(message) => Self::Click {
                    message: Some(message),
                    button: *button,
                },
                Err(_) => Self::Text(line.to_string()),
            },
            _ => Self::Text(line.to_string()),
        }
    }
}

fn print_chat(app: &DemoApp) {
    for (message, _) in app.transport.messages_in(DEMO_CHAT) {
        if let Some(rendered) = app.transport.render(message) {
            print!("{rendered}");
        }
    }
}

/// Run the console until stdin closes or the user quits
pub async fn run(app: DemoApp) -> anyhow::Result<()> {
    println!("inline-nav demo. Type /start, a button number, 'show' or 'quit'.");

    let mut next_user_message = USER_MESSAGE_BASE;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Show => print_chat(&app),
            Input::Click { message, button } => {
                let target = match message {
                    Some(id) => Some(MessageRef::new(DEMO_CHAT, id)),
                    None => app.latest_view(DEMO_CHAT),
                };
                let Some(target) = target else {
                    println!("(no view to click)");
                    continue;
                };
                match app.click(target, button, DEMO_USER).await {
                    Ok(Some(Dispatch::Stale(reason))) => println!("(view expired: {reason})"),
                    Ok(Some(Dispatch::Gone)) => println!("(message {target} is gone)"),
                    Ok(Some(_)) => print_chat(&app),
                    Ok(None) => println!("(no button {button} on {target})"),
                    Err(e) => {
                        tracing::error!(error = %e, "click failed");
                        println!("(error: {e:#})");
                    }
                }
            }
            Input::Text(text) => {
                next_user_message += 1;
                let message = IncomingMessage {
                    message: MessageRef::new(DEMO_CHAT, next_user_message),
                    thread_id: None,
                    from: DEMO_USER,
                    text,
                };
                match app.say(message).await {
                    Ok(Routed::Unhandled) => println!("(nothing handles that; try /start)"),
                    Ok(_) => print_chat(&app),
                    Err(e) => {
                        tracing::error!(error = %e, "message failed");
                        println!("(error: {e:#})");
                    }
                }
            }
        }
    }

    tracing::info!(
        open_views = app.dispatcher.state().navigation.len(),
        hooks = app.dispatcher.state().hooks.len(),
        "demo finished"
    );
    Ok(())
}
