// inline-nav - callback routing for inline chat buttons
//
// The binary runs the demo bot against an in-memory transport driven from
// the console. A real deployment replaces MemoryTransport with a platform
// client and feeds CallbackEvents / IncomingMessages from its update loop.
//
// Architecture:
// - Dispatcher: decodes button payloads, routes to hooks or components
// - RouterState: hook registry, navigation history, page stacks per view
// - MessageRouter: text commands, reply buttons, per-user message hooks
// - Console: stdin front-end for the demo

mod cli;
mod logging;
mod startup;

use anyhow::Result;
use inline_nav::config::Config;
use inline_nav::demo::{console, DemoApp};
use inline_nav::routing::RouterState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Config subcommands run and exit before anything else starts
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // A broken config file is fatal: better than silently running on defaults
    let config = Config::from_env()?;

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard = logging::init(&config.logging);

    let state = Arc::new(RouterState::new(config.routing.hook_id_bytes));

    // Opt-in hook expiry; aborted on exit
    let sweeper = config
        .hooks
        .ttl()
        .and_then(|ttl| state.spawn_hook_sweeper(ttl, config.hooks.sweep_interval()));

    let app = DemoApp::with_state(state, config.routing.clone());
    startup::print_startup(&config, &app);
    tracing::info!(
        components = app.dispatcher.components().len(),
        hook_ttl_secs = config.hooks.ttl_secs,
        "router ready"
    );

    let result = console::run(app).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}
