//! Routing and ephemeral session state for inline chat buttons.
//!
//! Every inline button carries a compact route token
//! (`t=<type>;p=<path>?k=v&...`). The [`routing::Dispatcher`] turns clicks
//! back into routes and sends them to dynamically registered hooks or to
//! named components, while keeping per-view navigation history and
//! pagination state in memory. Plain text messages go through the
//! [`messages::MessageRouter`].
//!
//! The messaging platform itself sits behind [`transport::Transport`];
//! [`transport::MemoryTransport`] backs the demo and the tests.

pub mod components;
pub mod config;
pub mod demo;
pub mod messages;
pub mod routing;
pub mod transport;
