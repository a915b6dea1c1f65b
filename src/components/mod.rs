//! Components shipped with the router

pub mod standard;

pub use standard::StandardComponent;
