//! Routing error taxonomy
//!
//! Three of these (`MalformedRoute`, `UnknownHook`, `StaleNavigationState`)
//! mean the same thing at the dispatcher boundary: the state behind the
//! clicked view no longer exists. The dispatcher collapses them into one
//! cleanup path. The page errors are caller mistakes and surface as-is.

/// Errors produced by the routing core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Token could not be decoded into a route
    #[error("malformed route {token:?}: {reason}")]
    MalformedRoute { token: String, reason: &'static str },

    /// Hook id is not (or no longer) registered
    #[error("unknown hook {id:?}")]
    UnknownHook { id: String },

    /// Navigation stack is missing or too shallow to go back
    #[error("stale navigation state (stack depth {depth})")]
    StaleNavigationState { depth: usize },

    /// Page controllers need at least one element per page
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Page numbers start at 1
    #[error("page number {page} is less than 1")]
    InvalidPage { page: usize },
}

impl RoutingError {
    pub(crate) fn malformed(token: &str, reason: &'static str) -> Self {
        Self::MalformedRoute {
            token: token.to_string(),
            reason,
        }
    }

    /// Whether this error means "the backing state for this view is gone"
    pub fn is_stale_view(&self) -> bool {
        matches!(
            self,
            Self::MalformedRoute { .. } | Self::UnknownHook { .. } | Self::StaleNavigationState { .. }
        )
    }
}
