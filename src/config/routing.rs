//! Routing and hook configuration
//!
//! Wire-level knobs of the callback router and the lifetime policy of
//! dynamically registered hooks.

use serde::Deserialize;
use std::time::Duration;

use crate::routing::hooks::DEFAULT_ID_BYTES;

// ─────────────────────────────────────────────────────────────────────────────
// Routing
// ─────────────────────────────────────────────────────────────────────────────

/// Callback routing settings
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Payload of inert buttons (spacers, labels); acknowledged and dropped
    pub noop_token: String,
    /// Platform limit on callback payload size; longer tokens are logged
    pub max_payload_bytes: usize,
    /// Random bytes per hook id (hex-encoded on the wire)
    pub hook_id_bytes: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            noop_token: "none".to_string(),
            max_payload_bytes: 64, // Telegram callback_data limit
            hook_id_bytes: DEFAULT_ID_BYTES,
        }
    }
}

/// Routing settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRouting {
    pub noop_token: Option<String>,
    pub max_payload_bytes: Option<usize>,
    pub hook_id_bytes: Option<usize>,
}

impl RoutingConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileRouting>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            noop_token: file.noop_token.unwrap_or(defaults.noop_token),
            max_payload_bytes: file.max_payload_bytes.unwrap_or(defaults.max_payload_bytes),
            // Zero-length ids would collide on every registration
            hook_id_bytes: file
                .hook_id_bytes
                .filter(|&n| n > 0)
                .unwrap_or(defaults.hook_id_bytes),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Hook lifetime settings
#[derive(Debug, Clone, PartialEq)]
pub struct HooksConfig {
    /// Evict hooks older than this many seconds (0 = keep until unregistered)
    pub ttl_secs: u64,
    /// How often the eviction sweep runs
    pub sweep_interval_secs: u64,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0, // Views own their hooks; eviction is opt-in
            sweep_interval_secs: 60,
        }
    }
}

/// Hook settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileHooks {
    pub ttl_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

impl HooksConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileHooks>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            ttl_secs: file.ttl_secs.unwrap_or(defaults.ttl_secs),
            sweep_interval_secs: file
                .sweep_interval_secs
                .filter(|&n| n > 0)
                .unwrap_or(defaults.sweep_interval_secs),
        }
    }

    /// Maximum hook age, `None` when eviction is disabled
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
