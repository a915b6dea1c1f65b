//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize the full config as a commented TOML document
    pub fn to_toml(&self) -> String {
        format!(
            r#"# inline-nav configuration

# Callback routing
[routing]
# Payload of inert buttons (spacers, labels)
noop_token = "{noop_token}"
# Platform limit on callback payload size (bytes)
max_payload_bytes = {max_payload}
# Random bytes per hook id
hook_id_bytes = {hook_id_bytes}

# Hook lifetime
[hooks]
# Evict hooks older than this many seconds (0 = keep until the view releases them)
ttl_secs = {ttl_secs}
sweep_interval_secs = {sweep_interval_secs}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            noop_token = self.routing.noop_token,
            max_payload = self.routing.max_payload_bytes,
            hook_id_bytes = self.routing.hook_id_bytes,
            ttl_secs = self.hooks.ttl_secs,
            sweep_interval_secs = self.hooks.sweep_interval_secs,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation,
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
