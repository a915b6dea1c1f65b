//! Configuration tests
//!
//! The serialized template must parse back into the same config, so a new
//! field that is loaded but never written (or the reverse) fails here.

use super::*;

fn no_env(_: &str) -> Option<String> {
    None
}

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).expect("config should parse")
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
    assert_eq!(Config::resolve(parsed.unwrap(), no_env), config);
}

#[test]
fn test_config_roundtrip_custom_values() {
    let mut config = Config::default();
    config.routing.noop_token = "noop".to_string();
    config.routing.max_payload_bytes = 128;
    config.routing.hook_id_bytes = 4;
    config.hooks.ttl_secs = 3600;
    config.hooks.sweep_interval_secs = 30;
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;

    let resolved = Config::resolve(parse(&config.to_toml()), no_env);
    assert_eq!(resolved, config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults and overrides
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::resolve(parse(""), no_env);
    assert_eq!(config, Config::default());
    assert_eq!(config.routing.noop_token, "none");
    assert_eq!(config.routing.max_payload_bytes, 64);
    assert_eq!(config.hooks.ttl(), None);
}

#[test]
fn test_partial_sections() {
    let config = Config::resolve(
        parse("[hooks]\nttl_secs = 90\n\n[logging]\nfile_rotation = \"never\"\n"),
        no_env,
    );
    assert_eq!(config.hooks.ttl(), Some(std::time::Duration::from_secs(90)));
    assert_eq!(config.hooks.sweep_interval_secs, 60);
    assert_eq!(config.logging.file_rotation, LogRotation::Never);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_zero_values_fall_back_to_defaults() {
    let config = Config::resolve(
        parse("[routing]\nhook_id_bytes = 0\n\n[hooks]\nsweep_interval_secs = 0\n"),
        no_env,
    );
    assert_eq!(config.routing.hook_id_bytes, 8);
    assert_eq!(config.hooks.sweep_interval_secs, 60);
}

#[test]
fn test_env_overrides_file() {
    let env = |name: &str| match name {
        "INLINE_NAV_LOG_LEVEL" => Some("trace".to_string()),
        "INLINE_NAV_HOOK_TTL" => Some("120".to_string()),
        "INLINE_NAV_MAX_PAYLOAD" => Some("not-a-number".to_string()),
        _ => None,
    };
    let config = Config::resolve(
        parse("[routing]\nmax_payload_bytes = 100\n\n[logging]\nlevel = \"warn\"\n"),
        env,
    );
    assert_eq!(config.logging.level, "trace");
    assert_eq!(config.hooks.ttl_secs, 120);
    // Unparsable env values are ignored
    assert_eq!(config.routing.max_payload_bytes, 100);
}

#[test]
fn test_invalid_file_is_rejected() {
    let parsed: Result<FileConfig, _> = toml::from_str("[routing]\nmax_payload_bytes = \"big\"\n");
    assert!(parsed.is_err());
}

#[test]
fn test_log_rotation_parse() {
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
    assert!("weekly".parse::<LogRotation>().is_err());
    assert_eq!(LogRotation::Hourly.to_string(), "hourly");
}
