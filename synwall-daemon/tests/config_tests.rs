//! Configuration loading and validation tests.
//!
//! Tests TOML parsing, environment variable overrides, file loading,
//! partial configs, and validation.

use std::env;

use serial_test::serial;

use synwall_core::config::{BlockPolicy, LogFormat, SynwallConfig};

#[test]
fn test_parse_full_config() {
    // Given: A complete TOML config
    let toml_str = r#"
[general]
log_level = "debug"
log_format = "json"

[filter]
window_secs = 2
syn_threshold = 10
flow_capacity = 16384
block_policy = "persistent"
block_expiry_secs = 300

[monitor]
sample_interval_secs = 1

[metrics]
enabled = true
listen_addr = "127.0.0.1"
port = 9465
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should succeed
    assert!(result.is_ok(), "full config should parse successfully");
    let config = result.expect("config should parse");

    // Verify general section
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, LogFormat::Json);

    // Verify module sections
    assert_eq!(config.filter.window_secs, 2);
    assert_eq!(config.filter.syn_threshold, 10);
    assert_eq!(config.filter.flow_capacity, 16384);
    assert_eq!(config.filter.block_policy, BlockPolicy::Persistent);
    assert_eq!(config.filter.block_expiry_secs, 300);

    assert_eq!(config.monitor.sample_interval_secs, 1);

    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.port, 9465);
}

#[test]
fn test_parse_partial_config_with_defaults() {
    // Given: A partial config (only filter threshold)
    let toml_str = r#"
[filter]
syn_threshold = 25
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should use defaults for missing fields and sections
    assert!(result.is_ok(), "partial config should parse with defaults");
    let config = result.expect("config should parse");

    assert_eq!(config.filter.syn_threshold, 25);
    assert_eq!(config.filter.window_secs, 2, "window should default to 2s");
    assert_eq!(
        config.filter.block_policy,
        BlockPolicy::Transient,
        "block policy should default to transient"
    );
    assert_eq!(config.general.log_level, "info");
    assert!(!config.metrics.enabled, "metrics should be disabled by default");
}

#[test]
fn test_parse_empty_config() {
    // Given: An empty config string
    let toml_str = "";

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should succeed with all defaults and validate cleanly
    assert!(result.is_ok(), "empty config should parse successfully");
    let config = result.expect("config should parse");
    assert!(config.validate().is_ok());
    assert_eq!(config.filter.flow_capacity, 16384);
}

#[test]
fn test_parse_malformed_toml_fails() {
    // Given: Malformed TOML
    let toml_str = r#"
[filter
syn_threshold = 10
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should fail
    assert!(result.is_err(), "malformed TOML should fail to parse");
}

#[test]
fn test_parse_invalid_field_type_fails() {
    // Given: TOML with invalid field type
    let toml_str = r#"
[filter]
syn_threshold = "not_a_number"
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should fail
    assert!(result.is_err(), "invalid field type should fail to parse");
}

#[test]
fn test_parse_unknown_block_policy_fails() {
    // Given: TOML with an unknown block policy variant
    let toml_str = r#"
[filter]
block_policy = "forever"
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should fail
    assert!(result.is_err(), "unknown block policy should fail to parse");
}

#[test]
fn test_parse_unknown_log_format_fails() {
    // Given: TOML with an unknown log format variant
    let toml_str = r#"
[general]
log_format = "plain"
"#;

    // When: Parsing config
    let result = SynwallConfig::parse(toml_str);

    // Then: Should fail
    assert!(result.is_err(), "unknown log format should fail to parse");
}

#[test]
#[serial]
fn test_env_override_syn_threshold() {
    // Given: A base config and environment variable
    let toml_str = r#"
[filter]
syn_threshold = 10
"#;

    // SAFETY: Test isolation - we set and clean up env vars
    unsafe {
        env::set_var("SYNWALL_FILTER_SYN_THRESHOLD", "50");
    }

    // When: Applying env overrides
    let mut config = SynwallConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: Environment variable should override TOML value
    assert_eq!(
        config.filter.syn_threshold, 50,
        "env var should override TOML value"
    );

    // Cleanup
    // SAFETY: Test cleanup
    unsafe {
        env::remove_var("SYNWALL_FILTER_SYN_THRESHOLD");
    }
}

#[test]
#[serial]
fn test_env_override_block_policy() {
    // Given: Default config and a block policy env var
    let toml_str = "";

    // SAFETY: Test isolation
    unsafe {
        env::set_var("SYNWALL_FILTER_BLOCK_POLICY", "persistent");
    }

    // When: Applying env overrides
    let mut config = SynwallConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: Should use env var value
    assert_eq!(config.filter.block_policy, BlockPolicy::Persistent);

    // Cleanup
    // SAFETY: Test cleanup
    unsafe {
        env::remove_var("SYNWALL_FILTER_BLOCK_POLICY");
    }
}

#[test]
#[serial]
fn test_env_override_unparsable_value_keeps_toml() {
    // Given: Config and an unparsable numeric env var
    let toml_str = r#"
[filter]
window_secs = 5
"#;

    // SAFETY: Test isolation
    unsafe {
        env::set_var("SYNWALL_FILTER_WINDOW_SECS", "two_seconds");
    }

    // When: Applying env overrides
    let mut config = SynwallConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: TOML value should remain
    assert_eq!(
        config.filter.window_secs, 5,
        "unparsable env var should be ignored"
    );

    // Cleanup
    // SAFETY: Test cleanup
    unsafe {
        env::remove_var("SYNWALL_FILTER_WINDOW_SECS");
    }
}

#[test]
#[serial]
fn test_env_override_no_env_var_keeps_toml() {
    // Given: Config without corresponding env var
    let toml_str = r#"
[monitor]
sample_interval_secs = 3
"#;

    // When: Applying env overrides (no env vars set)
    let mut config = SynwallConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: TOML value should remain
    assert_eq!(
        config.monitor.sample_interval_secs, 3,
        "TOML value should remain when no env var is set"
    );
}

#[tokio::test]
async fn test_load_from_file() {
    // Given: A config file on disk
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("synwall.toml");
    std::fs::write(
        &path,
        r#"
[general]
log_level = "warn"
log_format = "pretty"

[filter]
syn_threshold = 30
"#,
    )
    .expect("write config file");

    // When: Loading from file
    let config = SynwallConfig::from_file(&path)
        .await
        .expect("file config should load");

    // Then: File values should be applied over defaults
    assert_eq!(config.general.log_level, "warn");
    assert_eq!(config.general.log_format, LogFormat::Pretty);
    assert_eq!(config.filter.syn_threshold, 30);
    assert_eq!(config.filter.window_secs, 2);
}

#[tokio::test]
async fn test_load_missing_file_fails() {
    // Given: A path that does not exist
    let path = "/nonexistent/synwall.toml";

    // When: Loading from file
    let result = SynwallConfig::from_file(path).await;

    // Then: Should report file-not-found
    let err = result.expect_err("missing file must fail");
    assert!(err.to_string().contains(path));
}

#[tokio::test]
async fn test_load_rejects_invalid_values_in_file() {
    // Given: A config file with a zero threshold
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("synwall.toml");
    std::fs::write(
        &path,
        r#"
[filter]
syn_threshold = 0
"#,
    )
    .expect("write config file");

    // When: Loading from file
    let result = SynwallConfig::from_file(&path).await;

    // Then: Validation should reject it
    assert!(result.is_err(), "zero threshold must fail validation");
}

#[test]
fn test_config_roundtrips_through_toml() {
    // Given: A non-default config
    let mut config = SynwallConfig::default();
    config.filter.block_policy = BlockPolicy::Persistent;
    config.filter.syn_threshold = 42;
    config.metrics.enabled = true;

    // When: Serializing and re-parsing
    let rendered = toml::to_string(&config).expect("config should serialize");
    let reparsed = SynwallConfig::parse(&rendered).expect("rendered config should parse");

    // Then: Values should survive the round trip
    assert_eq!(reparsed.filter.block_policy, BlockPolicy::Persistent);
    assert_eq!(reparsed.filter.syn_threshold, 42);
    assert!(reparsed.metrics.enabled);
}
