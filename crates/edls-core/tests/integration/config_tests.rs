use edls_core::BridgeConfig;
use edls_core::config::DiagnosticRefresh;

use crate::common::test_utils::config_fixture_path;

#[test]
#[allow(clippy::expect_used)]
fn test_config_loading_minimal() {
    let config_path = config_fixture_path("minimal.toml");
    assert!(config_path.exists(), "Config fixture should exist");

    let config = BridgeConfig::load_from(&config_path).expect("Failed to load config");

    assert_eq!(config.bridge.request_timeout_ms, 2000);
    assert!(config.bridge.discard_stale_responses);
    assert_eq!(config.language.id, "solidity");
    assert_eq!(config.diagnostics.refresh, DiagnosticRefresh::Both);
}

#[test]
#[allow(clippy::expect_used)]
fn test_config_loading_custom_language() {
    let config_path = config_fixture_path("custom_language.toml");
    let config = BridgeConfig::load_from(&config_path).expect("Failed to load config");

    assert_eq!(config.language.id, "vyper");
    assert_eq!(config.language.extensions, vec![".vy"]);
    assert_eq!(config.grammar.rules.len(), 2);
    assert_eq!(config.grammar.rules[0].token, "comment");
    assert!(!config.bridge.discard_stale_responses);
    assert_eq!(config.diagnostics.owner, "vyper");
    assert_eq!(config.diagnostics.refresh, DiagnosticRefresh::ContentChange);
}

#[test]
#[allow(clippy::expect_used)]
fn test_config_renders_back_to_loadable_toml() {
    let config_path = config_fixture_path("custom_language.toml");
    let config = BridgeConfig::load_from(&config_path).expect("Failed to load config");

    let rendered = config.to_toml().expect("Failed to render config");
    let reparsed: BridgeConfig = toml::from_str(&rendered).expect("Failed to parse rendered");
    assert_eq!(reparsed, config);
}
