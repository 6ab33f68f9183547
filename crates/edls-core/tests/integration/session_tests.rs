use std::sync::Arc;

use edls_core::config::BridgeConfig;
use edls_core::{HeadlessEditor, ScriptedBackend, Session};

use crate::common::test_utils::config_fixture_path;

#[test]
fn test_initialize_twice_registers_once() {
    let editor = Arc::new(HeadlessEditor::new());
    let session = Session::new(editor.clone(), BridgeConfig::default());

    let first = session.initialize(Arc::new(ScriptedBackend::new()));
    let second = session.initialize(Arc::new(ScriptedBackend::new()));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(editor.registered_languages().len(), 1);
    assert_eq!(editor.symbol_provider_count("solidity"), 1);
    assert_eq!(editor.hover_provider_count("solidity"), 1);
}

#[test]
fn test_initialize_registers_language_and_grammar() {
    let editor = Arc::new(HeadlessEditor::new());
    let config = BridgeConfig::default();
    let session = Session::new(editor.clone(), config.clone());

    session.initialize(Arc::new(ScriptedBackend::new()));

    let languages = editor.registered_languages();
    assert_eq!(languages[0].id, "solidity");
    assert_eq!(languages[0].mimetypes, vec!["text/x-solidity"]);
    assert_eq!(editor.tokenizer("solidity"), Some(config.grammar));
}

#[test]
#[allow(clippy::expect_used)]
fn test_configured_language_is_registered() {
    let config = BridgeConfig::load_from(&config_fixture_path("custom_language.toml"))
        .expect("Failed to load config");
    let editor = Arc::new(HeadlessEditor::new());
    let session = Session::new(editor.clone(), config);

    session.initialize(Arc::new(ScriptedBackend::new()));

    assert_eq!(editor.symbol_provider_count("vyper"), 1);
    assert_eq!(editor.hover_provider_count("solidity"), 0);
    assert_eq!(editor.tokenizer("vyper").map(|g| g.rules.len()), Some(2));
}

#[tokio::test]
async fn test_concurrent_initialize_yields_one_bridge() {
    let editor = Arc::new(HeadlessEditor::new());
    let session = Arc::new(Session::new(editor.clone(), BridgeConfig::default()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.initialize(Arc::new(ScriptedBackend::new())) })
        })
        .collect();

    let bridges: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap_or_else(|e| panic!("initialize task failed: {e}")))
        .collect();

    for bridge in &bridges[1..] {
        assert!(Arc::ptr_eq(&bridges[0], bridge));
    }
    assert_eq!(editor.symbol_provider_count("solidity"), 1);
}
