use std::sync::Arc;

use edls_core::config::BridgeConfig;
use edls_core::editor::{EditorPosition, EditorRange, EditorSymbolKind};
use edls_core::{HeadlessEditor, ScriptedBackend, ScriptedResponse, Session};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::common::test_utils::{contract_fixture_path, init_tracing, uri};

const HOVER: &str = "textDocument/hover";
const SYMBOLS: &str = "textDocument/documentSymbol";

#[allow(clippy::expect_used)]
fn token_source() -> String {
    std::fs::read_to_string(contract_fixture_path("Token.sol")).expect("Failed to read fixture")
}

fn start() -> (Arc<HeadlessEditor>, Arc<ScriptedBackend>, Session) {
    init_tracing();
    let editor = Arc::new(HeadlessEditor::new());
    let backend = Arc::new(ScriptedBackend::new());
    let session = Session::new(editor.clone(), BridgeConfig::default());
    session.initialize(backend.clone());
    (editor, backend, session)
}

#[tokio::test]
async fn test_outline_through_editor() {
    let (editor, backend, _session) = start();
    backend.script(
        SYMBOLS,
        ScriptedResponse::Result(json!([{
            "name": "Token",
            "kind": 5,
            "range": { "start": { "line": 3, "character": 0 }, "end": { "line": 12, "character": 1 } },
            "selectionRange": { "start": { "line": 3, "character": 9 }, "end": { "line": 3, "character": 14 } },
            "children": [{
                "name": "transfer",
                "detail": "function transfer(address,uint256)",
                "kind": 12,
                "range": { "start": { "line": 7, "character": 4 }, "end": { "line": 11, "character": 5 } },
                "selectionRange": { "start": { "line": 7, "character": 13 }, "end": { "line": 7, "character": 21 } }
            }]
        }])),
    );
    let doc = editor.open_document(uri("file:///contracts/Token.sol"), token_source());

    let symbols = editor
        .document_symbols(&doc, &CancellationToken::new())
        .await;

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "Token");
    assert_eq!(symbols[0].kind, EditorSymbolKind::Class);
    assert_eq!(symbols[0].selection_range, EditorRange::new(4, 10, 4, 15));
    let transfer = &symbols[0].children[0];
    assert_eq!(transfer.kind, EditorSymbolKind::Function);
    assert_eq!(transfer.detail, "function transfer(address,uint256)");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, SYMBOLS);
}

#[tokio::test]
async fn test_flat_outline_through_editor() {
    let (editor, backend, _session) = start();
    backend.script(
        SYMBOLS,
        ScriptedResponse::Result(json!([{
            "name": "totalSupply",
            "kind": 8,
            "location": {
                "uri": "file:///contracts/Token.sol",
                "range": { "start": { "line": 4, "character": 4 }, "end": { "line": 4, "character": 31 } }
            },
            "containerName": "Token"
        }])),
    );
    let doc = editor.open_document(uri("file:///contracts/Token.sol"), token_source());

    let symbols = editor
        .document_symbols(&doc, &CancellationToken::new())
        .await;

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].kind, EditorSymbolKind::Field);
    assert_eq!(symbols[0].container_name.as_deref(), Some("Token"));
    assert_eq!(symbols[0].range, EditorRange::new(5, 5, 5, 32));
}

#[tokio::test]
async fn test_hover_through_editor() {
    let (editor, backend, _session) = start();
    backend.script(
        HOVER,
        ScriptedResponse::Result(json!({
            "contents": { "language": "solidity", "value": "uint256 public totalSupply" },
            "range": { "start": { "line": 4, "character": 19 }, "end": { "line": 4, "character": 30 } }
        })),
    );
    let doc = editor.open_document(uri("file:///contracts/Token.sol"), token_source());

    let hover = editor
        .hover(&doc, EditorPosition::new(5, 22), &CancellationToken::new())
        .await;

    let hover = hover.unwrap_or_else(|| panic!("expected hover content"));
    assert_eq!(
        hover.contents[0].value,
        "```solidity\nuint256 public totalSupply\n```"
    );
    assert_eq!(hover.range, Some(EditorRange::new(5, 20, 5, 31)));

    let requests = backend.requests();
    assert_eq!(requests[0].1["position"], json!({ "line": 4, "character": 21 }));
}

#[tokio::test]
async fn test_backend_failure_is_contained() {
    let (editor, backend, _session) = start();
    backend.script(
        HOVER,
        ScriptedResponse::Error {
            code: -32801,
            message: "content modified".to_string(),
        },
    );
    backend.script(SYMBOLS, ScriptedResponse::Result(json!({ "unexpected": true })));
    let doc = editor.open_document(uri("file:///contracts/Token.sol"), token_source());
    let token = CancellationToken::new();

    assert!(editor.hover(&doc, EditorPosition::new(1, 1), &token).await.is_none());
    assert!(editor.document_symbols(&doc, &token).await.is_empty());
}

#[tokio::test]
async fn test_concurrent_hovers_on_different_documents_all_answer() {
    let (editor, backend, _session) = start();
    backend.script(
        HOVER,
        ScriptedResponse::Result(json!({ "contents": "shared answer" })),
    );
    let docs: Vec<_> = (0..4)
        .map(|i| editor.open_document(uri(&format!("file:///contracts/C{i}.sol")), ""))
        .collect();
    let token = CancellationToken::new();

    let hovers = futures::future::join_all(
        docs.iter()
            .map(|doc| editor.hover(doc, EditorPosition::new(1, 1), &token)),
    )
    .await;

    assert!(hovers.iter().all(Option::is_some));
    assert_eq!(backend.requests().len(), 4);
}

#[tokio::test]
async fn test_documents_of_other_languages_get_no_providers() {
    let (editor, backend, _session) = start();
    let doc = editor.open_document(uri("file:///README.md"), "# Token");

    let hover = editor
        .hover(&doc, EditorPosition::new(1, 1), &CancellationToken::new())
        .await;

    assert!(hover.is_none());
    assert!(backend.requests().is_empty());
}
