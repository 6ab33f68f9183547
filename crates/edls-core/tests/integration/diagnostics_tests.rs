use std::sync::Arc;

use edls_core::config::{BridgeConfig, DiagnosticRefresh};
use edls_core::editor::{EditorRange, MarkerSeverity};
use edls_core::{HeadlessEditor, ScriptedBackend, Session};
use lsp_types::DiagnosticSeverity;

use crate::common::test_utils::{diagnostic, publication, uri, wait_until};

fn start(refresh: DiagnosticRefresh) -> (Arc<HeadlessEditor>, Arc<ScriptedBackend>, Session) {
    let editor = Arc::new(HeadlessEditor::new());
    let backend = Arc::new(ScriptedBackend::new());
    let mut config = BridgeConfig::default();
    config.diagnostics.refresh = refresh;
    let session = Session::new(editor.clone(), config);
    session.initialize(backend.clone());
    (editor, backend, session)
}

#[test]
fn test_error_diagnostic_renders_as_error_marker() {
    let (editor, backend, _session) = start(DiagnosticRefresh::ContentChange);
    let doc_uri = uri("file:///contracts/Token.sol");
    backend.publish_diagnostics(publication(
        &doc_uri,
        vec![diagnostic(
            Some(DiagnosticSeverity::ERROR),
            "This is a mock error",
            (0, 0),
            (4, 4),
        )],
    ));

    let doc = editor.open_document(doc_uri, "contract Token {}");

    let markers = editor.markers(&doc, "solidity");
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].severity, MarkerSeverity::Error);
    assert_eq!(markers[0].severity.level(), 8);
    assert_eq!(markers[0].range, EditorRange::new(1, 1, 5, 5));
    assert_eq!(markers[0].message, "This is a mock error");
}

#[test]
fn test_content_change_with_zero_diagnostics_sets_empty_markers() {
    let (editor, _backend, _session) = start(DiagnosticRefresh::ContentChange);
    let doc = editor.open_document(uri("file:///contracts/Empty.sol"), "");
    editor.take_marker_updates();

    editor.edit_document(&doc, "pragma solidity ^0.8.20;");

    let updates = editor.take_marker_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].uri, "file:///contracts/Empty.sol");
    assert_eq!(updates[0].owner, "solidity");
    assert!(updates[0].markers.is_empty());
}

#[test]
fn test_every_content_change_rereads_snapshot() {
    let (editor, backend, _session) = start(DiagnosticRefresh::ContentChange);
    let doc_uri = uri("file:///contracts/Token.sol");
    let doc = editor.open_document(doc_uri.clone(), "contract Token {");

    backend.publish_diagnostics(publication(
        &doc_uri,
        vec![
            diagnostic(Some(DiagnosticSeverity::ERROR), "expected '}'", (0, 16), (0, 16)),
            diagnostic(Some(DiagnosticSeverity::WARNING), "unused", (0, 0), (0, 8)),
            diagnostic(None, "note", (0, 0), (0, 1)),
        ],
    ));
    editor.edit_document(&doc, "contract Token {\n");

    let severities: Vec<u8> = editor
        .markers(&doc, "solidity")
        .iter()
        .map(|marker| marker.severity.level())
        .collect();
    assert_eq!(severities, vec![8, 4, 2]);

    backend.publish_diagnostics(publication(&doc_uri, vec![]));
    editor.edit_document(&doc, "contract Token {}");
    assert!(editor.markers(&doc, "solidity").is_empty());
}

#[tokio::test]
async fn test_publication_rerenders_only_open_documents() {
    let (editor, backend, _session) = start(DiagnosticRefresh::Publish);
    let open_uri = uri("file:///contracts/Open.sol");
    let closed_uri = uri("file:///contracts/Closed.sol");
    let open = editor.open_document(open_uri.clone(), "contract Open {}");
    let closed = editor.open_document(closed_uri.clone(), "contract Closed {}");
    editor.close_document(&closed);
    editor.take_marker_updates();

    backend.publish_diagnostics(publication(
        &closed_uri,
        vec![diagnostic(Some(DiagnosticSeverity::ERROR), "closed", (0, 0), (0, 1))],
    ));
    backend.publish_diagnostics(publication(
        &open_uri,
        vec![diagnostic(Some(DiagnosticSeverity::HINT), "open", (1, 2), (1, 5))],
    ));

    wait_until(|| !editor.markers(&open, "solidity").is_empty()).await;

    let updates = editor.take_marker_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].uri, "file:///contracts/Open.sol");
    assert_eq!(updates[0].markers[0].severity, MarkerSeverity::Hint);
    assert_eq!(updates[0].markers[0].range, EditorRange::new(2, 3, 2, 6));
}

#[tokio::test]
async fn test_dropping_session_stops_publication_refresh() {
    let (editor, backend, session) = start(DiagnosticRefresh::Publish);
    let doc_uri = uri("file:///contracts/Token.sol");
    let doc = editor.open_document(doc_uri.clone(), "contract Token {}");
    drop(session);
    tokio::task::yield_now().await;
    editor.take_marker_updates();

    backend.publish_diagnostics(publication(
        &doc_uri,
        vec![diagnostic(Some(DiagnosticSeverity::ERROR), "late", (0, 0), (0, 1))],
    ));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert!(editor.markers(&doc, "solidity").is_empty());
}
