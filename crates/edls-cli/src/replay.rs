//! `replay` subcommand.
//!
//! Drives a headless editor through a scripted session. The backend answers
//! from the script's canned responses, so a session can be reproduced
//! without a language server.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use edls_core::editor::{EditorHover, EditorPosition, EditorSymbol, MarkerUpdate};
use edls_core::{
    BridgeConfig, DocumentHandle, HeadlessEditor, ScriptedBackend, ScriptedResponse, Session,
};
use lsp_types::{PublishDiagnosticsParams, Uri};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A replay script.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Canned backend state.
    #[serde(default)]
    pub backend: BackendScript,
    /// Editor actions, run in order.
    pub steps: Vec<Step>,
}

/// Backend responses and the diagnostics known before the first step.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendScript {
    /// Response queues keyed by protocol method.
    #[serde(default)]
    pub responses: HashMap<String, Vec<ScriptedResponse>>,
    /// Publications applied before the session starts.
    #[serde(default)]
    pub diagnostics: Vec<PublishDiagnosticsParams>,
}

/// One editor action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Open a document.
    Open {
        /// Document URI.
        uri: Uri,
        /// Initial text.
        #[serde(default)]
        text: String,
    },
    /// Replace the text of an open document.
    Edit {
        /// Document URI.
        uri: Uri,
        /// New text.
        text: String,
    },
    /// Close a document.
    Close {
        /// Document URI.
        uri: Uri,
    },
    /// Ask for hover content.
    Hover {
        /// Document URI.
        uri: Uri,
        /// Line number, starting at 1.
        line: u32,
        /// Column, starting at 1.
        column: u32,
        /// Cancel the request before it is sent.
        #[serde(default)]
        cancelled: bool,
    },
    /// Ask for the document outline.
    Symbols {
        /// Document URI.
        uri: Uri,
    },
    /// Publish diagnostics from the backend.
    Publish(PublishDiagnosticsParams),
    /// Initialize the session again.
    Initialize,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event {
    Opened {
        uri: String,
        id: u64,
        language: Option<String>,
    },
    Edited {
        uri: String,
        version: i32,
    },
    Closed {
        uri: String,
    },
    Hover {
        uri: String,
        position: EditorPosition,
        hover: Option<EditorHover>,
    },
    Symbols {
        uri: String,
        symbols: Vec<EditorSymbol>,
    },
    Markers(MarkerUpdate),
}

/// Read a script from disk and replay it.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or a step
/// refers to a document that is not open.
pub async fn run_file(path: &Path, config: BridgeConfig, out: &mut impl Write) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let script: Script = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse script {}", path.display()))?;
    run(script, config, out).await
}

/// Replay `script`, writing one JSON line per event to `out`.
///
/// # Errors
///
/// Returns an error if a step refers to a document that is not open or
/// writing fails.
pub async fn run(script: Script, config: BridgeConfig, out: &mut impl Write) -> Result<()> {
    let backend = Arc::new(ScriptedBackend::new());
    for (method, responses) in script.backend.responses {
        for response in responses {
            backend.script(&method, response);
        }
    }
    for publication in script.backend.diagnostics {
        backend.publish_diagnostics(publication);
    }

    let publication_refresh = config.diagnostics.refresh.on_publish();
    let publication_wait = config.bridge.request_timeout();
    let editor = Arc::new(HeadlessEditor::new());
    let session = Session::new(editor.clone(), config);
    session.initialize(backend.clone());

    let mut documents: HashMap<String, DocumentHandle> = HashMap::new();
    for (index, step) in script.steps.into_iter().enumerate() {
        debug!(step = index, "replaying step");
        match step {
            Step::Open { uri, text } => {
                let document = editor.open_document(uri, text);
                emit(
                    out,
                    &Event::Opened {
                        uri: document.uri().to_string(),
                        id: document.id(),
                        language: editor.language_of(&document),
                    },
                )?;
                documents.insert(document.uri().to_string(), document);
            }
            Step::Edit { uri, text } => {
                let document = lookup(&documents, &uri)?;
                let version = editor
                    .edit_document(document, text)
                    .with_context(|| format!("document {} is not open", uri.as_str()))?;
                emit(
                    out,
                    &Event::Edited {
                        uri: uri.to_string(),
                        version,
                    },
                )?;
            }
            Step::Close { uri } => {
                let document = lookup(&documents, &uri)?.clone();
                editor.close_document(&document);
                documents.remove(uri.as_str());
                emit(out, &Event::Closed { uri: uri.to_string() })?;
            }
            Step::Hover {
                uri,
                line,
                column,
                cancelled,
            } => {
                let document = lookup(&documents, &uri)?;
                let token = CancellationToken::new();
                if cancelled {
                    token.cancel();
                }
                let position = EditorPosition::new(line, column);
                let hover = editor.hover(document, position, &token).await;
                emit(
                    out,
                    &Event::Hover {
                        uri: uri.to_string(),
                        position,
                        hover,
                    },
                )?;
            }
            Step::Symbols { uri } => {
                let document = lookup(&documents, &uri)?;
                let symbols = editor
                    .document_symbols(document, &CancellationToken::new())
                    .await;
                emit(
                    out,
                    &Event::Symbols {
                        uri: uri.to_string(),
                        symbols,
                    },
                )?;
            }
            Step::Publish(publication) => {
                let uri = publication.uri.to_string();
                backend.publish_diagnostics(publication);
                if publication_refresh && documents.contains_key(&uri) {
                    let rendered = tokio::time::timeout(publication_wait, async {
                        while !editor.marker_updates().iter().any(|update| update.uri == uri) {
                            tokio::task::yield_now().await;
                        }
                    })
                    .await;
                    if rendered.is_err() {
                        warn!(uri = %uri, "publication was not rendered in time");
                    }
                }
            }
            Step::Initialize => {
                session.initialize(backend.clone());
            }
        }

        for update in editor.take_marker_updates() {
            emit(out, &Event::Markers(update))?;
        }
    }

    Ok(())
}

fn lookup<'a>(
    documents: &'a HashMap<String, DocumentHandle>,
    uri: &Uri,
) -> Result<&'a DocumentHandle> {
    match documents.get(uri.as_str()) {
        Some(document) => Ok(document),
        None => bail!("document {} is not open", uri.as_str()),
    }
}

fn emit(out: &mut impl Write, event: &Event) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)?;
    Ok(())
}
