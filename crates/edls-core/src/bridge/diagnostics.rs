//! Diagnostic storage and marker refresh.
//!
//! Backends keep their latest diagnostics in a [`DiagnosticStore`]; readers
//! get an immutable [`DiagnosticSnapshot`]. The [`DiagnosticBinder`] keeps
//! the editor's markers in line with that snapshot, re-rendering a document
//! when its content changes or when the backend publishes new diagnostics
//! for it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use chrono::{DateTime, Utc};
use lsp_types::{Diagnostic, PublishDiagnosticsParams, Uri};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::translator::to_editor_markers;
use crate::backend::Backend;
use crate::config::{DiagnosticRefresh, DiagnosticsSettings, LanguageDescriptor};
use crate::editor::{DocumentHandle, EditorSurface};

/// Capacity of the publication channel before slow receivers lag.
const PUBLICATION_CHANNEL_CAPACITY: usize = 64;

/// Diagnostics last published for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// URI of the document.
    pub uri: Uri,
    /// Document version the diagnostics were computed for.
    pub version: Option<i32>,
    /// List of diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// When the publication was received.
    pub received_at: DateTime<Utc>,
}

/// Immutable view of the diagnostics of every document.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSnapshot {
    entries: Arc<HashMap<String, DiagnosticInfo>>,
}

impl DiagnosticSnapshot {
    /// Entry for a document, if anything was published for it.
    #[must_use]
    pub fn get(&self, uri: &Uri) -> Option<&DiagnosticInfo> {
        self.entries.get(uri.as_str())
    }

    /// Diagnostics of a document; empty when nothing was published.
    #[must_use]
    pub fn for_document(&self, uri: &Uri) -> &[Diagnostic] {
        self.get(uri)
            .map(|info| info.diagnostics.as_slice())
            .unwrap_or_default()
    }

    /// Number of documents with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no document has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Copy-on-write diagnostic map with a publication channel.
#[derive(Debug)]
pub struct DiagnosticStore {
    entries: RwLock<Arc<HashMap<String, DiagnosticInfo>>>,
    publications: broadcast::Sender<Uri>,
}

impl Default for DiagnosticStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (publications, _) = broadcast::channel(PUBLICATION_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(Arc::new(HashMap::new())),
            publications,
        }
    }

    /// Replace the diagnostics of a document and announce the publication.
    ///
    /// Snapshots taken earlier are unaffected.
    pub fn publish(&self, params: PublishDiagnosticsParams) {
        let uri = params.uri.clone();
        let info = DiagnosticInfo {
            uri: params.uri,
            version: params.version,
            diagnostics: params.diagnostics,
            received_at: Utc::now(),
        };
        debug!(
            uri = %uri.as_str(),
            count = info.diagnostics.len(),
            "diagnostics published"
        );
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            Arc::make_mut(&mut *entries).insert(uri.to_string(), info);
        }
        // No receivers is not an error.
        let _ = self.publications.send(uri);
    }

    /// Current diagnostics of every document.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        DiagnosticSnapshot {
            entries: Arc::clone(&entries),
        }
    }

    /// Receive the URI of every subsequent publication.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Uri> {
        self.publications.subscribe()
    }

    /// Forget the diagnostics of one document and announce the change.
    ///
    /// Returns the removed entry, if there was one.
    pub fn clear(&self, uri: &Uri) -> Option<DiagnosticInfo> {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if !entries.contains_key(uri.as_str()) {
                return None;
            }
            Arc::make_mut(&mut *entries).remove(uri.as_str())
        };
        debug!(uri = %uri.as_str(), "diagnostics cleared");
        let _ = self.publications.send(uri.clone());
        removed
    }

    /// Forget every diagnostic, announcing each document that had any.
    pub fn clear_all(&self) {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *entries, Arc::new(HashMap::new()))
        };
        debug!(count = removed.len(), "all diagnostics cleared");
        for info in removed.values() {
            let _ = self.publications.send(info.uri.clone());
        }
    }
}

/// Keeps editor markers in line with the backend's diagnostics.
pub struct DiagnosticBinder {
    editor: Weak<dyn EditorSurface>,
    backend: Arc<dyn Backend>,
    language: LanguageDescriptor,
    owner: String,
    refresh: DiagnosticRefresh,
}

impl std::fmt::Debug for DiagnosticBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticBinder")
            .field("language", &self.language.id)
            .field("owner", &self.owner)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

impl DiagnosticBinder {
    /// Create a binder. Nothing is subscribed until [`Self::attach`].
    #[must_use]
    pub fn new(
        editor: &Arc<dyn EditorSurface>,
        backend: Arc<dyn Backend>,
        language: LanguageDescriptor,
        settings: &DiagnosticsSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            editor: Arc::downgrade(editor),
            backend,
            language,
            owner: settings.owner.clone(),
            refresh: settings.refresh,
        })
    }

    /// Owner label of the markers this binder sets.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Subscribe to document creation and, when publications trigger
    /// refreshes, start the publication listener.
    ///
    /// Returns the listener task. It is `None` when the backend has no
    /// publication channel, publications are not a refresh trigger, or no
    /// tokio runtime is running.
    pub fn attach(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let editor = self.editor.upgrade()?;
        let binder = Arc::clone(self);
        editor.on_document_created(Arc::new(move |document: &DocumentHandle| {
            binder.document_created(document);
        }));
        self.spawn_publication_listener()
    }

    fn document_created(self: &Arc<Self>, document: &DocumentHandle) {
        let Some(editor) = self.editor.upgrade() else {
            return;
        };

        if self.refresh.on_content_change() {
            let binder = Arc::clone(self);
            editor.on_content_changed(
                document,
                Arc::new(move |changed: &DocumentHandle| binder.refresh(changed)),
            );
        }
        debug!(
            uri = %document.uri().as_str(),
            language = %self.language.id,
            "bound diagnostics to document"
        );
        self.refresh(document);
    }

    /// Replace the markers of `document` with its current diagnostics.
    ///
    /// An empty diagnostic list clears the markers.
    pub fn refresh(&self, document: &DocumentHandle) {
        let Some(editor) = self.editor.upgrade() else {
            return;
        };
        let snapshot = self.backend.diagnostic_snapshot();
        let markers = to_editor_markers(snapshot.for_document(document.uri()));
        debug!(
            uri = %document.uri().as_str(),
            markers = markers.len(),
            "refreshing markers"
        );
        editor.set_markers(document, &self.owner, markers);
    }

    /// Refresh the open document with `uri`, if there is one.
    ///
    /// Returns whether a document was refreshed.
    pub fn refresh_uri(&self, uri: &Uri) -> bool {
        let Some(document) = self.editor.upgrade().and_then(|editor| editor.document(uri)) else {
            return false;
        };
        self.refresh(&document);
        true
    }

    /// Refresh every open document.
    ///
    /// Returns the number of documents refreshed.
    pub fn refresh_all(&self) -> usize {
        let Some(editor) = self.editor.upgrade() else {
            return 0;
        };
        let documents = editor.open_documents();
        drop(editor);

        for document in &documents {
            self.refresh(document);
        }
        documents.len()
    }

    fn spawn_publication_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.refresh.on_publish() {
            return None;
        }
        let mut publications = self.backend.subscribe_diagnostics()?;
        let Ok(runtime) = Handle::try_current() else {
            debug!("no tokio runtime, publication refresh disabled");
            return None;
        };

        let binder = Arc::clone(self);
        Some(runtime.spawn(async move {
            loop {
                if binder.editor.strong_count() == 0 {
                    break;
                }
                match publications.recv().await {
                    Ok(uri) => {
                        binder.refresh_uri(&uri);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "diagnostic publications lagged, refreshing all documents");
                        binder.refresh_all();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("publication listener stopped");
        }))
    }
}
