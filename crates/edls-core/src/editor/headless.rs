//! In-memory editor surface.
//!
//! Records every registration and marker update so sessions can be driven
//! without a UI: the replay command and the test suites both use it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lsp_types::Uri;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{
    ContentChangedCallback, DocumentCreatedCallback, DocumentHandle, DocumentSymbolProvider,
    EditorHover, EditorMarker, EditorPosition, EditorSurface, EditorSymbol, HoverProvider,
};
use crate::config::{LanguageDescriptor, TokenGrammar};

/// One `set_markers` call as observed by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerUpdate {
    /// URI of the document the markers were set on.
    pub uri: String,
    /// Owner label.
    pub owner: String,
    /// Markers that replaced the previous set.
    pub markers: Vec<EditorMarker>,
}

struct OpenDocument {
    handle: DocumentHandle,
    language_id: Option<String>,
    text: String,
    version: i32,
    listeners: Vec<ContentChangedCallback>,
}

/// Editor surface that keeps all state in memory.
#[derive(Default)]
pub struct HeadlessEditor {
    next_id: AtomicU64,
    languages: Mutex<Vec<LanguageDescriptor>>,
    tokenizers: Mutex<HashMap<String, TokenGrammar>>,
    symbol_providers: Mutex<HashMap<String, Vec<Arc<dyn DocumentSymbolProvider>>>>,
    hover_providers: Mutex<HashMap<String, Vec<Arc<dyn HoverProvider>>>>,
    created_callbacks: Mutex<Vec<DocumentCreatedCallback>>,
    documents: Mutex<HashMap<u64, OpenDocument>>,
    markers: Mutex<HashMap<(u64, String), Vec<EditorMarker>>>,
    marker_updates: Mutex<Vec<MarkerUpdate>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for HeadlessEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessEditor")
            .field("languages", &*lock(&self.languages))
            .field("documents", &lock(&self.documents).len())
            .field("marker_updates", &lock(&self.marker_updates).len())
            .finish_non_exhaustive()
    }
}

impl HeadlessEditor {
    /// Create an editor with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Languages registered so far, in registration order.
    #[must_use]
    pub fn registered_languages(&self) -> Vec<LanguageDescriptor> {
        lock(&self.languages).clone()
    }

    /// Tokenizer grammar installed for a language.
    #[must_use]
    pub fn tokenizer(&self, language_id: &str) -> Option<TokenGrammar> {
        lock(&self.tokenizers).get(language_id).cloned()
    }

    /// Number of outline providers registered for a language.
    #[must_use]
    pub fn symbol_provider_count(&self, language_id: &str) -> usize {
        lock(&self.symbol_providers)
            .get(language_id)
            .map_or(0, Vec::len)
    }

    /// Number of hover providers registered for a language.
    #[must_use]
    pub fn hover_provider_count(&self, language_id: &str) -> usize {
        lock(&self.hover_providers)
            .get(language_id)
            .map_or(0, Vec::len)
    }

    /// Create a document model and notify creation subscribers.
    pub fn open_document(&self, uri: Uri, text: impl Into<String>) -> DocumentHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = DocumentHandle::new(id, uri);
        let language_id = lock(&self.languages)
            .iter()
            .find(|language| language.matches_uri(handle.uri().as_str()))
            .map(|language| language.id.clone());

        lock(&self.documents).insert(
            id,
            OpenDocument {
                handle: handle.clone(),
                language_id,
                text: text.into(),
                version: 1,
                listeners: Vec::new(),
            },
        );

        let callbacks = lock(&self.created_callbacks).clone();
        for callback in callbacks {
            callback(&handle);
        }
        handle
    }

    /// Replace the content of a document and notify its change listeners.
    ///
    /// Returns the new document version, or `None` if the document is not open.
    pub fn edit_document(&self, document: &DocumentHandle, text: impl Into<String>) -> Option<i32> {
        let (version, listeners) = {
            let mut documents = lock(&self.documents);
            let open = documents.get_mut(&document.id())?;
            open.text = text.into();
            open.version += 1;
            (open.version, open.listeners.clone())
        };

        for listener in listeners {
            listener(document);
        }
        Some(version)
    }

    /// Dispose a document model, dropping its listeners and markers.
    pub fn close_document(&self, document: &DocumentHandle) -> bool {
        let removed = lock(&self.documents).remove(&document.id()).is_some();
        if removed {
            lock(&self.markers).retain(|(id, _), _| *id != document.id());
        }
        removed
    }

    /// Current text of a document.
    #[must_use]
    pub fn text(&self, document: &DocumentHandle) -> Option<String> {
        lock(&self.documents)
            .get(&document.id())
            .map(|open| open.text.clone())
    }

    /// Language assigned to a document when it was opened.
    #[must_use]
    pub fn language_of(&self, document: &DocumentHandle) -> Option<String> {
        lock(&self.documents)
            .get(&document.id())
            .and_then(|open| open.language_id.clone())
    }

    /// Ask the hover providers of the document's language, first answer wins.
    pub async fn hover(
        &self,
        document: &DocumentHandle,
        position: EditorPosition,
        token: &CancellationToken,
    ) -> Option<EditorHover> {
        let language_id = self.language_of(document)?;
        let providers = lock(&self.hover_providers)
            .get(&language_id)
            .cloned()
            .unwrap_or_default();

        for provider in providers {
            if let Some(hover) = provider.provide_hover(document, position, token).await {
                return Some(hover);
            }
        }
        None
    }

    /// Ask the outline providers of the document's language, concatenating results.
    pub async fn document_symbols(
        &self,
        document: &DocumentHandle,
        token: &CancellationToken,
    ) -> Vec<EditorSymbol> {
        let Some(language_id) = self.language_of(document) else {
            return Vec::new();
        };
        let providers = lock(&self.symbol_providers)
            .get(&language_id)
            .cloned()
            .unwrap_or_default();

        let mut symbols = Vec::new();
        for provider in providers {
            symbols.extend(provider.provide_document_symbols(document, token).await);
        }
        symbols
    }

    /// Markers currently set on a document under `owner`.
    #[must_use]
    pub fn markers(&self, document: &DocumentHandle, owner: &str) -> Vec<EditorMarker> {
        lock(&self.markers)
            .get(&(document.id(), owner.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Every `set_markers` call received, oldest first.
    #[must_use]
    pub fn marker_updates(&self) -> Vec<MarkerUpdate> {
        lock(&self.marker_updates).clone()
    }

    /// Drain the recorded `set_markers` calls.
    pub fn take_marker_updates(&self) -> Vec<MarkerUpdate> {
        std::mem::take(&mut *lock(&self.marker_updates))
    }
}

impl EditorSurface for HeadlessEditor {
    fn register_language(&self, descriptor: &LanguageDescriptor) {
        lock(&self.languages).push(descriptor.clone());
    }

    fn register_tokenizer(&self, language_id: &str, grammar: &TokenGrammar) {
        lock(&self.tokenizers).insert(language_id.to_string(), grammar.clone());
    }

    fn register_document_symbol_provider(
        &self,
        language_id: &str,
        provider: Arc<dyn DocumentSymbolProvider>,
    ) {
        lock(&self.symbol_providers)
            .entry(language_id.to_string())
            .or_default()
            .push(provider);
    }

    fn register_hover_provider(&self, language_id: &str, provider: Arc<dyn HoverProvider>) {
        lock(&self.hover_providers)
            .entry(language_id.to_string())
            .or_default()
            .push(provider);
    }

    fn on_document_created(&self, callback: DocumentCreatedCallback) {
        lock(&self.created_callbacks).push(callback);
    }

    fn on_content_changed(&self, document: &DocumentHandle, callback: ContentChangedCallback) {
        if let Some(open) = lock(&self.documents).get_mut(&document.id()) {
            open.listeners.push(callback);
        }
    }

    fn set_markers(&self, document: &DocumentHandle, owner: &str, markers: Vec<EditorMarker>) {
        if !lock(&self.documents).contains_key(&document.id()) {
            return;
        }
        lock(&self.marker_updates).push(MarkerUpdate {
            uri: document.uri().to_string(),
            owner: owner.to_string(),
            markers: markers.clone(),
        });
        lock(&self.markers).insert((document.id(), owner.to_string()), markers);
    }

    fn open_documents(&self) -> Vec<DocumentHandle> {
        let mut handles: Vec<DocumentHandle> = lock(&self.documents)
            .values()
            .map(|open| open.handle.clone())
            .collect();
        handles.sort_by_key(DocumentHandle::id);
        handles
    }
}
