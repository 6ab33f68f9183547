//! Language registration and the session that owns it.
//!
//! A [`Session`] ties one editor to one configuration. Calling
//! [`Session::initialize`] registers the language, its tokenizer, the
//! document-symbol and hover providers and the diagnostic binder with the
//! editor. Registration happens at most once per session.

use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::bridge::{DiagnosticBinder, ProviderBridge};
use crate::config::{BridgeConfig, LanguageDescriptor};
use crate::editor::EditorSurface;

/// Everything registered with the editor for one language.
#[derive(Debug)]
pub struct LanguageBridge {
    language: LanguageDescriptor,
    providers: Arc<ProviderBridge>,
    binder: Arc<DiagnosticBinder>,
    publication_listener: Option<JoinHandle<()>>,
}

impl LanguageBridge {
    /// Register the configured language with `editor`, answering provider
    /// calls through `backend`.
    #[must_use]
    pub fn register(
        editor: &Arc<dyn EditorSurface>,
        backend: Arc<dyn Backend>,
        config: &BridgeConfig,
    ) -> Self {
        let language = config.language.clone();
        editor.register_language(&language);
        editor.register_tokenizer(&language.id, &config.grammar);

        let providers = Arc::new(ProviderBridge::new(Arc::clone(&backend), &config.bridge));
        editor.register_document_symbol_provider(&language.id, providers.clone());
        editor.register_hover_provider(&language.id, providers.clone());

        let binder = DiagnosticBinder::new(
            editor,
            backend,
            language.clone(),
            &config.diagnostics,
        );
        let publication_listener = binder.attach();

        info!(
            language = %language.id,
            extensions = ?language.extensions,
            owner = binder.owner(),
            publication_refresh = publication_listener.is_some(),
            "language registered"
        );

        Self {
            language,
            providers,
            binder,
            publication_listener,
        }
    }

    /// Registered language.
    #[must_use]
    pub const fn language(&self) -> &LanguageDescriptor {
        &self.language
    }

    /// Provider bridge registered for document symbols and hover.
    #[must_use]
    pub fn providers(&self) -> Arc<ProviderBridge> {
        Arc::clone(&self.providers)
    }

    /// Diagnostic binder.
    #[must_use]
    pub fn binder(&self) -> Arc<DiagnosticBinder> {
        Arc::clone(&self.binder)
    }
}

impl Drop for LanguageBridge {
    fn drop(&mut self) {
        if let Some(listener) = self.publication_listener.take() {
            listener.abort();
        }
    }
}

/// Lifetime scope of one language registration.
pub struct Session {
    editor: Arc<dyn EditorSurface>,
    config: BridgeConfig,
    bridge: OnceLock<Arc<LanguageBridge>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("language", &self.config.language.id)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session. Nothing is registered until [`Self::initialize`].
    #[must_use]
    pub fn new(editor: Arc<dyn EditorSurface>, config: BridgeConfig) -> Self {
        Self {
            editor,
            config,
            bridge: OnceLock::new(),
        }
    }

    /// Configuration of this session.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Register the language with the editor.
    ///
    /// Only the first call registers anything. Later calls log a warning,
    /// ignore `backend` and return the existing bridge.
    pub fn initialize(&self, backend: Arc<dyn Backend>) -> Arc<LanguageBridge> {
        let mut registered = false;
        let bridge = self.bridge.get_or_init(|| {
            registered = true;
            Arc::new(LanguageBridge::register(&self.editor, backend, &self.config))
        });
        if !registered {
            warn!(
                language = %self.config.language.id,
                "language bridge already initialized; ignoring"
            );
        }
        Arc::clone(bridge)
    }

    /// Bridge created by [`Self::initialize`], if it ran.
    #[must_use]
    pub fn bridge(&self) -> Option<Arc<LanguageBridge>> {
        self.bridge.get().cloned()
    }

    /// Whether [`Self::initialize`] has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.bridge.get().is_some()
    }
}
