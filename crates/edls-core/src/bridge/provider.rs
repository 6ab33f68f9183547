//! Document-symbol and hover providers backed by the language backend.
//!
//! Each invocation issues exactly one request. Failures never reach the
//! editor: they are logged and the invocation yields its "no result" value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sequence::RequestSequencer;
use super::translator::{document_symbol_params, hover_params, to_editor_hover, to_editor_symbols};
use crate::backend::{Backend, BackendRequest, BackendResponse, dispatch};
use crate::config::BridgeSettings;
use crate::editor::{
    DocumentHandle, DocumentSymbolProvider, EditorHover, EditorPosition, EditorSymbol,
    HoverProvider,
};
use crate::error::{Error, Result};

/// Answers editor provider calls by querying the backend.
pub struct ProviderBridge {
    backend: Arc<dyn Backend>,
    sequencer: RequestSequencer,
    timeout: Duration,
    discard_stale: bool,
}

impl std::fmt::Debug for ProviderBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBridge")
            .field("timeout", &self.timeout)
            .field("discard_stale", &self.discard_stale)
            .finish_non_exhaustive()
    }
}

impl ProviderBridge {
    /// Create a provider bridge over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, settings: &BridgeSettings) -> Self {
        Self {
            backend,
            sequencer: RequestSequencer::new(),
            timeout: settings.request_timeout(),
            discard_stale: settings.discard_stale_responses,
        }
    }

    /// Outline of `document`.
    ///
    /// Returns `Ok(None)` when a newer outline request for the same document
    /// superseded this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, is cancelled, or the
    /// response is malformed.
    pub async fn document_symbols(
        &self,
        document: &DocumentHandle,
        token: &CancellationToken,
    ) -> Result<Option<Vec<EditorSymbol>>> {
        let request = BackendRequest::DocumentSymbol(document_symbol_params(document));
        match self.exchange(request, token).await? {
            Some(BackendResponse::DocumentSymbol(response)) => {
                Ok(Some(to_editor_symbols(response)))
            }
            Some(BackendResponse::Hover(_)) | None => Ok(None),
        }
    }

    /// Hover content at `position`.
    ///
    /// The outer `Option` is `None` when a newer hover request for the same
    /// document superseded this one; the inner one is `None` for "no hover".
    ///
    /// # Errors
    ///
    /// Returns an error if the position is invalid, the request fails, times
    /// out, is cancelled, or the response is malformed.
    pub async fn hover(
        &self,
        document: &DocumentHandle,
        position: EditorPosition,
        token: &CancellationToken,
    ) -> Result<Option<Option<EditorHover>>> {
        let request = BackendRequest::Hover(hover_params(document, position)?);
        match self.exchange(request, token).await? {
            Some(BackendResponse::Hover(response)) => Ok(Some(to_editor_hover(response))),
            Some(BackendResponse::DocumentSymbol(_)) | None => Ok(None),
        }
    }

    /// Issue `request` under a fresh ticket, bounded by the timeout and the
    /// cancellation token. `None` means the response was superseded.
    async fn exchange(
        &self,
        request: BackendRequest,
        token: &CancellationToken,
    ) -> Result<Option<BackendResponse>> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let ticket = self.sequencer.begin(request.uri(), request.capability());

        let response = tokio::select! {
            biased;
            () = token.cancelled() => return Err(Error::Cancelled),
            result = tokio::time::timeout(self.timeout, dispatch(self.backend.as_ref(), &request)) => {
                result.map_err(|_| Error::Timeout(timeout_ms(self.timeout)))??
            }
        };

        if self.discard_stale && !ticket.is_latest() {
            debug!(
                method = ticket.capability().method(),
                uri = %request.uri().as_str(),
                sequence = ticket.sequence(),
                "discarding superseded response"
            );
            return Ok(None);
        }
        Ok(Some(response))
    }
}

fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn log_failure(operation: &str, document: &DocumentHandle, error: &Error) {
    if matches!(error, Error::Cancelled) {
        debug!(operation, uri = %document.uri().as_str(), "provider call cancelled");
    } else {
        warn!(operation, uri = %document.uri().as_str(), error = %error, "provider call failed");
    }
}

#[async_trait]
impl DocumentSymbolProvider for ProviderBridge {
    async fn provide_document_symbols(
        &self,
        document: &DocumentHandle,
        token: &CancellationToken,
    ) -> Vec<EditorSymbol> {
        match self.document_symbols(document, token).await {
            Ok(symbols) => symbols.unwrap_or_default(),
            Err(e) => {
                log_failure("documentSymbol", document, &e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl HoverProvider for ProviderBridge {
    async fn provide_hover(
        &self,
        document: &DocumentHandle,
        position: EditorPosition,
        token: &CancellationToken,
    ) -> Option<EditorHover> {
        match self.hover(document, position, token).await {
            Ok(hover) => hover.flatten(),
            Err(e) => {
                log_failure("hover", document, &e);
                None
            }
        }
    }
}
