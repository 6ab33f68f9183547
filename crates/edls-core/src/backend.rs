//! Backend capability surface.
//!
//! The language backend sits behind a protocol client that this crate does
//! not implement. [`Backend`] is the narrow interface the bridge needs: issue
//! a named request and read the latest diagnostics. [`ScriptedBackend`]
//! answers from canned responses and drives the test suites and the replay
//! command.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::request::{DocumentSymbolRequest, HoverRequest, Request};
use lsp_types::{
    DocumentSymbolParams, DocumentSymbolResponse, Hover, HoverParams, PublishDiagnosticsParams,
    Uri,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::bridge::{DiagnosticSnapshot, DiagnosticStore};
use crate::error::{Error, Result};

/// Request capabilities the bridge issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// `textDocument/documentSymbol`.
    DocumentSymbol,
    /// `textDocument/hover`.
    Hover,
}

impl Capability {
    /// Protocol method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::DocumentSymbol => DocumentSymbolRequest::METHOD,
            Self::Hover => HoverRequest::METHOD,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Typed request payload, one variant per capability.
#[derive(Debug, Clone)]
pub enum BackendRequest {
    /// Outline of a document.
    DocumentSymbol(DocumentSymbolParams),
    /// Hover at a position.
    Hover(HoverParams),
}

impl BackendRequest {
    /// Capability this request belongs to.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        match self {
            Self::DocumentSymbol(_) => Capability::DocumentSymbol,
            Self::Hover(_) => Capability::Hover,
        }
    }

    /// Document the request is about.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        match self {
            Self::DocumentSymbol(params) => &params.text_document.uri,
            Self::Hover(params) => &params.text_document_position_params.text_document.uri,
        }
    }

    /// Serialize the parameters for the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_params(&self) -> Result<Value> {
        let value = match self {
            Self::DocumentSymbol(params) => serde_json::to_value(params)?,
            Self::Hover(params) => serde_json::to_value(params)?,
        };
        Ok(value)
    }
}

/// Typed response payload, one variant per capability.
#[derive(Debug, Clone)]
pub enum BackendResponse {
    /// Outline, absent when the backend returned `null`.
    DocumentSymbol(Option<DocumentSymbolResponse>),
    /// Hover, absent when the backend returned `null`.
    Hover(Option<Hover>),
}

impl BackendResponse {
    /// Parse a raw response for `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the payload does not have the
    /// shape the capability prescribes.
    pub fn parse(capability: Capability, value: Value) -> Result<Self> {
        let malformed = |source| Error::MalformedResponse {
            method: capability.method(),
            source,
        };
        match capability {
            Capability::DocumentSymbol => serde_json::from_value(value)
                .map(Self::DocumentSymbol)
                .map_err(malformed),
            Capability::Hover => serde_json::from_value(value)
                .map(Self::Hover)
                .map_err(malformed),
        }
    }
}

/// Operations the bridge consumes from the language backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Issue one request and wait for its raw response.
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Latest diagnostics for every document. Reading it never contacts the
    /// backend.
    fn diagnostic_snapshot(&self) -> DiagnosticSnapshot;

    /// Channel announcing the URI of every diagnostics publication, if the
    /// backend offers one.
    fn subscribe_diagnostics(&self) -> Option<broadcast::Receiver<Uri>> {
        None
    }
}

/// Send a typed request through `backend` and parse the typed response.
///
/// # Errors
///
/// Returns the backend's error, or [`Error::MalformedResponse`] when the
/// response cannot be parsed.
pub async fn dispatch(backend: &dyn Backend, request: &BackendRequest) -> Result<BackendResponse> {
    let capability = request.capability();
    let params = request.to_params()?;
    debug!(method = capability.method(), uri = %request.uri().as_str(), "sending request");
    let value = backend.request(capability.method(), params).await?;
    BackendResponse::parse(capability, value)
}

/// Canned answer of a [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedResponse {
    /// Answer immediately with a result payload.
    Result(Value),
    /// Answer after a delay.
    Delayed {
        /// Delay before answering, in milliseconds.
        delay_ms: u64,
        /// Result payload.
        result: Value,
    },
    /// Fail with a protocol error.
    Error {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },
    /// Never answer.
    Hang,
}

/// Backend answering from per-method queues of canned responses.
///
/// The last response of a queue is sticky: it answers every further request
/// for that method. Methods without a script answer `null`.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    requests: Mutex<Vec<(String, Value)>>,
    diagnostics: DiagnosticStore,
}

impl ScriptedBackend {
    /// Create a backend with no scripted responses and no diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response to the queue of `method`.
    pub fn script(&self, method: &str, response: ScriptedResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Diagnostic store backing the snapshot.
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticStore {
        &self.diagnostics
    }

    /// Record a diagnostics publication.
    pub fn publish_diagnostics(&self, params: PublishDiagnosticsParams) {
        self.diagnostics.publish(params);
    }

    fn next_response(&self, method: &str) -> Option<ScriptedResponse> {
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = responses.get_mut(method)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method.to_string(), params));

        match self.next_response(method) {
            None => Ok(Value::Null),
            Some(ScriptedResponse::Result(value)) => Ok(value),
            Some(ScriptedResponse::Delayed { delay_ms, result }) => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(result)
            }
            Some(ScriptedResponse::Error { code, message }) => Err(Error::Backend { code, message }),
            Some(ScriptedResponse::Hang) => std::future::pending().await,
        }
    }

    fn diagnostic_snapshot(&self) -> DiagnosticSnapshot {
        self.diagnostics.snapshot()
    }

    fn subscribe_diagnostics(&self) -> Option<broadcast::Receiver<Uri>> {
        Some(self.diagnostics.subscribe())
    }
}
