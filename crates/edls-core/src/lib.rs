//! # edls-core
//!
//! Core library bridging a code editor to a language backend that speaks the
//! Language Server Protocol.
//!
//! The editor counts lines and columns from 1 and renders its own marker,
//! outline and hover types; the protocol counts from 0 and speaks in
//! `lsp-types` values. This crate translates between the two, answers the
//! editor's document-symbol and hover provider calls with backend requests,
//! and keeps diagnostic markers in line with document edits.
//!
//! ## Architecture
//!
//! - [`bridge`] - Coordinate translation, providers and diagnostic refresh
//! - [`editor`] - Editor capability surface and editor-native types
//! - [`backend`] - Backend capability surface and typed requests
//! - [`language`] - Language registration and the owning session
//! - [`config`] - Configuration types and loading
//! - [`error`] - Error types for the library
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use edls_core::{BridgeConfig, HeadlessEditor, ScriptedBackend, Session};
//!
//! let editor = Arc::new(HeadlessEditor::new());
//! let session = Session::new(editor.clone(), BridgeConfig::load()?);
//! let bridge = session.initialize(Arc::new(ScriptedBackend::new()));
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod editor;
pub mod error;
pub mod language;

pub use backend::{Backend, Capability, ScriptedBackend, ScriptedResponse};
pub use config::BridgeConfig;
pub use editor::{DocumentHandle, EditorSurface, HeadlessEditor};
pub use error::Error;
pub use language::{LanguageBridge, Session};
