//! Editor capability surface.
//!
//! The editor widget is an external collaborator. This module describes what
//! the bridge needs from it ([`EditorSurface`]) and the editor-native values
//! exchanged across that boundary. All positions here use the editor
//! convention: line and column numbers start at 1.

mod headless;

use std::sync::Arc;

use async_trait::async_trait;
pub use headless::{HeadlessEditor, MarkerUpdate};
use lsp_types::Uri;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::{LanguageDescriptor, TokenGrammar};

/// Handle to a document model owned by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    id: u64,
    uri: Uri,
}

impl DocumentHandle {
    /// Create a handle from an editor-assigned id and the document URI.
    #[must_use]
    pub const fn new(id: u64, uri: Uri) -> Self {
        Self { id, uri }
    }

    /// Editor-assigned model id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Document URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }
}

/// Position in editor convention (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPosition {
    /// Line number, starting at 1.
    pub line_number: u32,
    /// Column, starting at 1.
    pub column: u32,
}

impl EditorPosition {
    /// Create a position.
    #[must_use]
    pub const fn new(line_number: u32, column: u32) -> Self {
        Self {
            line_number,
            column,
        }
    }
}

/// Range in editor convention (1-based, end inclusive of its column offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRange {
    /// Start line, starting at 1.
    pub start_line_number: u32,
    /// Start column, starting at 1.
    pub start_column: u32,
    /// End line, starting at 1.
    pub end_line_number: u32,
    /// End column, starting at 1.
    pub end_column: u32,
}

impl EditorRange {
    /// Create a range from raw coordinates.
    #[must_use]
    pub const fn new(
        start_line_number: u32,
        start_column: u32,
        end_line_number: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start_line_number,
            start_column,
            end_line_number,
            end_column,
        }
    }

    /// Start of the range.
    #[must_use]
    pub const fn start(&self) -> EditorPosition {
        EditorPosition::new(self.start_line_number, self.start_column)
    }

    /// End of the range.
    #[must_use]
    pub const fn end(&self) -> EditorPosition {
        EditorPosition::new(self.end_line_number, self.end_column)
    }
}

/// Marker severity on the editor's numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum MarkerSeverity {
    /// Hint.
    Hint = 1,
    /// Informational.
    Info = 2,
    /// Warning.
    Warning = 4,
    /// Error.
    Error = 8,
}

impl MarkerSeverity {
    /// Numeric level as understood by the editor.
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

impl From<MarkerSeverity> for u8 {
    fn from(severity: MarkerSeverity) -> Self {
        severity.level()
    }
}

impl TryFrom<u8> for MarkerSeverity {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, String> {
        match level {
            1 => Ok(Self::Hint),
            2 => Ok(Self::Info),
            4 => Ok(Self::Warning),
            8 => Ok(Self::Error),
            other => Err(format!("unknown marker severity {other}")),
        }
    }
}

/// Annotation rendered by the editor over a document range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorMarker {
    /// Severity.
    pub severity: MarkerSeverity,
    /// Message shown to the user.
    pub message: String,
    /// Diagnostic code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Producer of the diagnostic, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Range the marker covers.
    #[serde(flatten)]
    pub range: EditorRange,
}

/// Symbol kind on the editor's 0-based scale.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EditorSymbolKind {
    File = 0,
    Module = 1,
    Namespace = 2,
    Package = 3,
    Class = 4,
    Method = 5,
    Property = 6,
    Field = 7,
    Constructor = 8,
    Enum = 9,
    Interface = 10,
    Function = 11,
    Variable = 12,
    Constant = 13,
    String = 14,
    Number = 15,
    Boolean = 16,
    Array = 17,
    Object = 18,
    Key = 19,
    Null = 20,
    EnumMember = 21,
    Struct = 22,
    Event = 23,
    Operator = 24,
    TypeParameter = 25,
}

/// Entry in the editor's document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSymbol {
    /// Symbol name.
    pub name: String,
    /// Additional detail, empty when the backend gave none.
    pub detail: String,
    /// Symbol kind.
    pub kind: EditorSymbolKind,
    /// Name of the enclosing symbol, for flat symbol lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    /// Full extent of the symbol.
    pub range: EditorRange,
    /// Extent of the identifier.
    pub selection_range: EditorRange,
    /// Nested symbols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

/// Markdown fragment rendered in a hover widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownString {
    /// Markdown source.
    pub value: String,
}

impl MarkdownString {
    /// Wrap markdown source.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Hover content for the symbol under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorHover {
    /// Content fragments, in display order.
    pub contents: Vec<MarkdownString>,
    /// Range the hover applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<EditorRange>,
}

/// Supplies the outline of a document.
#[async_trait]
pub trait DocumentSymbolProvider: Send + Sync {
    /// Produce the symbols of `document`. An empty vector means no symbols.
    async fn provide_document_symbols(
        &self,
        document: &DocumentHandle,
        token: &CancellationToken,
    ) -> Vec<EditorSymbol>;
}

/// Supplies hover content.
#[async_trait]
pub trait HoverProvider: Send + Sync {
    /// Produce hover content at `position`, or `None` for no hover.
    async fn provide_hover(
        &self,
        document: &DocumentHandle,
        position: EditorPosition,
        token: &CancellationToken,
    ) -> Option<EditorHover>;
}

/// Callback invoked when the editor creates a document model.
pub type DocumentCreatedCallback = Arc<dyn Fn(&DocumentHandle) + Send + Sync>;

/// Callback invoked when the content of a document changes.
pub type ContentChangedCallback = Arc<dyn Fn(&DocumentHandle) + Send + Sync>;

/// Operations the bridge consumes from the editor.
///
/// Registration calls are fire-and-forget: the editor owns the registered
/// objects and the lifetime of every subscription.
pub trait EditorSurface: Send + Sync {
    /// Make a language known to the editor.
    fn register_language(&self, descriptor: &LanguageDescriptor);

    /// Install the tokenizer grammar for a language.
    fn register_tokenizer(&self, language_id: &str, grammar: &TokenGrammar);

    /// Register an outline provider for a language.
    fn register_document_symbol_provider(
        &self,
        language_id: &str,
        provider: Arc<dyn DocumentSymbolProvider>,
    );

    /// Register a hover provider for a language.
    fn register_hover_provider(&self, language_id: &str, provider: Arc<dyn HoverProvider>);

    /// Subscribe to document model creation.
    fn on_document_created(&self, callback: DocumentCreatedCallback);

    /// Subscribe to content changes of one document. The subscription ends
    /// when the editor disposes the document.
    fn on_content_changed(&self, document: &DocumentHandle, callback: ContentChangedCallback);

    /// Replace every marker owned by `owner` on `document`.
    fn set_markers(&self, document: &DocumentHandle, owner: &str, markers: Vec<EditorMarker>);

    /// Documents currently open.
    fn open_documents(&self) -> Vec<DocumentHandle>;

    /// Look up an open document by URI.
    fn document(&self, uri: &Uri) -> Option<DocumentHandle> {
        self.open_documents()
            .into_iter()
            .find(|document| document.uri() == uri)
    }
}
