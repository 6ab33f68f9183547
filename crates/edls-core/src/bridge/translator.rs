//! Conversion of protocol values to editor values, and of editor context to
//! protocol request parameters.
//!
//! Everything here is a pure function. Response-side conversions are total:
//! missing or empty protocol data becomes an empty result, never an error.

use lsp_types::{
    Diagnostic, DiagnosticSeverity, DocumentSymbol, DocumentSymbolParams,
    DocumentSymbolResponse, Hover, HoverContents, HoverParams, MarkedString, NumberOrString,
    PartialResultParams, SymbolInformation, SymbolKind, TextDocumentIdentifier,
    TextDocumentPositionParams, WorkDoneProgressParams,
};

use super::encoding::{to_editor_range, to_protocol_position};
use crate::editor::{
    DocumentHandle, EditorHover, EditorMarker, EditorPosition, EditorSymbol, EditorSymbolKind,
    MarkdownString, MarkerSeverity,
};
use crate::error::Result;

/// Identify an editor document in protocol terms.
#[must_use]
pub fn text_document_identifier(document: &DocumentHandle) -> TextDocumentIdentifier {
    TextDocumentIdentifier {
        uri: document.uri().clone(),
    }
}

/// Build `textDocument/documentSymbol` parameters for a document.
#[must_use]
pub fn document_symbol_params(document: &DocumentHandle) -> DocumentSymbolParams {
    DocumentSymbolParams {
        text_document: text_document_identifier(document),
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
    }
}

/// Build `textDocument/hover` parameters for a cursor position.
///
/// # Errors
///
/// Returns an error if `position` is not a valid editor position.
pub fn hover_params(document: &DocumentHandle, position: EditorPosition) -> Result<HoverParams> {
    Ok(HoverParams {
        text_document_position_params: TextDocumentPositionParams {
            text_document: text_document_identifier(document),
            position: to_protocol_position(position)?,
        },
        work_done_progress_params: WorkDoneProgressParams::default(),
    })
}

/// Map a protocol severity onto the editor's marker scale.
///
/// Diagnostics without a (known) severity are shown as informational.
#[must_use]
pub const fn to_marker_severity(severity: Option<DiagnosticSeverity>) -> MarkerSeverity {
    match severity {
        Some(DiagnosticSeverity::ERROR) => MarkerSeverity::Error,
        Some(DiagnosticSeverity::WARNING) => MarkerSeverity::Warning,
        Some(DiagnosticSeverity::HINT) => MarkerSeverity::Hint,
        _ => MarkerSeverity::Info,
    }
}

/// Convert one diagnostic into an editor marker.
#[must_use]
pub fn to_editor_marker(diagnostic: &Diagnostic) -> EditorMarker {
    EditorMarker {
        severity: to_marker_severity(diagnostic.severity),
        message: diagnostic.message.clone(),
        code: diagnostic.code.as_ref().map(|code| match code {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::String(s) => s.clone(),
        }),
        source: diagnostic.source.clone(),
        range: to_editor_range(diagnostic.range),
    }
}

/// Convert diagnostics into editor markers, one per diagnostic, in order.
#[must_use]
pub fn to_editor_markers(diagnostics: &[Diagnostic]) -> Vec<EditorMarker> {
    diagnostics.iter().map(to_editor_marker).collect()
}

/// Map a protocol symbol kind (1-based) onto the editor scale (0-based).
#[must_use]
pub const fn to_editor_symbol_kind(kind: SymbolKind) -> EditorSymbolKind {
    use EditorSymbolKind as K;
    match kind {
        SymbolKind::FILE => K::File,
        SymbolKind::MODULE => K::Module,
        SymbolKind::NAMESPACE => K::Namespace,
        SymbolKind::PACKAGE => K::Package,
        SymbolKind::CLASS => K::Class,
        SymbolKind::METHOD => K::Method,
        SymbolKind::FIELD => K::Field,
        SymbolKind::CONSTRUCTOR => K::Constructor,
        SymbolKind::ENUM => K::Enum,
        SymbolKind::INTERFACE => K::Interface,
        SymbolKind::FUNCTION => K::Function,
        SymbolKind::VARIABLE => K::Variable,
        SymbolKind::CONSTANT => K::Constant,
        SymbolKind::STRING => K::String,
        SymbolKind::NUMBER => K::Number,
        SymbolKind::BOOLEAN => K::Boolean,
        SymbolKind::ARRAY => K::Array,
        SymbolKind::OBJECT => K::Object,
        SymbolKind::KEY => K::Key,
        SymbolKind::NULL => K::Null,
        SymbolKind::ENUM_MEMBER => K::EnumMember,
        SymbolKind::STRUCT => K::Struct,
        SymbolKind::EVENT => K::Event,
        SymbolKind::OPERATOR => K::Operator,
        SymbolKind::TYPE_PARAMETER => K::TypeParameter,
        _ => K::Property,
    }
}

fn from_symbol_information(symbol: SymbolInformation) -> EditorSymbol {
    let range = to_editor_range(symbol.location.range);
    EditorSymbol {
        name: symbol.name,
        detail: String::new(),
        kind: to_editor_symbol_kind(symbol.kind),
        container_name: symbol.container_name,
        range,
        selection_range: range,
        children: Vec::new(),
    }
}

fn from_document_symbol(symbol: DocumentSymbol) -> EditorSymbol {
    EditorSymbol {
        name: symbol.name,
        detail: symbol.detail.unwrap_or_default(),
        kind: to_editor_symbol_kind(symbol.kind),
        container_name: None,
        range: to_editor_range(symbol.range),
        selection_range: to_editor_range(symbol.selection_range),
        children: symbol
            .children
            .unwrap_or_default()
            .into_iter()
            .map(from_document_symbol)
            .collect(),
    }
}

/// Convert a document-symbol response into the editor outline.
///
/// An absent response and an empty list both yield an empty vector.
#[must_use]
pub fn to_editor_symbols(response: Option<DocumentSymbolResponse>) -> Vec<EditorSymbol> {
    match response {
        Some(DocumentSymbolResponse::Flat(symbols)) => {
            symbols.into_iter().map(from_symbol_information).collect()
        }
        Some(DocumentSymbolResponse::Nested(symbols)) => {
            symbols.into_iter().map(from_document_symbol).collect()
        }
        None => Vec::new(),
    }
}

fn marked_string_to_markdown(marked: MarkedString) -> String {
    match marked {
        MarkedString::String(s) => s,
        MarkedString::LanguageString(ls) => format!("```{}\n{}\n```", ls.language, ls.value),
    }
}

/// Convert a hover response into editor hover content.
///
/// Returns `None` ("no hover") when the response is absent or carries no
/// non-empty content.
#[must_use]
pub fn to_editor_hover(hover: Option<Hover>) -> Option<EditorHover> {
    let hover = hover?;
    let fragments: Vec<String> = match hover.contents {
        HoverContents::Scalar(marked) => vec![marked_string_to_markdown(marked)],
        HoverContents::Array(marked) => marked.into_iter().map(marked_string_to_markdown).collect(),
        HoverContents::Markup(markup) => vec![markup.value],
    };

    let contents: Vec<MarkdownString> = fragments
        .into_iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .map(MarkdownString::new)
        .collect();

    if contents.is_empty() {
        return None;
    }

    Some(EditorHover {
        contents,
        range: hover.range.map(to_editor_range),
    })
}
