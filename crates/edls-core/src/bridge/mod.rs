//! Translation layer between the editor and the language backend.
//!
//! Converts editor positions and requests into protocol form and protocol
//! responses back into editor annotations, and keeps diagnostic markers
//! synchronized with document edits.

mod diagnostics;
mod encoding;
mod provider;
mod sequence;
mod translator;

pub use diagnostics::{DiagnosticBinder, DiagnosticInfo, DiagnosticSnapshot, DiagnosticStore};
pub use encoding::{to_editor_position, to_editor_range, to_protocol_position, to_protocol_range};
pub use provider::ProviderBridge;
pub use sequence::{RequestSequencer, Ticket};
pub use translator::{
    document_symbol_params, hover_params, text_document_identifier, to_editor_hover,
    to_editor_marker, to_editor_markers, to_editor_symbol_kind, to_editor_symbols,
    to_marker_severity,
};
