//! Position conversion between editor and protocol conventions.
//!
//! The editor counts lines and columns from 1, the protocol counts lines and
//! character offsets from 0. Each side has its own type, so a value can only be
//! read in the convention it was produced in.

use lsp_types::{Position, Range};

use crate::editor::{EditorPosition, EditorRange};
use crate::error::{Error, Result};

/// Convert an editor position (1-based) to a protocol position (0-based).
///
/// # Errors
///
/// Returns [`Error::InvalidPosition`] if the line or column is 0.
pub fn to_protocol_position(position: EditorPosition) -> Result<Position> {
    if position.line_number == 0 || position.column == 0 {
        return Err(Error::InvalidPosition {
            line: position.line_number,
            column: position.column,
        });
    }
    Ok(Position {
        line: position.line_number - 1,
        character: position.column - 1,
    })
}

/// Convert a protocol position (0-based) to an editor position (1-based).
#[must_use]
pub const fn to_editor_position(position: Position) -> EditorPosition {
    EditorPosition {
        line_number: position.line.saturating_add(1),
        column: position.character.saturating_add(1),
    }
}

/// Convert an editor range to a protocol range.
///
/// # Errors
///
/// Returns [`Error::InvalidPosition`] if either endpoint is invalid.
pub fn to_protocol_range(range: EditorRange) -> Result<Range> {
    Ok(Range {
        start: to_protocol_position(range.start())?,
        end: to_protocol_position(range.end())?,
    })
}

/// Convert a protocol range to an editor range.
#[must_use]
pub const fn to_editor_range(range: Range) -> EditorRange {
    let start = to_editor_position(range.start);
    let end = to_editor_position(range.end);
    EditorRange {
        start_line_number: start.line_number,
        start_column: start.column,
        end_line_number: end.line_number,
        end_column: end.column,
    }
}
