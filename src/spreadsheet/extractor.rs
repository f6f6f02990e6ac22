//! Row extraction state machine.
//!
//! A row is read in a single forward pass with a column cursor that starts at 0
//! and only moves forward: by one for a cell carrying text, by the repeat count
//! for an empty cell. All of this state lives in one [`extract_row`] call.

use crate::error::RustyOdsError;
use crate::spreadsheet::cell::read_cell_text;
use crate::spreadsheet::is_cell;
use crate::spreadsheet::Attributes;
use crate::spreadsheet::Row;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Token;
use crate::spreadsheet::TokenSource;
use crate::spreadsheet::COLUMNS_REPEATED;
use crate::spreadsheet::PARAGRAPH;
use crate::spreadsheet::TABLE_ROW;
use std::num::IntErrorKind;

/// Position of the extractor inside the row being read
#[derive(Debug)]
enum RowState {
    /// Between cells
    RowOpen,
    /// Inside a cell element
    CellScan(CellScan),
    /// Inside an element that is not a cell, skipped with its children
    Foreign { depth: usize },
}

/// Scanning state of one open cell
#[derive(Debug)]
struct CellScan {
    /// Columns the cell stands for when it turns out to be empty
    repeat: usize,
    /// Depth of non-paragraph children currently open
    depth: usize,
    /// Whether a direct paragraph child has been read
    has_text: bool,
}

impl CellScan {
    /// Opens a cell, validating its repeat attribute
    fn open(attributes: &Attributes, row: usize) -> Result<Self, RustyOdsError> {
        Ok(CellScan {
            repeat: repeat_count(attributes, row)?,
            depth: 0,
            has_text: false,
        })
    }
}

/// Row under construction together with its column cursor
struct RowBuilder {
    row: Row,
    cursor: usize,
}

impl RowBuilder {
    fn new(index: usize) -> Self {
        RowBuilder {
            row: Row::new(index),
            cursor: 0,
        }
    }

    /// Stores paragraph text for the open cell.
    /// The first paragraph claims the next column, later ones extend it line by line.
    fn push_text(&mut self, cell: &mut CellScan, text: String) {
        if cell.has_text {
            if let Some(value) = self.row.cells.get_mut(&self.cursor) {
                value.push('\n');
                value.push_str(&text);
            }
        } else {
            cell.has_text = true;
            self.cursor = self.cursor.saturating_add(1);
            self.row.cells.insert(self.cursor, text);
        }
    }

    /// Closes a cell; an empty one moves the cursor by its repeat count
    fn close_cell(&mut self, cell: CellScan) {
        if !cell.has_text {
            self.cursor = self.cursor.saturating_add(cell.repeat);
        }
    }

    fn finish(mut self) -> Row {
        self.row.columns = self.cursor;
        self.row
    }
}

/// Reads the repeat count of a cell, defaulting to 1 when the attribute is absent.
///
/// Counts beyond `usize::MAX` saturate, like the cursor they advance.
fn repeat_count(attributes: &Attributes, row: usize) -> Result<usize, RustyOdsError> {
    match attributes.get(COLUMNS_REPEATED) {
        None => Ok(1),
        Some(value) => match value.parse::<usize>() {
            Ok(count) if count > 0 => Ok(count),
            Err(error) if *error.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
            _ => Err(SpreadsheetError::InvalidRepeatAttribute {
                row,
                value: value.to_owned(),
            })?,
        },
    }
}

/// Logs character data that has no column position
fn ignore_text(text: &str, row: usize) {
    if !text.trim().is_empty() {
        log::warn!("Ignore text '{}' outside of any cell paragraph in row {}", text, row);
    }
}

/// Extracts one row from the token stream.
///
/// Must be called right after the `table:table-row` start token was consumed;
/// returns once the matching row end has been read.
///
/// # Arguments
/// * `tokens` - Token stream positioned inside the row
/// * `index` - 1-based index assigned to the row
///
/// # Returns
/// * `Result<Row, RustyOdsError>` - The sparse row, `MalformedDocument` if the
///   stream ends inside the row, `InvalidRepeatAttribute` for a bad repeat count
pub fn extract_row<S: TokenSource + ?Sized>(tokens: &mut S, index: usize) -> Result<Row, RustyOdsError> {
    let mut builder = RowBuilder::new(index);
    let mut state = RowState::RowOpen;
    while let Some(token) = tokens.next_token()? {
        state = match (state, token) {
            (RowState::RowOpen, Token::Start { name, attributes }) if is_cell(&name) => {
                RowState::CellScan(CellScan::open(&attributes, index)?)
            }
            (RowState::RowOpen, Token::Start { name, .. }) => {
                log::debug!("Skip <{}> outside of any cell in row {}", name, index);
                RowState::Foreign { depth: 0 }
            }
            (RowState::RowOpen, Token::End { name }) if name == TABLE_ROW => {
                return Ok(builder.finish());
            }
            (RowState::RowOpen, Token::End { name }) => {
                log::debug!("Ignore stray </{}> in row {}", name, index);
                RowState::RowOpen
            }
            (RowState::RowOpen, Token::Text(text)) => {
                ignore_text(&text, index);
                RowState::RowOpen
            }

            (RowState::CellScan(mut cell), Token::Start { name, .. }) if cell.depth == 0 && name == PARAGRAPH => {
                let text = read_cell_text(tokens, index)?;
                builder.push_text(&mut cell, text);
                RowState::CellScan(cell)
            }
            // A cell that was never closed: look through it to the next one
            (RowState::CellScan(cell), Token::Start { name, attributes }) if cell.depth == 0 && is_cell(&name) => {
                builder.close_cell(cell);
                RowState::CellScan(CellScan::open(&attributes, index)?)
            }
            (RowState::CellScan(mut cell), Token::Start { .. }) => {
                cell.depth += 1;
                RowState::CellScan(cell)
            }
            (RowState::CellScan(cell), Token::End { name }) if cell.depth == 0 && name == TABLE_ROW => {
                builder.close_cell(cell);
                return Ok(builder.finish());
            }
            (RowState::CellScan(cell), Token::End { name }) if cell.depth == 0 => {
                if !is_cell(&name) {
                    log::debug!("Close cell on mismatched </{}> in row {}", name, index);
                }
                builder.close_cell(cell);
                RowState::RowOpen
            }
            (RowState::CellScan(mut cell), Token::End { .. }) => {
                cell.depth -= 1;
                RowState::CellScan(cell)
            }
            (RowState::CellScan(cell), Token::Text(text)) => {
                if cell.depth == 0 {
                    ignore_text(&text, index);
                }
                RowState::CellScan(cell)
            }

            (RowState::Foreign { depth }, Token::Start { .. }) => RowState::Foreign { depth: depth + 1 },
            (RowState::Foreign { depth: 0 }, Token::End { .. }) => RowState::RowOpen,
            (RowState::Foreign { depth }, Token::End { .. }) => RowState::Foreign { depth: depth - 1 },
            (state @ RowState::Foreign { .. }, Token::Text(_)) => state,
        };
    }
    let element = match state {
        RowState::CellScan(_) => "cell",
        _ => "row",
    };
    Err(SpreadsheetError::MalformedDocument { row: index, element })?
}
