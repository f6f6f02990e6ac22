//! # Spreadsheet Processing Module
//!
//! Streams the `content.xml` document of an OpenDocument spreadsheet and turns
//! its `table:table-row` elements into sparse, column-indexed [`Row`]s.
//!
//! The work is split into:
//!
//! - [`TokenSource`]: forward-only markup events (see `helpers::xml` for the quick-xml adapter)
//! - [`cell`]: flattening of the text inside a cell paragraph
//! - [`extractor`]: the per-row state machine tracking the column cursor
//! - [`walker`]: the document driver routing the header and data rows
//! - [`ods`]: opening the archive and locating `content.xml`
use crate::error::RustyOdsError;
use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;

pub mod cell;
pub mod extractor;
pub mod ods;
pub mod walker;

/// Local name of the row element
pub(crate) const TABLE_ROW: &str = "table-row";
/// Local name of the cell element
pub(crate) const TABLE_CELL: &str = "table-cell";
/// Local name of the covered (merged) cell element
pub(crate) const TABLE_COVERED_CELL: &str = "covered-table-cell";
/// Local name of the text-bearing paragraph element
pub(crate) const PARAGRAPH: &str = "p";
/// Local name of the attribute holding the empty cell repeat count
pub(crate) const COLUMNS_REPEATED: &str = "number-columns-repeated";

/// Error types raised while extracting rows from the token stream
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// The stream ended before the row or cell text was closed
    #[error("Malformed document: stream ended inside an unterminated {element} in row {row}")]
    MalformedDocument { row: usize, element: &'static str },

    /// The repeat count of a cell is not a positive integer
    #[error("Invalid number-columns-repeated value '{value}' in row {row}")]
    InvalidRepeatAttribute { row: usize, value: String },
}

/// Element attributes keyed by local name
pub type Attributes = HashMap<String, String>;

/// One markup event of the document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Element start, empty elements are reported as a start followed by an end
    Start { name: String, attributes: Attributes },
    /// Element end
    End { name: String },
    /// Character data with entities already resolved
    Text(String),
}

/// Forward-only, pull-based stream of markup events.
///
/// `Ok(None)` marks the end of the stream; it is never an error by itself.
pub trait TokenSource {
    /// Pulls the next token, or `None` once the stream is exhausted
    fn next_token(&mut self) -> Result<Option<Token>, RustyOdsError>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Option<Token>, RustyOdsError> {
        (**self).next_token()
    }
}

/// One logical spreadsheet row.
///
/// Only columns that carried text are present in `cells`; columns covered by
/// empty cells are absent rather than filled with empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of the row in the document, the header is row 1
    pub index: usize,
    /// 1-based column index to cell text
    pub cells: BTreeMap<usize, String>,
    /// Column cursor value when the row ended
    pub columns: usize,
}

impl Row {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Returns the text stored at a 1-based column index
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }

    /// Returns true if no column carried text
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns true if the row consumed a different number of columns than `expected`
    pub fn is_ragged(&self, expected: usize) -> bool {
        self.columns != expected
    }
}

/// Returns true if the element occupies a column position inside a row
pub(crate) fn is_cell(name: &str) -> bool {
    name == TABLE_CELL || name == TABLE_COVERED_CELL
}
