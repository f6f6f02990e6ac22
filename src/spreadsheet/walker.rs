use crate::error::RustyOdsError;
use crate::spreadsheet::extractor::extract_row;
use crate::spreadsheet::Row;
use crate::spreadsheet::Token;
use crate::spreadsheet::TokenSource;
use crate::spreadsheet::TABLE_ROW;

/// Consumer of the rows of a document.
///
/// `on_header` is called exactly once with the first row, then `on_data_row`
/// for every following row in document order.
pub trait RowSink {
    fn on_header(&mut self, row: Row) -> Result<(), RustyOdsError>;

    fn on_data_row(&mut self, row: Row) -> Result<(), RustyOdsError>;
}

/// Pull-based iterator over the rows of a token stream.
///
/// Rows are numbered from 1. Dropping the iterator between two rows is the
/// only supported way to stop early. After an error no further rows are read.
pub struct Rows<S: TokenSource> {
    tokens: S,
    count: usize,
    failed: bool,
}

impl<S: TokenSource> Rows<S> {
    pub fn new(tokens: S) -> Self {
        Rows {
            tokens,
            count: 0,
            failed: false,
        }
    }

    /// Scans forward to the next row start, ignoring everything else
    fn next_row(&mut self) -> Result<Option<Row>, RustyOdsError> {
        while let Some(token) = self.tokens.next_token()? {
            if let Token::Start { name, .. } = token {
                if name == TABLE_ROW {
                    self.count += 1;
                    let row = extract_row(&mut self.tokens, self.count)?;
                    log::trace!("Row {} has {} cells over {} columns", row.index, row.cells.len(), row.columns);
                    return Ok(Some(row));
                }
            }
        }
        Ok(None)
    }
}

impl<S: TokenSource> Iterator for Rows<S> {
    type Item = Result<Row, RustyOdsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_row();
        self.failed = result.is_err();
        result.transpose()
    }
}

/// Walks every row of the token stream into `sink`.
///
/// # Returns
/// * `Result<usize, RustyOdsError>` - Number of rows read, header included.
///   The first extraction or sink error stops the walk.
pub fn walk_rows<S: TokenSource, K: RowSink + ?Sized>(tokens: S, sink: &mut K) -> Result<usize, RustyOdsError> {
    let mut count = 0usize;
    for row in Rows::new(tokens) {
        let row = row?;
        count = row.index;
        if row.index == 1 {
            sink.on_header(row)?;
        } else {
            sink.on_data_row(row)?;
        }
    }
    Ok(count)
}

/// Adapts a pair of callbacks to [`RowSink`]
struct CallbackSink<H, D> {
    on_header: H,
    on_data_row: D,
}

impl<H, D> RowSink for CallbackSink<H, D>
where
    H: FnMut(Row) -> Result<(), RustyOdsError>,
    D: FnMut(Row) -> Result<(), RustyOdsError>,
{
    fn on_header(&mut self, row: Row) -> Result<(), RustyOdsError> {
        (self.on_header)(row)
    }

    fn on_data_row(&mut self, row: Row) -> Result<(), RustyOdsError> {
        (self.on_data_row)(row)
    }
}

/// Walks every row of the token stream, routing the first one to `on_header`
/// and the rest to `on_data_row`.
pub fn for_each_row<S, H, D>(tokens: S, on_header: H, on_data_row: D) -> Result<usize, RustyOdsError>
where
    S: TokenSource,
    H: FnMut(Row) -> Result<(), RustyOdsError>,
    D: FnMut(Row) -> Result<(), RustyOdsError>,
{
    walk_rows(tokens, &mut CallbackSink { on_header, on_data_row })
}
