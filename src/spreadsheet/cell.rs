use crate::error::RustyOdsError;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Token;
use crate::spreadsheet::TokenSource;

/// Flattens the content of a text-bearing element into plain text.
///
/// Must be called right after the element's start token was consumed. Character
/// data is appended in document order; nested elements only contribute their
/// descendant text. The closing token is found by depth, so an inner element
/// with the same name as the outer one does not end the read.
///
/// # Arguments
/// * `tokens` - Token stream positioned inside the text element
/// * `row` - Index of the row being extracted, used in error reports
///
/// # Returns
/// * `Result<String, RustyOdsError>` - The flattened text, or `MalformedDocument`
///   when the stream ends before the element is closed
pub fn read_cell_text<S: TokenSource + ?Sized>(tokens: &mut S, row: usize) -> Result<String, RustyOdsError> {
    let mut text = String::new();
    let mut depth = 0usize;
    while let Some(token) = tokens.next_token()? {
        match token {
            Token::Text(value) => text.push_str(&value),
            Token::Start { .. } => depth += 1,
            Token::End { .. } if depth == 0 => return Ok(text),
            Token::End { .. } => depth -= 1,
        }
    }
    Err(SpreadsheetError::MalformedDocument { row, element: "cell text" })?
}
