use crate::database::LoaderError;
use crate::error::RustyOdsError;
use crate::spreadsheet::Row;

/// Parameterized INSERT derived from the header row.
///
/// Each field remembers the header column it came from, which is the only
/// place where column indexes are tied to field names.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertStatement {
    /// `(column index, field name)` in increasing column order
    pub fields: Vec<(usize, String)>,
    /// SQL text with one `?` placeholder per field
    pub sql: String,
}

impl InsertStatement {
    /// Builds the statement for `table` from the header row.
    /// Blank header cells are skipped; a header without any field is rejected.
    pub fn from_header(table: &str, header: &Row) -> Result<Self, RustyOdsError> {
        let mut fields = Vec::with_capacity(header.cells.len());
        for (column, name) in &header.cells {
            if name.trim().is_empty() {
                log::warn!("Skip blank header name in column {}", column);
            } else {
                fields.push((*column, name.to_owned()));
            }
        }
        if fields.is_empty() {
            Err(LoaderError::EmptyHeader)?;
        }

        let names = fields
            .iter()
            .map(|(_, name)| quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!("INSERT INTO {} ({}) VALUES ({})", quote_table(table), names, placeholders);
        log::debug!("Prepared query: {}", sql);
        Ok(InsertStatement { fields, sql })
    }

    /// Collects one parameter per field: the text at the field's column, `None` when absent
    pub fn bind<'a>(&self, row: &'a Row) -> Vec<Option<&'a str>> {
        self.fields
            .iter()
            .map(|(column, _)| row.get(*column))
            .collect()
    }
}

/// Double-quotes an identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes every part of a possibly schema-qualified table name
fn quote_table(table: &str) -> String {
    table
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::cells;
    use pretty_assertions::assert_eq;

    fn row(index: usize, entries: &[(usize, &str)]) -> Row {
        Row {
            index,
            cells: cells(entries),
            columns: entries.iter().map(|(column, _)| *column).max().unwrap_or(0),
        }
    }

    #[test]
    fn sql_from_header() {
        let statement = InsertStatement::from_header("people", &row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        assert_eq!(statement.sql, r#"INSERT INTO "people" ("Name", "Age") VALUES (?, ?)"#);
        assert_eq!(statement.fields, vec![(1, "Name".to_owned()), (2, "Age".to_owned())]);
    }

    #[test]
    fn identifiers_are_quoted() {
        let statement = InsertStatement::from_header("main.my table", &row(1, &[(1, "say \"hi\"")])).unwrap();
        assert_eq!(statement.sql, r#"INSERT INTO "main"."my table" ("say ""hi""") VALUES (?)"#);
    }

    #[test]
    fn header_gaps_keep_column_positions() {
        let statement = InsertStatement::from_header("t", &row(1, &[(1, "a"), (3, "c"), (4, " ")])).unwrap();
        assert_eq!(statement.fields, vec![(1, "a".to_owned()), (3, "c".to_owned())]);

        let data = row(2, &[(2, "skipped"), (3, "z")]);
        assert_eq!(statement.bind(&data), vec![None, Some("z")]);
    }

    #[test]
    fn bind_by_column_index() {
        let statement = InsertStatement::from_header("t", &row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        assert_eq!(statement.bind(&row(2, &[(1, "Ann"), (2, "30")])), vec![Some("Ann"), Some("30")]);
        assert_eq!(statement.bind(&row(3, &[(2, "40")])), vec![None, Some("40")]);
        assert_eq!(statement.bind(&row(4, &[(5, "extra")])), vec![None, None]);
    }

    #[test]
    fn empty_header_is_rejected() {
        for header in [row(1, &[]), row(1, &[(1, ""), (2, "  ")])] {
            assert!(matches!(
                InsertStatement::from_header("t", &header),
                Err(RustyOdsError::LoaderError(LoaderError::EmptyHeader))
            ));
        }
    }
}
