//! Row sink inserting data rows into a DuckDB table.

use crate::database::options::LoadOptions;
use crate::database::statement::InsertStatement;
use crate::database::LoaderError;
use crate::error::RustyOdsError;
use crate::spreadsheet::walker::RowSink;
use crate::spreadsheet::Row;
use duckdb::params_from_iter;
use duckdb::Connection;
use duckdb::Statement;
use std::path::Path;

/// Outcome of a load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Data rows read, header excluded
    pub rows: usize,
    /// Rows inserted successfully
    pub inserted: usize,
    /// Rows whose insert failed
    pub failed: usize,
    /// Rows skipped because no column carried text
    pub skipped: usize,
}

/// Opens an existing DuckDB database file.
pub fn open_database(path: &Path) -> Result<Connection, RustyOdsError> {
    if !path.exists() {
        Err(LoaderError::DatabaseNotFound(path.display().to_string()))?;
    }
    Ok(Connection::open(path)?)
}

/// Inserts every data row through the statement prepared from the header.
///
/// A failing insert is logged and counted but does not stop the load.
pub struct DuckDbLoader<'a> {
    connection: &'a Connection,
    options: &'a LoadOptions,
    prepared: Option<(InsertStatement, Statement<'a>)>,
    /// Columns consumed by the header row
    header_columns: usize,
    summary: LoadSummary,
}

impl<'a> DuckDbLoader<'a> {
    pub fn new(connection: &'a Connection, options: &'a LoadOptions) -> Self {
        DuckDbLoader {
            connection,
            options,
            prepared: None,
            header_columns: 0,
            summary: LoadSummary::default(),
        }
    }

    /// Returns the counters accumulated so far
    pub fn summary(&self) -> LoadSummary {
        self.summary
    }
}

impl RowSink for DuckDbLoader<'_> {
    fn on_header(&mut self, row: Row) -> Result<(), RustyOdsError> {
        let statement = InsertStatement::from_header(&self.options.table, &row)?;
        let prepared = self.connection.prepare(&statement.sql)?;
        log::info!(
            "Loading {} fields into '{}': {}",
            statement.fields.len(),
            self.options.table,
            statement.fields.iter().map(|(_, name)| name.as_str()).collect::<Vec<_>>().join(", ")
        );
        self.prepared = Some((statement, prepared));
        self.header_columns = row.columns;
        Ok(())
    }

    fn on_data_row(&mut self, row: Row) -> Result<(), RustyOdsError> {
        let (statement, prepared) = self.prepared.as_mut().ok_or(LoaderError::HeaderNotLoaded)?;
        self.summary.rows += 1;
        if row.is_ragged(self.header_columns) {
            log::debug!(
                "Row {} spans {} columns, the header {}",
                row.index,
                row.columns,
                self.header_columns
            );
        }
        if self.options.skip_empty_rows && row.is_empty() {
            self.summary.skipped += 1;
            return Ok(());
        }

        match prepared.execute(params_from_iter(statement.bind(&row))) {
            Ok(count) if count > 0 => {
                self.summary.inserted += 1;
                if self.options.is_milestone(self.summary.inserted) {
                    log::info!("{} rows inserted successfully", self.summary.inserted);
                }
            }
            Ok(_) => {
                self.summary.failed += 1;
                log::warn!("Insert of row {} changed nothing", row.index);
            }
            Err(error) => {
                self.summary.failed += 1;
                log::warn!("Insert of row {} failed: {}", row.index, error);
            }
        }
        Ok(())
    }
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
            columns: 2,
        }
    }

    fn people(connection: &Connection) -> Vec<(Option<String>, Option<String>)> {
        let mut statement = connection
            .prepare("SELECT Name, Age FROM people ORDER BY Age")
            .unwrap();
        statement
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn inserts_rows_by_header_columns() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("CREATE TABLE people (Name VARCHAR, Age VARCHAR)").unwrap();
        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);

        loader.on_header(row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        loader.on_data_row(row(2, &[(1, "Ann"), (2, "30")])).unwrap();
        loader.on_data_row(row(3, &[(2, "40")])).unwrap();
        let summary = loader.summary();
        drop(loader);

        assert_eq!(summary, LoadSummary { rows: 2, inserted: 2, failed: 0, skipped: 0 });
        assert_eq!(
            people(&connection),
            vec![
                (Some("Ann".to_owned()), Some("30".to_owned())),
                (None, Some("40".to_owned())),
            ]
        );
    }

    #[test]
    fn ragged_rows_are_still_inserted() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("CREATE TABLE people (Name VARCHAR, Age VARCHAR)").unwrap();
        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);

        loader.on_header(row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        let short = Row {
            index: 2,
            cells: cells(&[(1, "Ann")]),
            columns: 1,
        };
        let long = Row {
            index: 3,
            cells: cells(&[(1, "Bob"), (2, "50"), (5, "ignored")]),
            columns: 5,
        };
        assert!(short.is_ragged(2) && long.is_ragged(2));
        loader.on_data_row(short).unwrap();
        loader.on_data_row(long).unwrap();
        let summary = loader.summary();
        drop(loader);

        assert_eq!(summary, LoadSummary { rows: 2, inserted: 2, failed: 0, skipped: 0 });
        assert_eq!(
            people(&connection),
            vec![
                (Some("Bob".to_owned()), Some("50".to_owned())),
                (Some("Ann".to_owned()), None),
            ]
        );
    }

    #[test]
    fn failed_inserts_are_counted() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("CREATE TABLE people (Name VARCHAR NOT NULL, Age VARCHAR)").unwrap();
        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);

        loader.on_header(row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        loader.on_data_row(row(2, &[(2, "40")])).unwrap();
        loader.on_data_row(row(3, &[(1, "Bob"), (2, "50")])).unwrap();

        assert_eq!(loader.summary(), LoadSummary { rows: 2, inserted: 1, failed: 1, skipped: 0 });
    }

    #[test]
    fn empty_rows_are_skipped_or_inserted() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("CREATE TABLE people (Name VARCHAR, Age VARCHAR)").unwrap();

        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);
        loader.on_header(row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        loader.on_data_row(row(2, &[])).unwrap();
        assert_eq!(loader.summary(), LoadSummary { rows: 1, inserted: 0, failed: 0, skipped: 1 });

        let options = LoadOptions {
            skip_empty_rows: false,
            ..LoadOptions::new("people")
        };
        let mut loader = DuckDbLoader::new(&connection, &options);
        loader.on_header(row(1, &[(1, "Name"), (2, "Age")])).unwrap();
        loader.on_data_row(row(2, &[])).unwrap();
        assert_eq!(loader.summary(), LoadSummary { rows: 1, inserted: 1, failed: 0, skipped: 0 });
    }

    #[test]
    fn unknown_field_fails_at_header() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("CREATE TABLE people (Name VARCHAR)").unwrap();
        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);
        assert!(matches!(
            loader.on_header(row(1, &[(1, "Nickname")])),
            Err(RustyOdsError::DuckDBError(_))
        ));
    }

    #[test]
    fn data_before_header() {
        let connection = Connection::open_in_memory().unwrap();
        let options = LoadOptions::new("people");
        let mut loader = DuckDbLoader::new(&connection, &options);
        assert!(matches!(
            loader.on_data_row(row(2, &[(1, "x")])),
            Err(RustyOdsError::LoaderError(LoaderError::HeaderNotLoaded))
        ));
    }

    #[test]
    fn database_must_exist() {
        let directory = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_database(&directory.path().join("missing.duckdb")),
            Err(RustyOdsError::LoaderError(LoaderError::DatabaseNotFound(_)))
        ));
    }
}
