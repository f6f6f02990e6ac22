//! # Rusty ODS
//!
//! Streams the rows of an OpenDocument spreadsheet (`.ods`) and loads them into
//! a DuckDB table.
//!
//! ## Features
//!
//! - **Single pass**: `content.xml` is read as a forward-only event stream, no DOM is built
//! - **Sparse rows**: each row maps 1-based column indexes to cell text, empty cells leave gaps
//! - **Repeated columns**: `table:number-columns-repeated` is honored for empty cells
//! - **Rich text**: spans, links and line breaks inside a cell are flattened to plain text
//! - **Header-driven inserts**: the first row names the target fields
//!
//! ## Example
//!
//! ```no_run
//! use rusty_ods::database::options::LoadOptions;
//! use std::path::Path;
//!
//! let summary = rusty_ods::load("people.ods", Path::new("people.duckdb"), &LoadOptions::new("people"))?;
//! println!("{} rows inserted, {} failed", summary.inserted, summary.failed);
//! # Ok::<(), rusty_ods::error::RustyOdsError>(())
//! ```

pub mod database;
pub mod error;
pub mod helpers;
pub mod spreadsheet;

use crate::database::loader::open_database;
use crate::database::loader::DuckDbLoader;
use crate::database::loader::LoadSummary;
use crate::database::options::LoadOptions;
use crate::error::RustyOdsError;
use crate::spreadsheet::ods::OdsDocument;
use crate::spreadsheet::walker::walk_rows;
use std::path::Path;

/// Loads every data row of an ODS file into a DuckDB table.
///
/// # Arguments
///
/// * `ods_file` - Path of the spreadsheet
/// * `database` - Path of an existing DuckDB database file
/// * `options` - Target table and load settings
///
/// # Returns
///
/// * `Result<LoadSummary, RustyOdsError>` - Counters of the load
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the database does not exist,
/// the header is empty or does not match the table, or the document is malformed.
/// Individual failing inserts are only counted. Errors keep their variant:
/// container problems are [`OdsError`](crate::spreadsheet::ods::OdsError)s,
/// extraction problems [`SpreadsheetError`](crate::spreadsheet::SpreadsheetError)s
/// carrying the row index.
pub fn load(ods_file: &str, database: &Path, options: &LoadOptions) -> Result<LoadSummary, RustyOdsError> {
    let mut document = OdsDocument::open(ods_file)?;
    let connection = open_database(database)?;
    let mut loader = DuckDbLoader::new(&connection, options);
    let rows = walk_rows(document.tokens()?, &mut loader)?;
    let summary = loader.summary();
    log::info!(
        "Read {} rows from '{}': {} inserted, {} failed, {} skipped",
        rows,
        document.name,
        summary.inserted,
        summary.failed,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::ods::tests::package;
    use crate::spreadsheet::ods::tests::people;
    use crate::spreadsheet::ods::OdsError;
    use crate::spreadsheet::SpreadsheetError;
    use duckdb::Connection;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_ods_file_into_table() {
        let directory = tempfile::tempdir().unwrap();
        let ods_file = directory.path().join("people.ods");
        std::fs::write(&ods_file, people()).unwrap();
        let database = directory.path().join("people.duckdb");
        {
            let connection = Connection::open(&database).unwrap();
            connection.execute_batch("CREATE TABLE people (Name VARCHAR, Age VARCHAR)").unwrap();
        }

        let summary = load(ods_file.to_str().unwrap(), &database, &LoadOptions::new("people")).unwrap();
        assert_eq!(summary, LoadSummary { rows: 2, inserted: 2, failed: 0, skipped: 0 });

        let connection = Connection::open(&database).unwrap();
        let (count, ages): (i64, i64) = connection
            .query_row("SELECT count(*), CAST(sum(CAST(Age AS BIGINT)) AS BIGINT) FROM people WHERE Name IS NULL OR Name = 'Ann'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(ages, 70);
    }

    #[test]
    fn missing_database() {
        let directory = tempfile::tempdir().unwrap();
        let ods_file = directory.path().join("people.ods");
        std::fs::write(&ods_file, people()).unwrap();
        let result = load(
            ods_file.to_str().unwrap(),
            &directory.path().join("missing.duckdb"),
            &LoadOptions::new("people"),
        );
        assert!(matches!(
            result,
            Err(RustyOdsError::LoaderError(crate::database::LoaderError::DatabaseNotFound(_)))
        ));
    }

    #[test]
    fn container_errors_stay_typed() {
        let error = load("missing.ods", Path::new("missing.duckdb"), &LoadOptions::new("t")).unwrap_err();
        assert!(matches!(error, RustyOdsError::OdsError(OdsError::FileNotFound(_))));
    }

    #[test]
    fn extraction_errors_carry_the_row() {
        let directory = tempfile::tempdir().unwrap();
        let ods_file = directory.path().join("broken.ods");
        let content = r#"<table:table-row><table:table-cell><text:p>Name</text:p></table:table-cell></table:table-row>
            <table:table-row><table:table-cell table:number-columns-repeated="none"/></table:table-row>"#;
        std::fs::write(&ods_file, package(&[("content.xml", content)])).unwrap();
        let database = directory.path().join("people.duckdb");
        Connection::open(&database).unwrap().execute_batch("CREATE TABLE people (Name VARCHAR)").unwrap();

        let error = load(ods_file.to_str().unwrap(), &database, &LoadOptions::new("people")).unwrap_err();
        assert!(matches!(
            error,
            RustyOdsError::SpreadsheetError(SpreadsheetError::InvalidRepeatAttribute { row: 2, .. })
        ));
    }
}
