//! # Database Module
//!
//! Loads extracted rows into a DuckDB table: the header row becomes a
//! parameterized INSERT, every data row is bound and executed against it.
use thiserror::Error;

pub mod loader;
pub mod options;
pub mod statement;

/// Errors raised while loading rows into the database
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Header row has no field names")]
    EmptyHeader,

    #[error("Data row received before the header row")]
    HeaderNotLoaded,

    #[error("Specified database '{0}' does not exist")]
    DatabaseNotFound(String),
}
