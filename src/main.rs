//! Command line entry point: loads an ODS file into a table of a DuckDB database.
//!
//! The header (first row) of the spreadsheet must name the fields of the table.
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use rusty_ods::database::options::LoadOptions;
use std::path::PathBuf;
use std::process::ExitCode;

/// Load the rows of an OpenDocument spreadsheet into a DuckDB table
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ODS file to read
    ods_file: String,

    /// Existing DuckDB database file
    database: PathBuf,

    /// Table receiving the rows
    table: String,

    /// Insert data rows whose cells are all empty as rows of NULLs
    #[arg(long)]
    keep_empty_rows: bool,

    /// Log progress every N inserted rows (0 disables it)
    #[arg(long, default_value_t = LoadOptions::PROGRESS_INTERVAL)]
    progress_interval: usize,
}

impl Args {
    fn to_options(&self) -> LoadOptions {
        LoadOptions {
            skip_empty_rows: !self.keep_empty_rows,
            progress_interval: self.progress_interval,
            ..LoadOptions::new(&self.table)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let summary = rusty_ods::load(&args.ods_file, &args.database, &args.to_options())
        .with_context(|| format!("Failed to load '{}' into '{}'", args.ods_file, args.table))?;
    println!(
        "{} rows inserted, {} failed, {} skipped",
        summary.inserted, summary.failed, summary.skipped
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("Program couldn't execute properly: {:#}", error);
            ExitCode::FAILURE
        }
    }
}
