//! Massedit CLI - apply CSV bulk updates to records
//!
//! # Main Command
//!
//! ```bash
//! massedit run changes.csv --records records.json --report report.csv
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! massedit parse changes.csv       # Show typed rows as JSON
//! massedit plan changes.csv        # Show planned operations per row
//! ```

use clap::{Parser, Subcommand};
use massedit::{
    parse_row, plan, read_file_auto, run_import, HeaderSchema, ImportError, JsonFileStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "massedit")]
#[command(about = "Bulk-update records from a CSV description of changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full import: parse CSV, apply against the record store, write report
    Run {
        /// Input CSV file describing the changes
        input: PathBuf,

        /// Records JSON file acting as the record store
        #[arg(short, long)]
        records: PathBuf,

        /// Output path for the report CSV (default: stdout)
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,

        /// Where to write the updated records (default: back to --records)
        #[arg(long)]
        records_out: Option<PathBuf>,

        /// Apply rows but do not persist the updated records
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a CSV file and print the typed rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,
    },

    /// Print the planned operations for each row
    Plan {
        /// Input CSV file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { input, records, report, records_out, dry_run } => {
            cmd_run(input, records, report, records_out, dry_run)
        }
        Commands::Parse { input } => cmd_parse(input),
        Commands::Plan { input } => cmd_plan(input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    input: PathBuf,
    records: PathBuf,
    report_path: Option<PathBuf>,
    records_out: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), ImportError> {
    let content = read_file_auto(&input)?;
    let mut store = JsonFileStore::open(&records)?;

    let report = run_import(&content, &mut store)?;

    if dry_run {
        println!("(dry run: records not persisted)");
    } else {
        match records_out {
            Some(path) => store.persist_to(path)?,
            None => store.persist()?,
        }
    }

    match report_path {
        Some(path) => std::fs::write(path, &report.report_csv)?,
        None => print!("{}", report.report_csv),
    }

    println!(
        "{} rows processed: {} succeeded, {} failed ({} duplicate headers skipped)",
        report.processed, report.succeeded, report.failed, report.duplicate_headers
    );
    Ok(())
}

fn cmd_parse(input: PathBuf) -> Result<(), ImportError> {
    let content = read_file_auto(&input)?;
    let (schema, lines) = read_schema(&content)?;

    for line in lines {
        match parse_row(&schema, line) {
            Ok(Some(row)) => println!("{}", serde_json::to_string(&row)?),
            Ok(None) => println!("(duplicate header skipped)"),
            Err(e) => println!("error: {e}"),
        }
    }
    Ok(())
}

fn cmd_plan(input: PathBuf) -> Result<(), ImportError> {
    let content = read_file_auto(&input)?;
    let (schema, lines) = read_schema(&content)?;

    for line in lines {
        println!("{}", line.trim());
        match parse_row(&schema, line) {
            Ok(Some(row)) => match plan(&schema, &row) {
                Ok(ops) => {
                    for op in ops {
                        println!("  {op:?}");
                    }
                }
                Err(e) => println!("  error: {e}"),
            },
            Ok(None) => println!("  (duplicate header skipped)"),
            Err(e) => println!("  error: {e}"),
        }
    }
    Ok(())
}

fn read_schema(content: &str) -> Result<(HeaderSchema, impl Iterator<Item = &str>), ImportError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or(ImportError::EmptyInput)?;
    Ok((HeaderSchema::parse(header)?, lines))
}
