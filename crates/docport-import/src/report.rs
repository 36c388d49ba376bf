//! Run results and the console report

use crate::registry;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// What happened to one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// Rows were processed (some may have failed)
    Imported,
    /// No CSV matched the table name
    MissingCsv,
    /// CSV found but had no data rows
    Empty,
    /// CSV found but could not be read
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub status: TableStatus,
    pub source: Option<PathBuf>,
    pub inserted: usize,
    /// Rows rejected by the required-field check
    pub skipped_rows: usize,
    /// Rows the store refused or that failed in transit
    pub failed_rows: usize,
}

impl TableReport {
    pub fn new(table: impl Into<String>, status: TableStatus, source: Option<PathBuf>) -> Self {
        Self {
            table: table.into(),
            status,
            source,
            inserted: 0,
            skipped_rows: 0,
            failed_rows: 0,
        }
    }

    /// Errors counted against the run's exit status
    pub fn errors(&self) -> usize {
        self.skipped_rows + self.failed_rows + usize::from(self.status == TableStatus::Unreadable)
    }

    /// One-line summary printed when the table finishes
    pub fn print_line(&self) {
        match self.status {
            TableStatus::Imported => {
                let mut line = format!("  {} {}: {} inserted", "✓".green(), self.table, self.inserted);
                if self.errors() > 0 {
                    line.push_str(&format!(
                        ", {} ({} skipped, {} failed)",
                        format!("{} errors", self.errors()).red(),
                        self.skipped_rows,
                        self.failed_rows
                    ));
                }
                println!("{}", line);
            },
            TableStatus::MissingCsv => {
                println!("{}", format!("  - {}: no CSV found, skipped", self.table).dimmed());
            },
            TableStatus::Empty => {
                println!("{}", format!("  - {}: CSV has no data rows", self.table).dimmed());
            },
            TableStatus::Unreadable => {
                println!("  {} {}: CSV could not be read", "✗".red(), self.table);
            },
        }
    }
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Nothing inserted and nothing failed
    NothingImported { no_csv_found: bool },
    /// At least one row or table errored
    RowErrors,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Success => 0,
            RunOutcome::NothingImported { .. } | RunOutcome::RowErrors => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub tables: Vec<TableReport>,
}

impl ImportReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.tables.iter().map(TableReport::errors).sum()
    }

    pub fn tables_missing_csv(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| t.status == TableStatus::MissingCsv)
            .count()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.total_inserted() == 0 && self.total_errors() == 0 {
            RunOutcome::NothingImported {
                no_csv_found: self.tables_missing_csv() == self.tables.len(),
            }
        } else if self.total_errors() > 0 {
            RunOutcome::RowErrors
        } else {
            RunOutcome::Success
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome().exit_code()
    }

    /// Grand summary plus remediation hints for failed runs
    pub fn print_summary(&self, data_dir: &Path) {
        println!();
        println!("{}", "Import summary".cyan().bold());
        println!("  Inserted:       {}", self.total_inserted());
        if self.total_errors() > 0 {
            println!("  Errors:         {}", self.total_errors().to_string().red());
        }
        if self.tables_missing_csv() > 0 {
            println!("  Tables skipped: {} (no CSV found)", self.tables_missing_csv());
        }
        println!();

        match self.outcome() {
            RunOutcome::Success => println!("{}", "Import complete.".green().bold()),
            RunOutcome::NothingImported { no_csv_found } => {
                if no_csv_found {
                    println!(
                        "{}",
                        format!("No CSV files found in {}.", data_dir.display()).yellow().bold()
                    );
                } else {
                    println!("{}", "No rows were imported.".yellow().bold());
                }
                print_hints(data_dir);
            },
            RunOutcome::RowErrors => {
                println!(
                    "{}",
                    format!(
                        "Import finished with {} errors; partial data was written.",
                        self.total_errors()
                    )
                    .red()
                    .bold()
                );
                println!("Re-run with --verbose to see skipped rows and store errors.");
            },
        }
    }
}

fn print_hints(data_dir: &Path) {
    println!("To fix:");
    println!("  1. Export each table as <table>.csv or <table>_rows.csv (header row first).");
    println!("  2. Put the files in {} or pass --dir <path>.", data_dir.display());
    println!(
        "  3. Known tables: {}",
        registry::table_names().collect::<Vec<_>>().join(", ")
    );
}
