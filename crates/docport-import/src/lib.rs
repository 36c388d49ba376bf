//! Docport Import Library
//!
//! Migrates a relational table export (one CSV per table) into a hosted
//! document store, table by table in dependency order.
//!
//! # Pipeline
//!
//! - **Parse**: [`parser::parse_csv`] turns CSV text into [`parser::Row`]s
//! - **Transform**: [`transform::transform_row`] builds a typed document,
//!   resolving foreign keys through [`idmap::IdMaps`]
//! - **Insert**: [`importer::Importer`] submits documents one at a time to a
//!   [`store::DocumentStore`] and records the ids it hands back
//!
//! # Example
//!
//! ```no_run
//! use docport_import::importer::{ImportOptions, Importer};
//! use docport_import::store::MemoryStore;
//! use std::path::Path;
//!
//! # async fn demo() -> docport_import::Result<()> {
//! let mut importer = Importer::new(MemoryStore::new(), ImportOptions::default());
//! let report = importer.run(Path::new("./export")).await?;
//! println!("inserted {}", report.total_inserted());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod error;
pub mod idmap;
pub mod importer;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod report;
pub mod store;
pub mod transform;

pub use error::{ImportError, Result};
pub use transform::Document;

use clap::Parser;
use std::path::PathBuf;

/// Import a relational CSV export into the document store
#[derive(Parser, Debug)]
#[command(name = "docport-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing <table>.csv or <table>_rows.csv files
    #[arg(long, env = "DOCPORT_DATA_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Transform and count rows without contacting the store
    #[arg(long)]
    pub dry_run: bool,

    /// Only import these tables (repeatable)
    #[arg(long = "only", value_name = "TABLE")]
    pub only: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Reject `--only` names that are not in the registry
    pub fn validate(&self) -> Result<()> {
        match self.only.iter().find(|name| registry::find(name).is_none()) {
            Some(unknown) => Err(ImportError::config(format!(
                "unknown table '{}'; known tables: {}",
                unknown,
                registry::table_names().collect::<Vec<_>>().join(", ")
            ))),
            None => Ok(()),
        }
    }
}
