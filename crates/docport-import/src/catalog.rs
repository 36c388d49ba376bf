//! Locating per-table CSV files in the data directory

use crate::error::{ImportError, Result};
use std::path::{Path, PathBuf};

/// The `*.csv` files found in one directory (not recursive)
#[derive(Debug, Clone, Default)]
pub struct CsvCatalog {
    files: Vec<PathBuf>,
}

impl CsvCatalog {
    pub fn scan(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|source| ImportError::ScanDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_csv_extension(path))
            .collect();
        files.sort();

        Ok(Self { files })
    }

    pub fn from_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// CSV for `table`.
    ///
    /// Tries `<table>.csv` then `<table>_rows.csv` exactly, then both again
    /// ignoring case.
    pub fn locate(&self, table: &str) -> Option<&Path> {
        let candidates = [format!("{}.csv", table), format!("{}_rows.csv", table)];

        let exact = candidates
            .iter()
            .find_map(|name| self.files.iter().find(|f| file_name(f) == Some(name.as_str())));
        let found = exact.or_else(|| {
            candidates.iter().find_map(|name| {
                self.files
                    .iter()
                    .find(|f| file_name(f).is_some_and(|n| n.eq_ignore_ascii_case(name)))
            })
        });

        found.map(PathBuf::as_path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}
