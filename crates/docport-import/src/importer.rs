//! Import driver
//!
//! Walks the registry parents-first and inserts one row at a time, awaiting
//! each insert before the next. That ordering is what makes foreign keys
//! resolvable: every parent id is recorded before any child row is
//! transformed, and a self-referencing row only sees rows above it in its
//! own CSV.

use crate::catalog::CsvCatalog;
use crate::error::{ImportError, Result};
use crate::idmap::IdMaps;
use crate::parser::{parse_csv, Row};
use crate::progress::{create_row_progress, tick};
use crate::registry::{TableDescriptor, TABLES};
use crate::report::{ImportReport, TableReport, TableStatus};
use crate::store::DocumentStore;
use crate::transform::{transform_row, TransformOutcome};
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument};

/// Insert failures logged per table before the rest are only counted
pub const MAX_LOGGED_ERRORS_PER_TABLE: usize = 3;

/// Table whose rows are referenced by both `id` and `user_id`
const PROFILES_TABLE: &str = "profiles";

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Draw a progress bar per table
    pub show_progress: bool,
    /// Print a summary line as each table finishes
    pub print_tables: bool,
    /// Restrict the run to these tables (registry order is kept)
    pub only: Vec<String>,
}

pub struct Importer<S> {
    store: S,
    tables: Vec<&'static TableDescriptor>,
    id_maps: IdMaps,
    options: ImportOptions,
}

impl<S: DocumentStore> Importer<S> {
    /// Importer over the full registry
    pub fn new(store: S, options: ImportOptions) -> Self {
        let tables = TABLES
            .iter()
            .filter(|t| options.only.is_empty() || options.only.iter().any(|o| o == t.name))
            .collect();
        Self::with_tables(store, tables, options)
    }

    /// Importer over an explicit, already parents-first table list
    pub fn with_tables(
        store: S,
        tables: Vec<&'static TableDescriptor>,
        options: ImportOptions,
    ) -> Self {
        Self {
            store,
            tables,
            id_maps: IdMaps::new(),
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn id_maps(&self) -> &IdMaps {
        &self.id_maps
    }

    /// Import every table from the CSVs in `data_dir`.
    ///
    /// Only an unreadable data directory is an error; everything below the
    /// table level is recorded in the report.
    pub async fn run(&mut self, data_dir: &Path) -> Result<ImportReport> {
        let catalog = CsvCatalog::scan(data_dir)?;
        info!(
            dir = %data_dir.display(),
            csv_files = catalog.files().len(),
            tables = self.tables.len(),
            "Starting import"
        );

        let mut report = ImportReport::default();
        let tables = self.tables.clone();

        for table in tables {
            let span = info_span!("table", name = table.name);
            let table_report = self.import_table(table, &catalog).instrument(span).await;
            if self.options.print_tables {
                table_report.print_line();
            }
            report.tables.push(table_report);
        }

        info!(
            inserted = report.total_inserted(),
            errors = report.total_errors(),
            missing = report.tables_missing_csv(),
            "Import finished"
        );
        Ok(report)
    }

    async fn import_table(&mut self, table: &'static TableDescriptor, catalog: &CsvCatalog) -> TableReport {
        let Some(path) = catalog.locate(table.name) else {
            debug!("No CSV found");
            return TableReport::new(table.name, TableStatus::MissingCsv, None);
        };
        let source = Some(path.to_path_buf());

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(source_err) => {
                let e = ImportError::ReadCsv {
                    path: path.to_path_buf(),
                    source: source_err,
                };
                warn!(error = %e, "Skipping table");
                return TableReport::new(table.name, TableStatus::Unreadable, source);
            },
        };

        let rows = parse_csv(&text);
        if rows.is_empty() {
            info!(path = %path.display(), "CSV has no data rows");
            return TableReport::new(table.name, TableStatus::Empty, source);
        }

        info!(path = %path.display(), rows = rows.len(), "Importing table");
        self.import_rows(table, &rows, TableReport::new(table.name, TableStatus::Imported, source))
            .await
    }

    async fn import_rows(
        &mut self,
        table: &'static TableDescriptor,
        rows: &[Row],
        mut report: TableReport,
    ) -> TableReport {
        // Created before the first row so self-references can resolve.
        self.id_maps.begin_table(table.name);
        let pb = create_row_progress(rows.len(), table.name, self.options.show_progress);

        for (index, row) in rows.iter().enumerate() {
            match transform_row(row, table, &self.id_maps) {
                TransformOutcome::Skip { missing_field } => {
                    report.skipped_rows += 1;
                    debug!(row = index, missing_field, "Skipping row without required field");
                },
                TransformOutcome::Ready(document) => {
                    match self.store.insert(table.name, &document).await {
                        Ok(new_id) => {
                            self.register_ids(table, row, index, &new_id);
                            report.inserted += 1;
                        },
                        Err(e) => {
                            report.failed_rows += 1;
                            if report.failed_rows <= MAX_LOGGED_ERRORS_PER_TABLE {
                                warn!(row = index, error = %e, "Insert failed");
                            }
                        },
                    }
                },
            }
            tick(&pb, index + 1, rows.len());
        }
        pb.finish_and_clear();

        if report.failed_rows > MAX_LOGGED_ERRORS_PER_TABLE {
            warn!(
                suppressed = report.failed_rows - MAX_LOGGED_ERRORS_PER_TABLE,
                "Further insert failures not logged"
            );
        }
        info!(
            inserted = report.inserted,
            skipped = report.skipped_rows,
            failed = report.failed_rows,
            "Table finished"
        );
        report
    }

    /// Record the new id under the row's legacy key: `id`, else `user_id`,
    /// else the row index. Profiles are registered under both `id` and
    /// `user_id`.
    fn register_ids(&mut self, table: &TableDescriptor, row: &Row, index: usize, new_id: &str) {
        let id = row.get("id");
        let user_id = row.get("user_id");

        let legacy_key = id
            .or(user_id)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string());
        self.id_maps.record(table.name, legacy_key, new_id);

        if table.name == PROFILES_TABLE {
            if let (Some(_), Some(user_id)) = (id, user_id) {
                self.id_maps.record(table.name, user_id, new_id);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry;
    use crate::store::MemoryStore;
    use crate::transform::Document;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn importer_for(tables: &[&str]) -> Importer<MemoryStore> {
        let tables = tables.iter().map(|t| registry::find(t).unwrap()).collect();
        Importer::with_tables(MemoryStore::new(), tables, ImportOptions::default())
    }

    /// Fails every insert whose document has `fail` set
    #[derive(Default)]
    struct FlakyStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn insert(&self, table: &str, document: &Document) -> crate::error::Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if document.get("fail") == Some(&json!(true)) {
                return Err(ImportError::rejected(table, "validator rejected document"));
            }
            Ok(format!("id-{n}"))
        }
    }

    #[tokio::test]
    async fn test_self_reference_within_table() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "content_categories.csv",
            "id,name,parent_id\n1,Tech,\n2,AI,1\n3,Robotics,4\n4,Hardware,\n",
        );

        let mut importer = importer_for(&["content_categories"]);
        let report = importer.run(dir.path()).await.unwrap();

        let docs = importer.store().documents("content_categories");
        assert_eq!(docs.len(), 4);
        assert!(!docs[0].1.contains_key("parentId"));
        assert_eq!(docs[1].1["parentId"], json!(docs[0].0));
        // parent appears later in the file: link dropped, row still imported
        assert!(!docs[2].1.contains_key("parentId"));
        assert_eq!(report.table("content_categories").unwrap().inserted, 4);
        assert_eq!(importer.id_maps().len("content_categories"), 4);
    }

    #[tokio::test]
    async fn test_profiles_registered_by_id_and_user_id() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "profiles.csv", "id,user_id,email\n10,auth-abc,a@b.co\n");
        write(
            dir.path(),
            "orders.csv",
            "id,user_id,total\n1,auth-abc,20\n2,10,5\n3,nobody,7\n",
        );

        let mut importer = importer_for(&["profiles", "orders"]);
        let report = importer.run(dir.path()).await.unwrap();

        let profile_id = importer.id_maps().resolve("profiles", "10").unwrap().to_string();
        assert_eq!(importer.id_maps().resolve("profiles", "auth-abc"), Some(profile_id.as_str()));

        let orders = importer.store().documents("orders");
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|(_, doc)| doc["userId"] == json!(profile_id)));

        let orders_report = report.table("orders").unwrap();
        assert_eq!(orders_report.inserted, 2);
        assert_eq!(orders_report.skipped_rows, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_legacy_key_falls_back_to_row_index() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "newsletter_subscribers_rows.csv", "email\na@b.co\nc@d.co\n");

        let mut importer = importer_for(&["newsletter_subscribers"]);
        importer.run(dir.path()).await.unwrap();

        let ids = importer.id_maps().table("newsletter_subscribers").unwrap();
        assert_eq!(ids.get("0").map(String::as_str), Some("newsletter_subscribers:1"));
        assert_eq!(ids.get("1").map(String::as_str), Some("newsletter_subscribers:2"));
    }

    #[tokio::test]
    async fn test_insert_failures_do_not_stop_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = String::from("id,name,fail\n");
        for i in 0..10 {
            csv.push_str(&format!("{i},cat {i},{}\n", if i % 2 == 0 { "true" } else { "false" }));
        }
        write(dir.path(), "content_categories.csv", &csv);

        let tables = vec![registry::find("content_categories").unwrap()];
        let mut importer = Importer::with_tables(FlakyStore::default(), tables, ImportOptions::default());
        let report = importer.run(dir.path()).await.unwrap();

        let table = report.table("content_categories").unwrap();
        assert_eq!(importer.store().calls.load(Ordering::SeqCst), 10);
        assert_eq!(table.inserted, 5);
        assert_eq!(table.failed_rows, 5);
        assert_eq!(importer.id_maps().len("content_categories"), 5);
        assert_eq!(importer.id_maps().resolve("content_categories", "0"), None);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_empty_csvs_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "profiles.csv", "id,email\n");
        write(dir.path(), "products.csv", "id,name,price\n1,Preset pack,19\n");

        let mut importer = importer_for(&["profiles", "articles", "products"]);
        let report = importer.run(dir.path()).await.unwrap();

        assert_eq!(report.table("profiles").unwrap().status, TableStatus::Empty);
        assert_eq!(report.table("articles").unwrap().status, TableStatus::MissingCsv);
        assert_eq!(report.table("products").unwrap().inserted, 1);
        assert_eq!(report.total_errors(), 0);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_csv_counts_as_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("guides.csv"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        write(dir.path(), "products.csv", "id,name,price\n1,Kit,10\n");

        let mut importer = importer_for(&["guides", "products"]);
        let report = importer.run(dir.path()).await.unwrap();

        let guides = report.table("guides").unwrap();
        assert_eq!(guides.status, TableStatus::Unreadable);
        assert_eq!(guides.errors(), 1);
        assert_eq!(report.table("products").unwrap().inserted, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_only_option_keeps_registry_order() {
        let importer = Importer::new(
            MemoryStore::new(),
            ImportOptions {
                only: vec!["orders".to_string(), "profiles".to_string()],
                ..ImportOptions::default()
            },
        );
        let names: Vec<_> = importer.tables.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["profiles", "orders"]);
    }

    #[tokio::test]
    async fn test_missing_data_dir_is_fatal() {
        let mut importer = importer_for(&["profiles"]);
        let err = importer.run(Path::new("/no/such/dir")).await.unwrap_err();
        assert!(matches!(err, ImportError::ScanDir { .. }));
    }
}
