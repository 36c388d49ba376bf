//! Legacy-id to new-id lookups, one map per imported table

use std::collections::HashMap;

/// Accumulated id assignments for the whole run.
///
/// A table's map is created empty when the table starts importing and is
/// only appended to while that table's rows are inserted. Later tables only
/// read it.
#[derive(Debug, Clone, Default)]
pub struct IdMaps {
    tables: HashMap<String, HashMap<String, String>>,
}

impl IdMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `table` has a (possibly empty) map
    pub fn begin_table(&mut self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    pub fn record(&mut self, table: &str, legacy_id: impl Into<String>, new_id: impl Into<String>) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(legacy_id.into(), new_id.into());
    }

    /// New id assigned to `legacy_id` in `table`
    pub fn resolve(&self, table: &str, legacy_id: &str) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|ids| ids.get(legacy_id.trim()))
            .map(String::as_str)
    }

    pub fn table(&self, table: &str) -> Option<&HashMap<String, String>> {
        self.tables.get(table)
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, HashMap::len)
    }
}
