//! Target document stores
//!
//! The importer needs exactly one operation from its store: insert a
//! document into a named table and return the id the store assigned.

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::transform::Document;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document` into `table`, returning its new id
    async fn insert(&self, table: &str, document: &Document) -> Result<String>;
}

// ============================================================================
// Remote store
// ============================================================================

/// Store reached through the deployment's HTTP mutation endpoint.
///
/// Each insert is one `POST {deployment}/api/mutation` naming the
/// configured mutation with `{ table, document }` as its arguments.
pub struct RemoteStore {
    client: Client,
    endpoint: String,
    mutation_path: String,
}

#[derive(Serialize)]
struct MutationRequest<'a> {
    path: &'a str,
    args: InsertArgs<'a>,
    format: &'static str,
}

#[derive(Serialize)]
struct InsertArgs<'a> {
    table: &'a str,
    document: &'a Document,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum MutationResponse {
    Success {
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl RemoteStore {
    pub fn new(config: &ImportConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/mutation", config.deployment_url),
            mutation_path: config.mutation_path.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    async fn insert(&self, table: &str, document: &Document) -> Result<String> {
        let request = MutationRequest {
            path: &self.mutation_path,
            args: InsertArgs { table, document },
            format: "json",
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::rejected(
                table,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        match response.json::<MutationResponse>().await? {
            MutationResponse::Success { value: Value::String(id) } => {
                debug!(table, id = %id, "Inserted document");
                Ok(id)
            },
            MutationResponse::Success { value: Value::Null } => {
                Err(ImportError::rejected(table, "mutation returned no id"))
            },
            MutationResponse::Success { value } => Ok(value.to_string()),
            MutationResponse::Error { error_message } => {
                Err(ImportError::rejected(table, error_message))
            },
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store used for dry runs and tests.
///
/// Ids are `<table>:<n>` with `n` counting from 1 per table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryTables>,
}

#[derive(Debug, Default)]
struct MemoryTables {
    documents: Vec<(String, String, Document)>,
    counters: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(id, document)` pairs inserted into `table`, in insertion order
    pub fn documents(&self, table: &str) -> Vec<(String, Document)> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .documents
            .iter()
            .filter(|(t, _, _)| t == table)
            .map(|(_, id, doc)| (id.clone(), doc.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, table: &str, document: &Document) -> Result<String> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let counter = inner.counters.entry(table.to_string()).or_insert(0);
        *counter += 1;
        let id = format!("{}:{}", table, counter);
        inner
            .documents
            .push((table.to_string(), id.clone(), document.clone()));
        Ok(id)
    }
}
