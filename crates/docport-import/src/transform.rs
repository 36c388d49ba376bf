//! Row transformer: raw CSV row -> typed document
//!
//! Each non-blank column is claimed by the first matching rule:
//!
//! 1. blank cell: no field written
//! 2. foreign key: replaced by the referenced row's new id, or dropped
//! 3. primary key `id`: kept verbatim as `legacyId`
//! 4. timestamp column, or any value shaped like an ISO datetime: epoch ms
//! 5. string-forced field: trimmed text
//! 6. boolean-looking text: `0`/`1` on number fields, `true`/`false` elsewhere
//! 7. number field: parsed number, or no field when it does not parse
//! 8. numeric-looking text on a field that is not an id or URL: number
//! 9. array-looking text: string array, collapsed unless the field holds arrays
//! 10. JSON object text: nested object
//! 11. anything else: trimmed text
//!
//! Declared array fields skip rules 6 and 8 so scalars still become
//! one-element arrays.
//!
//! Table-level normalization, business defaults and the required-field gate
//! run afterwards.

use crate::coerce::{
    array_to_value, collapse_json_array, is_boolean_like, number_value, to_array, to_bool,
    to_camel, to_json, to_ms, to_num,
};
use crate::idmap::IdMaps;
use crate::parser::Row;
use crate::registry::{self, TableDescriptor};
use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use uuid::Uuid;

/// Document ready for insertion, keyed by camelCase field name
pub type Document = serde_json::Map<String, Value>;

static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}").expect("ISO datetime pattern is valid")
});

/// Result of transforming one row
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    Ready(Document),
    /// A required field was still missing after defaults were applied
    Skip { missing_field: &'static str },
}

impl TransformOutcome {
    pub fn document(&self) -> Option<&Document> {
        match self {
            TransformOutcome::Ready(doc) => Some(doc),
            TransformOutcome::Skip { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, TransformOutcome::Skip { .. })
    }
}

/// Transform `row` for `table`, stamping defaults with the current time
pub fn transform_row(row: &Row, table: &TableDescriptor, id_maps: &IdMaps) -> TransformOutcome {
    transform_row_at(row, table, id_maps, Utc::now().timestamp_millis())
}

/// Transform `row` for `table` with `now_ms` as the default timestamp
pub fn transform_row_at(
    row: &Row,
    table: &TableDescriptor,
    id_maps: &IdMaps,
    now_ms: i64,
) -> TransformOutcome {
    let mut doc = Document::new();

    for (column, value) in row.iter() {
        let Some(raw) = value else {
            continue;
        };
        let field = to_camel(column);

        if let Some(target) = table.foreign_key(column) {
            if let Some(new_id) = id_maps.resolve(target, raw) {
                doc.insert(field, Value::String(new_id.to_string()));
            }
            continue;
        }

        if column == "id" {
            doc.insert("legacyId".to_string(), Value::String(raw.to_string()));
            continue;
        }

        if let Some(value) = coerce_cell(column, &field, raw) {
            doc.insert(field, value);
        }
    }

    normalize_timestamps(&mut doc, table.name, now_ms);
    normalize_field_types(&mut doc);
    apply_business_defaults(&mut doc, table.name, now_ms);

    let missing = table
        .required_fields
        .iter()
        .find(|field| doc.get(**field).map_or(true, Value::is_null));

    match missing {
        Some(field) => TransformOutcome::Skip {
            missing_field: *field,
        },
        None => TransformOutcome::Ready(doc),
    }
}

/// Apply the per-column rules (4 to 11 above) to one non-blank cell.
///
/// `None` means the field is not written.
fn coerce_cell(column: &str, field: &str, raw: &str) -> Option<Value> {
    if registry::is_date_column(column) || ISO_DATETIME.is_match(raw) {
        return to_ms(raw).map(Value::from);
    }

    if registry::is_string_field(field) {
        return Some(Value::String(raw.trim().to_string()));
    }

    let array_field = registry::is_array_field(field);

    if !array_field && is_boolean_like(raw) {
        let flag = to_bool(raw).unwrap_or(false);
        return Some(if registry::is_number_field(field) {
            Value::from(i64::from(flag))
        } else {
            Value::Bool(flag)
        });
    }

    if registry::is_number_field(field) {
        return to_num(raw).map(number_value);
    }

    if !array_field && !looks_like_id_or_url(field) {
        if let Some(n) = to_num(raw) {
            return Some(number_value(n));
        }
    }

    if looks_like_array(field, raw) {
        if let Some(items) = to_array(raw) {
            return Some(array_to_value(items, registry::keeps_array(field)));
        }
    }

    if raw.starts_with('{') && raw.ends_with('}') {
        if let Some(Value::Object(object)) = to_json(raw) {
            return Some(Value::Object(object));
        }
    }

    Some(Value::String(raw.trim().to_string()))
}

fn looks_like_id_or_url(field: &str) -> bool {
    field == "id"
        || field.ends_with("Id")
        || field.ends_with("Ids")
        || field.to_lowercase().contains("url")
}

fn looks_like_array(field: &str, raw: &str) -> bool {
    (raw.starts_with('[') && raw.ends_with(']')) || registry::is_array_field(field)
}

fn is_missing(doc: &Document, field: &str) -> bool {
    doc.get(field).map_or(true, Value::is_null)
}

fn normalize_timestamps(doc: &mut Document, table: &str, now_ms: i64) {
    if !registry::has_timestamps(table) {
        doc.remove("createdAt");
        doc.remove("updatedAt");
        return;
    }

    if is_missing(doc, "createdAt") {
        doc.insert("createdAt".to_string(), Value::from(now_ms));
    }

    if registry::has_updated_at(table) {
        if is_missing(doc, "updatedAt") {
            let created = doc.get("createdAt").cloned().unwrap_or(Value::from(now_ms));
            doc.insert("updatedAt".to_string(), created);
        }
    } else {
        doc.remove("updatedAt");
    }
}

/// Second pass over the finished document for values an earlier rule put
/// in the wrong shape.
fn normalize_field_types(doc: &mut Document) {
    for (field, value) in doc.iter_mut() {
        if let Value::Array(items) = value {
            if !registry::keeps_array(field) {
                *value = collapse_json_array(items);
            }
        }

        if registry::is_string_field(field) && value.is_number() {
            *value = Value::String(value.to_string());
        }

        if registry::is_array_field(field) {
            match value {
                Value::String(text) => {
                    let items = text
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| Value::String(item.to_string()))
                        .collect();
                    *value = Value::Array(items);
                },
                Value::Number(_) | Value::Bool(_) => {
                    *value = Value::Array(vec![Value::String(value.to_string())]);
                },
                _ => {},
            }
        }

        if registry::is_number_field(field) {
            if let Value::Bool(flag) = value {
                *value = Value::from(i64::from(*flag));
            }
        }
    }
}

/// Business fields that some tables default instead of skipping the row
const DEFAULTED_FIELDS: &[&str] = &["title", "slug", "content", "platform", "email"];

/// Placeholder content for business fields some tables cannot import
/// without. Linkage fields are never defaulted.
fn apply_business_defaults(doc: &mut Document, table: &str, now_ms: i64) {
    for field in DEFAULTED_FIELDS {
        let blank = match doc.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if !blank {
            continue;
        }
        if let Some(value) = business_default(table, field, now_ms) {
            doc.insert(field.to_string(), value);
        }
    }
}

fn business_default(table: &str, field: &str, now_ms: i64) -> Option<Value> {
    let value = match (table, field) {
        ("articles", "title") => Value::from("Untitled"),
        ("articles", "slug") => Value::from(generate_slug("article", now_ms)),
        ("learning_paths", "title") => Value::from("Untitled Path"),
        ("learning_paths", "slug") => Value::from(generate_slug("path", now_ms)),
        ("guides", "title") => Value::from("Untitled Guide"),
        ("guides", "slug") => Value::from(generate_slug("guide", now_ms)),
        ("guides", "platform") => Value::from("general"),
        ("articles" | "guides", "content") => Value::from(""),
        ("profiles", "email") => Value::from(format!(
            "{}@placeholder.invalid",
            generate_slug("imported", now_ms)
        )),
        _ => return None,
    };
    Some(value)
}

/// `<prefix>-<epoch ms>-<8 lowercase alphanumerics>`
pub fn generate_slug(prefix: &str, now_ms: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, now_ms, &suffix[..8])
}
