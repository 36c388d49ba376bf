//! Table registry for the creator platform export
//!
//! [`TABLES`] lists every importable table parents-first: a table's foreign
//! keys only point at tables earlier in the list, or at itself. The field
//! allow-lists below drive type coercion in the transformer.

/// A column whose value is the legacy primary key of another table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

const fn fk(column: &'static str, references: &'static str) -> ForeignKey {
    ForeignKey { column, references }
}

/// Static description of one source table / target collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Collection name; also the CSV base filename
    pub name: &'static str,
    pub foreign_keys: &'static [ForeignKey],
    /// Document fields (camelCase) that must be present or the row is skipped
    pub required_fields: &'static [&'static str],
}

impl TableDescriptor {
    /// Table referenced by `column`, if it is a foreign key
    pub fn foreign_key(&self, column: &str) -> Option<&'static str> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.column == column)
            .map(|fk| fk.references)
    }
}

pub static TABLES: &[TableDescriptor] = &[
    TableDescriptor {
        name: "profiles",
        foreign_keys: &[],
        required_fields: &["email"],
    },
    TableDescriptor {
        name: "content_categories",
        foreign_keys: &[fk("parent_id", "content_categories")],
        required_fields: &["name"],
    },
    TableDescriptor {
        name: "articles",
        foreign_keys: &[
            fk("author_id", "profiles"),
            fk("category_id", "content_categories"),
        ],
        required_fields: &["title", "slug"],
    },
    TableDescriptor {
        name: "article_tags",
        foreign_keys: &[fk("article_id", "articles")],
        required_fields: &["articleId", "tag"],
    },
    TableDescriptor {
        name: "learning_paths",
        foreign_keys: &[
            fk("author_id", "profiles"),
            fk("category_id", "content_categories"),
        ],
        required_fields: &["title", "slug"],
    },
    TableDescriptor {
        name: "path_modules",
        foreign_keys: &[fk("path_id", "learning_paths"), fk("article_id", "articles")],
        required_fields: &["pathId", "title"],
    },
    TableDescriptor {
        name: "guides",
        foreign_keys: &[
            fk("author_id", "profiles"),
            fk("category_id", "content_categories"),
        ],
        required_fields: &["title", "slug", "platform"],
    },
    TableDescriptor {
        name: "user_progress",
        foreign_keys: &[
            fk("user_id", "profiles"),
            fk("path_id", "learning_paths"),
            fk("module_id", "path_modules"),
        ],
        required_fields: &["userId", "pathId"],
    },
    TableDescriptor {
        name: "community_posts",
        foreign_keys: &[
            fk("author_id", "profiles"),
            fk("category_id", "content_categories"),
        ],
        required_fields: &["authorId", "content"],
    },
    TableDescriptor {
        name: "comments",
        foreign_keys: &[
            fk("post_id", "community_posts"),
            fk("article_id", "articles"),
            fk("author_id", "profiles"),
            fk("parent_id", "comments"),
        ],
        required_fields: &["authorId", "content"],
    },
    TableDescriptor {
        name: "products",
        foreign_keys: &[],
        required_fields: &["name", "price"],
    },
    TableDescriptor {
        name: "orders",
        foreign_keys: &[fk("user_id", "profiles")],
        required_fields: &["userId"],
    },
    TableDescriptor {
        name: "order_items",
        foreign_keys: &[fk("order_id", "orders"), fk("product_id", "products")],
        required_fields: &["orderId", "productId"],
    },
    TableDescriptor {
        name: "bookmarks",
        foreign_keys: &[
            fk("user_id", "profiles"),
            fk("article_id", "articles"),
            fk("guide_id", "guides"),
        ],
        required_fields: &["userId"],
    },
    TableDescriptor {
        name: "newsletter_subscribers",
        foreign_keys: &[],
        required_fields: &["email"],
    },
];

/// Source columns (snake_case) holding timestamps
const DATE_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "published_at",
    "started_at",
    "completed_at",
    "last_login_at",
    "last_accessed_at",
    "expires_at",
    "subscribed_at",
    "unsubscribed_at",
    "paid_at",
    "shipped_at",
    "deleted_at",
    "scheduled_for",
];

/// Fields kept as strings even when the value looks numeric
const STRING_FIELDS: &[&str] = &[
    "legacyId",
    "userId",
    "email",
    "username",
    "slug",
    "sku",
    "version",
    "phone",
    "postalCode",
    "zipCode",
    "currency",
    "orderNumber",
    "externalId",
    "stripeCustomerId",
    "stripePriceId",
    "stripeSessionId",
];

const NUMBER_FIELDS: &[&str] = &[
    "price",
    "compareAtPrice",
    "amount",
    "subtotal",
    "tax",
    "discount",
    "total",
    "quantity",
    "stock",
    "position",
    "sortOrder",
    "orderIndex",
    "viewCount",
    "likeCount",
    "commentCount",
    "readTime",
    "readTimeMinutes",
    "durationMinutes",
    "estimatedHours",
    "progress",
    "progressPercent",
    "rating",
    "score",
    "level",
    "xp",
];

const ARRAY_FIELDS: &[&str] = &[
    "tags",
    "categories",
    "keywords",
    "topics",
    "skills",
    "images",
    "platforms",
    "languages",
    "prerequisites",
    "learningOutcomes",
];

/// Free-form fields stored exactly as parsed
const ANY_FIELDS: &[&str] = &[
    "metadata",
    "settings",
    "preferences",
    "socialLinks",
    "seo",
    "data",
    "payload",
];

/// Collections whose schema has neither `createdAt` nor `updatedAt`
const NO_TIMESTAMP_TABLES: &[&str] = &["article_tags", "order_items"];

/// Collections whose schema carries `updatedAt`
const UPDATED_AT_TABLES: &[&str] = &[
    "profiles",
    "articles",
    "learning_paths",
    "path_modules",
    "guides",
    "user_progress",
    "community_posts",
    "comments",
    "products",
    "orders",
];

pub fn find(name: &str) -> Option<&'static TableDescriptor> {
    TABLES.iter().find(|t| t.name == name)
}

pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|t| t.name)
}

pub fn is_date_column(column: &str) -> bool {
    DATE_COLUMNS.contains(&column)
}

pub fn is_string_field(field: &str) -> bool {
    STRING_FIELDS.contains(&field)
}

pub fn is_number_field(field: &str) -> bool {
    NUMBER_FIELDS.contains(&field)
}

pub fn is_array_field(field: &str) -> bool {
    ARRAY_FIELDS.contains(&field)
}

/// Array and free-form fields may hold arrays; everything else is scalar
pub fn keeps_array(field: &str) -> bool {
    is_array_field(field) || ANY_FIELDS.contains(&field)
}

pub fn has_timestamps(table: &str) -> bool {
    !NO_TIMESTAMP_TABLES.contains(&table)
}

pub fn has_updated_at(table: &str) -> bool {
    UPDATED_AT_TABLES.contains(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_are_parents_first() {
        for (position, table) in TABLES.iter().enumerate() {
            for fk in table.foreign_keys {
                if fk.references == table.name {
                    continue;
                }
                let parent = TABLES
                    .iter()
                    .position(|t| t.name == fk.references)
                    .unwrap_or_else(|| panic!("{}.{} references unknown table", table.name, fk.column));
                assert!(
                    parent < position,
                    "{} must come before {} ({})",
                    fk.references,
                    table.name,
                    fk.column
                );
            }
        }
    }

    #[test]
    fn test_table_names_unique() {
        let names: HashSet<_> = table_names().collect();
        assert_eq!(names.len(), TABLES.len());
    }

    #[test]
    fn test_allow_lists_in_sync_with_tables() {
        for name in NO_TIMESTAMP_TABLES.iter().chain(UPDATED_AT_TABLES) {
            assert!(find(name).is_some(), "unknown table {name}");
        }
        for name in UPDATED_AT_TABLES {
            assert!(has_timestamps(name), "{name} has updatedAt but no timestamps");
        }
    }

    #[test]
    fn test_field_kinds_do_not_overlap() {
        for field in STRING_FIELDS {
            assert!(!is_number_field(field) && !keeps_array(field), "{field}");
        }
        for field in NUMBER_FIELDS {
            assert!(!keeps_array(field), "{field}");
        }
    }

    #[test]
    fn test_foreign_key_lookup() {
        let categories = find("content_categories").unwrap();
        assert_eq!(categories.foreign_key("parent_id"), Some("content_categories"));
        assert_eq!(categories.foreign_key("name"), None);
        assert!(find("no_such_table").is_none());
    }

    #[test]
    fn test_classification() {
        assert!(is_date_column("published_at"));
        assert!(!is_date_column("publishedAt"));
        assert!(is_string_field("sku"));
        assert!(is_number_field("price"));
        assert!(keeps_array("tags"));
        assert!(keeps_array("metadata"));
        assert!(!keeps_array("title"));
        assert!(!has_timestamps("order_items"));
        assert!(has_updated_at("articles"));
        assert!(!has_updated_at("bookmarks"));
    }
}
