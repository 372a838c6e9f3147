//! Schema build configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a schema build.
///
/// Usually supplied by whatever loads the project configuration; every key is
/// optional and falls back to [`SchemaConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaConfig {
    /// Name of the synthetic identifier field for models without an explicit
    /// identifier.
    pub identifier_field: String,

    /// Field that stores the record owner for `owner()` rules that do not
    /// name one.
    pub owner_field: String,

    /// Add read-only `createdAt` / `updatedAt` fields to every model.
    pub timestamps: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            identifier_field: "id".to_string(),
            owner_field: "owner".to_string(),
            timestamps: true,
        }
    }
}

/// Names of the timestamp fields added when [`SchemaConfig::timestamps`] is on.
pub const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];
