//! Schema error types.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of a [`SchemaError`].
///
/// Several concrete errors share a kind; callers that only care about the
/// category (e.g. "was this a bad reference or a bad relationship?") match on
/// this instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed identifier, default value or modifier combination.
    Configuration,
    /// A symbolic type reference with no matching enum or custom type.
    UnresolvedReference,
    /// A relationship whose target model or foreign key does not exist.
    DanglingRelationship,
    /// Duplicate top-level name across combined schemas.
    CombineCollision,
    /// Mutation attempted on a builder that already produced a graph.
    FrozenSchema,
}

/// Errors that can occur while building or combining a schema.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SchemaError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Model '{model}' uses '{field}' as an identifier field, but no such field exists")]
    #[diagnostic(
        code(data_schema::config::missing_identifier_field),
        help("Identifier fields must be declared as scalar fields on the same model")
    )]
    MissingIdentifierField {
        model: String,
        field: String,
    },

    #[error("Identifier field '{model}.{field}' must be required")]
    #[diagnostic(
        code(data_schema::config::optional_identifier_field),
        help("Call .required() on every field that is part of the identifier")
    )]
    OptionalIdentifierField {
        model: String,
        field: String,
    },

    #[error("Default value {value} of '{owner}.{field}' is not assignable to {expected}")]
    #[diagnostic(code(data_schema::config::invalid_default))]
    InvalidDefault {
        owner: String,
        field: String,
        value: String,
        expected: String,
    },

    #[error("Relationship '{model}.{relationship}' cannot use {fields:?} as a key for '{target}': {reason}")]
    #[diagnostic(code(data_schema::config::incompatible_foreign_key))]
    IncompatibleForeignKey {
        model: String,
        relationship: String,
        target: String,
        fields: Vec<String>,
        reason: String,
    },

    #[error(
        "Relationship '{model}.{relationship}' references {declared:?}, but '{inverse_model}.{inverse_relationship}' owns {expected:?}"
    )]
    #[diagnostic(
        code(data_schema::config::foreign_key_mismatch),
        help("The belongsTo side owns the foreign key; declare the same field names on both sides or omit them on the hasOne/hasMany side")
    )]
    ForeignKeyMismatch {
        model: String,
        relationship: String,
        declared: Vec<String>,
        inverse_model: String,
        inverse_relationship: String,
        expected: Vec<String>,
    },

    #[error("Invalid definition '{owner}.{member}': {reason}")]
    #[diagnostic(code(data_schema::config::invalid_definition))]
    InvalidDefinition {
        owner: String,
        member: String,
        reason: String,
    },

    #[error("Name '{name}' is already used by {existing}")]
    #[diagnostic(
        code(data_schema::config::duplicate_name),
        help("Models, enums, custom types and operations share one namespace per schema")
    )]
    DuplicateName {
        name: String,
        existing: String,
    },

    // =========================================================================
    // Reference Errors
    // =========================================================================
    #[error("Field '{owner}.{field}' references unknown type '{symbol}'")]
    #[diagnostic(
        code(data_schema::reference::unresolved),
        help("Define '{symbol}' as an enum or custom type in the same schema, or combine with the schema that defines it")
    )]
    UnresolvedReference {
        owner: String,
        field: String,
        symbol: String,
    },

    // =========================================================================
    // Relationship Errors
    // =========================================================================
    #[error("Relationship '{model}.{relationship}' targets unknown model '{target}'")]
    #[diagnostic(code(data_schema::relationship::missing_target))]
    MissingTargetModel {
        model: String,
        relationship: String,
        target: String,
    },

    #[error("Relationship '{model}.{relationship}' expects foreign key field '{key_model}.{field}', which does not exist")]
    #[diagnostic(
        code(data_schema::relationship::missing_foreign_key),
        help("Declare the foreign key field, or add a belongsTo on '{key_model}' so it can be synthesized")
    )]
    MissingForeignKey {
        model: String,
        relationship: String,
        key_model: String,
        field: String,
    },

    // =========================================================================
    // Combination Errors
    // =========================================================================
    #[error("Cannot combine schemas: {kind} '{name}' is defined more than once")]
    #[diagnostic(
        code(data_schema::combine::collision),
        help("Rename one of the definitions; combined schemas never rename on conflict")
    )]
    CombineCollision {
        name: String,
        kind: String,
    },

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Cannot {operation}: the schema has already been built")]
    #[diagnostic(code(data_schema::lifecycle::frozen))]
    FrozenSchema {
        operation: String,
    },
}

impl SchemaError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::MissingIdentifierField { .. }
            | SchemaError::OptionalIdentifierField { .. }
            | SchemaError::InvalidDefault { .. }
            | SchemaError::IncompatibleForeignKey { .. }
            | SchemaError::ForeignKeyMismatch { .. }
            | SchemaError::InvalidDefinition { .. }
            | SchemaError::DuplicateName { .. } => ErrorKind::Configuration,
            SchemaError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            SchemaError::MissingTargetModel { .. } | SchemaError::MissingForeignKey { .. } => {
                ErrorKind::DanglingRelationship
            }
            SchemaError::CombineCollision { .. } => ErrorKind::CombineCollision,
            SchemaError::FrozenSchema { .. } => ErrorKind::FrozenSchema,
        }
    }

    /// Creates an invalid definition error.
    pub fn invalid(
        owner: impl Into<String>,
        member: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDefinition {
            owner: owner.into(),
            member: member.into(),
            reason: reason.into(),
        }
    }

    /// Creates a frozen schema error.
    pub fn frozen(operation: impl Into<String>) -> Self {
        Self::FrozenSchema {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        let err = SchemaError::MissingForeignKey {
            model: "Company".to_string(),
            relationship: "employees".to_string(),
            key_model: "Employee".to_string(),
            field: "companyId".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::DanglingRelationship);
        assert_eq!(SchemaError::frozen("add a definition").kind(), ErrorKind::FrozenSchema);
        assert_eq!(
            SchemaError::invalid("Todo", "owner", "bad").kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = SchemaError::UnresolvedReference {
            owner: "Post".to_string(),
            field: "status".to_string(),
            symbol: "PostStatus".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Post.status"));
        assert!(message.contains("PostStatus"));
    }
}
