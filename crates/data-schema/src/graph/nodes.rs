//! Frozen, resolved schema nodes.
//!
//! Everything here is produced by the builder and never mutated afterwards.
//! Nodes refer to each other by name; every name is guaranteed to resolve
//! within the owning [`super::SchemaGraph`].

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{AuthRule, OperationKind, RelationshipKind, ScalarType};

/// A resolved field type. Never symbolic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum TypeRef {
    Scalar(ScalarType),
    Enum(String),
    CustomType(String),
    /// Only produced for custom operation return types.
    Model(String),
}

impl TypeRef {
    /// The named non-model type this refers to, if any.
    pub fn non_model_name(&self) -> Option<&str> {
        match self {
            TypeRef::Enum(name) | TypeRef::CustomType(name) => Some(name),
            TypeRef::Scalar(_) | TypeRef::Model(_) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TypeRef::Scalar(s) => s.as_str().to_string(),
            TypeRef::Enum(name) => format!("enum {}", name),
            TypeRef::CustomType(name) => format!("custom type {}", name),
            TypeRef::Model(name) => format!("model {}", name),
        }
    }
}

/// Where a field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOrigin {
    /// Declared by the schema author.
    Declared,
    /// The synthetic identifier of a model without an explicit identifier.
    Identifier,
    /// Foreign key materialized for a relationship.
    ForeignKey,
    /// Owner field materialized for an owner rule.
    Owner,
    /// Group list field materialized for a groups-from-field rule.
    GroupsField,
    /// `createdAt` / `updatedAt`.
    Timestamp,
}

impl FieldOrigin {
    /// Hidden fields are omitted from the client read shape.
    pub fn is_hidden(&self) -> bool {
        matches!(self, FieldOrigin::ForeignKey)
    }
}

/// Attachment point a merged rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOrigin {
    Model,
    Field,
}

/// An authorization rule as seen by one field after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRule {
    pub origin: RuleOrigin,
    pub rule: AuthRule,
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub name: String,
    pub field_type: TypeRef,
    pub required: bool,
    pub array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub origin: FieldOrigin,
    /// Model-level rules followed by field-level rules, in declaration order.
    /// Empty for fields of custom types and operations.
    pub rules: Vec<MergedRule>,
}

impl FieldNode {
    pub(crate) fn materialized(name: impl Into<String>, field_type: TypeRef, origin: FieldOrigin) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            array: false,
            default: None,
            origin,
            rules: Vec::new(),
        }
    }

    /// Rules declared on the field itself.
    pub fn field_rules(&self) -> impl Iterator<Item = &AuthRule> {
        self.rules_from(RuleOrigin::Field)
    }

    /// Rules inherited from the model.
    pub fn model_rules(&self) -> impl Iterator<Item = &AuthRule> {
        self.rules_from(RuleOrigin::Model)
    }

    pub fn has_field_rules(&self) -> bool {
        self.rules.iter().any(|r| r.origin == RuleOrigin::Field)
    }

    /// Timestamps are maintained by the backend and never written by clients.
    pub fn is_read_only(&self) -> bool {
        self.origin == FieldOrigin::Timestamp
    }

    fn rules_from(&self, origin: RuleOrigin) -> impl Iterator<Item = &AuthRule> {
        self.rules
            .iter()
            .filter(move |r| r.origin == origin)
            .map(|r| &r.rule)
    }
}

/// Which model stores the foreign key of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyLocation {
    /// On the declaring model (`belongsTo`).
    Local,
    /// On the target model (`hasOne` / `hasMany`).
    Target,
    /// On the implicit join model (`manyToMany`).
    JoinModel,
}

/// A resolved relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdge {
    pub name: String,
    pub kind: RelationshipKind,
    pub target: String,
    /// Foreign key fields, ordered like the referenced identifier.
    pub foreign_keys: Vec<String>,
    pub key_location: KeyLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_model: Option<String>,
    /// Name of the relationship on the target that points back here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
}

/// A resolved model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelNode {
    pub name: String,
    pub fields: Vec<FieldNode>,
    pub identifier: Vec<String>,
    pub relationships: Vec<RelationEdge>,
    /// Effective model-level rules (the schema's global rules when the model
    /// declares none).
    pub auth_rules: Vec<AuthRule>,
    /// Synthesized for a many-to-many relationship.
    pub join_model: bool,
}

impl ModelNode {
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationEdge> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Identifier fields in key order.
    pub fn identifier_fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.identifier.iter().filter_map(|name| self.field(name))
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldNode> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}

/// Where a non-model type was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeOrigin {
    /// A top-level schema entry.
    Declared,
    /// Declared inline on a field and lifted under the field's capitalized
    /// name.
    Inline { owner: String, field: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumNode {
    pub name: String,
    pub values: Vec<String>,
    pub origin: TypeOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomTypeNode {
    pub name: String,
    pub fields: Vec<FieldNode>,
    pub origin: TypeOrigin,
}

impl CustomTypeNode {
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Resolved return type of a custom operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnType {
    pub field_type: TypeRef,
    pub required: bool,
    pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationNode {
    pub name: String,
    pub kind: OperationKind,
    pub arguments: Vec<FieldNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    pub auth_rules: Vec<AuthRule>,
}
