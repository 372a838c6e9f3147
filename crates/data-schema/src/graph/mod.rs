//! The resolved schema graph.
//!
//! A [`SchemaGraph`] is the immutable result of building a schema: every type
//! reference points at a real node, every relationship knows its foreign keys
//! and inverse, every model has a validated identifier and every field carries
//! its merged authorization rules.
//!
//! ```text
//! definitions ──► resolve ──► relationships ──► authorization ──► SchemaGraph
//!                 (types,     (belongsTo,       (principal
//!                  inline      hasOne/Many,      fields, rule
//!                  lifting,    manyToMany,       merging,
//!                  identifiers inverses)         timestamps)
//!                  defaults)
//! ```

mod authorization;
mod builder;
mod combine;
mod nodes;
mod relationships;
mod resolve;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SchemaConfig;
use crate::descriptor::{AuthRule, Definition};
use crate::diagnostic::SchemaResult;

pub use builder::{schema, SchemaBuilder};
pub use combine::combine;
pub use nodes::{
    CustomTypeNode, EnumNode, FieldNode, FieldOrigin, KeyLocation, MergedRule, ModelNode,
    OperationNode, RelationEdge, ReturnType, RuleOrigin, TypeOrigin, TypeRef,
};

/// Definitions a graph was built from, with global rules already applied to
/// every model and operation that declared none.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Sources {
    pub(crate) definitions: BTreeMap<String, Definition>,
    pub(crate) global_auth_rules: Vec<AuthRule>,
    pub(crate) config: SchemaConfig,
    /// Definitions built under a different configuration than `config`,
    /// keyed by definition name. Only combined schemas have entries.
    pub(crate) model_configs: BTreeMap<String, SchemaConfig>,
}

impl Sources {
    pub(crate) fn new(
        definitions: BTreeMap<String, Definition>,
        global_auth_rules: Vec<AuthRule>,
        config: SchemaConfig,
    ) -> Self {
        let definitions = definitions
            .into_iter()
            .map(|(name, definition)| {
                let definition = match definition {
                    Definition::Model(mut m) if m.auth_rules.is_empty() => {
                        m.auth_rules = global_auth_rules.clone();
                        Definition::Model(m)
                    }
                    Definition::CustomOperation(mut op) if op.auth_rules.is_empty() => {
                        op.auth_rules = global_auth_rules.clone();
                        Definition::CustomOperation(op)
                    }
                    other => other,
                };
                (name, definition)
            })
            .collect();

        Self {
            definitions,
            global_auth_rules,
            config,
            model_configs: BTreeMap::new(),
        }
    }

    pub(crate) fn build(self) -> SchemaResult<SchemaGraph> {
        let resolved = resolve::Resolver::run(&self, resolve::Mode::Strict)?;
        Ok(SchemaGraph {
            models: resolved.models,
            enums: resolved.enums,
            custom_types: resolved.custom_types,
            custom_operations: resolved.operations,
            global_auth_rules: self.global_auth_rules.clone(),
            config: self.config.clone(),
            sources: self,
        })
    }

    pub(crate) fn build_partial(self) -> SchemaResult<PartialSchema> {
        let resolved = resolve::Resolver::run(&self, resolve::Mode::Open)?;
        let names = namespace(
            &resolved.models,
            &resolved.enums,
            &resolved.custom_types,
            &resolved.operations,
        );
        Ok(PartialSchema {
            sources: self,
            names,
            external_references: resolved.external,
        })
    }
}

/// Every top-level name of a resolved schema with its kind, including join
/// models and lifted inline types.
fn namespace<M, E, C, O>(
    models: &BTreeMap<String, M>,
    enums: &BTreeMap<String, E>,
    custom_types: &BTreeMap<String, C>,
    operations: &BTreeMap<String, O>,
) -> BTreeMap<String, &'static str> {
    models
        .keys()
        .map(|name| (name.clone(), "model"))
        .chain(enums.keys().map(|name| (name.clone(), "enum")))
        .chain(custom_types.keys().map(|name| (name.clone(), "custom type")))
        .chain(operations.keys().map(|name| (name.clone(), "custom operation")))
        .collect()
}

/// A fully resolved, immutable schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraph {
    models: BTreeMap<String, ModelNode>,
    enums: BTreeMap<String, EnumNode>,
    custom_types: BTreeMap<String, CustomTypeNode>,
    custom_operations: BTreeMap<String, OperationNode>,
    global_auth_rules: Vec<AuthRule>,
    config: SchemaConfig,
    #[serde(skip)]
    sources: Sources,
}

impl SchemaGraph {
    /// Models in name order, join models included.
    pub fn models(&self) -> impl Iterator<Item = &ModelNode> {
        self.models.values()
    }

    pub fn model(&self, name: &str) -> Option<&ModelNode> {
        self.models.get(name)
    }

    /// Enums in name order, lifted inline enums included.
    pub fn enums(&self) -> impl Iterator<Item = &EnumNode> {
        self.enums.values()
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumNode> {
        self.enums.get(name)
    }

    /// Custom types in name order, lifted inline types included.
    pub fn custom_types(&self) -> impl Iterator<Item = &CustomTypeNode> {
        self.custom_types.values()
    }

    pub fn custom_type(&self, name: &str) -> Option<&CustomTypeNode> {
        self.custom_types.get(name)
    }

    pub fn custom_operations(&self) -> impl Iterator<Item = &OperationNode> {
        self.custom_operations.values()
    }

    pub fn custom_operation(&self, name: &str) -> Option<&OperationNode> {
        self.custom_operations.get(name)
    }

    /// Schema-wide rules applied to models and operations that declare none.
    pub fn global_auth_rules(&self) -> &[AuthRule] {
        &self.global_auth_rules
    }

    /// Configuration of the graph. A combined graph reports its first
    /// input's configuration; definitions from other inputs keep the one they
    /// were built under.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub(crate) fn sources(&self) -> &Sources {
        &self.sources
    }
}

/// A reference to a type or model that a partial schema does not define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalReference {
    /// Model, custom type or operation holding the reference.
    pub owner: String,
    /// Field, argument or relationship holding the reference.
    pub member: String,
    /// The missing name.
    pub symbol: String,
}

/// A schema validated in isolation, except for names it expects another
/// schema to define.
///
/// Produced by [`SchemaBuilder::build_partial`] and consumed by [`combine`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSchema {
    pub(crate) sources: Sources,
    /// Resolved top-level names, lifted and synthesized ones included.
    pub(crate) names: BTreeMap<String, &'static str>,
    external_references: Vec<ExternalReference>,
}

impl PartialSchema {
    /// References left open for [`combine`] to resolve.
    pub fn external_references(&self) -> &[ExternalReference] {
        &self.external_references
    }

    /// Whether the schema would also build on its own.
    pub fn is_self_contained(&self) -> bool {
        self.external_references.is_empty()
    }

    /// Names of every top-level definition.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.sources.definitions.keys().map(String::as_str)
    }
}

impl From<SchemaGraph> for PartialSchema {
    fn from(graph: SchemaGraph) -> Self {
        let names = namespace(
            &graph.models,
            &graph.enums,
            &graph.custom_types,
            &graph.custom_operations,
        );
        PartialSchema {
            sources: graph.sources,
            names,
            external_references: Vec::new(),
        }
    }
}
