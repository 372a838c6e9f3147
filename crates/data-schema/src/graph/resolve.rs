//! Symbol resolution.
//!
//! The [`Resolver`] turns descriptors into nodes. It owns every intermediate
//! table while the graph is being built; the relationship and authorization
//! passes live in sibling modules as further `impl Resolver` blocks.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::nodes::{
    CustomTypeNode, EnumNode, FieldNode, FieldOrigin, MergedRule, ModelNode, OperationNode,
    ReturnType, RuleOrigin, TypeOrigin, TypeRef,
};
use super::{ExternalReference, Sources};
use crate::config::SchemaConfig;
use crate::descriptor::{
    CustomType, Definition, EnumType, FieldDescriptor, FieldType, IdentifierSpec,
    RelationshipDescriptor, ScalarType,
};
use crate::diagnostic::{SchemaError, SchemaResult};
use crate::naming::{lifted_type_name, return_type_name};
use crate::validate::{validate_default, validate_identifier};

/// How references to names outside the schema are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    /// Every reference must resolve.
    Strict,
    /// Missing names are recorded as [`ExternalReference`]s.
    Open,
}

/// What a top-level name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Symbol {
    Model,
    Enum,
    CustomType,
    Operation,
}

impl Symbol {
    fn kind_name(self) -> &'static str {
        match self {
            Symbol::Model => "model",
            Symbol::Enum => "enum",
            Symbol::CustomType => "custom type",
            Symbol::Operation => "custom operation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InlineType<'a> {
    Enum(&'a EnumType),
    Custom(&'a CustomType),
}

#[derive(Debug, Clone)]
struct Lifted<'a> {
    ty: InlineType<'a>,
    owner: String,
    field: String,
}

/// Output of a successful resolution.
pub(super) struct Resolved {
    pub(super) models: BTreeMap<String, ModelNode>,
    pub(super) enums: BTreeMap<String, EnumNode>,
    pub(super) custom_types: BTreeMap<String, CustomTypeNode>,
    pub(super) operations: BTreeMap<String, OperationNode>,
    pub(super) external: Vec<ExternalReference>,
}

pub(super) struct Resolver<'a> {
    pub(super) config: &'a SchemaConfig,
    model_configs: &'a BTreeMap<String, SchemaConfig>,
    pub(super) mode: Mode,
    definitions: &'a BTreeMap<String, Definition>,
    pub(super) symbols: BTreeMap<String, Symbol>,
    lifted: BTreeMap<String, Lifted<'a>>,
    pub(super) models: BTreeMap<String, ModelNode>,
    pub(super) enums: BTreeMap<String, EnumNode>,
    pub(super) custom_types: BTreeMap<String, CustomTypeNode>,
    pub(super) operations: BTreeMap<String, OperationNode>,
    /// Relationship descriptors per model, in declaration order.
    pub(super) pending: BTreeMap<String, Vec<(String, RelationshipDescriptor)>>,
    pub(super) external: Vec<ExternalReference>,
}

impl<'a> Resolver<'a> {
    /// Runs every phase over `sources`.
    pub(super) fn run(sources: &'a Sources, mode: Mode) -> SchemaResult<Resolved> {
        let mut resolver = Resolver {
            config: &sources.config,
            model_configs: &sources.model_configs,
            mode,
            definitions: &sources.definitions,
            symbols: BTreeMap::new(),
            lifted: BTreeMap::new(),
            models: BTreeMap::new(),
            enums: BTreeMap::new(),
            custom_types: BTreeMap::new(),
            operations: BTreeMap::new(),
            pending: BTreeMap::new(),
            external: Vec::new(),
        };

        resolver.register()?;
        resolver.resolve_non_models()?;
        resolver.resolve_models()?;
        resolver.resolve_operations()?;
        resolver.validate_defaults()?;
        resolver.resolve_relationships()?;
        resolver.apply_authorization()?;

        debug!(
            models = resolver.models.len(),
            enums = resolver.enums.len(),
            custom_types = resolver.custom_types.len(),
            operations = resolver.operations.len(),
            external = resolver.external.len(),
            "Resolved schema"
        );

        Ok(Resolved {
            models: resolver.models,
            enums: resolver.enums,
            custom_types: resolver.custom_types,
            operations: resolver.operations,
            external: resolver.external,
        })
    }

    /// Configuration the definition `name` was first built under.
    pub(super) fn config_for(&self, name: &str) -> &'a SchemaConfig {
        self.model_configs.get(name).unwrap_or(self.config)
    }

    /// Describes whatever currently holds `name`, for diagnostics.
    pub(super) fn describe(&self, name: &str) -> String {
        if let Some(lifted) = self.lifted.get(name) {
            return format!(
                "the inline type declared on '{}.{}'",
                lifted.owner, lifted.field
            );
        }
        match self.symbols.get(name) {
            Some(symbol) => format!("{} '{}'", symbol.kind_name(), name),
            None => format!("'{}'", name),
        }
    }

    /// Records a missing name, or fails in strict mode.
    pub(super) fn external(
        &mut self,
        owner: &str,
        member: &str,
        symbol: &str,
        strict_error: SchemaError,
    ) -> SchemaResult<()> {
        match self.mode {
            Mode::Strict => Err(strict_error),
            Mode::Open => {
                trace!(owner, member, symbol, "Recorded external reference");
                self.external.push(ExternalReference {
                    owner: owner.to_string(),
                    member: member.to_string(),
                    symbol: symbol.to_string(),
                });
                Ok(())
            }
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn register(&mut self) -> SchemaResult<()> {
        let definitions = self.definitions;
        for (name, definition) in definitions {
            let symbol = match definition {
                Definition::Model(_) => Symbol::Model,
                Definition::Enum(_) => Symbol::Enum,
                Definition::CustomType(_) => Symbol::CustomType,
                Definition::CustomOperation(_) => Symbol::Operation,
            };
            self.symbols.insert(name.clone(), symbol);
        }

        for (name, definition) in definitions {
            match definition {
                Definition::Model(m) => self.lift_fields(name, &m.fields)?,
                Definition::CustomType(ct) => self.lift_fields(name, &ct.fields)?,
                Definition::CustomOperation(op) => {
                    self.lift_fields(name, &op.arguments)?;
                    if let Some(returns) = &op.returns {
                        self.lift(name, &return_type_name(name), returns)?;
                    }
                }
                Definition::Enum(_) => {}
            }
        }

        debug!(
            symbols = self.symbols.len(),
            lifted = self.lifted.len(),
            "Registered schema names"
        );
        Ok(())
    }

    fn lift_fields(&mut self, owner: &str, fields: &'a [(String, FieldDescriptor)]) -> SchemaResult<()> {
        for (name, field) in fields {
            self.lift(owner, name, field)?;
        }
        Ok(())
    }

    /// Registers an inline enum or custom type under the field's capitalized
    /// name. Structurally identical definitions share one entry.
    fn lift(&mut self, owner: &str, field_name: &str, field: &'a FieldDescriptor) -> SchemaResult<()> {
        let (ty, symbol) = match &field.field_type {
            FieldType::InlineEnum(e) => (InlineType::Enum(e), Symbol::Enum),
            FieldType::InlineCustomType(c) => (InlineType::Custom(c), Symbol::CustomType),
            FieldType::Scalar(_) | FieldType::Ref(_) => return Ok(()),
        };

        let name = lifted_type_name(field_name);
        if self.symbols.contains_key(&name) {
            if self.same_definition(&name, ty) {
                trace!(owner, field = field_name, name = %name, "Shared inline type");
                return Ok(());
            }
            return Err(SchemaError::DuplicateName {
                existing: self.describe(&name),
                name,
            });
        }

        trace!(owner, field = field_name, name = %name, "Lifted inline type");
        self.symbols.insert(name.clone(), symbol);
        self.lifted.insert(
            name.clone(),
            Lifted {
                ty,
                owner: owner.to_string(),
                field: field_name.to_string(),
            },
        );

        if let InlineType::Custom(c) = ty {
            self.lift_fields(&name, &c.fields)?;
        }
        Ok(())
    }

    fn same_definition(&self, name: &str, ty: InlineType<'a>) -> bool {
        if let Some(lifted) = self.lifted.get(name) {
            return lifted.ty == ty;
        }
        match (self.definitions.get(name), ty) {
            (Some(Definition::Enum(declared)), InlineType::Enum(inline)) => declared == inline,
            (Some(Definition::CustomType(declared)), InlineType::Custom(inline)) => declared == inline,
            _ => false,
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Resolves a declared field type. `lift_as` is the field name an inline
    /// type was lifted under.
    fn resolve_type(
        &mut self,
        owner: &str,
        member: &str,
        lift_as: &str,
        ty: &FieldType,
        allow_model: bool,
    ) -> SchemaResult<TypeRef> {
        let symbol = match ty {
            FieldType::Scalar(scalar) => return Ok(TypeRef::Scalar(*scalar)),
            FieldType::InlineEnum(_) => return Ok(TypeRef::Enum(lifted_type_name(lift_as))),
            FieldType::InlineCustomType(_) => {
                return Ok(TypeRef::CustomType(lifted_type_name(lift_as)))
            }
            FieldType::Ref(symbol) => symbol,
        };

        match self.symbols.get(symbol).copied() {
            Some(Symbol::Enum) => Ok(TypeRef::Enum(symbol.clone())),
            Some(Symbol::CustomType) => Ok(TypeRef::CustomType(symbol.clone())),
            Some(Symbol::Model) if allow_model => Ok(TypeRef::Model(symbol.clone())),
            Some(Symbol::Model) => Err(SchemaError::invalid(
                owner,
                member,
                format!("'{}' is a model; link models with a relationship instead", symbol),
            )),
            Some(Symbol::Operation) => Err(SchemaError::invalid(
                owner,
                member,
                format!("'{}' is a custom operation, not a type", symbol),
            )),
            None => {
                let err = SchemaError::UnresolvedReference {
                    owner: owner.to_string(),
                    field: member.to_string(),
                    symbol: symbol.clone(),
                };
                self.external(owner, member, symbol, err)?;
                // Placeholder; open builds are discarded once external
                // references are collected.
                Ok(TypeRef::Scalar(ScalarType::Json))
            }
        }
    }

    fn resolve_field(
        &mut self,
        owner: &str,
        name: &str,
        field: &FieldDescriptor,
    ) -> SchemaResult<FieldNode> {
        let field_type = self.resolve_type(owner, name, name, &field.field_type, false)?;
        Ok(FieldNode {
            name: name.to_string(),
            field_type,
            required: field.required,
            array: field.array,
            default: field.default.clone(),
            origin: FieldOrigin::Declared,
            rules: field
                .auth_rules
                .iter()
                .cloned()
                .map(|rule| MergedRule {
                    origin: RuleOrigin::Field,
                    rule,
                })
                .collect(),
        })
    }

    /// Resolves fields of a custom type or operation, which cannot carry
    /// authorization rules.
    fn resolve_plain_fields(
        &mut self,
        owner: &str,
        fields: &[(String, FieldDescriptor)],
    ) -> SchemaResult<Vec<FieldNode>> {
        let mut out = Vec::with_capacity(fields.len());
        for (name, field) in fields {
            if !field.auth_rules.is_empty() {
                return Err(SchemaError::invalid(
                    owner,
                    name,
                    "authorization rules can only be attached to model fields",
                ));
            }
            out.push(self.resolve_field(owner, name, field)?);
        }
        Ok(out)
    }

    fn resolve_non_models(&mut self) -> SchemaResult<()> {
        let definitions = self.definitions;
        for (name, definition) in definitions {
            match definition {
                Definition::Enum(e) => {
                    self.enums.insert(
                        name.clone(),
                        EnumNode {
                            name: name.clone(),
                            values: e.values.clone(),
                            origin: TypeOrigin::Declared,
                        },
                    );
                }
                Definition::CustomType(ct) => {
                    let fields = self.resolve_plain_fields(name, &ct.fields)?;
                    self.custom_types.insert(
                        name.clone(),
                        CustomTypeNode {
                            name: name.clone(),
                            fields,
                            origin: TypeOrigin::Declared,
                        },
                    );
                }
                Definition::Model(_) | Definition::CustomOperation(_) => {}
            }
        }

        let lifted: Vec<(String, Lifted<'a>)> = self
            .lifted
            .iter()
            .map(|(name, lifted)| (name.clone(), lifted.clone()))
            .collect();
        for (name, lifted) in lifted {
            let origin = TypeOrigin::Inline {
                owner: lifted.owner,
                field: lifted.field,
            };
            match lifted.ty {
                InlineType::Enum(e) => {
                    self.enums.insert(
                        name.clone(),
                        EnumNode {
                            name,
                            values: e.values.clone(),
                            origin,
                        },
                    );
                }
                InlineType::Custom(c) => {
                    let fields = self.resolve_plain_fields(&name, &c.fields)?;
                    self.custom_types.insert(
                        name.clone(),
                        CustomTypeNode {
                            name,
                            fields,
                            origin,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Models and operations
    // =========================================================================

    fn resolve_models(&mut self) -> SchemaResult<()> {
        let definitions = self.definitions;
        for (name, definition) in definitions {
            let Definition::Model(m) = definition else {
                continue;
            };

            let mut fields = Vec::with_capacity(m.fields.len() + 1);
            for (field_name, field) in &m.fields {
                fields.push(self.resolve_field(name, field_name, field)?);
            }

            let identifier = match &m.identifier {
                IdentifierSpec::Implicit => {
                    let id = self.config_for(name).identifier_field.clone();
                    if !fields.iter().any(|f| f.name == id) {
                        fields.insert(
                            0,
                            FieldNode {
                                required: true,
                                ..FieldNode::materialized(
                                    id.clone(),
                                    TypeRef::Scalar(ScalarType::Id),
                                    FieldOrigin::Identifier,
                                )
                            },
                        );
                    }
                    vec![id]
                }
                IdentifierSpec::Explicit(names) => names.clone(),
            };

            let node = ModelNode {
                name: name.clone(),
                fields,
                identifier,
                relationships: Vec::new(),
                auth_rules: m.auth_rules.clone(),
                join_model: false,
            };
            validate_identifier(&node)?;
            trace!(model = %name, identifier = ?node.identifier, "Resolved model");

            self.pending.insert(name.clone(), m.relationships.clone());
            self.models.insert(name.clone(), node);
        }
        Ok(())
    }

    fn resolve_operations(&mut self) -> SchemaResult<()> {
        let definitions = self.definitions;
        for (name, definition) in definitions {
            let Definition::CustomOperation(op) = definition else {
                continue;
            };

            let arguments = self.resolve_plain_fields(name, &op.arguments)?;
            let returns = match &op.returns {
                Some(returns) => {
                    if !returns.auth_rules.is_empty() {
                        return Err(SchemaError::invalid(
                            name,
                            "returns",
                            "authorization rules can only be attached to model fields",
                        ));
                    }
                    let field_type = self.resolve_type(
                        name,
                        "returns",
                        &return_type_name(name),
                        &returns.field_type,
                        true,
                    )?;
                    Some(ReturnType {
                        field_type,
                        required: returns.required,
                        array: returns.array,
                    })
                }
                None => None,
            };

            self.operations.insert(
                name.clone(),
                OperationNode {
                    name: name.clone(),
                    kind: op.kind,
                    arguments,
                    returns,
                    handler: op.handler.clone(),
                    auth_rules: op.auth_rules.clone(),
                },
            );
        }
        Ok(())
    }

    fn validate_defaults(&self) -> SchemaResult<()> {
        let models = self.models.values().map(|m| (&m.name, &m.fields));
        let custom_types = self.custom_types.values().map(|t| (&t.name, &t.fields));
        let operations = self.operations.values().map(|o| (&o.name, &o.arguments));

        for (owner, fields) in models.chain(custom_types).chain(operations) {
            for field in fields {
                validate_default(owner, field, &self.enums, &self.custom_types)?;
            }
        }
        Ok(())
    }
}
