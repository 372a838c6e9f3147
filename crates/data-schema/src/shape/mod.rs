//! Client shape derivation.
//!
//! A [`ClientShape`] is the design-time contract handed to a typed client:
//! per model, the readable fields with concrete types, relationships as model
//! references, and the inputs accepted by create and update. Non-model types
//! reachable from the shape are lifted to named top-level entries.
//!
//! Derivation is a pure function of the graph (and caller); every collection
//! is ordered, so deriving twice yields identical shapes.

mod collect;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::access::{Caller, ModelCapabilities};
use crate::descriptor::{OperationKind, RelationshipKind, ScalarType};
use crate::graph::{FieldNode, FieldOrigin, ModelNode, RelationEdge, SchemaGraph, TypeRef};

/// A concrete client-side type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum ShapeType {
    Scalar(ScalarType),
    Enum(String),
    CustomType(String),
    Model(String),
}

impl From<&TypeRef> for ShapeType {
    fn from(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Scalar(s) => ShapeType::Scalar(*s),
            TypeRef::Enum(name) => ShapeType::Enum(name.clone()),
            TypeRef::CustomType(name) => ShapeType::CustomType(name.clone()),
            TypeRef::Model(name) => ShapeType::Model(name.clone()),
        }
    }
}

/// A field of a model, custom type, input or operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldShape {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ShapeType,
    pub required: bool,
    /// A list of `ty`.
    pub array: bool,
}

impl FieldShape {
    fn from_node(field: &FieldNode) -> Self {
        Self {
            name: field.name.clone(),
            ty: ShapeType::from(&field.field_type),
            required: field.required,
            array: field.array,
        }
    }

    fn relation(edge: &RelationEdge) -> Self {
        // A manyToMany surfaces as the list of join records.
        let target = match (&edge.kind, &edge.join_model) {
            (RelationshipKind::ManyToMany, Some(join)) => join.clone(),
            _ => edge.target.clone(),
        };
        Self {
            name: edge.name.clone(),
            ty: ShapeType::Model(target),
            required: false,
            array: edge.kind.is_collection(),
        }
    }
}

/// The client view of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelShape {
    pub name: String,
    pub identifier: Vec<String>,
    /// Readable fields, then relationships, in declaration order.
    pub fields: Vec<FieldShape>,
    /// `None` when creating is not allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_input: Option<Vec<FieldShape>>,
    /// `None` when updating is not allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_input: Option<Vec<FieldShape>>,
    pub can_delete: bool,
}

impl ModelShape {
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The client view of a custom operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationShape {
    pub name: String,
    pub kind: OperationKind,
    pub arguments: Vec<FieldShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<FieldShape>,
}

/// Everything a typed client needs to know about a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientShape {
    pub models: BTreeMap<String, ModelShape>,
    pub enums: BTreeMap<String, Vec<String>>,
    pub custom_types: BTreeMap<String, Vec<FieldShape>>,
    pub operations: BTreeMap<String, OperationShape>,
}

impl ClientShape {
    /// Derives the unrestricted shape: every model, field and operation.
    pub fn derive(graph: &SchemaGraph) -> Self {
        Deriver { graph, caller: None }.run()
    }

    /// Derives the shape as seen by `caller`.
    ///
    /// Models the caller can do nothing with are dropped, fields the caller
    /// cannot read are dropped, and inputs only list writable fields.
    pub fn for_caller(graph: &SchemaGraph, caller: &Caller) -> Self {
        Deriver {
            graph,
            caller: Some(caller),
        }
        .run()
    }

    pub fn model(&self, name: &str) -> Option<&ModelShape> {
        self.models.get(name)
    }
}

struct Deriver<'a> {
    graph: &'a SchemaGraph,
    caller: Option<&'a Caller>,
}

impl Deriver<'_> {
    fn run(&self) -> ClientShape {
        let models: BTreeMap<String, ModelShape> = self
            .graph
            .models()
            .filter_map(|model| self.model_shape(model))
            .map(|shape| (shape.name.clone(), shape))
            .collect();

        let operations: BTreeMap<String, OperationShape> = self
            .graph
            .custom_operations()
            .filter(|op| match self.caller {
                Some(caller) => self.graph.can_invoke(&op.name, caller).unwrap_or(false),
                None => true,
            })
            .map(|op| {
                let shape = OperationShape {
                    name: op.name.clone(),
                    kind: op.kind,
                    arguments: op.arguments.iter().map(FieldShape::from_node).collect(),
                    returns: op.returns.as_ref().map(|r| FieldShape {
                        name: "returns".to_string(),
                        ty: ShapeType::from(&r.field_type),
                        required: r.required,
                        array: r.array,
                    }),
                };
                (op.name.clone(), shape)
            })
            .collect();

        let (enums, custom_types) = collect::non_model_types(self.graph, &models, &operations);

        debug!(
            models = models.len(),
            enums = enums.len(),
            custom_types = custom_types.len(),
            operations = operations.len(),
            filtered = self.caller.is_some(),
            "Derived client shape"
        );

        ClientShape {
            models,
            enums,
            custom_types,
            operations,
        }
    }

    fn capabilities(&self, model: &ModelNode) -> Option<ModelCapabilities> {
        self.caller.map(|caller| model.capabilities(caller))
    }

    fn model_shape(&self, model: &ModelNode) -> Option<ModelShape> {
        let caps = self.capabilities(model);
        if let Some(caps) = &caps {
            if !(caps.read || caps.create || caps.update || caps.delete) {
                return None;
            }
        }

        let readable = |field: &FieldNode| caps.as_ref().map_or(true, |c| c.can_read_field(&field.name));
        let creatable = |field: &FieldNode| {
            caps.as_ref()
                .map_or(!field.is_read_only(), |c| c.field(&field.name).is_some_and(|f| f.create))
        };
        let updatable = |field: &FieldNode| {
            caps.as_ref()
                .map_or(!field.is_read_only(), |c| c.field(&field.name).is_some_and(|f| f.update))
        };
        let target_visible = |edge: &RelationEdge| {
            let target = edge.join_model.as_deref().unwrap_or(&edge.target);
            match (self.caller, self.graph.model(target)) {
                (None, Some(_)) => true,
                (Some(caller), Some(target)) => target.capabilities(caller).read,
                (_, None) => false,
            }
        };

        let is_key = |field: &FieldNode| model.identifier.contains(&field.name);
        let hidden = |field: &FieldNode| field.origin.is_hidden() && !is_key(field);

        let mut fields: Vec<FieldShape> = model
            .fields
            .iter()
            .filter(|&f| !hidden(f) && readable(f))
            .map(FieldShape::from_node)
            .collect();
        if caps.as_ref().map_or(true, |c| c.read) {
            fields.extend(
                model
                    .relationships
                    .iter()
                    .filter(|&edge| target_visible(edge))
                    .map(FieldShape::relation),
            );
        }

        let create_allowed = caps.as_ref().map_or(true, |c| c.create);
        let create_input = create_allowed.then(|| {
            model
                .fields
                .iter()
                .filter(|&f| creatable(f))
                .map(|f| FieldShape {
                    required: f.required
                        && f.default.is_none()
                        && f.origin != FieldOrigin::Identifier,
                    ..FieldShape::from_node(f)
                })
                .collect()
        });

        let update_allowed = caps.as_ref().map_or(true, |c| c.update);
        let update_input = update_allowed.then(|| {
            let keys = model.identifier_fields().map(|f| FieldShape {
                required: true,
                ..FieldShape::from_node(f)
            });
            let rest = model
                .fields
                .iter()
                .filter(|&f| !is_key(f) && updatable(f))
                .map(|f| FieldShape {
                    required: false,
                    ..FieldShape::from_node(f)
                });
            keys.chain(rest).collect()
        });

        Some(ModelShape {
            name: model.name.clone(),
            identifier: model.identifier.clone(),
            fields,
            create_input,
            update_input,
            can_delete: caps.as_ref().map_or(true, |c| c.delete),
        })
    }
}
