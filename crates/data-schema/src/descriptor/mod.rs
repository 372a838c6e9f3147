//! Declarative descriptors.
//!
//! Descriptors are plain values assembled with consuming builder calls. They
//! reference each other only by name; nothing is resolved until the schema is
//! built (see [`crate::graph`]).

pub mod auth;
pub mod field;
mod model;
mod non_model;
mod relationship;

pub use auth::{allow, AuthRule, Operation, OperationSet, Principal};
pub use field::{FieldDescriptor, FieldType, ScalarType};
pub use model::{model, IdentifierSpec, ModelDescriptor};
pub use non_model::{
    custom_type, enumeration, mutation, query, subscription, CustomOperation, CustomType,
    EnumType, OperationKind,
};
pub use relationship::{
    belongs_to, has_many, has_one, many_to_many, RelationshipDescriptor, RelationshipKind,
};

pub(crate) use non_model::insert_named;

/// A top-level schema entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Model(ModelDescriptor),
    Enum(EnumType),
    CustomType(CustomType),
    CustomOperation(CustomOperation),
}

impl Definition {
    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Definition::Model(_) => "model",
            Definition::Enum(_) => "enum",
            Definition::CustomType(_) => "custom type",
            Definition::CustomOperation(_) => "custom operation",
        }
    }
}

impl From<ModelDescriptor> for Definition {
    fn from(model: ModelDescriptor) -> Self {
        Definition::Model(model)
    }
}

impl From<EnumType> for Definition {
    fn from(enum_type: EnumType) -> Self {
        Definition::Enum(enum_type)
    }
}

impl From<CustomType> for Definition {
    fn from(custom_type: CustomType) -> Self {
        Definition::CustomType(custom_type)
    }
}

impl From<CustomOperation> for Definition {
    fn from(operation: CustomOperation) -> Self {
        Definition::CustomOperation(operation)
    }
}
