//! Identifier validation.
//!
//! Every identifier field must exist on the model, be required and hold a
//! single scalar or enum value.

use std::collections::BTreeSet;

use crate::diagnostic::{SchemaError, SchemaResult};
use crate::graph::{ModelNode, TypeRef};

/// Validates the identifier of a model.
pub(crate) fn validate_identifier(model: &ModelNode) -> SchemaResult<()> {
    if model.identifier.is_empty() {
        return Err(SchemaError::invalid(
            &model.name,
            "identifier",
            "an explicit identifier needs at least one field",
        ));
    }

    let mut seen = BTreeSet::new();
    for name in &model.identifier {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::invalid(
                &model.name,
                name,
                "listed more than once in the identifier",
            ));
        }

        let field = model
            .field(name)
            .ok_or_else(|| SchemaError::MissingIdentifierField {
                model: model.name.clone(),
                field: name.clone(),
            })?;

        if !field.required {
            return Err(SchemaError::OptionalIdentifierField {
                model: model.name.clone(),
                field: name.clone(),
            });
        }

        let keyable = matches!(field.field_type, TypeRef::Scalar(_) | TypeRef::Enum(_));
        if field.array || !keyable {
            return Err(SchemaError::invalid(
                &model.name,
                name,
                format!(
                    "identifier fields must hold a single scalar or enum value, found {}{}",
                    field.field_type.describe(),
                    if field.array { " list" } else { "" }
                ),
            ));
        }
    }

    Ok(())
}
