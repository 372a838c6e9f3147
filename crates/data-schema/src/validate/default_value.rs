//! Default value validation.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::descriptor::ScalarType;
use crate::diagnostic::{SchemaError, SchemaResult};
use crate::graph::{CustomTypeNode, EnumNode, FieldNode, TypeRef};

/// Checks that the default of `field` (if any) is assignable to its type.
///
/// Array fields take a JSON array whose elements are assignable to the base
/// type. `null` is accepted only on optional fields.
pub(crate) fn validate_default(
    owner: &str,
    field: &FieldNode,
    enums: &BTreeMap<String, EnumNode>,
    custom_types: &BTreeMap<String, CustomTypeNode>,
) -> SchemaResult<()> {
    let Some(value) = &field.default else {
        return Ok(());
    };

    let checker = Checker {
        enums,
        custom_types,
    };
    let ok = match value {
        Value::Null => !field.required,
        Value::Array(items) if field.array => items
            .iter()
            .all(|item| checker.assignable(item, &field.field_type)),
        _ if field.array => false,
        _ => checker.assignable(value, &field.field_type),
    };

    if ok {
        Ok(())
    } else {
        Err(SchemaError::InvalidDefault {
            owner: owner.to_string(),
            field: field.name.clone(),
            value: value.to_string(),
            expected: expected(field),
        })
    }
}

fn expected(field: &FieldNode) -> String {
    let base = field.field_type.describe();
    match (field.array, field.required) {
        (true, true) => format!("required {} list", base),
        (true, false) => format!("{} list", base),
        (false, true) => format!("required {}", base),
        (false, false) => base,
    }
}

struct Checker<'a> {
    enums: &'a BTreeMap<String, EnumNode>,
    custom_types: &'a BTreeMap<String, CustomTypeNode>,
}

impl Checker<'_> {
    fn assignable(&self, value: &Value, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Scalar(scalar) => scalar_assignable(value, *scalar),
            TypeRef::Enum(name) => match (value, self.enums.get(name)) {
                (Value::String(s), Some(e)) => e.values.iter().any(|v| v == s),
                _ => false,
            },
            TypeRef::CustomType(name) => match (value, self.custom_types.get(name)) {
                (Value::Object(map), Some(ty)) => self.object_assignable(map, ty),
                _ => false,
            },
            TypeRef::Model(_) => false,
        }
    }

    fn object_assignable(&self, map: &serde_json::Map<String, Value>, ty: &CustomTypeNode) -> bool {
        if map.keys().any(|key| ty.field(key).is_none()) {
            return false;
        }
        ty.fields.iter().all(|field| match map.get(&field.name) {
            None | Some(Value::Null) => !field.required,
            Some(Value::Array(items)) if field.array => {
                items.iter().all(|item| self.assignable(item, &field.field_type))
            }
            Some(_) if field.array => false,
            Some(value) => self.assignable(value, &field.field_type),
        })
    }
}

fn scalar_assignable(value: &Value, scalar: ScalarType) -> bool {
    match scalar {
        ScalarType::Json => true,
        ScalarType::Boolean => value.is_boolean(),
        ScalarType::Integer | ScalarType::Timestamp => value.is_i64() || value.is_u64(),
        ScalarType::Float => value.is_number(),
        ScalarType::Email => value.as_str().is_some_and(|s| s.contains('@')),
        _ if scalar.is_string_like() => value.is_string(),
        _ => false,
    }
}
