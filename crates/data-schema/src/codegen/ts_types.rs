//! TypeScript type rendering for shape types.

use crate::descriptor::ScalarType;
use crate::shape::{FieldShape, ShapeType};

/// Converts a ShapeType to a TypeScript type string.
pub fn to_ts_type(ty: &ShapeType) -> String {
    match ty {
        ShapeType::Scalar(scalar) => scalar_ts_type(*scalar).to_string(),
        ShapeType::Enum(name) | ShapeType::CustomType(name) | ShapeType::Model(name) => name.clone(),
    }
}

fn scalar_ts_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Integer | ScalarType::Float | ScalarType::Timestamp => "number",
        ScalarType::Boolean => "boolean",
        ScalarType::Json => "unknown",
        _ => "string",
    }
}

/// Full type of a field, including list and nullability.
pub fn field_ts_type(field: &FieldShape) -> String {
    let base = to_ts_type(&field.ty);
    let base = if field.array { format!("{}[]", base) } else { base };
    if field.required {
        base
    } else {
        format!("{} | null", base)
    }
}

/// Formats a single field as an object type member.
pub fn format_field(field: &FieldShape) -> String {
    let optional_marker = if field.required { "" } else { "?" };
    format!("{}{}: {}", field.name, optional_marker, field_ts_type(field))
}

/// Generates an inline TypeScript object type.
pub fn generate_object_type(fields: &[FieldShape]) -> String {
    if fields.is_empty() {
        return "Record<string, never>".to_string();
    }
    let fields: Vec<String> = fields.iter().map(format_field).collect();
    format!("{{ {} }}", fields.join("; "))
}

/// Generates `export type Name = { ... };` with one member per line.
pub fn generate_type_alias(name: &str, fields: &[FieldShape]) -> String {
    if fields.is_empty() {
        return format!("export type {} = Record<string, never>;\n", name);
    }
    let mut output = format!("export type {} = {{\n", name);
    for field in fields {
        output.push_str(&format!("  {};\n", format_field(field)));
    }
    output.push_str("};\n");
    output
}

/// Quotes a string as a TypeScript string literal.
pub fn string_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: ShapeType, required: bool, array: bool) -> FieldShape {
        FieldShape {
            name: name.to_string(),
            ty,
            required,
            array,
        }
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(to_ts_type(&ShapeType::Scalar(ScalarType::Id)), "string");
        assert_eq!(to_ts_type(&ShapeType::Scalar(ScalarType::Timestamp)), "number");
        assert_eq!(to_ts_type(&ShapeType::Scalar(ScalarType::Boolean)), "boolean");
        assert_eq!(to_ts_type(&ShapeType::Scalar(ScalarType::Json)), "unknown");
    }

    #[test]
    fn test_list_and_nullability() {
        let tags = field("tags", ShapeType::Scalar(ScalarType::String), false, true);
        assert_eq!(field_ts_type(&tags), "string[] | null");
        let author = field("author", ShapeType::Model("User".to_string()), true, false);
        assert_eq!(format_field(&author), "author: User");
    }

    #[test]
    fn test_object_type() {
        let fields = vec![
            field("lat", ShapeType::Scalar(ScalarType::Float), true, false),
            field("label", ShapeType::Scalar(ScalarType::String), false, false),
        ];
        assert_eq!(
            generate_object_type(&fields),
            "{ lat: number; label?: string | null }"
        );
        assert_eq!(generate_object_type(&[]), "Record<string, never>");
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        assert_eq!(string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
