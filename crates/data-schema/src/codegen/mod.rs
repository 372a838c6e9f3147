//! TypeScript declaration generation from a client shape.
//!
//! Produces declaration files only; nothing is written to disk:
//! - `types.ts`: enums as string literal unions, custom types as object types
//! - `models.ts`: one type per model plus `Create<Model>Input` /
//!   `Update<Model>Input` where the shape allows it
//! - `operations.ts`: argument and result types of custom operations
//! - `index.ts`: re-exports

mod ts_types;

use tracing::debug;

use crate::naming::capitalize;
use crate::shape::{ClientShape, ModelShape, OperationShape};
use ts_types::{generate_object_type, generate_type_alias, string_literal, to_ts_type, field_ts_type};

/// Generated TypeScript code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Filename and content, in generation order.
    pub files: Vec<(String, String)>,
}

impl GeneratedCode {
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }
}

/// Generates TypeScript declarations for `shape`.
pub fn generate(shape: &ClientShape) -> GeneratedCode {
    let files = vec![
        ("types.ts".to_string(), generate_types(shape)),
        ("models.ts".to_string(), generate_models(shape)),
        ("operations.ts".to_string(), generate_operations(shape)),
        (
            "index.ts".to_string(),
            "export * from \"./types\";\nexport * from \"./models\";\nexport * from \"./operations\";\n"
                .to_string(),
        ),
    ];
    debug!(files = files.len(), "Generated TypeScript declarations");
    GeneratedCode { files }
}

const HEADER: &str = "// Generated from the schema. Do not edit.\n";

fn generate_types(shape: &ClientShape) -> String {
    let mut output = String::from(HEADER);

    for (name, values) in &shape.enums {
        let union: Vec<String> = values.iter().map(|v| string_literal(v)).collect();
        let union = if union.is_empty() {
            "never".to_string()
        } else {
            union.join(" | ")
        };
        output.push_str(&format!("\nexport type {} = {};\n", name, union));
    }

    for (name, fields) in &shape.custom_types {
        output.push('\n');
        output.push_str(&generate_type_alias(name, fields));
    }

    output
}

fn generate_models(shape: &ClientShape) -> String {
    let mut output = String::from(HEADER);
    output.push_str(&import_line(type_names(shape), "./types"));

    for model in shape.models.values() {
        output.push('\n');
        output.push_str(&generate_model(model));
    }

    output
}

fn generate_model(model: &ModelShape) -> String {
    let mut output = generate_type_alias(&model.name, &model.fields);

    if let Some(input) = &model.create_input {
        output.push_str(&generate_type_alias(&format!("Create{}Input", model.name), input));
    }
    if let Some(input) = &model.update_input {
        output.push_str(&generate_type_alias(&format!("Update{}Input", model.name), input));
    }
    if model.can_delete {
        let keys: Vec<_> = model
            .identifier
            .iter()
            .filter_map(|key| {
                let inputs = model.create_input.iter().chain(&model.update_input).flatten();
                model.fields.iter().chain(inputs).find(|f| f.name == *key)
            })
            .map(|f| format!("{}: {}", f.name, to_ts_type(&f.ty)))
            .collect();
        output.push_str(&format!(
            "export type Delete{}Input = {{ {} }};\n",
            model.name,
            keys.join("; ")
        ));
    }

    output
}

fn type_names(shape: &ClientShape) -> impl Iterator<Item = &str> {
    shape
        .enums
        .keys()
        .chain(shape.custom_types.keys())
        .map(String::as_str)
}

/// `import type { A, B } from "module";`, or nothing when there is nothing to
/// import.
fn import_line<'a>(names: impl Iterator<Item = &'a str>, module: &str) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        return String::new();
    }
    format!("import type {{ {} }} from {};\n", names.join(", "), string_literal(module))
}

fn generate_operations(shape: &ClientShape) -> String {
    let mut output = String::from(HEADER);
    output.push_str(&import_line(type_names(shape), "./types"));
    output.push_str(&import_line(shape.models.keys().map(String::as_str), "./models"));

    for op in shape.operations.values() {
        output.push('\n');
        output.push_str(&generate_operation(op));
    }

    output
}

fn generate_operation(op: &OperationShape) -> String {
    let type_name = capitalize(&op.name);
    let mut output = format!("/** {} */\n", op.kind.as_str());
    output.push_str(&format!(
        "export type {}Arguments = {};\n",
        type_name,
        generate_object_type(&op.arguments)
    ));
    let result = match &op.returns {
        Some(returns) => field_ts_type(returns),
        None => "void".to_string(),
    };
    output.push_str(&format!("export type {}Result = {};\n", type_name, result));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OperationKind, ScalarType};
    use crate::shape::{FieldShape, ShapeType};

    fn field(name: &str, ty: ShapeType, required: bool) -> FieldShape {
        FieldShape {
            name: name.to_string(),
            ty,
            required,
            array: false,
        }
    }

    fn sample() -> ClientShape {
        let mut shape = ClientShape::default();
        shape.enums.insert(
            "Priority".to_string(),
            vec!["low".to_string(), "high".to_string()],
        );
        let id = field("id", ShapeType::Scalar(ScalarType::Id), true);
        let content = field("content", ShapeType::Scalar(ScalarType::String), false);
        let priority = field("priority", ShapeType::Enum("Priority".to_string()), false);
        shape.models.insert(
            "Todo".to_string(),
            ModelShape {
                name: "Todo".to_string(),
                identifier: vec!["id".to_string()],
                fields: vec![id.clone(), content.clone(), priority.clone()],
                create_input: Some(vec![
                    FieldShape {
                        required: false,
                        ..id.clone()
                    },
                    content,
                ]),
                update_input: None,
                can_delete: true,
            },
        );
        shape.operations.insert(
            "echo".to_string(),
            OperationShape {
                name: "echo".to_string(),
                kind: OperationKind::Query,
                arguments: vec![field("content", ShapeType::Scalar(ScalarType::String), true)],
                returns: Some(field("returns", ShapeType::Scalar(ScalarType::String), false)),
            },
        );
        shape
    }

    #[test]
    fn test_generates_enum_unions() {
        let code = generate(&sample());
        let types = code.file("types.ts").unwrap();
        assert!(types.contains("export type Priority = \"low\" | \"high\";"));
    }

    #[test]
    fn test_generates_model_and_inputs() {
        let code = generate(&sample());
        let models = code.file("models.ts").unwrap();
        assert!(models.contains("export type Todo = {\n  id: string;\n  content?: string | null;\n  priority?: Priority | null;\n};"));
        assert!(models.contains("export type CreateTodoInput = {\n  id?: string | null;"));
        assert!(!models.contains("UpdateTodoInput"));
        assert!(models.contains("export type DeleteTodoInput = { id: string };"));
    }

    #[test]
    fn test_generates_operations() {
        let code = generate(&sample());
        let ops = code.file("operations.ts").unwrap();
        assert!(ops.contains("export type EchoArguments = { content: string };"));
        assert!(ops.contains("export type EchoResult = string | null;"));
    }

    #[test]
    fn test_imports_referenced_names() {
        let code = generate(&sample());
        assert!(code
            .file("models.ts")
            .unwrap()
            .contains("import type { Priority } from \"./types\";"));
        assert!(code
            .file("operations.ts")
            .unwrap()
            .contains("import type { Todo } from \"./models\";"));
    }

    #[test]
    fn test_file_list() {
        let generated = generate(&sample());
        let names: Vec<&str> = generated
            .files
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, ["types.ts", "models.ts", "operations.ts", "index.ts"]);
    }
}
