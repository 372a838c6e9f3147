//! Non-model type extraction.

use std::collections::BTreeMap;

use super::{FieldShape, ModelShape, OperationShape, ShapeType};
use crate::graph::SchemaGraph;

/// Enums and custom types reachable from `models` and `operations`, keyed by
/// name. Each type appears once no matter how many fields use it.
pub(super) fn non_model_types(
    graph: &SchemaGraph,
    models: &BTreeMap<String, ModelShape>,
    operations: &BTreeMap<String, OperationShape>,
) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, Vec<FieldShape>>) {
    let mut pending: Vec<&ShapeType> = Vec::new();
    for model in models.values() {
        let inputs = model.create_input.iter().chain(&model.update_input).flatten();
        pending.extend(model.fields.iter().chain(inputs).map(|f| &f.ty));
    }
    for op in operations.values() {
        pending.extend(op.arguments.iter().chain(&op.returns).map(|f| &f.ty));
    }

    let mut enums = BTreeMap::new();
    let mut custom_types: BTreeMap<String, Vec<FieldShape>> = BTreeMap::new();
    let mut queue: Vec<ShapeType> = pending.into_iter().cloned().collect();

    while let Some(ty) = queue.pop() {
        match ty {
            ShapeType::Enum(name) if !enums.contains_key(&name) => {
                if let Some(e) = graph.enum_type(&name) {
                    enums.insert(name, e.values.clone());
                }
            }
            ShapeType::CustomType(name) if !custom_types.contains_key(&name) => {
                if let Some(ct) = graph.custom_type(&name) {
                    let fields: Vec<FieldShape> = ct.fields.iter().map(FieldShape::from_node).collect();
                    queue.extend(fields.iter().map(|f| f.ty.clone()));
                    custom_types.insert(name, fields);
                }
            }
            _ => {}
        }
    }

    (enums, custom_types)
}
