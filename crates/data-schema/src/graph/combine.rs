//! Combining schemas.

use std::collections::BTreeMap;

use tracing::debug;

use super::{PartialSchema, SchemaGraph, Sources};
use crate::diagnostic::{SchemaError, SchemaResult};

/// Merges several schemas into one graph.
///
/// Accepts finished graphs and partial schemas alike. Every resolved name
/// (models, join models, enums, custom types and operations, inline types
/// included) must be unique across all inputs; references left open by a
/// partial schema must be satisfied by one of the others.
///
/// Every definition keeps what it was built with: its own schema's global
/// rules and its own schema's configuration. The result reports the first
/// input's configuration.
pub fn combine<I>(schemas: I) -> SchemaResult<SchemaGraph>
where
    I: IntoIterator,
    I::Item: Into<PartialSchema>,
{
    let inputs: Vec<PartialSchema> = schemas.into_iter().map(Into::into).collect();
    let config = inputs
        .first()
        .map(|input| input.sources.config.clone())
        .unwrap_or_default();

    let mut claimed: BTreeMap<String, &'static str> = BTreeMap::new();
    let mut definitions = BTreeMap::new();
    let mut model_configs = BTreeMap::new();
    let mut global_auth_rules = Vec::new();
    let count = inputs.len();

    for input in inputs {
        for (name, kind) in input.names {
            if claimed.contains_key(&name) {
                return Err(SchemaError::CombineCollision {
                    kind: kind.to_string(),
                    name,
                });
            }
            claimed.insert(name, kind);
        }

        let sources = input.sources;
        for (name, definition) in sources.definitions {
            let built_with = sources.model_configs.get(&name).unwrap_or(&sources.config);
            if *built_with != config {
                model_configs.insert(name.clone(), built_with.clone());
            }
            definitions.insert(name, definition);
        }
        global_auth_rules.extend(sources.global_auth_rules);
    }

    debug!(
        schemas = count,
        definitions = definitions.len(),
        reconfigured = model_configs.len(),
        "Combining schemas"
    );

    // Rules are already applied per definition, so the merged global list
    // must not be re-applied.
    Sources {
        definitions,
        global_auth_rules,
        config,
        model_configs,
    }
    .build()
}
