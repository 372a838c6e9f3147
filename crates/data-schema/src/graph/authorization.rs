//! Authorization pass.
//!
//! Materializes the fields that owner and group rules read from, adds
//! timestamp fields and merges model-level rules into every field.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::nodes::{FieldNode, FieldOrigin, MergedRule, ModelNode, RuleOrigin, TypeRef};
use super::resolve::Resolver;
use crate::config::{SchemaConfig, TIMESTAMP_FIELDS};
use crate::descriptor::{Principal, ScalarType};
use crate::diagnostic::{SchemaError, SchemaResult};

impl Resolver<'_> {
    pub(super) fn apply_authorization(&mut self) -> SchemaResult<()> {
        // Join models follow the configuration of their first participant.
        let configs: BTreeMap<String, &SchemaConfig> = self
            .models
            .values()
            .map(|model| {
                let source = match model.relationships.first() {
                    Some(edge) if model.join_model => edge.target.as_str(),
                    _ => model.name.as_str(),
                };
                (model.name.clone(), self.config_for(source))
            })
            .collect();

        for model in self.models.values_mut() {
            let config = configs.get(&model.name).copied().unwrap_or(self.config);
            materialize_principal_fields(model, config)?;
            if config.timestamps {
                add_timestamps(model);
            }
            merge_rules(model);
        }
        debug!(models = self.models.len(), "Merged authorization rules");
        Ok(())
    }
}

/// A record field that a rule reads its principal from.
fn principal_field(principal: &Principal, config: &SchemaConfig) -> Option<(String, bool, FieldOrigin)> {
    match principal {
        Principal::Owner { field, multiple } => Some((
            field.clone().unwrap_or_else(|| config.owner_field.clone()),
            *multiple,
            FieldOrigin::Owner,
        )),
        Principal::GroupsFromField { field, multiple } => {
            Some((field.clone(), *multiple, FieldOrigin::GroupsField))
        }
        Principal::Group { .. }
        | Principal::PublicApiKey
        | Principal::PublicUnauthenticated
        | Principal::PrivateAuthenticated => None,
    }
}

fn materialize_principal_fields(model: &mut ModelNode, config: &SchemaConfig) -> SchemaResult<()> {
    let field_rules = model.fields.iter().flat_map(|f| f.field_rules());
    let wanted: Vec<(String, bool, FieldOrigin)> = model
        .auth_rules
        .iter()
        .chain(field_rules)
        .filter_map(|rule| principal_field(rule.principal(), config))
        .collect();

    for (name, multiple, origin) in wanted {
        match model.field(&name) {
            Some(existing) => {
                let string_like = matches!(
                    existing.field_type,
                    TypeRef::Scalar(s) if s.is_key_compatible(ScalarType::String)
                );
                if !string_like || existing.array != multiple {
                    return Err(SchemaError::invalid(
                        &model.name,
                        &name,
                        format!(
                            "{} rules need {}, found {}{}",
                            if origin == FieldOrigin::Owner { "owner" } else { "group" },
                            if multiple { "a list of strings" } else { "a single string" },
                            existing.field_type.describe(),
                            if existing.array { " list" } else { "" }
                        ),
                    ));
                }
            }
            None => {
                trace!(model = %model.name, field = %name, ?origin, "Materialized principal field");
                model.fields.push(FieldNode {
                    array: multiple,
                    ..FieldNode::materialized(name, TypeRef::Scalar(ScalarType::String), origin)
                });
            }
        }
    }
    Ok(())
}

fn add_timestamps(model: &mut ModelNode) {
    for name in TIMESTAMP_FIELDS {
        if model.field(name).is_none() {
            model.fields.push(FieldNode {
                required: true,
                ..FieldNode::materialized(name, TypeRef::Scalar(ScalarType::DateTime), FieldOrigin::Timestamp)
            });
        }
    }
}

/// Prefixes every field's own rules with the model rules.
fn merge_rules(model: &mut ModelNode) {
    let inherited: Vec<MergedRule> = model
        .auth_rules
        .iter()
        .cloned()
        .map(|rule| MergedRule {
            origin: RuleOrigin::Model,
            rule,
        })
        .collect();

    for field in &mut model.fields {
        let own = std::mem::take(&mut field.rules);
        field.rules = inherited.iter().cloned().chain(own).collect();
    }
}
