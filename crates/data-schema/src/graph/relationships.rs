//! Relationship resolution.
//!
//! Runs after every model has its declared fields and identifier:
//!
//! 1. `belongsTo` edges, which own their foreign keys and may materialize them
//! 2. `hasOne` / `hasMany` edges, which adopt the keys of the inverse
//!    `belongsTo` on the target, or reference key fields on the target directly
//! 3. `manyToMany` edges, which synthesize one join model per pair
//! 4. inverse linking of `belongsTo` edges

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::nodes::{FieldNode, FieldOrigin, KeyLocation, ModelNode, RelationEdge, TypeRef};
use super::resolve::{Resolver, Symbol};
use crate::descriptor::{AuthRule, RelationshipDescriptor, RelationshipKind};
use crate::diagnostic::{SchemaError, SchemaResult};
use crate::naming::{default_foreign_key, default_join_model, lower_first};

/// Identifier fields of a model with their resolved types.
type KeyShape = Vec<(String, TypeRef)>;

/// A join model being assembled from one or both sides of a many-to-many.
struct JoinSpec {
    /// Participants in name order.
    participants: [String; 2],
    /// `(model, relationship)` for each side that declared it.
    sides: Vec<(String, String)>,
}

impl Resolver<'_> {
    pub(super) fn resolve_relationships(&mut self) -> SchemaResult<()> {
        self.check_relationship_descriptors()?;
        self.resolve_belongs_to()?;
        self.resolve_has()?;
        self.resolve_many_to_many()?;
        self.link_inverses();
        self.restore_declaration_order();

        debug!(
            edges = self.models.values().map(|m| m.relationships.len()).sum::<usize>(),
            "Resolved relationships"
        );
        Ok(())
    }

    fn relationships_of(&self, model: &str, kinds: &[RelationshipKind]) -> Vec<(String, RelationshipDescriptor)> {
        self.pending
            .get(model)
            .map(|rels| {
                rels.iter()
                    .filter(|(_, desc)| kinds.contains(&desc.kind))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    fn key_shape(&self, model: &str) -> Option<KeyShape> {
        self.models.get(model).map(|m| {
            m.identifier_fields()
                .map(|f| (f.name.clone(), f.field_type.clone()))
                .collect()
        })
    }

    fn push_edge(&mut self, model: &str, edge: RelationEdge) {
        trace!(
            model,
            relationship = %edge.name,
            kind = edge.kind.as_str(),
            target = %edge.target,
            keys = ?edge.foreign_keys,
            "Resolved relationship"
        );
        if let Some(node) = self.models.get_mut(model) {
            node.relationships.push(edge);
        }
    }

    /// Handles a relationship whose target is not a model of this schema.
    fn dangling_target(&mut self, model: &str, relationship: &str, target: &str) -> SchemaResult<()> {
        if self.symbols.contains_key(target) {
            return Err(SchemaError::invalid(
                model,
                relationship,
                format!("{} is not a model", self.describe(target)),
            ));
        }
        let err = SchemaError::MissingTargetModel {
            model: model.to_string(),
            relationship: relationship.to_string(),
            target: target.to_string(),
        };
        self.external(model, relationship, target, err)
    }

    // =========================================================================
    // Descriptor checks
    // =========================================================================

    fn check_relationship_descriptors(&self) -> SchemaResult<()> {
        for (model, rels) in &self.pending {
            let Some(node) = self.models.get(model) else {
                continue;
            };
            for (name, desc) in rels {
                if node.field(name).is_some() {
                    return Err(SchemaError::invalid(
                        model,
                        name,
                        "declared as both a field and a relationship",
                    ));
                }
                if desc.join_model.is_some() && desc.kind != RelationshipKind::ManyToMany {
                    return Err(SchemaError::invalid(
                        model,
                        name,
                        "through() only applies to manyToMany relationships",
                    ));
                }
                match &desc.foreign_keys {
                    Some(_) if desc.kind == RelationshipKind::ManyToMany => {
                        return Err(SchemaError::invalid(
                            model,
                            name,
                            "manyToMany relationships take their keys from the join model",
                        ));
                    }
                    Some(keys) if keys.is_empty() => {
                        return Err(SchemaError::invalid(
                            model,
                            name,
                            "references() needs at least one field",
                        ));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // belongsTo
    // =========================================================================

    fn resolve_belongs_to(&mut self) -> SchemaResult<()> {
        for model in self.model_names() {
            for (name, desc) in self.relationships_of(&model, &[RelationshipKind::BelongsTo]) {
                let Some(target_key) = self.key_shape(&desc.target) else {
                    self.dangling_target(&model, &name, &desc.target)?;
                    continue;
                };

                let declared = desc.foreign_keys.is_some();
                let keys: Vec<String> = match &desc.foreign_keys {
                    Some(keys) => keys.clone(),
                    None => target_key
                        .iter()
                        .map(|(id, _)| default_foreign_key(&desc.target, id))
                        .collect(),
                };
                check_key_count(&model, &name, &desc.target, &keys, &target_key)?;

                let mut materialized = Vec::new();
                if let Some(node) = self.models.get(&model) {
                    for (key, (_, id_type)) in keys.iter().zip(&target_key) {
                        if !declared {
                            if let Some(other) = node.relationships.iter().find(|e| {
                                e.kind == RelationshipKind::BelongsTo && e.foreign_keys.contains(key)
                            }) {
                                return Err(SchemaError::invalid(
                                    &model,
                                    &name,
                                    format!(
                                        "implicit foreign key '{}' is already used by relationship '{}'; name the keys with references()",
                                        key, other.name
                                    ),
                                ));
                            }
                        }

                        match node.field(key) {
                            Some(field) => check_key_field(&model, &name, &desc.target, &keys, field, id_type)?,
                            None if declared => {
                                return Err(SchemaError::MissingForeignKey {
                                    model: model.clone(),
                                    relationship: name.clone(),
                                    key_model: model.clone(),
                                    field: key.clone(),
                                });
                            }
                            None => materialized.push(FieldNode::materialized(
                                key.clone(),
                                id_type.clone(),
                                FieldOrigin::ForeignKey,
                            )),
                        }
                    }
                }

                if let Some(node) = self.models.get_mut(&model) {
                    for field in materialized {
                        trace!(model = %model, field = %field.name, "Materialized foreign key");
                        node.fields.push(field);
                    }
                }

                self.push_edge(
                    &model,
                    RelationEdge {
                        name,
                        kind: RelationshipKind::BelongsTo,
                        target: desc.target,
                        foreign_keys: keys,
                        key_location: KeyLocation::Local,
                        join_model: None,
                        inverse: None,
                    },
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // hasOne / hasMany
    // =========================================================================

    fn resolve_has(&mut self) -> SchemaResult<()> {
        let kinds = [RelationshipKind::HasOne, RelationshipKind::HasMany];
        for model in self.model_names() {
            let source_key = self.key_shape(&model).unwrap_or_default();

            for (name, desc) in self.relationships_of(&model, &kinds) {
                let candidates: Option<Vec<(String, Vec<String>)>> =
                    self.models.get(&desc.target).map(|target| {
                        target
                            .relationships
                            .iter()
                            .filter(|e| e.kind == RelationshipKind::BelongsTo && e.target == model)
                            .map(|e| (e.name.clone(), e.foreign_keys.clone()))
                            .collect()
                    });
                let Some(candidates) = candidates else {
                    self.dangling_target(&model, &name, &desc.target)?;
                    continue;
                };

                let (keys, inverse) = match (&desc.foreign_keys, candidates.as_slice()) {
                    (declared, []) => {
                        let keys = match declared {
                            Some(keys) => keys.clone(),
                            None => source_key
                                .iter()
                                .map(|(id, _)| default_foreign_key(&model, id))
                                .collect(),
                        };
                        self.check_target_keys(&model, &name, &desc.target, &keys, &source_key)?;
                        (keys, None)
                    }
                    (Some(declared), candidates) => {
                        match candidates.iter().find(|(_, keys)| keys == declared) {
                            Some((inverse, keys)) => (keys.clone(), Some(inverse.clone())),
                            None => {
                                let (inverse, expected) = &candidates[0];
                                return Err(SchemaError::ForeignKeyMismatch {
                                    model: model.clone(),
                                    relationship: name,
                                    declared: declared.clone(),
                                    inverse_model: desc.target,
                                    inverse_relationship: inverse.clone(),
                                    expected: expected.clone(),
                                });
                            }
                        }
                    }
                    (None, [(inverse, keys)]) => (keys.clone(), Some(inverse.clone())),
                    (None, candidates) => {
                        let names: Vec<&str> = candidates.iter().map(|(n, _)| n.as_str()).collect();
                        return Err(SchemaError::invalid(
                            &model,
                            &name,
                            format!(
                                "'{}' has several belongsTo relationships to '{}' ({}); name the foreign keys with references()",
                                desc.target,
                                model,
                                names.join(", ")
                            ),
                        ));
                    }
                };

                self.push_edge(
                    &model,
                    RelationEdge {
                        name,
                        kind: desc.kind,
                        target: desc.target,
                        foreign_keys: keys,
                        key_location: KeyLocation::Target,
                        join_model: None,
                        inverse,
                    },
                );
            }
        }
        Ok(())
    }

    /// Checks keys that a `hasOne` / `hasMany` without an inverse expects on
    /// its target.
    fn check_target_keys(
        &self,
        model: &str,
        relationship: &str,
        target: &str,
        keys: &[String],
        source_key: &KeyShape,
    ) -> SchemaResult<()> {
        check_key_count(model, relationship, model, keys, source_key)?;
        let Some(target_node) = self.models.get(target) else {
            return Ok(());
        };
        for (key, (_, id_type)) in keys.iter().zip(source_key) {
            let field = target_node
                .field(key)
                .ok_or_else(|| SchemaError::MissingForeignKey {
                    model: model.to_string(),
                    relationship: relationship.to_string(),
                    key_model: target.to_string(),
                    field: key.clone(),
                })?;
            check_key_field(model, relationship, model, keys, field, id_type)?;
        }
        Ok(())
    }

    // =========================================================================
    // manyToMany
    // =========================================================================

    fn resolve_many_to_many(&mut self) -> SchemaResult<()> {
        let mut joins: BTreeMap<String, JoinSpec> = BTreeMap::new();

        for model in self.model_names() {
            for (name, desc) in self.relationships_of(&model, &[RelationshipKind::ManyToMany]) {
                if !self.models.contains_key(&desc.target) {
                    self.dangling_target(&model, &name, &desc.target)?;
                    continue;
                }
                if desc.target == model {
                    return Err(SchemaError::invalid(
                        &model,
                        &name,
                        "manyToMany relationships between a model and itself are not supported",
                    ));
                }

                let join = desc
                    .join_model
                    .clone()
                    .unwrap_or_else(|| default_join_model(&model, &desc.target));
                let mut participants = [model.clone(), desc.target.clone()];
                participants.sort();

                match joins.get_mut(&join) {
                    Some(spec) => {
                        if spec.participants != participants {
                            return Err(SchemaError::invalid(
                                &model,
                                &name,
                                format!(
                                    "join model '{}' already links '{}' and '{}'",
                                    join, spec.participants[0], spec.participants[1]
                                ),
                            ));
                        }
                        if let Some((_, other)) = spec.sides.iter().find(|(m, _)| *m == model) {
                            return Err(SchemaError::invalid(
                                &model,
                                &name,
                                format!("relationship '{}' already links through '{}'", other, join),
                            ));
                        }
                        spec.sides.push((model.clone(), name));
                    }
                    None => {
                        if self.symbols.contains_key(&join) {
                            return Err(SchemaError::DuplicateName {
                                existing: self.describe(&join),
                                name: join,
                            });
                        }
                        joins.insert(
                            join,
                            JoinSpec {
                                participants,
                                sides: vec![(model.clone(), name)],
                            },
                        );
                    }
                }
            }
        }

        for (join, spec) in joins {
            self.synthesize_join_model(join, spec)?;
        }
        Ok(())
    }

    fn synthesize_join_model(&mut self, join: String, spec: JoinSpec) -> SchemaResult<()> {
        let mut fields: Vec<FieldNode> = Vec::new();
        let mut relationships = Vec::new();
        let mut auth_rules: Vec<AuthRule> = Vec::new();
        let mut side_keys: Vec<Vec<String>> = Vec::new();

        for participant in &spec.participants {
            let key_shape = self.key_shape(participant).unwrap_or_default();
            let mut keys = Vec::with_capacity(key_shape.len());
            for (id, id_type) in key_shape {
                let key = default_foreign_key(participant, &id);
                if fields.iter().any(|f| f.name == key) {
                    return Err(SchemaError::invalid(
                        &join,
                        &key,
                        "both sides of the join model produce the same foreign key",
                    ));
                }
                fields.push(FieldNode {
                    required: true,
                    ..FieldNode::materialized(key.clone(), id_type, FieldOrigin::ForeignKey)
                });
                keys.push(key);
            }

            relationships.push(RelationEdge {
                name: lower_first(participant),
                kind: RelationshipKind::BelongsTo,
                target: participant.clone(),
                foreign_keys: keys.clone(),
                key_location: KeyLocation::Local,
                join_model: None,
                inverse: None,
            });
            if let Some(node) = self.models.get(participant) {
                auth_rules.extend(node.auth_rules.iter().cloned());
            }
            side_keys.push(keys);
        }

        let node = ModelNode {
            name: join.clone(),
            identifier: fields.iter().map(|f| f.name.clone()).collect(),
            fields,
            relationships,
            auth_rules,
            join_model: true,
        };
        debug!(join_model = %join, participants = ?spec.participants, "Synthesized join model");
        self.symbols.insert(join.clone(), Symbol::Model);
        self.models.insert(join.clone(), node);

        for (model, name) in &spec.sides {
            let side = usize::from(spec.participants[0] != *model);
            let other = &spec.participants[1 - side];
            let inverse = spec
                .sides
                .iter()
                .find(|(m, _)| m == other)
                .map(|(_, rel)| rel.clone());
            self.push_edge(
                model,
                RelationEdge {
                    name: name.clone(),
                    kind: RelationshipKind::ManyToMany,
                    target: other.clone(),
                    foreign_keys: side_keys[side].clone(),
                    key_location: KeyLocation::JoinModel,
                    join_model: Some(join.clone()),
                    inverse,
                },
            );
        }
        Ok(())
    }

    // =========================================================================
    // Finishing
    // =========================================================================

    /// Points every `belongsTo` at the `hasOne` / `hasMany` that shares its
    /// keys.
    fn link_inverses(&mut self) {
        let mut links: Vec<(String, usize, String)> = Vec::new();
        for (name, node) in &self.models {
            for (index, edge) in node.relationships.iter().enumerate() {
                if edge.kind != RelationshipKind::BelongsTo || edge.inverse.is_some() {
                    continue;
                }
                let back = self.models.get(&edge.target).and_then(|target| {
                    target.relationships.iter().find(|b| {
                        b.key_location == KeyLocation::Target
                            && b.target == *name
                            && b.foreign_keys == edge.foreign_keys
                    })
                });
                if let Some(back) = back {
                    links.push((name.clone(), index, back.name.clone()));
                }
            }
        }

        for (model, index, inverse) in links {
            if let Some(edge) = self
                .models
                .get_mut(&model)
                .and_then(|m| m.relationships.get_mut(index))
            {
                edge.inverse = Some(inverse);
            }
        }
    }

    fn restore_declaration_order(&mut self) {
        for (model, rels) in &self.pending {
            let Some(node) = self.models.get_mut(model) else {
                continue;
            };
            node.relationships
                .sort_by_key(|edge| rels.iter().position(|(name, _)| *name == edge.name));
        }
    }
}

fn key_compatible(key: &TypeRef, identifier: &TypeRef) -> bool {
    match (key, identifier) {
        (TypeRef::Scalar(k), TypeRef::Scalar(i)) => k.is_key_compatible(*i),
        (k, i) => k == i,
    }
}

fn check_key_count(
    model: &str,
    relationship: &str,
    referenced: &str,
    keys: &[String],
    identifier: &KeyShape,
) -> SchemaResult<()> {
    if keys.len() == identifier.len() {
        return Ok(());
    }
    Err(SchemaError::IncompatibleForeignKey {
        model: model.to_string(),
        relationship: relationship.to_string(),
        target: referenced.to_string(),
        fields: keys.to_vec(),
        reason: format!(
            "'{}' is identified by {} field(s), {} key field(s) given",
            referenced,
            identifier.len(),
            keys.len()
        ),
    })
}

fn check_key_field(
    model: &str,
    relationship: &str,
    referenced: &str,
    keys: &[String],
    field: &FieldNode,
    identifier_type: &TypeRef,
) -> SchemaResult<()> {
    if !field.array && key_compatible(&field.field_type, identifier_type) {
        return Ok(());
    }
    Err(SchemaError::IncompatibleForeignKey {
        model: model.to_string(),
        relationship: relationship.to_string(),
        target: referenced.to_string(),
        fields: keys.to_vec(),
        reason: format!(
            "field '{}' is {}{}, but the identifier is {}",
            field.name,
            field.field_type.describe(),
            if field.array { " list" } else { "" },
            identifier_type.describe()
        ),
    })
}
