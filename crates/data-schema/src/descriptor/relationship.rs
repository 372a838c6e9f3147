//! Relationship descriptors.

use serde::Serialize;

/// The kind of link between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// Back-reference to a single record whose `belongsTo` holds the key.
    HasOne,
    /// Back-reference to every record whose `belongsTo` holds the key.
    HasMany,
    /// Owning side: this model stores the foreign key.
    BelongsTo,
    /// Link through an implicit join model.
    ManyToMany,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::HasOne => "hasOne",
            RelationshipKind::HasMany => "hasMany",
            RelationshipKind::BelongsTo => "belongsTo",
            RelationshipKind::ManyToMany => "manyToMany",
        }
    }

    /// Whether the relationship resolves to a list of records.
    pub fn is_collection(&self) -> bool {
        matches!(self, RelationshipKind::HasMany | RelationshipKind::ManyToMany)
    }
}

/// A named link from one model to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    pub(crate) kind: RelationshipKind,
    pub(crate) target: String,
    pub(crate) foreign_keys: Option<Vec<String>>,
    pub(crate) join_model: Option<String>,
}

impl RelationshipDescriptor {
    fn new(kind: RelationshipKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            foreign_keys: None,
            join_model: None,
        }
    }

    /// Names the foreign key field(s), in target identifier order.
    ///
    /// For `belongsTo` they live on the declaring model; for `hasOne` /
    /// `hasMany` they live on the target.
    pub fn references<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreign_keys = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Names the join model of a many-to-many relationship.
    pub fn through(mut self, join_model: impl Into<String>) -> Self {
        self.join_model = Some(join_model.into());
        self
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// `None` when the foreign key is left implicit.
    pub fn foreign_keys(&self) -> Option<&[String]> {
        self.foreign_keys.as_deref()
    }

    pub fn join_model(&self) -> Option<&str> {
        self.join_model.as_deref()
    }
}

pub fn has_one(target: impl Into<String>) -> RelationshipDescriptor {
    RelationshipDescriptor::new(RelationshipKind::HasOne, target)
}

pub fn has_many(target: impl Into<String>) -> RelationshipDescriptor {
    RelationshipDescriptor::new(RelationshipKind::HasMany, target)
}

pub fn belongs_to(target: impl Into<String>) -> RelationshipDescriptor {
    RelationshipDescriptor::new(RelationshipKind::BelongsTo, target)
}

pub fn many_to_many(target: impl Into<String>) -> RelationshipDescriptor {
    RelationshipDescriptor::new(RelationshipKind::ManyToMany, target)
}
