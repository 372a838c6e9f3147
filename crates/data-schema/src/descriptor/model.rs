//! Model descriptors.

use super::auth::AuthRule;
use super::field::FieldDescriptor;
use super::non_model::insert_named;
use super::relationship::RelationshipDescriptor;

/// How a model's records are addressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentifierSpec {
    /// A single synthetic identifier field (see `SchemaConfig::identifier_field`).
    #[default]
    Implicit,
    /// An ordered list of declared fields forming a (possibly composite) key.
    Explicit(Vec<String>),
}

/// A model under construction.
///
/// Field names passed to [`ModelDescriptor::identifier`] are not checked here;
/// they may refer to fields declared later and are validated when the schema
/// is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDescriptor {
    pub(crate) fields: Vec<(String, FieldDescriptor)>,
    pub(crate) relationships: Vec<(String, RelationshipDescriptor)>,
    pub(crate) identifier: IdentifierSpec,
    pub(crate) auth_rules: Vec<AuthRule>,
}

impl ModelDescriptor {
    /// Adds or replaces a field.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<FieldDescriptor>) -> Self {
        insert_named(&mut self.fields, name.into(), field.into());
        self
    }

    /// Adds or replaces a relationship.
    pub fn relationship(mut self, name: impl Into<String>, relationship: RelationshipDescriptor) -> Self {
        insert_named(&mut self.relationships, name.into(), relationship);
        self
    }

    /// Sets an explicit identifier. Last call wins.
    pub fn identifier<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier = IdentifierSpec::Explicit(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Appends model-level authorization rules.
    pub fn authorization(mut self, rules: impl IntoIterator<Item = AuthRule>) -> Self {
        self.auth_rules.extend(rules);
        self
    }

    pub fn fields(&self) -> &[(String, FieldDescriptor)] {
        &self.fields
    }

    pub fn relationships(&self) -> &[(String, RelationshipDescriptor)] {
        &self.relationships
    }

    pub fn identifier_spec(&self) -> &IdentifierSpec {
        &self.identifier
    }

    pub fn auth_rules(&self) -> &[AuthRule] {
        &self.auth_rules
    }
}

/// Creates an empty model.
pub fn model() -> ModelDescriptor {
    ModelDescriptor::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::allow;
    use crate::descriptor::field::{id, string};

    #[test]
    fn test_identifier_last_write_wins() {
        let m = model()
            .identifier(["a"])
            .identifier(["b", "c"]);
        assert_eq!(
            m.identifier_spec(),
            &IdentifierSpec::Explicit(vec!["b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_identifier_may_precede_fields() {
        let m = model()
            .identifier(["customerId"])
            .field("customerId", id().required());
        assert_eq!(m.fields().len(), 1);
    }

    #[test]
    fn test_model_authorization_appends() {
        let m = model()
            .field("content", string())
            .authorization([allow::owner()])
            .authorization([allow::authenticated()]);
        assert_eq!(m.auth_rules().len(), 2);
    }
}
