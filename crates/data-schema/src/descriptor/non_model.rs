//! Non-model types: enums, custom types and custom operations.

use serde::Serialize;

use super::auth::AuthRule;
use super::field::FieldDescriptor;

/// An enumeration: an ordered set of string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub(crate) values: Vec<String>,
}

impl EnumType {
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Creates an enum. Repeated values keep their first position.
pub fn enumeration<I, S>(values: I) -> EnumType
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.into();
        if !out.contains(&value) {
            out.push(value);
        }
    }
    EnumType { values: out }
}

/// A named structured type that is not a model: no identifier, no
/// relationships, no authorization of its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomType {
    pub(crate) fields: Vec<(String, FieldDescriptor)>,
}

impl CustomType {
    /// Adds or replaces a field.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<FieldDescriptor>) -> Self {
        insert_named(&mut self.fields, name.into(), field.into());
        self
    }

    pub fn fields(&self) -> &[(String, FieldDescriptor)] {
        &self.fields
    }
}

/// Creates a custom type from `(name, field)` pairs.
pub fn custom_type<I, S, F>(fields: I) -> CustomType
where
    I: IntoIterator<Item = (S, F)>,
    S: Into<String>,
    F: Into<FieldDescriptor>,
{
    fields
        .into_iter()
        .fold(CustomType::default(), |ty, (name, field)| ty.field(name, field))
}

/// Kind of a custom operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// Signature of a custom query, mutation or subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomOperation {
    pub(crate) kind: OperationKind,
    pub(crate) arguments: Vec<(String, FieldDescriptor)>,
    pub(crate) returns: Option<FieldDescriptor>,
    pub(crate) handler: Option<String>,
    pub(crate) auth_rules: Vec<AuthRule>,
}

impl CustomOperation {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            arguments: Vec::new(),
            returns: None,
            handler: None,
            auth_rules: Vec::new(),
        }
    }

    /// Adds or replaces an argument.
    pub fn argument(mut self, name: impl Into<String>, field: impl Into<FieldDescriptor>) -> Self {
        insert_named(&mut self.arguments, name.into(), field.into());
        self
    }

    /// Sets the return type. May reference a model by name.
    pub fn returns(mut self, field: impl Into<FieldDescriptor>) -> Self {
        self.returns = Some(field.into());
        self
    }

    /// Names the function that implements the operation.
    pub fn handler(mut self, name: impl Into<String>) -> Self {
        self.handler = Some(name.into());
        self
    }

    /// Appends authorization rules. Operations without rules use the
    /// schema's global rules.
    pub fn authorization(mut self, rules: impl IntoIterator<Item = AuthRule>) -> Self {
        self.auth_rules.extend(rules);
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn arguments(&self) -> &[(String, FieldDescriptor)] {
        &self.arguments
    }

    pub fn return_type(&self) -> Option<&FieldDescriptor> {
        self.returns.as_ref()
    }
}

pub fn query() -> CustomOperation {
    CustomOperation::new(OperationKind::Query)
}

pub fn mutation() -> CustomOperation {
    CustomOperation::new(OperationKind::Mutation)
}

pub fn subscription() -> CustomOperation {
    CustomOperation::new(OperationKind::Subscription)
}

/// Inserts `(name, value)`, replacing an existing entry in place.
pub(crate) fn insert_named<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::field::{float, string};

    #[test]
    fn test_enum_values_are_an_ordered_set() {
        let e = enumeration(["low", "high", "low", "medium"]);
        assert_eq!(e.values(), ["low", "high", "medium"]);
    }

    #[test]
    fn test_custom_type_field_replaces_in_place() {
        let ty = custom_type([("lat", float()), ("long", float())]).field("lat", string());
        let names: Vec<&str> = ty.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["lat", "long"]);
        assert_eq!(ty.fields()[0].1, string());
    }
}
