//! Capability queries.
//!
//! Answers "what may this caller do with this model?" from the merged rules
//! stored in a [`SchemaGraph`]. All rule evaluation goes through
//! [`rule_is_satisfied`].
//!
//! - A field is readable when one of its own rules grants `read` to the
//!   caller, or, if it has none, when a model-level rule does.
//! - Creating or updating a field requires a model-level rule granting the
//!   operation and, if the field has rules, one of those as well.
//! - Deleting is decided by model-level rules alone.
//! - A model is readable when any of its fields is.

use serde::Serialize;

use crate::descriptor::{AuthRule, Operation, Principal};
use crate::graph::{FieldNode, ModelNode, SchemaGraph};

/// Who is asking.
///
/// Record-dependent facts (owning the record, belonging to a group stored on
/// the record) are supplied by the caller, since the schema has no records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    signed_in: bool,
    api_key: bool,
    owns_record: bool,
    groups: Vec<String>,
    in_record_groups: bool,
}

impl Caller {
    /// An anonymous caller without an API key.
    pub fn guest() -> Self {
        Self::default()
    }

    /// An anonymous caller presenting the API key.
    pub fn with_api_key() -> Self {
        Self {
            api_key: true,
            ..Self::default()
        }
    }

    /// A signed-in user with no further claims.
    pub fn signed_in() -> Self {
        Self {
            signed_in: true,
            ..Self::default()
        }
    }

    /// Marks the caller as the record's owner. Implies signed in.
    pub fn owner(mut self) -> Self {
        self.signed_in = true;
        self.owns_record = true;
        self
    }

    /// Adds a static group membership. Implies signed in.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.signed_in = true;
        self.groups.push(group.into());
        self
    }

    /// Marks the caller as a member of a group named by the record. Implies
    /// signed in.
    pub fn in_record_groups(mut self) -> Self {
        self.signed_in = true;
        self.in_record_groups = true;
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Whether `rule`'s principal matches `caller`, ignoring operations.
pub fn rule_is_satisfied(rule: &AuthRule, caller: &Caller) -> bool {
    match rule.principal() {
        Principal::Owner { .. } => caller.signed_in && caller.owns_record,
        Principal::Group { groups } => {
            caller.signed_in && groups.iter().any(|g| caller.groups.contains(g))
        }
        Principal::GroupsFromField { .. } => caller.signed_in && caller.in_record_groups,
        Principal::PublicApiKey => caller.api_key,
        Principal::PublicUnauthenticated => !caller.signed_in && !caller.api_key,
        Principal::PrivateAuthenticated => caller.signed_in,
    }
}

/// Whether any of `rules` grants `op` to `caller`.
pub fn any_grants<'r>(rules: impl IntoIterator<Item = &'r AuthRule>, op: Operation, caller: &Caller) -> bool {
    rules
        .into_iter()
        .any(|rule| rule.grants(op) && rule_is_satisfied(rule, caller))
}

/// What a caller may do with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCapabilities {
    pub name: String,
    pub read: bool,
    pub create: bool,
    pub update: bool,
}

/// What a caller may do with one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCapabilities {
    pub model: String,
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    /// In model field order.
    pub fields: Vec<FieldCapabilities>,
}

impl ModelCapabilities {
    pub fn field(&self, name: &str) -> Option<&FieldCapabilities> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn can_read_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|f| f.read)
    }

    pub fn readable_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| f.read).map(|f| f.name.as_str())
    }

    /// Whether the record-level operation is allowed at all.
    pub fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

fn field_capabilities(model: &ModelNode, field: &FieldNode, caller: &Caller) -> FieldCapabilities {
    let model_grants = |op| any_grants(field.model_rules(), op, caller);
    let field_grants = |op| !field.has_field_rules() || any_grants(field.field_rules(), op, caller);

    let read = if field.has_field_rules() {
        any_grants(field.field_rules(), Operation::Read, caller)
    } else {
        any_grants(&model.auth_rules, Operation::Read, caller)
    };
    let writable = !field.is_read_only();

    FieldCapabilities {
        name: field.name.clone(),
        read,
        create: writable && model_grants(Operation::Create) && field_grants(Operation::Create),
        update: writable && model_grants(Operation::Update) && field_grants(Operation::Update),
    }
}

impl ModelNode {
    /// Evaluates this model's rules for `caller`.
    pub fn capabilities(&self, caller: &Caller) -> ModelCapabilities {
        let fields: Vec<FieldCapabilities> = self
            .fields
            .iter()
            .map(|field| field_capabilities(self, field, caller))
            .collect();

        ModelCapabilities {
            model: self.name.clone(),
            read: fields.iter().any(|f| f.read),
            create: any_grants(&self.auth_rules, Operation::Create, caller),
            update: any_grants(&self.auth_rules, Operation::Update, caller),
            delete: any_grants(&self.auth_rules, Operation::Delete, caller),
            fields,
        }
    }
}

impl SchemaGraph {
    /// Capabilities of `caller` on `model`, or `None` if there is no such
    /// model.
    pub fn capabilities(&self, model: &str, caller: &Caller) -> Option<ModelCapabilities> {
        self.model(model).map(|m| m.capabilities(caller))
    }

    /// Whether `caller` may invoke the custom operation `name`.
    ///
    /// Operations have no per-operation scoping: a rule allows invocation
    /// when it matches the caller and grants anything at all. A rule narrowed
    /// to no operations allows nothing.
    pub fn can_invoke(&self, name: &str, caller: &Caller) -> Option<bool> {
        self.custom_operation(name).map(|op| {
            op.auth_rules
                .iter()
                .any(|rule| !rule.operations().is_empty() && rule_is_satisfied(rule, caller))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{allow, model, query};
    use crate::graph::schema;

    #[test]
    fn test_owner_requires_sign_in_and_ownership() {
        let rule = allow::owner();
        assert!(rule_is_satisfied(&rule, &Caller::signed_in().owner()));
        assert!(!rule_is_satisfied(&rule, &Caller::signed_in()));
        assert!(!rule_is_satisfied(&rule, &Caller::guest()));
    }

    #[test]
    fn test_group_membership() {
        let rule = allow::specific_groups(["Admin", "Editor"]);
        assert!(rule_is_satisfied(&rule, &Caller::signed_in().in_group("Editor")));
        assert!(!rule_is_satisfied(&rule, &Caller::signed_in().in_group("Viewer")));
        assert!(rule_is_satisfied(
            &allow::groups_defined_in("editors"),
            &Caller::signed_in().in_record_groups()
        ));
    }

    #[test]
    fn test_public_principals() {
        assert!(rule_is_satisfied(&allow::guest(), &Caller::guest()));
        assert!(!rule_is_satisfied(&allow::guest(), &Caller::signed_in()));
        assert!(rule_is_satisfied(&allow::public_api_key(), &Caller::with_api_key()));
        assert!(!rule_is_satisfied(&allow::public_api_key(), &Caller::guest()));
        assert!(rule_is_satisfied(&allow::authenticated(), &Caller::signed_in()));
    }

    #[test]
    fn test_api_key_is_not_a_guest() {
        let key = Caller::with_api_key();
        assert!(!rule_is_satisfied(&allow::guest(), &key));
        assert!(rule_is_satisfied(&allow::guest(), &Caller::guest()));

        let graph = schema([("Note", model().authorization([allow::guest()]))])
            .build()
            .unwrap();
        let caps = graph.capabilities("Note", &key).unwrap();
        assert!(!caps.read && !caps.create && !caps.update && !caps.delete);
        assert!(graph.capabilities("Note", &Caller::guest()).unwrap().read);
    }

    #[test]
    fn test_invoke_needs_a_granting_rule() {
        let graph = schema([
            ("ping", query().authorization([allow::guest().to([])])),
            ("pong", query().authorization([allow::guest().to([Operation::Read])])),
        ])
        .build()
        .unwrap();
        assert_eq!(graph.can_invoke("ping", &Caller::guest()), Some(false));
        assert_eq!(graph.can_invoke("pong", &Caller::guest()), Some(true));
        assert_eq!(graph.can_invoke("pong", &Caller::with_api_key()), Some(false));
        assert_eq!(graph.can_invoke("missing", &Caller::guest()), None);
    }

    #[test]
    fn test_any_grants_is_a_disjunction() {
        let rules = [
            allow::owner(),
            allow::guest().to([Operation::Read]),
        ];
        assert!(any_grants(&rules, Operation::Read, &Caller::guest()));
        assert!(!any_grants(&rules, Operation::Update, &Caller::guest()));
        assert!(any_grants(&rules, Operation::Update, &Caller::signed_in().owner()));
    }
}
