//! Authorization rule descriptors.
//!
//! A rule pairs a principal (who) with the set of operations it grants (what).
//! Rules attached to the same model or field form a disjunction: a caller is
//! granted an operation when any one rule both matches the caller and lists
//! the operation. Evaluation lives in [`crate::access`].

use serde::{Serialize, Serializer};

/// A data operation that a rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    /// Every operation, in canonical order.
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Operation::Create => 1,
            Operation::Read => 1 << 1,
            Operation::Update => 1 << 2,
            Operation::Delete => 1 << 3,
        }
    }
}

/// A set of [`Operation`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperationSet(u8);

impl OperationSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b1111)
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn insert(&mut self, op: Operation) {
        self.0 |= op.bit();
    }

    pub fn union(self, other: OperationSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Operations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = Self::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl std::fmt::Debug for OperationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for OperationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Who a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Principal {
    /// The user recorded in the owner field of the record. `field` defaults
    /// to the configured owner field; `multiple` means the field holds a
    /// list of owners.
    Owner { field: Option<String>, multiple: bool },

    /// Members of any of the listed static groups.
    Group { groups: Vec<String> },

    /// Members of a group named by the record itself.
    GroupsFromField { field: String, multiple: bool },

    /// Anyone presenting the API key.
    PublicApiKey,

    /// Anyone without signing in.
    PublicUnauthenticated,

    /// Any signed-in user.
    PrivateAuthenticated,
}

impl Principal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Principal::Owner { .. } => "owner",
            Principal::Group { .. } => "group",
            Principal::GroupsFromField { .. } => "groupsFromField",
            Principal::PublicApiKey => "publicApiKey",
            Principal::PublicUnauthenticated => "publicUnauthenticated",
            Principal::PrivateAuthenticated => "privateAuthenticated",
        }
    }
}

/// A single authorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AuthRule {
    principal: Principal,
    operations: OperationSet,
}

impl AuthRule {
    /// Creates a rule granting every operation.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            operations: OperationSet::all(),
        }
    }

    /// Restricts the rule to the given operations. Replaces any earlier
    /// restriction.
    pub fn to(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn operations(&self) -> OperationSet {
        self.operations
    }

    /// Whether the rule lists `op`, regardless of who the caller is.
    pub fn grants(&self, op: Operation) -> bool {
        self.operations.contains(op)
    }
}

/// Rule constructors.
pub mod allow {
    use super::{AuthRule, Principal};

    /// The record owner, stored in the configured owner field.
    pub fn owner() -> AuthRule {
        AuthRule::new(Principal::Owner {
            field: None,
            multiple: false,
        })
    }

    /// The record owner, stored in `field`.
    pub fn owner_defined_in(field: impl Into<String>) -> AuthRule {
        AuthRule::new(Principal::Owner {
            field: Some(field.into()),
            multiple: false,
        })
    }

    /// Any of the owners listed in `field`.
    pub fn owners_defined_in(field: impl Into<String>) -> AuthRule {
        AuthRule::new(Principal::Owner {
            field: Some(field.into()),
            multiple: true,
        })
    }

    pub fn specific_group(group: impl Into<String>) -> AuthRule {
        AuthRule::new(Principal::Group {
            groups: vec![group.into()],
        })
    }

    pub fn specific_groups<I, S>(groups: I) -> AuthRule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthRule::new(Principal::Group {
            groups: groups.into_iter().map(Into::into).collect(),
        })
    }

    /// Members of the single group stored in `field`.
    pub fn group_defined_in(field: impl Into<String>) -> AuthRule {
        AuthRule::new(Principal::GroupsFromField {
            field: field.into(),
            multiple: false,
        })
    }

    /// Members of any group listed in `field`.
    pub fn groups_defined_in(field: impl Into<String>) -> AuthRule {
        AuthRule::new(Principal::GroupsFromField {
            field: field.into(),
            multiple: true,
        })
    }

    pub fn public_api_key() -> AuthRule {
        AuthRule::new(Principal::PublicApiKey)
    }

    /// Unauthenticated (guest) access.
    pub fn guest() -> AuthRule {
        AuthRule::new(Principal::PublicUnauthenticated)
    }

    /// Any signed-in user.
    pub fn authenticated() -> AuthRule {
        AuthRule::new(Principal::PrivateAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_default_to_all_operations() {
        let rule = allow::owner();
        for op in Operation::ALL {
            assert!(rule.grants(op));
        }
    }

    #[test]
    fn test_to_replaces_operations() {
        let rule = allow::authenticated()
            .to([Operation::Create])
            .to([Operation::Read]);
        assert!(rule.grants(Operation::Read));
        assert!(!rule.grants(Operation::Create));
    }

    #[test]
    fn test_operation_names_match_serialized_form() {
        for op in Operation::ALL {
            assert_eq!(serde_json::to_value(op).unwrap(), op.as_str());
        }
    }

    #[test]
    fn test_operation_set_iterates_in_canonical_order() {
        let set: OperationSet = [Operation::Delete, Operation::Create].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), [Operation::Create, Operation::Delete]);
        assert_eq!(format!("{:?}", set), "{Create, Delete}");
    }
}
