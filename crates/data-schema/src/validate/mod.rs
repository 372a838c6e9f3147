//! Validation of resolved nodes.
//!
//! These checks run inside the graph builder once type references have been
//! resolved, so they only ever see concrete [`TypeRef`](crate::graph::TypeRef)s.

mod default_value;
mod identifier;

pub(crate) use default_value::validate_default;
pub(crate) use identifier::validate_identifier;
