//! Schema builder.

use std::collections::BTreeMap;

use tracing::debug;

use super::{PartialSchema, SchemaGraph, Sources};
use crate::config::SchemaConfig;
use crate::descriptor::{AuthRule, Definition};
use crate::diagnostic::{SchemaError, SchemaResult};

/// Collects top-level definitions and builds them into a [`SchemaGraph`].
///
/// A builder is single-use: once [`build`](Self::build) or
/// [`build_partial`](Self::build_partial) succeeds, every further call fails
/// with [`SchemaError::FrozenSchema`].
///
/// ```rust
/// use data_schema::prelude::*;
///
/// let mut builder = SchemaBuilder::new();
/// builder
///     .add("Todo", model().field("content", string()))?
///     .authorization([allow::public_api_key()])?;
/// let graph = builder.build()?;
/// assert!(graph.model("Todo").is_some());
/// # Ok::<(), data_schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    definitions: BTreeMap<String, Definition>,
    global_auth_rules: Vec<AuthRule>,
    config: SchemaConfig,
    frozen: bool,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Adds or replaces a top-level definition.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        definition: impl Into<Definition>,
    ) -> SchemaResult<&mut Self> {
        self.ensure_open("add a definition")?;
        self.definitions.insert(name.into(), definition.into());
        Ok(self)
    }

    /// Appends schema-wide rules, applied to every model and custom
    /// operation that declares none of its own.
    pub fn authorization(&mut self, rules: impl IntoIterator<Item = AuthRule>) -> SchemaResult<&mut Self> {
        self.ensure_open("set schema authorization")?;
        self.global_auth_rules.extend(rules);
        Ok(self)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Builds a self-contained graph. Every reference must resolve.
    pub fn build(&mut self) -> SchemaResult<SchemaGraph> {
        self.ensure_open("build")?;
        let graph = self.sources().build()?;
        self.frozen = true;
        Ok(graph)
    }

    /// Builds a schema that may reference models and types defined by other
    /// schemas. Pass the result to [`combine`](super::combine).
    pub fn build_partial(&mut self) -> SchemaResult<PartialSchema> {
        self.ensure_open("build")?;
        let partial = self.sources().build_partial()?;
        self.frozen = true;
        Ok(partial)
    }

    fn sources(&self) -> Sources {
        debug!(
            definitions = self.definitions.len(),
            global_rules = self.global_auth_rules.len(),
            "Building schema"
        );
        Sources::new(
            self.definitions.clone(),
            self.global_auth_rules.clone(),
            self.config.clone(),
        )
    }

    fn ensure_open(&self, operation: &str) -> SchemaResult<()> {
        if self.frozen {
            Err(SchemaError::frozen(operation))
        } else {
            Ok(())
        }
    }
}

/// Creates a builder pre-populated with `definitions`.
pub fn schema<I, S, D>(definitions: I) -> SchemaBuilder
where
    I: IntoIterator<Item = (S, D)>,
    S: Into<String>,
    D: Into<Definition>,
{
    SchemaBuilder {
        definitions: definitions
            .into_iter()
            .map(|(name, definition)| (name.into(), definition.into()))
            .collect(),
        ..SchemaBuilder::default()
    }
}
