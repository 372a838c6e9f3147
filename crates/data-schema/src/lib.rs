//! # Data Schema
//!
//! This crate turns a declarative description of a data domain (models,
//! fields, relationships, enumerations and access rules) into a validated
//! schema graph and a client-facing shape derived from it.
//!
//! ## Architecture
//!
//! ```text
//! Descriptors (model(), string(), belongs_to(), allow::owner(), ...)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Builder    │  Resolve types, relationships and rules
//! │  (→ Graph)   │
//! └──────┬───────┘
//!        │  combine() merges graphs and partial schemas
//!        ▼
//! ┌──────────────┐
//! │ SchemaGraph  │  Frozen, canonical, serializable
//! └──────┬───────┘
//!        │
//!        ├──────────────► access: capabilities(model, caller)
//!        ▼
//! ┌──────────────┐
//! │    Shape     │  Client view, optionally filtered per caller
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  TypeScript declarations
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use data_schema::prelude::*;
//!
//! let mut builder = SchemaBuilder::new();
//! builder
//!     .add(
//!         "Todo",
//!         model()
//!             .field("content", string())
//!             .field("secret", string().authorization([allow::guest().to([Operation::Read])]))
//!             .authorization([allow::owner()]),
//!     )?;
//! let graph = builder.build()?;
//!
//! let guest = graph.capabilities("Todo", &Caller::guest()).unwrap();
//! assert!(guest.can_read_field("secret"));
//! assert!(!guest.can_read_field("content"));
//!
//! let shape = ClientShape::derive(&graph);
//! let code = codegen::generate(&shape);
//! assert!(code.file("models.ts").is_some());
//! # Ok::<(), data_schema::SchemaError>(())
//! ```

pub mod access;
pub mod codegen;
pub mod config;
pub mod descriptor;
pub mod diagnostic;
pub mod graph;
pub mod naming;
pub mod shape;
mod validate;

pub use access::{Caller, FieldCapabilities, ModelCapabilities};
pub use config::SchemaConfig;
pub use diagnostic::{ErrorKind, SchemaError, SchemaResult};
pub use graph::{combine, schema, PartialSchema, SchemaBuilder, SchemaGraph};
pub use shape::ClientShape;

/// Everything needed to declare and build a schema.
pub mod prelude {
    pub use crate::access::Caller;
    pub use crate::codegen;
    pub use crate::config::SchemaConfig;
    pub use crate::descriptor::field::{
        boolean, date, datetime, email, float, id, integer, ip_address, json, phone, reference,
        string, time, timestamp, url,
    };
    pub use crate::descriptor::{
        allow, belongs_to, custom_type, enumeration, has_many, has_one, many_to_many, model,
        mutation, query, subscription, Operation,
    };
    pub use crate::graph::{combine, schema, SchemaBuilder};
    pub use crate::shape::ClientShape;
}
