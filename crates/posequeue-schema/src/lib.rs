//! Optional JSON Schema validation of queued payloads.
//!
//! Decoding already re-validates every record field by hand. A
//! [`SchemaRegistry`] adds a declarative contract on top: payloads are
//! checked against a JSON Schema 2020-12 document per record kind before
//! they are decoded, and validation errors name the failing JSON path.
//!
//! [`SchemaRegistry::builtin`] carries the schemas of the two wire shapes.

pub mod config;
pub mod error;
pub mod registry;
mod validator;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::{SchemaRegistry, LABEL_SCHEMA, POSE_SCHEMA};
