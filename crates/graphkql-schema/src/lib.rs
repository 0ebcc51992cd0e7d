//! Schema collaborators for graphkql
//!
//! The translator does not own the mapping between graph labels and the
//! telemetry tables that back them. This crate defines the interface it
//! consumes (`SchemaProvider`), an in-memory implementation, and the index
//! catalog the optimizer checks equality filters against.

pub mod index;
pub mod mapping;

pub use index::{Index, IndexCatalog, IndexType};
pub use mapping::{FieldMapping, SchemaProvider, StaticSchema, TableMapping};
