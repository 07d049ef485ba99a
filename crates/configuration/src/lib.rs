//! Schema state for the engine: the provider seam that feeds introspected
//! metadata in, and the process-wide catalog that query compilation reads.

pub mod catalog;
pub mod error;
pub mod provider;

pub use catalog::{CatalogSnapshot, SchemaCatalog};
pub use error::CatalogError;
pub use provider::{EngineId, FixedProvider, SchemaProvider, TableMeta};
