//! Semantic model catalog
//!
//! Maps DAX table and column names to their Snowflake counterparts and holds
//! the relationship graph used for JOIN planning. A catalog is built once per
//! translator (from JSON or programmatically) and shared read-only.

pub mod errors;
pub mod sample;
pub mod schema_context;

pub use errors::CatalogError;
pub use sample::create_sample_retail_context;
pub use schema_context::{
    Cardinality, ColumnMapping, SchemaContext, TableMapping, TableRelationship,
};
