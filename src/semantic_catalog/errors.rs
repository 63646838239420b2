use thiserror::Error;

/// Schema catalog errors, surfaced verbatim to API callers.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid schema context JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Duplicate table '{0}' in schema context")]
    DuplicateTable(String),

    #[error("Relationship references unknown table '{table}'")]
    UnknownTable { table: String },

    #[error("Relationship references unknown column '{table}'.'{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("Multiple active relationships between '{a}' and '{b}' (at most one is allowed)")]
    DuplicateActiveRelationship { a: String, b: String },
}
