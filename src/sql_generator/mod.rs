//! Snowflake SQL generation from DAX ASTs
//!
//! Pattern-first: known DAX functions translate through dedicated rules
//! registered in the shared pattern registry; everything else is emitted
//! verbatim with a warning.

pub mod common;
pub mod errors;
pub mod pattern_registry;
pub mod to_sql;
pub mod validator;

pub use common::to_snake_case;
pub use errors::SqlGeneratorError;
pub use pattern_registry::{
    pattern_library, DaxPattern, PatternComplexity, PatternExample, PatternLibrary,
};
pub use to_sql::SqlGenerator;
pub use validator::{SqlValidator, ValidationResult};
