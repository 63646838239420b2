use thiserror::Error;

/// SQL generation failures.
///
/// Arity shortfalls and unknown functions are not errors; they degrade to
/// placeholder comments or verbatim emission with a warning. Errors are
/// reserved for AST shapes the generator cannot meaningfully render.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlGeneratorError {
    #[error("Unsupported AST node: {0}")]
    UnsupportedNode(String),

    #[error("Non-finite numeric literal cannot be rendered as SQL")]
    NonFiniteNumber,
}
