use thiserror::Error;

/// Lexing failures. All variants carry the 1-indexed source position.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedChar { ch: char, line: u32, column: u32 },

    #[error("Unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Unterminated quoted identifier starting at line {line}, column {column}")]
    UnterminatedQuotedIdentifier { line: u32, column: u32 },

    #[error("Unterminated bracketed name starting at line {line}, column {column}")]
    UnterminatedBracketedName { line: u32, column: u32 },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedBlockComment { line: u32, column: u32 },
}

/// Parse failures. Recovery is attempted once per error; accumulated errors
/// are surfaced as strings on `ParseResult`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token '{lexeme}' at line {line}, column {column}: expected {expected}")]
    UnexpectedToken {
        lexeme: String,
        line: u32,
        column: u32,
        expected: String,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("{0}")]
    Lex(#[from] LexError),
}
