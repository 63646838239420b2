//! Structural SQL validation
//!
//! A lightweight pre-flight check on generated SQL: balanced delimiters and
//! obviously malformed output. Semantic validation against a live warehouse
//! is a deployment concern and stays outside this crate.

use serde::Serialize;

/// Result of structurally validating a SQL string.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Structural validator for generated SQL expressions.
#[derive(Debug, Default)]
pub struct SqlValidator;

impl SqlValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, sql: &str) -> ValidationResult {
        let mut issues = Vec::new();

        if sql.trim().is_empty() {
            issues.push("SQL is empty".to_string());
            return ValidationResult {
                valid: false,
                issues,
            };
        }

        let mut paren_depth: i64 = 0;
        let mut in_string = false;
        let mut in_block_comment = false;
        let mut chars = sql.chars().peekable();

        while let Some(ch) = chars.next() {
            if in_block_comment {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            if in_string {
                if ch == '\'' {
                    // `''` is an escaped quote inside the literal.
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        in_string = false;
                    }
                }
                continue;
            }
            match ch {
                '\'' => in_string = true,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_block_comment = true;
                }
                '(' => paren_depth += 1,
                ')' => {
                    paren_depth -= 1;
                    if paren_depth < 0 {
                        issues.push("Unbalanced parentheses: ')' without '('".to_string());
                        paren_depth = 0;
                    }
                }
                _ => {}
            }
        }

        if paren_depth > 0 {
            issues.push(format!("Unbalanced parentheses: {} unclosed '('", paren_depth));
        }
        if in_string {
            issues.push("Unterminated string literal".to_string());
        }
        if in_block_comment {
            issues.push("Unterminated block comment".to_string());
        }

        ValidationResult {
            valid: issues.is_empty(),
            issues,
        }
    }
}
