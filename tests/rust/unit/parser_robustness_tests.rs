//! Parser and translator robustness against malformed input
//!
//! Malformed DAX must surface as errors on the result, never as panics.

use snowdax::dax_parser::{parse_dax, DaxLexer};
use snowdax::translator::{DaxTranslator, TranslationConfidence};

#[test]
fn malformed_expressions_do_not_panic() {
    let malformed = vec![
        "",
        "(",
        ")",
        "SUM(",
        "SUM)",
        "Sales[",
        "Sales[Amount",
        "[",
        "1 +",
        "+ 1",
        "IF(,,)",
        "a b c",
        "'unterminated",
        "\"unterminated",
        "1 ..",
        "&& ||",
        "SWITCH(",
        "/* unterminated comment",
    ];

    for source in malformed {
        let result = parse_dax(source);
        assert!(!result.success, "expected failure for: {source:?}");
        assert!(
            !result.errors.is_empty(),
            "expected errors for: {source:?}"
        );
    }
}

#[test]
fn translator_reports_failures_with_unknown_confidence() {
    let translator = DaxTranslator::default();
    for source in ["SUM(", "Sales[Amount", "1 + + +"] {
        let result = translator.translate(source);
        assert!(!result.success);
        assert_eq!(result.confidence, TranslationConfidence::Unknown);
        assert!(result.sql.is_empty());
    }
}

/// Re-lexing the generated SQL must yield a balanced parenthesis count for
/// every accepted expression.
#[test]
fn generated_sql_has_balanced_parentheses() {
    let sources = [
        "SUM(Sales[Amount])",
        "DIVIDE(Sales[Revenue], Sales[Cost], 0)",
        "IF([Amount] > 100, \"big\", \"small\")",
        "CALCULATE(SUM(Sales[Amount]), Sales[Region] = \"US\", Sales[Year] = 2024)",
        "SWITCH([Tier], 1, \"a\", 2, \"b\", \"c\")",
        "((1 + 2) * 3) ^ 2 ^ [Exp]",
        "CONCATENATE(UPPER([First]), LOWER([Last]))",
        "SUMX(Sales, Sales[Price] * Sales[Qty]) & \"x\"",
        "FILTER(Sales, Sales[Amount] > 0)",
        "UNKNOWNFN([a], UNKNOWN2([b]))",
    ];

    let translator = DaxTranslator::default();
    for source in sources {
        let result = translator.translate(source);
        assert!(result.success, "translation failed for {source:?}");

        let tokens = DaxLexer::new(&result.sql)
            .tokenize()
            .unwrap_or_else(|e| panic!("generated SQL does not re-lex for {source:?}: {e}"));
        let opens = tokens
            .iter()
            .filter(|t| t.lexeme == "(")
            .count();
        let closes = tokens
            .iter()
            .filter(|t| t.lexeme == ")")
            .count();
        assert_eq!(opens, closes, "unbalanced SQL for {source:?}: {}", result.sql);
    }
}

#[test]
fn function_name_casing_does_not_change_the_sql() {
    let translator = DaxTranslator::default();
    let lower = translator.translate("divide(Sales[Revenue], Sales[Cost])");
    let upper = translator.translate("DIVIDE(Sales[Revenue], Sales[Cost])");
    let mixed = translator.translate("Divide(Sales[Revenue], Sales[Cost])");
    assert_eq!(lower.sql, upper.sql);
    assert_eq!(mixed.sql, upper.sql);
}

#[test]
fn repeated_translation_is_byte_identical() {
    let translator = DaxTranslator::default();
    let source = "CALCULATE(SUMX(Sales, Sales[Price] * Sales[Qty]), ALL(Product))";
    let first = translator.translate(source);
    let second = translator.translate(source);
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.patterns_applied, second.patterns_applied);
    assert_eq!(first.tables_used, second.tables_used);
}
