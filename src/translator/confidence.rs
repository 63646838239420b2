use serde::{Deserialize, Serialize};
use std::fmt;

use super::analyzer::AstAnalyzer;
use crate::sql_generator::PatternLibrary;

/// Confidence level of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TranslationConfidence {
    /// Parse failed; no translation was produced.
    Unknown,
    /// Heuristic or fallback translation.
    Low,
    /// Mostly patterned, or patterned with a few warnings.
    Medium,
    /// Fully patterned, no approximations, no warnings.
    High,
}

impl fmt::Display for TranslationConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranslationConfidence::High => "HIGH",
            TranslationConfidence::Medium => "MEDIUM",
            TranslationConfidence::Low => "LOW",
            TranslationConfidence::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Derive the confidence level from analyzer and generator output.
///
/// Decision table, first match wins:
/// 1. every analyzed function patterned, no time intelligence, no filter
///    modification: HIGH with zero warnings, MEDIUM with at most two;
/// 2. more than half of the analyzed functions patterned: MEDIUM;
/// 3. otherwise LOW.
pub fn assess_confidence(
    analyzer: &AstAnalyzer,
    patterns_applied: &[String],
    warnings: &[String],
    patterns: &PatternLibrary,
) -> TranslationConfidence {
    let all_patterned = analyzer
        .functions
        .iter()
        .all(|f| patterns_applied.contains(f) || patterns.has_pattern(f));

    if all_patterned && !analyzer.has_time_intel && !analyzer.has_filter_mod {
        if warnings.is_empty() {
            return TranslationConfidence::High;
        }
        if warnings.len() <= 2 {
            return TranslationConfidence::Medium;
        }
    }

    if patterns_applied.len() > analyzer.functions.len() / 2 {
        return TranslationConfidence::Medium;
    }

    TranslationConfidence::Low
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_generator::pattern_library;

    fn analyzer_with(functions: &[&str], time_intel: bool, filter_mod: bool) -> AstAnalyzer {
        AstAnalyzer {
            functions: functions.iter().map(|f| f.to_string()).collect(),
            has_time_intel: time_intel,
            has_filter_mod: filter_mod,
            ..AstAnalyzer::default()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fully_patterned_without_warnings_is_high() {
        let analyzer = analyzer_with(&["SUM"], false, false);
        let confidence =
            assess_confidence(&analyzer, &strings(&["SUM"]), &[], pattern_library());
        assert_eq!(confidence, TranslationConfidence::High);
    }

    #[test]
    fn fully_patterned_with_few_warnings_is_medium() {
        let analyzer = analyzer_with(&["SUMX"], false, false);
        let confidence = assess_confidence(
            &analyzer,
            &strings(&["SUMX"]),
            &strings(&["table argument discarded"]),
            pattern_library(),
        );
        assert_eq!(confidence, TranslationConfidence::Medium);
    }

    #[test]
    fn time_intelligence_caps_at_medium() {
        let analyzer = analyzer_with(&["SAMEPERIODLASTYEAR"], true, false);
        let confidence = assess_confidence(
            &analyzer,
            &strings(&["SAMEPERIODLASTYEAR"]),
            &[],
            pattern_library(),
        );
        assert_eq!(confidence, TranslationConfidence::Medium);
    }

    #[test]
    fn mostly_unpatterned_is_low() {
        let analyzer = analyzer_with(&["FOO", "BAR", "BAZ"], false, false);
        let confidence =
            assess_confidence(&analyzer, &strings(&["SUM"]), &[], pattern_library());
        assert_eq!(confidence, TranslationConfidence::Low);
    }

    #[test]
    fn expression_without_functions_is_high() {
        let analyzer = analyzer_with(&[], false, false);
        let confidence = assess_confidence(&analyzer, &[], &[], pattern_library());
        assert_eq!(confidence, TranslationConfidence::High);
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(TranslationConfidence::High.to_string(), "HIGH");
        assert_eq!(TranslationConfidence::Unknown.to_string(), "UNKNOWN");
    }
}
