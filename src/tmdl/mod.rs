//! TMDL measure extraction and translation
//!
//! TMDL files are not parsed with a grammar; measure blocks are pulled out
//! with a regex plus an indentation-aware line scan, matching how the rest of
//! the boundary treats semi-structured model files. Each extracted expression
//! runs through the normal translation pipeline and the batch is rendered as
//! a semantic-model style YAML document.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::translator::DaxTranslator;

lazy_static! {
    /// `measure Name = expr` or `measure 'Name With Spaces' = expr`.
    static ref MEASURE_HEADER: Regex =
        Regex::new(r#"^\s*measure\s+(?:'([^']+)'|([A-Za-z_][\w ]*?))\s*=\s*(.*)$"#)
            .expect("static regex");
}

/// TMDL property lines that terminate a measure expression block.
const PROPERTY_PREFIXES: &[&str] = &[
    "formatString",
    "displayFolder",
    "description",
    "lineageTag",
    "annotation",
    "isHidden",
];

/// One extracted measure definition, expression still in DAX.
#[derive(Debug, Clone, PartialEq)]
pub struct TmdlMeasure {
    pub name: String,
    pub expression: String,
}

/// Outcome of translating a TMDL document.
#[derive(Debug, Clone, Serialize)]
pub struct TmdlTranslationSummary {
    pub success: bool,
    pub yaml: String,
    pub measures_translated: usize,
    pub measures_failed: usize,
    pub errors: Vec<String>,
}

#[derive(Serialize)]
struct SemanticModelYaml {
    measures: Vec<MeasureYaml>,
}

#[derive(Serialize)]
struct MeasureYaml {
    name: String,
    dax: String,
    sql: String,
    confidence: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Extract `measure NAME = EXPR` blocks from TMDL content.
///
/// An expression continues over following lines until the next measure
/// header, a known property line, or a dedented non-blank line.
pub fn extract_measures(tmdl_content: &str) -> Vec<TmdlMeasure> {
    let mut measures: Vec<TmdlMeasure> = Vec::new();
    let mut current: Option<TmdlMeasure> = None;

    for line in tmdl_content.lines() {
        if let Some(captures) = MEASURE_HEADER.captures(line) {
            if let Some(measure) = current.take() {
                measures.push(finish(measure));
            }
            let name = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            current = Some(TmdlMeasure {
                name,
                expression: captures[3].trim().to_string(),
            });
            continue;
        }

        if current.is_none() {
            continue;
        }

        let trimmed = line.trim();
        let is_property = PROPERTY_PREFIXES
            .iter()
            .any(|p| trimmed.starts_with(p) && trimmed[p.len()..].trim_start().starts_with(':'));
        let is_continuation =
            !trimmed.is_empty() && !is_property && line.starts_with([' ', '\t']);

        if is_continuation {
            if let Some(measure) = current.as_mut() {
                measure.expression.push('\n');
                measure.expression.push_str(trimmed);
            }
        } else if !trimmed.is_empty() {
            // Property line or dedented content ends the expression block.
            if let Some(measure) = current.take() {
                measures.push(finish(measure));
            }
        }
    }

    if let Some(measure) = current.take() {
        measures.push(finish(measure));
    }

    measures.into_iter().filter(|m| !m.expression.is_empty()).collect()
}

fn finish(mut measure: TmdlMeasure) -> TmdlMeasure {
    measure.expression = measure.expression.trim().to_string();
    measure
}

/// Translate every measure in a TMDL document and render the YAML summary.
pub fn translate_tmdl(translator: &DaxTranslator, tmdl_content: &str) -> TmdlTranslationSummary {
    let measures = extract_measures(tmdl_content);
    if measures.is_empty() {
        return TmdlTranslationSummary {
            success: false,
            yaml: String::new(),
            measures_translated: 0,
            measures_failed: 0,
            errors: vec!["No measure definitions found in TMDL content".to_string()],
        };
    }

    let mut rendered = Vec::new();
    let mut errors = Vec::new();
    let mut failed = 0usize;

    for measure in &measures {
        let result = translator.translate(&measure.expression);
        if result.success {
            rendered.push(MeasureYaml {
                name: measure.name.clone(),
                dax: measure.expression.clone(),
                sql: result.sql,
                confidence: result.confidence.to_string(),
                warnings: result.warnings,
            });
        } else {
            failed += 1;
            errors.push(format!(
                "measure '{}': {}",
                measure.name,
                result.errors.join("; ")
            ));
        }
    }

    let yaml = match serde_yaml::to_string(&SemanticModelYaml { measures: rendered }) {
        Ok(yaml) => yaml,
        Err(e) => {
            errors.push(format!("YAML rendering failed: {}", e));
            String::new()
        }
    };

    TmdlTranslationSummary {
        success: failed == 0 && errors.is_empty(),
        yaml,
        measures_translated: measures.len() - failed,
        measures_failed: failed,
        errors,
    }
}
