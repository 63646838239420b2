//! DAX to Snowflake SQL translation façade
//!
//! Orchestrates parse, analysis, SQL generation, JOIN planning, confidence
//! assessment and the optional Cortex enhancement. A translator is immutable
//! after construction and safe to share across concurrent callers; each
//! `translate` call is independent.

pub mod analyzer;
pub mod confidence;
pub mod fallback;

pub use analyzer::AstAnalyzer;
pub use confidence::{assess_confidence, TranslationConfidence};

use std::sync::Arc;

use crate::cortex::{build_enhancement_prompt, CortexClient};
use crate::dax_parser::{DaxExpression, DaxParser};
use crate::semantic_catalog::SchemaContext;
use crate::sql_generator::{pattern_library, PatternLibrary, SqlGenerator};

/// Applied-pattern marker for the VAR/RETURN fallback path.
pub const VAR_RETURN_FALLBACK: &str = "VAR_RETURN_FALLBACK";

/// Result of translating one DAX expression.
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub sql: String,
    pub success: bool,
    pub confidence: TranslationConfidence,
    pub dax_source: String,
    pub ast: Option<DaxExpression>,
    /// DAX table names referenced by the expression, first-encounter order.
    pub tables_used: Vec<String>,
    /// JOIN clause text when more than one table is involved and a schema
    /// context is available.
    pub joins_needed: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub llm_used: bool,
    pub patterns_applied: Vec<String>,
}

impl TranslationResult {
    fn failure(dax_source: &str, errors: Vec<String>) -> Self {
        Self {
            sql: String::new(),
            success: false,
            confidence: TranslationConfidence::Unknown,
            dax_source: dax_source.to_string(),
            ast: None,
            tables_used: Vec::new(),
            joins_needed: String::new(),
            warnings: Vec::new(),
            errors,
            llm_used: false,
            patterns_applied: Vec::new(),
        }
    }
}

/// Constructor options for [`DaxTranslator`].
pub struct TranslatorOptions {
    pub context: Option<SchemaContext>,
    pub patterns: Option<&'static PatternLibrary>,
    pub use_llm: bool,
    pub llm_client: Option<Arc<dyn CortexClient>>,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            context: None,
            patterns: None,
            use_llm: true,
            llm_client: None,
        }
    }
}

/// The main DAX to SQL translator.
///
/// ```
/// use snowdax::translator::DaxTranslator;
///
/// let translator = DaxTranslator::default();
/// let result = translator.translate("SUM(Sales[Amount])");
/// assert!(result.success);
/// assert_eq!(result.sql, "SUM(sales.amount)");
/// ```
pub struct DaxTranslator {
    context: Option<SchemaContext>,
    patterns: &'static PatternLibrary,
    use_llm: bool,
    llm_client: Option<Arc<dyn CortexClient>>,
    parser: DaxParser,
}

impl Default for DaxTranslator {
    fn default() -> Self {
        Self::new(TranslatorOptions::default())
    }
}

impl DaxTranslator {
    pub fn new(options: TranslatorOptions) -> Self {
        Self {
            context: options.context,
            patterns: options.patterns.unwrap_or_else(pattern_library),
            use_llm: options.use_llm,
            llm_client: options.llm_client,
            parser: DaxParser::new(),
        }
    }

    pub fn with_context(context: SchemaContext) -> Self {
        Self::new(TranslatorOptions {
            context: Some(context),
            ..TranslatorOptions::default()
        })
    }

    pub fn context(&self) -> Option<&SchemaContext> {
        self.context.as_ref()
    }

    /// Translate a DAX expression to Snowflake SQL.
    ///
    /// Purely synchronous; the Cortex enhancement step only runs through
    /// [`translate_with_llm`](Self::translate_with_llm).
    pub fn translate(&self, dax_source: &str) -> TranslationResult {
        let parse_result = self.parser.parse(dax_source);
        if !parse_result.success {
            return self.handle_parse_failure(dax_source, parse_result.errors);
        }
        let Some(ast) = parse_result.ast else {
            return TranslationResult::failure(
                dax_source,
                vec!["Parser produced no AST".to_string()],
            );
        };
        self.translate_ast(dax_source, ast)
    }

    /// Translate a measure definition `[Name] = expression`.
    ///
    /// The inner expression is translated; the measure name is kept on the
    /// result via `dax_source`. Parse failures get the same VAR/RETURN
    /// fallback treatment as plain expressions.
    pub fn translate_measure(&self, measure_def: &str) -> TranslationResult {
        let parse_result = self.parser.parse_measure(measure_def);
        if !parse_result.success {
            return self.handle_parse_failure(measure_def, parse_result.errors);
        }

        let Some(ast) = parse_result.ast else {
            return TranslationResult::failure(
                measure_def,
                vec!["Parser produced no AST".to_string()],
            );
        };
        let inner = match ast {
            DaxExpression::Measure { expression, .. } => *expression,
            other => other,
        };
        self.translate_ast(measure_def, inner)
    }

    /// Translate a batch of expressions, preserving input order.
    pub fn translate_batch(&self, expressions: &[String]) -> Vec<TranslationResult> {
        expressions
            .iter()
            .map(|expression| self.translate(expression))
            .collect()
    }

    /// Translate, then enhance through the Cortex client when the result
    /// came out low-confidence and a client is configured.
    pub async fn translate_with_llm(&self, dax_source: &str) -> TranslationResult {
        let mut result = self.translate(dax_source);

        let fallback_applied = result
            .patterns_applied
            .iter()
            .any(|p| p == VAR_RETURN_FALLBACK);
        if !result.success
            || result.confidence != TranslationConfidence::Low
            || fallback_applied
            || !self.use_llm
        {
            return result;
        }
        let Some(client) = &self.llm_client else {
            return result;
        };

        let prompt = build_enhancement_prompt(
            dax_source,
            &result.sql,
            self.patterns,
            self.context.as_ref(),
        );
        match client.complete(&prompt).await {
            Ok(reply) => {
                let reply = reply.trim();
                if !reply.is_empty() {
                    log::debug!("Cortex enhancement accepted for: {}", dax_source);
                    result.sql = reply.to_string();
                    result.confidence = TranslationConfidence::Medium;
                    result.llm_used = true;
                }
            }
            Err(e) => {
                log::warn!("Cortex enhancement failed: {}", e);
                result
                    .warnings
                    .push(format!("LLM enhancement failed: {}", e));
            }
        }
        result
    }

    fn handle_parse_failure(&self, dax_source: &str, errors: Vec<String>) -> TranslationResult {
        if fallback::applies_to(dax_source) {
            log::debug!("Applying VAR/RETURN fallback for unparseable source");
            return TranslationResult {
                sql: fallback::synthesize(dax_source),
                success: true,
                confidence: TranslationConfidence::Low,
                dax_source: dax_source.to_string(),
                ast: None,
                tables_used: Vec::new(),
                joins_needed: String::new(),
                warnings: vec![
                    "Complex VAR/RETURN syntax detected - using simplified translation".to_string(),
                ],
                errors: Vec::new(),
                llm_used: false,
                patterns_applied: vec![VAR_RETURN_FALLBACK.to_string()],
            };
        }

        TranslationResult::failure(dax_source, errors)
    }

    fn translate_ast(&self, dax_source: &str, ast: DaxExpression) -> TranslationResult {
        let mut analyzer = AstAnalyzer::new();
        analyzer.analyze(&ast);

        let mut generator = SqlGenerator::new(self.context.as_ref(), Some(self.patterns));
        let sql = match generator.generate(&ast) {
            Ok(sql) => sql,
            Err(e) => {
                let mut result =
                    TranslationResult::failure(dax_source, vec![format!("Generation error: {}", e)]);
                result.ast = Some(ast);
                return result;
            }
        };

        let joins_needed = match &self.context {
            Some(context) if generator.tables_used.len() > 1 => {
                context.generate_joins(&generator.tables_used)
            }
            _ => String::new(),
        };

        let confidence = assess_confidence(
            &analyzer,
            &generator.patterns_applied,
            &generator.warnings,
            self.patterns,
        );

        TranslationResult {
            sql,
            success: true,
            confidence,
            dax_source: dax_source.to_string(),
            ast: Some(ast),
            tables_used: generator.tables_used,
            joins_needed,
            warnings: generator.warnings,
            errors: Vec::new(),
            llm_used: false,
            patterns_applied: generator.patterns_applied,
        }
    }
}

/// Translate one expression with an optional schema context.
pub fn translate_dax(dax_source: &str, context: Option<SchemaContext>) -> TranslationResult {
    let translator = DaxTranslator::new(TranslatorOptions {
        context,
        ..TranslatorOptions::default()
    });
    translator.translate(dax_source)
}

/// Translate one measure definition with an optional schema context.
pub fn translate_dax_measure(
    measure_def: &str,
    context: Option<SchemaContext>,
) -> TranslationResult {
    let translator = DaxTranslator::new(TranslatorOptions {
        context,
        ..TranslatorOptions::default()
    });
    translator.translate_measure(measure_def)
}
