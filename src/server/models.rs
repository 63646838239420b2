use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::translator::{TranslationConfidence, TranslationResult};

/// Request for `POST /translate/expression`.
#[derive(Debug, Deserialize)]
pub struct TranslateExpressionRequest {
    /// DAX expression to translate
    pub dax: String,

    /// Optional schema context as a JSON string
    pub context_json: Option<String>,

    /// Run the structural SQL validator on the translated output
    pub validate_output: Option<bool>,
}

/// Request for `POST /translate/measure`.
#[derive(Debug, Deserialize)]
pub struct TranslateMeasureRequest {
    /// Measure definition like `[Name] = expression`
    pub measure: String,

    pub context_json: Option<String>,
}

/// Request for `POST /translate/batch`.
#[derive(Debug, Deserialize)]
pub struct TranslateBatchRequest {
    pub expressions: Vec<String>,
    pub context_json: Option<String>,
}

/// Request for `POST /translate/tmdl`.
#[derive(Debug, Deserialize)]
pub struct TranslateTmdlRequest {
    pub tmdl_content: String,
    pub context_json: Option<String>,
}

/// Request for `POST /translate/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateSqlRequest {
    pub sql: String,
}

/// Request for `POST /translate/cortex`.
#[derive(Debug, Deserialize)]
pub struct CortexCompletionRequest {
    pub prompt: String,
}

/// Response for `POST /translate/cortex`.
#[derive(Debug, Serialize)]
pub struct CortexCompletionResponse {
    pub completion: String,
    pub model: String,
}

/// Wire shape of one translation outcome.
#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub success: bool,
    pub sql: String,
    pub confidence: TranslationConfidence,
    pub tables_used: Vec<String>,
    pub joins: String,
    pub patterns_applied: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_issues: Option<Vec<String>>,
    /// ISO-8601 UTC
    pub timestamp: String,
}

impl TranslationResponse {
    pub fn from_result(
        result: TranslationResult,
        validation_issues: Option<Vec<String>>,
    ) -> Self {
        Self {
            success: result.success,
            sql: result.sql,
            confidence: result.confidence,
            tables_used: result.tables_used,
            joins: result.joins_needed,
            patterns_applied: result.patterns_applied,
            warnings: result.warnings,
            errors: result.errors,
            validation_issues,
            timestamp: now_utc(),
        }
    }
}

/// Response for `POST /translate/batch`.
#[derive(Debug, Serialize)]
pub struct BatchTranslationResponse {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<TranslationResponse>,
}

/// Response for `POST /translate/tmdl`.
#[derive(Debug, Serialize)]
pub struct TmdlTranslationResponse {
    pub success: bool,
    pub yaml: String,
    pub measures_translated: usize,
    pub measures_failed: usize,
    pub errors: Vec<String>,
    pub timestamp: String,
}

/// Current time as ISO-8601 UTC with a trailing `Z`.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
