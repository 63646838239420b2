//! Snowflake Cortex LLM boundary
//!
//! The translator only depends on the narrow [`CortexClient`] trait; the REST
//! client below is the deployment-side implementation detail. Prompts are
//! assembled from the pattern registry and the schema context so the model
//! sees the same reference material the deterministic pipeline uses.

use async_trait::async_trait;
use serde::Serialize;

use crate::semantic_catalog::SchemaContext;
use crate::sql_generator::PatternLibrary;

/// Completion client for LLM-backed SQL enhancement.
#[async_trait]
pub trait CortexClient: Send + Sync {
    /// Complete a prompt, returning the raw model reply.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Model identifier, for status reporting.
    fn model_name(&self) -> &str;
}

/// Status payload for `GET /translate/cortex/status`.
#[derive(Debug, Clone, Serialize)]
pub struct CortexStatus {
    pub configured: bool,
    pub enabled: bool,
    pub model: String,
}

/// Build the enhancement prompt for a low-confidence translation.
pub fn build_enhancement_prompt(
    dax_source: &str,
    initial_sql: &str,
    patterns: &PatternLibrary,
    context: Option<&SchemaContext>,
) -> String {
    let mut parts = vec![
        "You are a DAX to Snowflake SQL translator.".to_string(),
        String::new(),
        "Convert the following DAX expression to Snowflake SQL.".to_string(),
        String::new(),
        format!("DAX: {}", dax_source),
        String::new(),
        "Initial SQL attempt (may need fixes):".to_string(),
        initial_sql.to_string(),
        String::new(),
        "Reference patterns:".to_string(),
        patterns.to_prompt_context(),
    ];

    if let Some(context) = context {
        parts.push(String::new());
        parts.push(context.to_prompt_context());
    }

    parts.push(String::new());
    parts.push("Provide ONLY the corrected SQL, no explanations.".to_string());
    parts.join("\n")
}

/// REST client against the Snowflake Cortex completion endpoint.
///
/// Credential plumbing is deliberately not wired here; `complete` reports the
/// missing configuration so callers degrade to the pattern-based SQL with a
/// warning instead of failing the translation.
#[derive(Debug, Clone)]
pub struct CortexRestClient {
    model: String,
}

impl CortexRestClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl CortexClient for CortexRestClient {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!(
            "Snowflake Cortex REST access is not configured for model '{}'",
            self.model
        )
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
