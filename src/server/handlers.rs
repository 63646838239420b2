use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::semantic_catalog::{create_sample_retail_context, SchemaContext};
use crate::sql_generator::{pattern_library, SqlValidator};
use crate::tmdl;
use crate::translator::{DaxTranslator, TranslatorOptions};

use super::models::{
    now_utc, BatchTranslationResponse, CortexCompletionRequest, CortexCompletionResponse,
    TmdlTranslationResponse, TranslateBatchRequest, TranslateExpressionRequest,
    TranslateMeasureRequest, TranslateTmdlRequest, TranslationResponse, ValidateSqlRequest,
};
use super::AppState;

/// Simple health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "snowdax",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Parse the optional `context_json` request field; malformed input is the
/// caller's fault and surfaces verbatim as a 400.
fn parse_context(
    context_json: Option<&str>,
) -> Result<Option<SchemaContext>, (StatusCode, String)> {
    match context_json {
        None => Ok(None),
        Some(json) => match SchemaContext::from_json(json) {
            Ok(context) => Ok(Some(context)),
            Err(e) => {
                log::warn!("Rejecting request with invalid schema context: {}", e);
                Err((StatusCode::BAD_REQUEST, e.to_string()))
            }
        },
    }
}

/// Build a per-request translator over the shared Cortex client.
fn build_translator(state: &AppState, context: Option<SchemaContext>) -> DaxTranslator {
    DaxTranslator::new(TranslatorOptions {
        context,
        patterns: None,
        use_llm: state.config.use_llm,
        llm_client: state.cortex_client.clone(),
    })
}

pub async fn translate_expression_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateExpressionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    log::debug!("Translating expression: {}", payload.dax);

    let context = parse_context(payload.context_json.as_deref())?;
    let translator = build_translator(&state, context);
    let result = translator.translate_with_llm(&payload.dax).await;

    if !result.success {
        log::info!(
            "Translation failed for expression ({} error(s))",
            result.errors.len()
        );
    }

    let validation_issues = if payload.validate_output.unwrap_or(false) && result.success {
        Some(SqlValidator::new().validate(&result.sql).issues)
    } else {
        None
    };

    Ok(Json(TranslationResponse::from_result(
        result,
        validation_issues,
    )))
}

pub async fn translate_measure_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateMeasureRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    log::debug!("Translating measure: {}", payload.measure);

    let context = parse_context(payload.context_json.as_deref())?;
    let translator = build_translator(&state, context);
    let result = translator.translate_measure(&payload.measure);

    Ok(Json(TranslationResponse::from_result(result, None)))
}

pub async fn translate_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateBatchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    log::debug!("Translating batch of {} expressions", payload.expressions.len());

    let context = parse_context(payload.context_json.as_deref())?;
    let translator = build_translator(&state, context);

    let results = translator.translate_batch(&payload.expressions);
    let successful = results.iter().filter(|r| r.success).count();
    let failed = results.len() - successful;

    log::info!(
        "Batch translation finished: {} ok, {} failed",
        successful,
        failed
    );

    Ok(Json(BatchTranslationResponse {
        total: results.len(),
        successful,
        failed,
        results: results
            .into_iter()
            .map(|r| TranslationResponse::from_result(r, None))
            .collect(),
    }))
}

pub async fn translate_tmdl_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateTmdlRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let context = parse_context(payload.context_json.as_deref())?;
    let translator = build_translator(&state, context);

    let summary = tmdl::translate_tmdl(&translator, &payload.tmdl_content);
    log::info!(
        "TMDL translation finished: {} ok, {} failed",
        summary.measures_translated,
        summary.measures_failed
    );

    Ok(Json(TmdlTranslationResponse {
        success: summary.success,
        yaml: summary.yaml,
        measures_translated: summary.measures_translated,
        measures_failed: summary.measures_failed,
        errors: summary.errors,
        timestamp: now_utc(),
    }))
}

pub async fn list_patterns_handler() -> impl IntoResponse {
    let patterns = pattern_library().list_patterns();
    Json(serde_json::json!({
        "total": patterns.len(),
        "patterns": patterns,
    }))
}

pub async fn get_pattern_handler(
    Path(function): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match pattern_library().get_pattern(&function) {
        Some(pattern) => Ok(Json(pattern.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("No pattern registered for function '{}'", function),
        )),
    }
}

pub async fn sample_context_handler() -> impl IntoResponse {
    Json(create_sample_retail_context())
}

pub async fn validate_sql_handler(Json(payload): Json<ValidateSqlRequest>) -> impl IntoResponse {
    Json(SqlValidator::new().validate(&payload.sql))
}

pub async fn cortex_completion_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CortexCompletionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Some(client) = &state.cortex_client else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Cortex client is not configured".to_string(),
        ));
    };

    match client.complete(&payload.prompt).await {
        Ok(completion) => Ok(Json(CortexCompletionResponse {
            completion,
            model: client.model_name().to_string(),
        })),
        Err(e) => {
            log::error!("Cortex completion failed: {}", e);
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

pub async fn cortex_status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state
        .cortex_client
        .as_ref()
        .map(|c| c.model_name().to_string())
        .unwrap_or_else(|| state.config.cortex_model.clone());

    Json(crate::cortex::CortexStatus {
        configured: state.cortex_client.is_some(),
        enabled: state.config.use_llm && state.cortex_client.is_some(),
        model,
    })
}
