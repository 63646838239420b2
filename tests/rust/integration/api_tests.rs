use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use snowdax::config::ServerConfig;
use snowdax::server::{build_router, AppState};

fn app() -> Router {
    let state = Arc::new(AppState {
        config: ServerConfig::default(),
        cortex_client: None,
    });
    build_router(state)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoint_reports_service_name() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "snowdax");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn translate_expression_returns_sql_and_metadata() {
    let (status, body) = post_json(
        app(),
        "/translate/expression",
        json!({ "dax": "SUM(Sales[Amount])" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sql"], "SUM(sales.amount)");
    assert_eq!(body["confidence"], "HIGH");
    assert_eq!(body["tables_used"], json!(["Sales"]));
    assert_eq!(body["patterns_applied"], json!(["SUM"]));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn translate_expression_with_validation() {
    let (status, body) = post_json(
        app(),
        "/translate/expression",
        json!({ "dax": "SUM(Sales[Amount])", "validate_output": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validation_issues"], json!([]));
}

#[tokio::test]
async fn translate_expression_without_validation_omits_issues() {
    let (_, body) = post_json(
        app(),
        "/translate/expression",
        json!({ "dax": "SUM(Sales[Amount])" }),
    )
    .await;
    assert!(body.get("validation_issues").is_none());
}

#[tokio::test]
async fn translate_expression_with_schema_context() {
    let context_json = json!({
        "tables": [
            {
                "dax_name": "Sales",
                "sql_name": "fact_sales",
                "columns": [
                    {"dax_name": "Amount", "sql_name": "amount_usd", "data_type": "NUMBER"}
                ]
            }
        ],
        "relationships": []
    });

    let (status, body) = post_json(
        app(),
        "/translate/expression",
        json!({
            "dax": "SUM(Sales[Amount])",
            "context_json": context_json.to_string()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sql"], "SUM(fact_sales.amount_usd)");
}

#[tokio::test]
async fn malformed_context_json_is_a_bad_request() {
    let (status, body) = post_json(
        app(),
        "/translate/expression",
        json!({ "dax": "SUM(Sales[Amount])", "context_json": "{not json" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("Invalid schema context JSON"));
}

#[tokio::test]
async fn parse_failures_are_reported_not_500s() {
    let (status, body) = post_json(
        app(),
        "/translate/expression",
        json!({ "dax": "SUM(Sales[Amount]" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["confidence"], "UNKNOWN");
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn translate_measure_endpoint() {
    let (status, body) = post_json(
        app(),
        "/translate/measure",
        json!({ "measure": "[Total Sales] = SUM(Sales[Amount])" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sql"], "SUM(sales.amount)");
}

#[tokio::test]
async fn batch_endpoint_counts_successes_and_failures() {
    let (status, body) = post_json(
        app(),
        "/translate/batch",
        json!({
            "expressions": [
                "SUM(Sales[Amount])",
                "COUNTROWS(Sales)",
                "broken(",
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["successful"], 2);
    assert_eq!(body["failed"], 1);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["sql"], "COUNT(*)");
    assert_eq!(results[2]["success"], false);
}

#[tokio::test]
async fn tmdl_endpoint_translates_measures_to_yaml() {
    let tmdl = "measure 'Total Sales' = SUM(Sales[Amount])\nmeasure Orders = COUNTROWS(Sales)";
    let (status, body) =
        post_json(app(), "/translate/tmdl", json!({ "tmdl_content": tmdl })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["measures_translated"], 2);
    assert_eq!(body["measures_failed"], 0);
    let yaml = body["yaml"].as_str().unwrap();
    assert!(yaml.contains("Total Sales"));
    assert!(yaml.contains("SUM(sales.amount)"));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn patterns_listing_includes_registered_functions() {
    let (status, body) = get_json(app(), "/translate/patterns").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_u64().unwrap() > 30);
    let names: Vec<&str> = body["patterns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["dax_function"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"SUM"));
    assert!(names.contains(&"CALCULATE"));
}

#[tokio::test]
async fn single_pattern_lookup_is_case_insensitive() {
    let (status, body) = get_json(app(), "/translate/patterns/divide").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dax_function"], "DIVIDE");
    assert_eq!(body["complexity"], "simple");
}

#[tokio::test]
async fn unknown_pattern_is_a_404() {
    let (status, _) = get_json(app(), "/translate/patterns/FROBNICATE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sample_context_round_trips_through_the_catalog() {
    let (status, body) = get_json(app(), "/translate/context/sample").await;
    assert_eq!(status, StatusCode::OK);

    let parsed =
        snowdax::semantic_catalog::SchemaContext::from_json(&body.to_string()).unwrap();
    assert_eq!(
        parsed,
        snowdax::semantic_catalog::create_sample_retail_context()
    );
}

#[tokio::test]
async fn validate_endpoint_flags_unbalanced_sql() {
    let (status, body) = post_json(
        app(),
        "/translate/validate",
        json!({ "sql": "SUM(sales.amount" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(!body["issues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cortex_status_reports_unconfigured_by_default() {
    let (status, body) = get_json(app(), "/translate/cortex/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
    assert_eq!(body["enabled"], false);
}

#[tokio::test]
async fn cortex_completion_unavailable_without_client() {
    let (status, _) = post_json(app(), "/translate/cortex", json!({ "prompt": "hi" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
