//! Integration tests - HTTP surface exercised in-process
//!
//! Requests run through the full axum router with `tower::ServiceExt`; no
//! network listener is involved.

mod api_tests;
mod cortex_flow_tests;
