use serde_json::Value;

use crate::errors::EstimateError;
use crate::models::EstimationRequest;

/// Decoded request body plus whether it arrived in callable form
/// (`{ "data": { ... } }`), in which case the reply is nested under `result`.
#[derive(Debug)]
pub struct IncomingRequest {
    pub request: EstimationRequest,
    pub callable: bool,
}

/// Accepts `{ "foodDescription": ... }` or `{ "data": { "foodDescription": ... } }`.
/// Raw bytes, so a body that is not UTF-8 still gets an error envelope.
pub fn parse_request_body(body: &[u8]) -> Result<IncomingRequest, EstimateError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        log::warn!("⚠️ Request body is not JSON: {}", e);
        EstimateError::invalid_argument("Request body must be a JSON object")
    })?;

    let (payload, callable) = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => (data, true),
            Some(other) => {
                map.insert("data".to_string(), other);
                (Value::Object(map), false)
            }
            None => (Value::Object(map), false),
        },
        _ => {
            return Err(EstimateError::invalid_argument(
                "Request body must be a JSON object",
            ))
        }
    };

    let request = serde_json::from_value(payload).map_err(|e| {
        log::warn!("⚠️ Could not read estimation request: {}", e);
        EstimateError::invalid_argument("Food description is required and must be a string")
    })?;

    Ok(IncomingRequest { request, callable })
}

pub mod server {
    use super::*;
    use axum::{
        body::Bytes,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;

    use crate::models::{CallableEnvelope, ErrorBody, ErrorEnvelope, SuccessEnvelope};
    use crate::services::CalorieEstimator;

    pub struct AppState {
        pub estimator: Arc<CalorieEstimator>,
    }

    pub fn create_router(estimator: Arc<CalorieEstimator>) -> Router {
        let state = Arc::new(AppState { estimator });

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route(
                "/estimateCalories",
                post(estimate_handler).fallback(method_not_allowed),
            )
            .route(
                "/estimateCaloriesV2",
                post(estimate_handler).fallback(method_not_allowed),
            )
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    async fn estimate_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
        // A missing key wins over any body problem
        if let Err(e) = state.estimator.ensure_configured() {
            return e.into_response();
        }

        let incoming = match parse_request_body(&body) {
            Ok(incoming) => incoming,
            Err(e) => {
                log::warn!("⚠️ Rejected request: {}", e);
                return e.into_response();
            }
        };

        match state.estimator.estimate(&incoming.request).await {
            Ok(result) => {
                let envelope = SuccessEnvelope::new(result);
                if incoming.callable {
                    Json(CallableEnvelope { result: envelope }).into_response()
                } else {
                    Json(envelope).into_response()
                }
            }
            Err(e) => {
                log::error!("❌ Error in estimateCalories ({}): {}", e.status(), e);
                e.into_response()
            }
        }
    }

    async fn method_not_allowed() -> (StatusCode, Json<ErrorEnvelope>) {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    message: "Method not allowed".to_string(),
                    status: "METHOD_NOT_ALLOWED",
                },
            }),
        )
    }

    async fn root_handler() -> &'static str {
        "Calorie Estimation Service - POST { \"foodDescription\": \"...\" } to /estimateCalories"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

}
