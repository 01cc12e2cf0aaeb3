use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{InferenceKind, RawRequest, SessionId};
use super::errors::AdvisoryError;
use super::service::AdvisoryService;

/// Router builder exposing sessions, advice submission and the catalog.
pub fn advisory_router(service: Arc<AdvisoryService>) -> Router {
    Router::new()
        .route("/api/v1/sessions", post(open_session_handler))
        .route(
            "/api/v1/sessions/:session_id",
            get(session_handler).delete(close_session_handler),
        )
        .route(
            "/api/v1/sessions/:session_id/advice/:kind",
            post(advice_handler),
        )
        .route("/api/v1/catalog", get(catalog_handler))
        .route(
            "/api/v1/catalog/states/:state/districts",
            get(districts_handler),
        )
        .route("/api/v1/stats", get(stats_handler))
        .with_state(service)
}

pub(crate) async fn open_session_handler(State(service): State<Arc<AdvisoryService>>) -> Response {
    let session_id = service.open_session();
    let payload = json!({
        "session_id": session_id,
        "policy": service.policy(),
    });
    (StatusCode::CREATED, Json(payload)).into_response()
}

pub(crate) async fn session_handler(
    State(service): State<Arc<AdvisoryService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.view(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn close_session_handler(
    State(service): State<Arc<AdvisoryService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn advice_handler(
    State(service): State<Arc<AdvisoryService>>,
    Path((session_id, kind)): Path<(String, String)>,
    Json(request): Json<RawRequest>,
) -> Response {
    let Some(kind) = InferenceKind::parse(&kind) else {
        let payload = json!({
            "error": format!("unknown advisory flow '{kind}'"),
            "supported": InferenceKind::ordered().map(InferenceKind::slug),
        });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    match service.advise(&SessionId(session_id), request, kind).await {
        Ok(recommendation) => (StatusCode::OK, Json(recommendation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn catalog_handler(State(service): State<Arc<AdvisoryService>>) -> Response {
    (StatusCode::OK, Json(service.catalog().view())).into_response()
}

pub(crate) async fn districts_handler(
    State(service): State<Arc<AdvisoryService>>,
    Path(state): Path<String>,
) -> Response {
    match service.catalog().districts(&state) {
        Some(districts) => {
            let payload = json!({
                "state": state,
                "districts": districts,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        None => {
            let payload = json!({
                "error": format!("unknown state '{state}'"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn stats_handler(State(service): State<Arc<AdvisoryService>>) -> Response {
    (StatusCode::OK, Json(service.stats())).into_response()
}

fn error_response(err: AdvisoryError) -> Response {
    let status = err.status_code();
    let payload = match &err {
        AdvisoryError::Validation(validation) => json!({
            "error": validation.summary(),
            "missing_fields": validation.missing_fields,
            "out_of_range_fields": validation.out_of_range_fields,
        }),
        AdvisoryError::Busy(busy) => json!({
            "error": busy.to_string(),
            "in_flight": busy.in_flight,
            "in_flight_kind": busy.in_flight_kind,
        }),
        // Strategy internals stay out of the response body.
        AdvisoryError::Inference(_) => json!({
            "error": "Prediction failed. Please try again.",
        }),
        other => json!({
            "error": other.to_string(),
        }),
    };
    (status, Json(payload)).into_response()
}
