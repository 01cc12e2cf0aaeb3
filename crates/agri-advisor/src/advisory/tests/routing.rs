use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::advisory::router::{advice_handler, districts_handler};
use crate::advisory::{advisory_router, AdvisoryService, ConcurrencyPolicy, RawRequest};

fn service() -> Arc<AdvisoryService> {
    Arc::new(AdvisoryService::new(fixed_engine(), ConcurrencyPolicy::Reject))
}

async fn open_session(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/sessions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    body["session_id"]
        .as_str()
        .expect("session id")
        .to_string()
}

fn advice_request(session_id: &str, kind: &str, body: Value) -> Request<Body> {
    Request::post(format!("/api/v1/sessions/{session_id}/advice/{kind}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn crop_advice_round_trip() {
    let router = advisory_router(service());
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(advice_request(
            &session_id,
            "crop",
            json!({
                "nitrogen": 90,
                "phosphorus": 42,
                "potassium": 43,
                "temperature": "20.88",
                "humidity": 82,
                "ph": 6.5,
                "rainfall": 202.9
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "crop");
    assert_eq!(body["result"]["label"], "rice");
    assert_eq!(body["headline"], "Crop recommendation completed: Rice");
    assert_eq!(body["tips"].as_array().map(Vec::len), Some(4));

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/sessions/{session_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let view = read_json_body(response).await;
    assert_eq!(view["state"]["state"], "done");
    assert_eq!(view["status"]["busy"], false);
}

#[tokio::test]
async fn validation_errors_map_to_unprocessable_entity() {
    let router = advisory_router(service());
    let session_id = open_session(&router).await;

    let response = router
        .oneshot(advice_request(
            &session_id,
            "yield",
            json!({
                "state": "Punjab",
                "district": "Kolkata",
                "season": "Rabi",
                "crop": "Wheat",
                "area": "3"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["missing_fields"], json!(["production"]));
    assert_eq!(body["out_of_range_fields"][0]["field"], "district");
    assert_eq!(body["out_of_range_fields"][0]["reason"], "not_in_state");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let response = advice_handler(
        State(service()),
        Path(("session-missing".to_string(), "crop".to_string())),
        axum::Json(crop_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_flow_is_not_found() {
    let service = service();
    let session_id = service.open_session();

    let response = advice_handler(
        State(service),
        Path((session_id.0, "irrigation".to_string())),
        axum::Json(RawRequest::new()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["supported"], json!(["crop", "fertilizer", "yield"]));
}

#[tokio::test]
async fn closed_session_is_gone() {
    let router = advisory_router(service());
    let session_id = open_session(&router).await;

    let delete = || {
        Request::delete(format!("/api/v1/sessions/{session_id}"))
            .body(Body::empty())
            .expect("request")
    };

    let response = router.clone().oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router.oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn district_lookup_follows_catalog() {
    let response = districts_handler(State(service()), Path("Bihar".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body["districts"],
        json!(["Patna", "Gaya", "Bhagalpur", "Muzaffarpur"])
    );

    let response = districts_handler(State(service()), Path("Atlantis".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_and_stats_are_exposed() {
    let router = advisory_router(service());

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/catalog")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = read_json_body(response).await;
    assert_eq!(catalog["seasons"], json!(["Kharif", "Rabi", "Whole Year"]));
    assert_eq!(catalog["fertilizers"][0]["name"], "Urea");

    let response = router
        .oneshot(
            Request::get("/api/v1/stats")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let stats = read_json_body(response).await;
    assert_eq!(stats["sessions_open"], 0);
    assert_eq!(stats["requests"]["crop"], 0);
}
