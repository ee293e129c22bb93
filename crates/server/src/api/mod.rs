//! HTTP surface of the answer store.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use server_api::{health, list_responses, submit_answers};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{responses_route, submit_route, AnswerSet, StoredResponse, SubmitOutcome},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::warn;

use crate::app_state::AppState;

pub(crate) const ROOT_BANNER: &str = "Survey backend running";

pub(crate) fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(submit_route(), post(http_submit))
        .route(responses_route(), get(http_list_responses))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    ROOT_BANNER
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match health(&state.api).await {
        Ok(()) => "ok".into_response(),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, Json(err)).into_response(),
    }
}

async fn http_submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnswerSet>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, (StatusCode, Json<SubmitOutcome>)> {
    let Json(answers) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected survey submission body");
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(SubmitOutcome::rejected(rejection.body_text())),
        )
    })?;

    submit_answers(&state.api, &answers)
        .await
        .map(Json)
        .map_err(failure)
}

async fn http_list_responses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredResponse>>, (StatusCode, Json<SubmitOutcome>)> {
    list_responses(&state.api).await.map(Json).map_err(failure)
}

fn failure(err: ApiError) -> (StatusCode, Json<SubmitOutcome>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unavailable | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(SubmitOutcome::from(err)))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
