use axum::Json;
use axum::body::Bytes;
use axum::extract::Query;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::stats::{DayPlan, ScheduleStats};
use crate::services::{Answer, ScheduleSnapshot, StatusReport};
use crate::state::AppState;

#[derive(Deserialize)]
struct AskParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct UploadResponse {
    sessions: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_schedule).put(upload_schedule))
        .route("/schedule/reload", post(reload_schedule))
        .route("/week", get(week))
        .route("/status", get(status))
        .route("/query", get(ask))
        .route("/stats", get(stats))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_schedule(State(state): State<AppState>) -> Result<Json<ScheduleSnapshot>, AppError> {
    let snapshot = state.assistant.snapshot().await?;
    Ok(Json(snapshot))
}

async fn upload_schedule(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty".to_string()));
    }
    let sessions = state.assistant.replace_from_csv(&body).await?;
    Ok(Json(UploadResponse { sessions }))
}

async fn reload_schedule(State(state): State<AppState>) -> StatusCode {
    state.assistant.reload().await;
    StatusCode::NO_CONTENT
}

async fn week(State(state): State<AppState>) -> Result<Json<Vec<DayPlan>>, AppError> {
    let week = state.assistant.week().await?;
    Ok(Json(week))
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusReport>, AppError> {
    let report = state.assistant.status().await?;
    Ok(Json(report))
}

async fn ask(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<Answer>, AppError> {
    let answer = state.assistant.ask(&params.q).await?;
    Ok(Json(answer))
}

async fn stats(State(state): State<AppState>) -> Result<Json<ScheduleStats>, AppError> {
    let stats = state.assistant.stats().await?;
    Ok(Json(stats))
}
