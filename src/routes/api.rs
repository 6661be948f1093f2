use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::challenge::{
    check_wallet_address, plan_resubmission, plan_review, summarize, LifecycleError,
    SubmissionStatus, SubmitChallengeRequest,
};
use crate::db;
use crate::error::ApiError;
use crate::lesson::{self, Diagnostic};
use crate::state::AppState;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::BadRequest("Invalid JSON body".to_string())
    })
}

/// POST /api/submit-challenge
pub async fn submit_challenge(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitChallengeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = json_body(payload)?;
    let rules = state.rules();
    let submission = request.validate(&rules).map_err(ApiError::BadRequest)?;
    let pool = state.pool.as_ref();

    db::ensure_user(pool, &submission.wallet_address).await?;

    match db::find_submission(pool, &submission.wallet_address, submission.chapter_id).await? {
        Some(existing) => {
            let plan = plan_resubmission(existing.status(), rules.mode, Utc::now())?;
            let updated = db::resubmit(
                pool,
                existing.id,
                &submission,
                plan.status,
                plan.reviewed_at,
                plan.reviewer_notes.as_deref(),
            )
            .await?
            .ok_or(LifecycleError::AlreadyAccepted)?;

            tracing::info!(
                wallet = %updated.wallet_address,
                chapter = updated.chapter_id,
                status = %updated.status,
                "Submission updated"
            );
            Ok(updated_response(updated))
        }
        None => {
            // A request racing this one may create the row first; the upsert
            // then overwrites it the way a resubmission would.
            let on_conflict = plan_resubmission(SubmissionStatus::Pending, rules.mode, Utc::now())?;
            let upserted = db::upsert_submission(pool, &submission, &on_conflict)
                .await?
                .ok_or(LifecycleError::AlreadyAccepted)?;
            if upserted.inserted {
                tracing::info!(
                    wallet = %upserted.submission.wallet_address,
                    chapter = upserted.submission.chapter_id,
                    "Submission created"
                );
                Ok(created_response(upserted.submission))
            } else {
                tracing::info!(
                    wallet = %upserted.submission.wallet_address,
                    chapter = upserted.submission.chapter_id,
                    "Concurrent first submission folded into an update"
                );
                Ok(updated_response(upserted.submission))
            }
        }
    }
}

fn created_response(created: db::Submission) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Submission created successfully",
            "data": created,
            "is_update": false
        })),
    )
}

fn updated_response(updated: db::Submission) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Submission updated successfully",
            "data": updated,
            "is_update": true
        })),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub wallet_address: Option<String>,
    pub chapter_id: Option<String>,
}

/// GET /api/submit-challenge?wallet_address=&chapter_id=
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<Value>, ApiError> {
    let rules = state.rules();
    let wallet = check_wallet_address(query.wallet_address.as_deref(), "wallet_address", &rules)
        .map_err(ApiError::BadRequest)?;

    let chapter_id = match query.chapter_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let id = raw.parse::<i32>().ok().filter(|id| (1..=rules.max_chapter).contains(id));
            Some(id.ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "chapter_id must be an integer between 1 and {}",
                    rules.max_chapter
                ))
            })?)
        }
    };

    let submissions = db::list_submissions(state.pool.as_ref(), &wallet, chapter_id).await?;
    Ok(Json(json!({
        "success": true,
        "count": submissions.len(),
        "data": submissions
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserStatusQuery {
    pub address: Option<String>,
}

/// GET /api/user-status?address=
pub async fn user_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserStatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let rules = state.rules();
    let wallet = check_wallet_address(query.address.as_deref(), "address", &rules)
        .map_err(ApiError::BadRequest)?;

    let pool = state.pool.as_ref();
    let submissions = db::list_submissions(pool, &wallet, None).await?;
    let progress = db::get_progress(pool, &wallet).await?.map(|p| p.progress);

    let status = summarize(&wallet, &submissions, rules.max_chapter, progress);
    Ok(Json(json!({ "success": true, "data": status })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub submission_id: i32,
    pub status: SubmissionStatus,
    pub reviewer_notes: Option<String>,
}

fn authorize_reviewer(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state
        .config
        .reviewer_token
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;
    if !constant_time_compare(presented, expected) {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// POST /api/review
pub async fn review_submission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    authorize_reviewer(&state, &headers)?;
    let request = json_body(payload)?;
    let pool = state.pool.as_ref();

    let existing = db::get_submission(pool, request.submission_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Submission {}", request.submission_id)))?;
    let verdict = plan_review(existing.status(), request.status)?;

    let notes = request
        .reviewer_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let reviewed = db::record_review(pool, existing.id, verdict, notes)
        .await?
        .ok_or(LifecycleError::NotPending(existing.status()))?;

    tracing::info!(
        submission = reviewed.id,
        chapter = reviewed.chapter_id,
        status = %verdict,
        "Submission reviewed"
    );
    Ok(Json(json!({
        "success": true,
        "message": format!("Submission {}", verdict),
        "data": reviewed
    })))
}

/// GET /api/chapters
pub async fn list_chapters() -> Json<Value> {
    let chapters: Vec<_> = lesson::chapters().iter().map(|c| c.summary()).collect();
    Json(json!({ "success": true, "count": chapters.len(), "data": chapters }))
}

fn chapter_or_404(
    path: Result<Path<u32>, PathRejection>,
) -> Result<&'static lesson::Chapter, ApiError> {
    let Path(id) = path.map_err(|rejection| {
        tracing::debug!("Rejected chapter path: {}", rejection);
        ApiError::BadRequest("Chapter id must be a positive integer".to_string())
    })?;
    lesson::find_chapter(id).ok_or_else(|| ApiError::NotFound(format!("Chapter {}", id)))
}

/// GET /api/chapters/:id
pub async fn get_chapter(
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let chapter = chapter_or_404(path)?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "id": chapter.id,
            "title": chapter.title,
            "content": chapter.content,
            "initial_code": chapter.initial_code
        }
    })))
}

/// GET /api/chapters/:id/answer
pub async fn chapter_answer(
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let chapter = chapter_or_404(path)?;
    Ok(Json(json!({
        "success": true,
        "data": { "id": chapter.id, "expected_code": chapter.expected_code }
    })))
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub output: String,
}

/// POST /api/chapters/:id/check
pub async fn check_chapter(
    path: Result<Path<u32>, PathRejection>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let chapter = chapter_or_404(path)?;
    let request = json_body(payload)?;

    let verdict = chapter.check(&request.code);
    let output = lesson::render_verdict(chapter, &verdict);
    Ok(Json(CheckResponse {
        is_valid: verdict.is_valid,
        errors: verdict.errors,
        output,
    }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub review_mode: &'static str,
    pub database: DatabaseStatus,
}

#[derive(Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let started = std::time::Instant::now();
    let database = match db::ping(state.pool.as_ref()).await {
        Ok(()) => DatabaseStatus {
            connected: true,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(err) => {
            tracing::warn!("Health check could not reach the database: {}", err);
            DatabaseStatus {
                connected: false,
                latency_ms: None,
            }
        }
    };

    Json(HealthResponse {
        status: if database.connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        review_mode: state.config.review_mode.as_str(),
        database,
    })
}
