//! # qa-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the
//! mutation service. Handlers do no work of their own beyond decoding the
//! body and mapping the outcome to a status code.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qa_core::commands::{AddAnswerRequest, AddCommentRequest, AddQuestionRequest, VoteRequest};
use qa_core::error::AppError;
use qa_core::models::{Answer, Comment, Question, VoteDirection};
use qa_core::traits::EventHub;
use qa_services::{MutationService, VoteOutcome};
use serde::Deserialize;
use tracing::debug;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MutationService>,
    pub hub: Arc<dyn EventHub>,
}

impl AppState {
    pub fn new(service: Arc<MutationService>) -> Self {
        let hub = service.hub().clone();
        Self { service, hub }
    }
}

/// HTTP face of [`AppError`]: validation → 400, missing → 404, store → 500.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            err if err.is_validation() => StatusCode::BAD_REQUEST,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `POST /comment/addComment`
pub async fn add_comment(
    State(state): State<AppState>,
    body: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult<Comment> {
    let Json(request) = body?;
    Ok(Json(state.service.submit_comment(request).await?))
}

/// `POST /answer/addAnswer`
pub async fn add_answer(
    State(state): State<AppState>,
    body: Result<Json<AddAnswerRequest>, JsonRejection>,
) -> ApiResult<Answer> {
    let Json(request) = body?;
    Ok(Json(state.service.submit_answer(request).await?))
}

pub async fn upvote_question(
    State(state): State<AppState>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<VoteOutcome> {
    let Json(request) = body?;
    Ok(Json(state.service.submit_vote(request, VoteDirection::Up).await?))
}

pub async fn downvote_question(
    State(state): State<AppState>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<VoteOutcome> {
    let Json(request) = body?;
    Ok(Json(state.service.submit_vote(request, VoteDirection::Down).await?))
}

pub async fn add_question(
    State(state): State<AppState>,
    body: Result<Json<AddQuestionRequest>, JsonRejection>,
) -> ApiResult<Question> {
    let Json(request) = body?;
    Ok(Json(state.service.add_question(request).await?))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub username: Option<String>,
}

/// `GET /question/getQuestionById/{qid}`: counts a view as a side effect.
pub async fn get_question(
    State(state): State<AppState>,
    Path(qid): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Question> {
    debug!(%qid, viewer = ?query.username, "question viewed");
    Ok(Json(state.service.view_question(&qid).await?))
}
