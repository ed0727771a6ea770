//! # Command Client
//!
//! Issues write commands (and the seeding fetch) against the HTTP API.
//! Failures come back to the caller as [`ClientError`]; nothing is retried.

use async_trait::async_trait;
use qa_core::commands::{AddAnswerRequest, AddCommentRequest, AnswerInput, CommentInput, VoteRequest};
use qa_core::models::{Answer, Comment, Question, TargetType, VoteDirection};
use qa_core::votes::VoteOutcome;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any command was sent.
    #[error("{0}")]
    Form(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("event socket error: {0}")]
    Socket(String),

    #[error("invalid server url: {0}")]
    Url(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandClient: Send + Sync {
    async fn add_comment(
        &self,
        target_id: &str,
        target_type: TargetType,
        comment: CommentInput,
    ) -> Result<Comment, ClientError>;

    async fn add_answer(&self, qid: &str, answer: AnswerInput) -> Result<Answer, ClientError>;

    async fn vote(
        &self,
        qid: &str,
        username: &str,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, ClientError>;

    /// Full fetch of a populated question; counts as a view on the server.
    async fn get_question(&self, qid: &str) -> Result<Question, ClientError>;
}

/// [`CommandClient`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCommandClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCommandClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| ClientError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(target: "qa::command", %url, "sending command");
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl CommandClient for HttpCommandClient {
    async fn add_comment(
        &self,
        target_id: &str,
        target_type: TargetType,
        comment: CommentInput,
    ) -> Result<Comment, ClientError> {
        let body = AddCommentRequest {
            id: Some(target_id.to_string()),
            target_type: Some(target_type.as_str().to_string()),
            comment: Some(comment),
        };
        self.post_json(&["comment", "addComment"], &body).await
    }

    async fn add_answer(&self, qid: &str, answer: AnswerInput) -> Result<Answer, ClientError> {
        let body = AddAnswerRequest {
            qid: Some(qid.to_string()),
            ans: Some(answer),
        };
        self.post_json(&["answer", "addAnswer"], &body).await
    }

    async fn vote(
        &self,
        qid: &str,
        username: &str,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, ClientError> {
        let path = match direction {
            VoteDirection::Up => "upvoteQuestion",
            VoteDirection::Down => "downvoteQuestion",
        };
        let body = VoteRequest {
            qid: Some(qid.to_string()),
            username: Some(username.to_string()),
        };
        self.post_json(&["question", path], &body).await
    }

    async fn get_question(&self, qid: &str) -> Result<Question, ClientError> {
        let url = self.endpoint(&["question", "getQuestionById", qid])?;
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}
