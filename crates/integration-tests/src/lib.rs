//! Shared fixtures for the cross-crate tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use qa_api::{middleware, router, AppState};
use qa_core::commands::{
    AddAnswerRequest, AddCommentRequest, AddQuestionRequest, AnswerInput, CommentInput,
    VoteRequest,
};
use qa_core::error::{StoreError, StoreResult};
use qa_core::models::{
    Answer, Comment, NewAnswer, NewComment, NewQuestion, Question, TargetType, VoteDirection,
};
use qa_core::traits::DocumentStore;
use qa_core::votes::VoteSets;
use qa_services::MutationService;
use qa_store_memory::MemoryDocumentStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn question_request(title: &str, asked_by: &str) -> AddQuestionRequest {
    AddQuestionRequest {
        title: Some(title.into()),
        text: Some(format!("{title}?")),
        asked_by: Some(asked_by.into()),
        ask_date_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    }
}

pub fn comment_request(
    target_id: &str,
    target_type: TargetType,
    text: &str,
    by: &str,
) -> AddCommentRequest {
    AddCommentRequest {
        id: Some(target_id.into()),
        target_type: Some(target_type.to_string()),
        comment: Some(CommentInput {
            text: Some(text.into()),
            comment_by: Some(by.into()),
            comment_date_time: Some(Utc::now()),
        }),
    }
}

pub fn answer_request(qid: &str, text: &str, by: &str) -> AddAnswerRequest {
    AddAnswerRequest {
        qid: Some(qid.into()),
        ans: Some(AnswerInput {
            text: Some(text.into()),
            ans_by: Some(by.into()),
            ans_date_time: Some(Utc::now()),
        }),
    }
}

pub fn vote_request(qid: &str, username: &str) -> VoteRequest {
    VoteRequest {
        qid: Some(qid.into()),
        username: Some(username.into()),
    }
}

/// Memory store whose link steps always fail. Saves go through, so every
/// write leaves an orphan behind; the last saved ids are kept for lookup.
#[derive(Default)]
pub struct LinkFailingStore {
    pub inner: MemoryDocumentStore,
    pub last_comment: Mutex<Option<String>>,
    pub last_answer: Mutex<Option<String>>,
}

#[async_trait]
impl DocumentStore for LinkFailingStore {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        self.inner.insert_question(question).await
    }

    async fn save_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let saved = self.inner.save_comment(comment).await?;
        *self.last_comment.lock().unwrap() = Some(saved.id.clone());
        Ok(saved)
    }

    async fn save_answer(&self, answer: NewAnswer) -> StoreResult<Answer> {
        let saved = self.inner.save_answer(answer).await?;
        *self.last_answer.lock().unwrap() = Some(saved.id.clone());
        Ok(saved)
    }

    async fn link_comment(&self, _: &str, _: TargetType, _: &str) -> StoreResult<()> {
        Err(StoreError::Rejected("link refused".into()))
    }

    async fn link_answer(&self, _: &str, _: &str) -> StoreResult<()> {
        Err(StoreError::Rejected("link refused".into()))
    }

    async fn owning_question(&self, target_id: &str, target_type: TargetType) -> StoreResult<String> {
        self.inner.owning_question(target_id, target_type).await
    }

    async fn populated_question(&self, qid: &str) -> StoreResult<Question> {
        self.inner.populated_question(qid).await
    }

    async fn cast_vote(
        &self,
        qid: &str,
        username: &str,
        direction: VoteDirection,
    ) -> StoreResult<VoteSets> {
        self.inner.cast_vote(qid, username, direction).await
    }

    async fn increment_views(&self, qid: &str) -> StoreResult<()> {
        self.inner.increment_views(qid).await
    }
}

/// Serves the full router on an ephemeral port.
pub async fn spawn_server(service: Arc<MutationService>) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(service), middleware::cors_policy(None).unwrap());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}
