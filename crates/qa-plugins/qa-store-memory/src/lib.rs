//! # qa-store-memory
//!
//! In-process implementation of `DocumentStore`. Entities are kept as
//! records holding child *references* (identifiers); populated aggregates
//! are assembled on read, the way a document store resolves references.
//!
//! Every single-document update (append a child id, rewrite the vote sets,
//! bump the view counter) runs under the shard lock of that document, so
//! concurrent writers to the same question never lose each other's update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use qa_core::error::{StoreError, StoreResult};
use qa_core::models::{
    new_entity_id, Answer, Comment, NewAnswer, NewComment, NewQuestion, Question, TargetType,
    VoteDirection,
};
use qa_core::traits::DocumentStore;
use qa_core::votes::VoteSets;
use tracing::debug;

#[derive(Debug, Clone)]
struct QuestionRecord {
    id: String,
    title: String,
    text: String,
    asked_by: String,
    ask_date_time: DateTime<Utc>,
    views: u64,
    answer_ids: Vec<String>,
    comment_ids: Vec<String>,
    votes: VoteSets,
}

#[derive(Debug, Clone)]
struct AnswerRecord {
    id: String,
    text: String,
    ans_by: String,
    ans_date_time: DateTime<Utc>,
    comment_ids: Vec<String>,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    questions: DashMap<String, QuestionRecord>,
    answers: DashMap<String, AnswerRecord>,
    comments: DashMap<String, Comment>,
    /// answer id -> owning question id, recorded when the answer is linked
    answer_owner: DashMap<String, String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a persisted comment whether or not it is linked anywhere.
    pub fn comment(&self, id: &str) -> Option<Comment> {
        self.comments.get(id).map(|c| c.clone())
    }

    pub fn answer_exists(&self, id: &str) -> bool {
        self.answers.contains_key(id)
    }

    fn resolve_comments(&self, ids: &[String]) -> Vec<Comment> {
        ids.iter()
            .filter_map(|id| self.comments.get(id).map(|c| c.clone()))
            .collect()
    }

    fn populate_answer(&self, record: &AnswerRecord) -> Answer {
        Answer {
            id: record.id.clone(),
            text: record.text.clone(),
            ans_by: record.ans_by.clone(),
            ans_date_time: record.ans_date_time,
            comments: self.resolve_comments(&record.comment_ids),
        }
    }
}

fn append_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let record = QuestionRecord {
            id: new_entity_id(),
            title: question.title,
            text: question.text,
            asked_by: question.asked_by,
            ask_date_time: question.ask_date_time,
            views: 0,
            answer_ids: Vec::new(),
            comment_ids: Vec::new(),
            votes: VoteSets::default(),
        };
        let qid = record.id.clone();
        self.questions.insert(qid.clone(), record);
        debug!(%qid, "question inserted");
        self.populated_question(&qid).await
    }

    async fn save_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let saved = Comment {
            id: new_entity_id(),
            text: comment.text,
            comment_by: comment.comment_by,
            comment_date_time: comment.comment_date_time,
        };
        self.comments.insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    async fn save_answer(&self, answer: NewAnswer) -> StoreResult<Answer> {
        let record = AnswerRecord {
            id: new_entity_id(),
            text: answer.text,
            ans_by: answer.ans_by,
            ans_date_time: answer.ans_date_time,
            comment_ids: Vec::new(),
        };
        let saved = self.populate_answer(&record);
        self.answers.insert(record.id.clone(), record);
        Ok(saved)
    }

    async fn link_comment(
        &self,
        target_id: &str,
        target_type: TargetType,
        comment_id: &str,
    ) -> StoreResult<()> {
        if !self.comments.contains_key(comment_id) {
            return Err(StoreError::NotFound("Comment", comment_id.to_string()));
        }
        match target_type {
            TargetType::Question => {
                let mut question = self
                    .questions
                    .get_mut(target_id)
                    .ok_or_else(|| StoreError::NotFound("Question", target_id.to_string()))?;
                append_unique(&mut question.comment_ids, comment_id);
            }
            TargetType::Answer => {
                let mut answer = self
                    .answers
                    .get_mut(target_id)
                    .ok_or_else(|| StoreError::NotFound("Answer", target_id.to_string()))?;
                append_unique(&mut answer.comment_ids, comment_id);
            }
        }
        Ok(())
    }

    async fn link_answer(&self, qid: &str, answer_id: &str) -> StoreResult<()> {
        if !self.answers.contains_key(answer_id) {
            return Err(StoreError::NotFound("Answer", answer_id.to_string()));
        }
        if let Some(owner) = self.answer_owner.get(answer_id) {
            if owner.value() != qid {
                return Err(StoreError::Rejected(format!(
                    "answer {answer_id} already belongs to question {}",
                    owner.value()
                )));
            }
        }
        {
            let mut question = self
                .questions
                .get_mut(qid)
                .ok_or_else(|| StoreError::NotFound("Question", qid.to_string()))?;
            append_unique(&mut question.answer_ids, answer_id);
        }
        self.answer_owner.insert(answer_id.to_string(), qid.to_string());
        Ok(())
    }

    async fn owning_question(&self, target_id: &str, target_type: TargetType) -> StoreResult<String> {
        match target_type {
            TargetType::Question if self.questions.contains_key(target_id) => {
                Ok(target_id.to_string())
            }
            TargetType::Question => Err(StoreError::NotFound("Question", target_id.to_string())),
            TargetType::Answer => self
                .answer_owner
                .get(target_id)
                .map(|qid| qid.value().clone())
                .ok_or_else(|| StoreError::NotFound("Answer", target_id.to_string())),
        }
    }

    async fn populated_question(&self, qid: &str) -> StoreResult<Question> {
        let record = self
            .questions
            .get(qid)
            .map(|q| q.clone())
            .ok_or_else(|| StoreError::NotFound("Question", qid.to_string()))?;

        let answers = record
            .answer_ids
            .iter()
            .filter_map(|aid| self.answers.get(aid).map(|a| self.populate_answer(&a)))
            .collect();

        Ok(Question {
            id: record.id,
            title: record.title,
            text: record.text,
            asked_by: record.asked_by,
            ask_date_time: record.ask_date_time,
            views: record.views,
            answers,
            comments: self.resolve_comments(&record.comment_ids),
            up_votes: record.votes.up_votes,
            down_votes: record.votes.down_votes,
        })
    }

    async fn cast_vote(
        &self,
        qid: &str,
        username: &str,
        direction: VoteDirection,
    ) -> StoreResult<VoteSets> {
        let mut question = self
            .questions
            .get_mut(qid)
            .ok_or_else(|| StoreError::NotFound("Question", qid.to_string()))?;
        question.votes.cast(username, direction);
        Ok(question.votes.clone())
    }

    async fn increment_views(&self, qid: &str) -> StoreResult<()> {
        let mut question = self
            .questions
            .get_mut(qid)
            .ok_or_else(|| StoreError::NotFound("Question", qid.to_string()))?;
        question.views += 1;
        Ok(())
    }
}
