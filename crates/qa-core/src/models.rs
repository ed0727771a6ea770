//! # Domain Models
//!
//! These structs represent the core entities of the forum as they travel
//! over the wire. Identifiers are UUID v7 strings (time-ordered), exposed
//! under `_id` the way the document store has always named them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mints a fresh entity identifier. Only the document store calls this.
pub fn new_entity_id() -> String {
    Uuid::now_v7().to_string()
}

/// A comment attached to exactly one Question or one Answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub comment_by: String,
    pub comment_date_time: DateTime<Utc>,
}

/// An answer, owned by exactly one Question. `comments` is populated in
/// chronological order when the answer is loaded as part of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub ans_by: String,
    pub ans_date_time: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// The aggregate root: a question with its answers, comments and vote sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub text: String,
    pub asked_by: String,
    pub ask_date_time: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    /// Insertion order is chronological; never reordered.
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub up_votes: Vec<String>,
    #[serde(default)]
    pub down_votes: Vec<String>,
}

impl Question {
    pub fn answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

/// Discriminates the parent a comment hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Question,
    Answer,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Question => "question",
            TargetType::Answer => "answer",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(TargetType::Question),
            "answer" => Ok(TargetType::Answer),
            other => Err(format!("unknown target type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// A validated comment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub comment_by: String,
    pub comment_date_time: DateTime<Utc>,
}

/// A validated answer that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub text: String,
    pub ans_by: String,
    pub ans_date_time: DateTime<Utc>,
}

/// A validated question that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub title: String,
    pub text: String,
    pub asked_by: String,
    pub ask_date_time: DateTime<Utc>,
}
