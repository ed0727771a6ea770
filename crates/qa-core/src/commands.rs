//! # Inbound Commands
//!
//! Wire shapes of the write commands as they arrive from HTTP, and their
//! conversion into validated, typed commands. Every field is optional on the
//! wire so a malformed body is reported as `InvalidRequest` rather than a
//! deserialization fault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{NewAnswer, NewComment, NewQuestion, TargetType};
use crate::validation::validate_hyperlinks;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_date_time: Option<DateTime<Utc>>,
}

/// `POST /comment/addComment { id, type, comment }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ans_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ans_date_time: Option<DateTime<Utc>>,
}

/// `POST /answer/addAnswer { qid, ans }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAnswerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ans: Option<AnswerInput>,
}

/// `POST /question/{up,down}voteQuestion { qid, username }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `POST /question/addQuestion { title, text, askedBy, askDateTime }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_date_time: Option<DateTime<Utc>>,
}

/// A comment command that passed both validation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCommand {
    pub target_id: String,
    pub target_type: TargetType,
    pub comment: NewComment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCommand {
    pub qid: String,
    pub answer: NewAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteCommand {
    pub qid: String,
    pub username: String,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

impl AddCommentRequest {
    /// Checks the request shape first, then the comment content.
    pub fn validate(self) -> Result<CommentCommand> {
        let (Some(target_id), Some(raw_type), Some(comment)) =
            (present(self.id), present(self.target_type), self.comment)
        else {
            return Err(AppError::InvalidRequest(
                "id, type and comment are required".into(),
            ));
        };
        let target_type = raw_type.parse::<TargetType>().map_err(AppError::InvalidRequest)?;

        let (Some(text), Some(comment_by), Some(comment_date_time)) =
            (present(comment.text), present(comment.comment_by), comment.comment_date_time)
        else {
            return Err(AppError::InvalidComment(
                "text, commentBy and commentDateTime are required".into(),
            ));
        };
        validate_hyperlinks(&text).map_err(AppError::InvalidComment)?;

        Ok(CommentCommand {
            target_id,
            target_type,
            comment: NewComment { text, comment_by, comment_date_time },
        })
    }
}

impl AddAnswerRequest {
    pub fn validate(self) -> Result<AnswerCommand> {
        let (Some(qid), Some(ans)) = (present(self.qid), self.ans) else {
            return Err(AppError::InvalidRequest("qid and ans are required".into()));
        };
        let (Some(text), Some(ans_by), Some(ans_date_time)) =
            (present(ans.text), present(ans.ans_by), ans.ans_date_time)
        else {
            return Err(AppError::InvalidAnswer(
                "text, ansBy and ansDateTime are required".into(),
            ));
        };
        validate_hyperlinks(&text).map_err(AppError::InvalidAnswer)?;

        Ok(AnswerCommand {
            qid,
            answer: NewAnswer { text, ans_by, ans_date_time },
        })
    }
}

impl VoteRequest {
    pub fn validate(self) -> Result<VoteCommand> {
        match (present(self.qid), present(self.username)) {
            (Some(qid), Some(username)) => Ok(VoteCommand { qid, username }),
            _ => Err(AppError::InvalidVote("qid and username are required".into())),
        }
    }
}

impl AddQuestionRequest {
    pub fn validate(self) -> Result<NewQuestion> {
        match (
            present(self.title),
            present(self.text),
            present(self.asked_by),
            self.ask_date_time,
        ) {
            (Some(title), Some(text), Some(asked_by), Some(ask_date_time)) => {
                validate_hyperlinks(&text).map_err(AppError::InvalidRequest)?;
                Ok(NewQuestion { title, text, asked_by, ask_date_time })
            }
            _ => Err(AppError::InvalidRequest(
                "title, text, askedBy and askDateTime are required".into(),
            )),
        }
    }
}
