//! Builders for the comment and answer forms. Input is checked locally and
//! stamped with the current time; the server validates again.

use chrono::Utc;
use qa_core::commands::{AnswerInput, CommentInput};
use qa_core::validation::{ensure_not_blank, validate_hyperlinks};

use crate::commands::ClientError;

pub fn comment_draft(text: &str, author: &str) -> Result<CommentInput, ClientError> {
    ensure_not_blank(text, "Comment").map_err(ClientError::Form)?;
    Ok(CommentInput {
        text: Some(text.to_string()),
        comment_by: Some(author.to_string()),
        comment_date_time: Some(Utc::now()),
    })
}

pub fn answer_draft(text: &str, author: &str) -> Result<AnswerInput, ClientError> {
    ensure_not_blank(text, "Answer text").map_err(ClientError::Form)?;
    validate_hyperlinks(text)
        .map_err(|_| ClientError::Form("Invalid hyperlink format.".into()))?;
    Ok(AnswerInput {
        text: Some(text.to_string()),
        ans_by: Some(author.to_string()),
        ans_date_time: Some(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_comment_is_refused() {
        let err = comment_draft("   ", "alice").unwrap_err();
        assert_eq!(err.to_string(), "Comment cannot be empty");
    }

    #[test]
    fn comment_draft_is_stamped() {
        let draft = comment_draft("nice", "alice").unwrap();
        assert_eq!(draft.comment_by.as_deref(), Some("alice"));
        assert!(draft.comment_date_time.is_some());
    }

    #[test]
    fn answer_with_bad_link_is_refused() {
        let err = answer_draft("[docs](docs.rs)", "bob").unwrap_err();
        assert_eq!(err.to_string(), "Invalid hyperlink format.");
        assert!(answer_draft("[docs](https://docs.rs)", "bob").is_ok());
    }
}
