//! # Core Traits (Ports)
//!
//! Any store or hub plugin must implement these traits to be wired into the
//! mutation pipeline. Both are injected; nothing here is a global.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::events::{HubEvent, TopicFilter};
use crate::hub::Subscription;
use crate::models::{Answer, Comment, NewAnswer, NewComment, NewQuestion, Question, TargetType, VoteDirection};
use crate::votes::VoteSets;

/// Persistence contract for questions, answers and comments.
///
/// Writes return the persisted entity with its store-assigned identifier.
/// Linking is a separate step from saving; a failure in between leaves an
/// unlinked record behind.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question>;

    async fn save_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn save_answer(&self, answer: NewAnswer) -> StoreResult<Answer>;

    /// Atomically appends `comment_id` to the comment list of the target.
    async fn link_comment(
        &self,
        target_id: &str,
        target_type: TargetType,
        comment_id: &str,
    ) -> StoreResult<()>;

    /// Atomically appends `answer_id` to the question's answer list.
    async fn link_answer(&self, qid: &str, answer_id: &str) -> StoreResult<()>;

    /// Resolves the question that owns a comment target.
    async fn owning_question(&self, target_id: &str, target_type: TargetType) -> StoreResult<String>;

    /// Loads a question with its comments, answers and answers' comments.
    async fn populated_question(&self, qid: &str) -> StoreResult<Question>;

    /// Applies [`VoteSets::cast`] to the stored sets in one atomic update and
    /// returns the sets as written.
    async fn cast_vote(
        &self,
        qid: &str,
        username: &str,
        direction: VoteDirection,
    ) -> StoreResult<VoteSets>;

    /// Bumps the view counter by one.
    async fn increment_views(&self, qid: &str) -> StoreResult<()>;
}

/// Topic-addressed publish/subscribe channel.
///
/// Publish is fire-and-forget: it returns how many live subscribers the
/// event reached and never fails.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait EventHub: Send + Sync {
    fn publish(&self, event: HubEvent) -> usize;

    /// Subscribes to the topics in `filter`. Dropping the returned handle
    /// releases the subscription.
    fn subscribe(&self, filter: TopicFilter) -> Subscription;

    fn subscriber_count(&self) -> usize;
}
