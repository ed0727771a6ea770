//! # Mutation Service
//!
//! Runs every write through the same sequential chain: validate, persist,
//! link into the parent, reload, publish. Each command returns only the
//! entity it created; subscribers (the caller included) learn about the new
//! state from the hub.
//!
//! Persist and link are separate store calls. When linking fails, the
//! record persisted in the previous step stays behind unlinked and the
//! command fails with `Persistence`; nothing is rolled back.

use std::sync::Arc;

use dashmap::DashMap;
use qa_core::commands::{AddAnswerRequest, AddCommentRequest, AddQuestionRequest, VoteRequest};
use qa_core::error::{AppError, Result, StoreError};
use qa_core::events::{AnswerUpdate, CommentUpdate, HubEvent, VoteUpdate};
use qa_core::models::{Answer, Comment, Question, TargetType, VoteDirection};
use qa_core::traits::{DocumentStore, EventHub};
use qa_core::votes::VoteOutcome;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, warn};

pub struct MutationService {
    store: Arc<dyn DocumentStore>,
    hub: Arc<dyn EventHub>,
    /// Per-question lanes serializing "read the aggregate, publish it" so the
    /// last event published for a question carries its latest state. An
    /// entry lives only while some command holds or waits on it.
    publish_lanes: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive hold on one question's publish lane.
struct LaneGuard<'a> {
    lanes: &'a DashMap<String, Arc<Mutex<()>>>,
    qid: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own handle left means nobody is queued behind us.
        self.lanes
            .remove_if(&self.qid, |_, lane| Arc::strong_count(lane) == 1);
    }
}

fn rejected(kind: &'static str) -> impl FnOnce(&AppError) {
    move |err| warn!(target: "qa::command", kind, error = %err, "command rejected")
}

fn store_failure(step: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| {
        error!(target: "qa::command", step, error = %err, "store call failed");
        AppError::from(err)
    }
}

impl MutationService {
    pub fn new(store: Arc<dyn DocumentStore>, hub: Arc<dyn EventHub>) -> Self {
        Self {
            store,
            hub,
            publish_lanes: DashMap::new(),
        }
    }

    pub fn hub(&self) -> &Arc<dyn EventHub> {
        &self.hub
    }

    async fn enter_lane(&self, qid: &str) -> LaneGuard<'_> {
        let lane = self
            .publish_lanes
            .entry(qid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lane.lock_owned().await;
        LaneGuard {
            lanes: &self.publish_lanes,
            qid: qid.to_string(),
            guard: Some(guard),
        }
    }

    /// Adds a comment to a question or an answer and publishes the reloaded
    /// parent on `commentUpdate`.
    pub async fn submit_comment(&self, request: AddCommentRequest) -> Result<Comment> {
        let command = request.validate().inspect_err(rejected("comment"))?;
        let (target_id, target_type) = (command.target_id, command.target_type);

        let saved = self
            .store
            .save_comment(command.comment)
            .await
            .map_err(store_failure("save comment"))?;

        if let Err(err) = self.store.link_comment(&target_id, target_type, &saved.id).await {
            warn!(
                target: "qa::command",
                comment_id = %saved.id,
                %target_id,
                %target_type,
                "comment persisted but not linked"
            );
            return Err(store_failure("link comment")(err));
        }

        let qid = self
            .store
            .owning_question(&target_id, target_type)
            .await
            .map_err(store_failure("resolve owner"))?;

        let _lane = self.enter_lane(&qid).await;
        let question = self
            .store
            .populated_question(&qid)
            .await
            .map_err(store_failure("reload question"))?;

        let update = match target_type {
            TargetType::Question => CommentUpdate::Question(question),
            TargetType::Answer => {
                let answer = question
                    .answers
                    .into_iter()
                    .find(|a| a.id == target_id)
                    .ok_or_else(|| {
                        AppError::Persistence(format!(
                            "answer {target_id} missing from reloaded question {qid}"
                        ))
                    })?;
                CommentUpdate::Answer(answer)
            }
        };
        let receivers = self.hub.publish(HubEvent::CommentUpdate(update));

        info!(
            target: "qa::command",
            comment_id = %saved.id,
            %target_id,
            %target_type,
            receivers,
            "comment added"
        );
        Ok(saved)
    }

    /// Appends an answer to a question and publishes only the new answer on
    /// `answerUpdate`.
    pub async fn submit_answer(&self, request: AddAnswerRequest) -> Result<Answer> {
        let command = request.validate().inspect_err(rejected("answer"))?;
        let qid = command.qid;

        let saved = self
            .store
            .save_answer(command.answer)
            .await
            .map_err(store_failure("save answer"))?;

        if let Err(err) = self.store.link_answer(&qid, &saved.id).await {
            warn!(target: "qa::command", answer_id = %saved.id, %qid, "answer persisted but not linked");
            return Err(store_failure("link answer")(err));
        }

        // A comment that reloaded before this link must publish first, or
        // its stale aggregate would overwrite the appended answer.
        let _lane = self.enter_lane(&qid).await;
        let receivers = self.hub.publish(HubEvent::AnswerUpdate(AnswerUpdate {
            qid: qid.clone(),
            answer: saved.clone(),
        }));

        info!(target: "qa::command", answer_id = %saved.id, %qid, receivers, "answer added");
        Ok(saved)
    }

    /// Moves the voter into the set for `direction` and publishes both sets
    /// on `voteUpdate`. Re-voting the same direction still publishes.
    pub async fn submit_vote(
        &self,
        request: VoteRequest,
        direction: VoteDirection,
    ) -> Result<VoteOutcome> {
        let command = request.validate().inspect_err(rejected("vote"))?;

        let _lane = self.enter_lane(&command.qid).await;
        let sets = self
            .store
            .cast_vote(&command.qid, &command.username, direction)
            .await
            .map_err(store_failure("cast vote"))?;

        let receivers = self
            .hub
            .publish(HubEvent::VoteUpdate(VoteUpdate::new(&command.qid, sets.clone())));

        info!(
            target: "qa::command",
            qid = %command.qid,
            username = %command.username,
            ?direction,
            receivers,
            "vote recorded"
        );
        let msg = match direction {
            VoteDirection::Up => "Question upvoted successfully",
            VoteDirection::Down => "Question downvoted successfully",
        };
        Ok(VoteOutcome {
            msg: msg.to_string(),
            up_votes: sets.up_votes,
            down_votes: sets.down_votes,
        })
    }

    /// Counts a view and pushes the refreshed question on `viewsUpdate`.
    pub async fn view_question(&self, qid: &str) -> Result<Question> {
        if qid.is_empty() {
            return Err(AppError::InvalidRequest("qid is required".into()));
        }
        match self.store.increment_views(qid).await {
            Ok(()) => {}
            Err(StoreError::NotFound(kind, id)) => return Err(AppError::NotFound(kind, id)),
            Err(err) => return Err(store_failure("increment views")(err)),
        }

        let _lane = self.enter_lane(qid).await;
        let question = self
            .store
            .populated_question(qid)
            .await
            .map_err(store_failure("reload question"))?;
        self.hub.publish(HubEvent::ViewsUpdate(question.clone()));
        Ok(question)
    }

    /// Creates a question. Nothing is published; viewers pick it up on fetch.
    pub async fn add_question(&self, request: AddQuestionRequest) -> Result<Question> {
        let question = request.validate().inspect_err(rejected("question"))?;
        let saved = self
            .store
            .insert_question(question)
            .await
            .map_err(store_failure("insert question"))?;
        info!(target: "qa::command", qid = %saved.id, "question added");
        Ok(saved)
    }
}
