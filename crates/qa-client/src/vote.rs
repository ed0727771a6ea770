//! Vote buttons for an open question. Submission is fire-and-forget: a
//! failed vote is logged and the tally simply does not move, because the
//! tally only ever changes through a `voteUpdate` echo.

use std::sync::Arc;

use qa_core::models::VoteDirection;
use tracing::warn;

use crate::commands::CommandClient;

pub struct VoteHandler {
    client: Arc<dyn CommandClient>,
    username: String,
}

impl VoteHandler {
    pub fn new(client: Arc<dyn CommandClient>, username: impl Into<String>) -> Self {
        Self {
            client,
            username: username.into(),
        }
    }

    pub async fn handle_vote(&self, qid: &str, direction: VoteDirection) {
        if let Err(err) = self.client.vote(qid, &self.username, direction).await {
            warn!(
                target: "qa::command",
                %qid,
                username = %self.username,
                ?direction,
                error = %err,
                "vote not registered"
            );
        }
    }
}
