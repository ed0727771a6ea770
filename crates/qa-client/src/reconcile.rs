//! # Client Reconciliation
//!
//! A [`QuestionView`] holds the locally cached aggregate for one open
//! question and merges hub events into it. A [`ViewSession`] binds a view to
//! a hub subscription: the two are created together and dropped together,
//! so no event can reach a view after it has been torn down.
//!
//! Local submissions never touch the cache. The cache only moves when the
//! hub echoes the write back, for the author and every other client alike.

use qa_core::events::{AnswerUpdate, CommentUpdate, HubEvent, Topic, TopicFilter, VoteUpdate};
use qa_core::hub::{Subscription, SubscriptionError};
use qa_core::models::Question;
use qa_core::traits::EventHub;
use qa_core::votes::VoteTally;
use tracing::debug;

use crate::commands::{ClientError, CommandClient};

/// Topics a question view listens on.
pub const VIEW_TOPICS: [Topic; 4] = [
    Topic::AnswerUpdate,
    Topic::ViewsUpdate,
    Topic::CommentUpdate,
    Topic::VoteUpdate,
];

#[derive(Debug, Clone)]
pub struct QuestionView {
    qid: String,
    viewer: Option<String>,
    question: Option<Question>,
}

impl QuestionView {
    pub fn new(qid: impl Into<String>, viewer: Option<String>) -> Self {
        Self {
            qid: qid.into(),
            viewer,
            question: None,
        }
    }

    pub fn qid(&self) -> &str {
        &self.qid
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Seeds the cache from a full fetch. A question with another id is
    /// refused.
    pub fn seed(&mut self, question: Question) -> bool {
        if question.id != self.qid {
            return false;
        }
        self.question = Some(question);
        true
    }

    /// Net votes and the viewer's own direction, read off the cached sets.
    pub fn tally(&self) -> VoteTally {
        self.question
            .as_ref()
            .map(|q| VoteTally::of(q, self.viewer.as_deref()))
            .unwrap_or_default()
    }

    /// Merges one event. Returns whether the cached state changed.
    ///
    /// Events naming a different question are dropped. The browser client
    /// this replaces applied `answerUpdate` to whatever question was open;
    /// the identifier check here is a deliberate departure from that.
    pub fn apply(&mut self, event: &HubEvent) -> bool {
        match event {
            HubEvent::AnswerUpdate(update) => self.apply_answer(update),
            HubEvent::ViewsUpdate(question) => self.replace(question),
            HubEvent::CommentUpdate(CommentUpdate::Question(question)) => self.replace(question),
            HubEvent::CommentUpdate(CommentUpdate::Answer(answer)) => {
                let Some(cached) = self.question.as_mut() else {
                    return false;
                };
                match cached.answers.iter_mut().find(|a| a.id == answer.id) {
                    Some(slot) => {
                        *slot = answer.clone();
                        true
                    }
                    None => {
                        debug!(qid = %self.qid, answer_id = %answer.id, "foreign answer comment ignored");
                        false
                    }
                }
            }
            HubEvent::VoteUpdate(update) => self.apply_votes(update),
        }
    }

    fn apply_answer(&mut self, update: &AnswerUpdate) -> bool {
        if update.qid != self.qid {
            debug!(qid = %self.qid, foreign = %update.qid, "foreign answerUpdate ignored");
            return false;
        }
        let Some(cached) = self.question.as_mut() else {
            return false;
        };
        // The seeding fetch may already contain an answer whose event
        // arrives afterwards.
        if cached.answers.iter().any(|a| a.id == update.answer.id) {
            return false;
        }
        cached.answers.push(update.answer.clone());
        true
    }

    fn replace(&mut self, question: &Question) -> bool {
        if question.id != self.qid {
            debug!(qid = %self.qid, foreign = %question.id, "foreign question update ignored");
            return false;
        }
        self.question = Some(question.clone());
        true
    }

    fn apply_votes(&mut self, update: &VoteUpdate) -> bool {
        if update.qid != self.qid {
            return false;
        }
        let Some(cached) = self.question.as_mut() else {
            return false;
        };
        cached.up_votes = update.up_votes.clone();
        cached.down_votes = update.down_votes.clone();
        true
    }
}

/// A question view bound to a live hub subscription.
pub struct ViewSession {
    view: QuestionView,
    subscription: Subscription,
}

impl ViewSession {
    /// Subscribes to the view topics. The cache starts empty.
    pub fn open(hub: &dyn EventHub, qid: impl Into<String>, viewer: Option<String>) -> Self {
        let view = QuestionView::new(qid, viewer);
        let subscription = hub.subscribe(TopicFilter::topics(VIEW_TOPICS));
        debug!(qid = %view.qid, "view session opened");
        Self { view, subscription }
    }

    /// Subscribes, then seeds the cache with one full fetch. Subscribing
    /// first means no event published during the fetch is missed.
    pub async fn mount(
        hub: &dyn EventHub,
        client: &dyn CommandClient,
        qid: impl Into<String>,
        viewer: Option<String>,
    ) -> Result<Self, ClientError> {
        let mut session = Self::open(hub, qid, viewer);
        let question = client.get_question(session.view.qid()).await?;
        session.view.seed(question);
        Ok(session)
    }

    pub fn view(&self) -> &QuestionView {
        &self.view
    }

    pub fn seed(&mut self, question: Question) -> bool {
        self.view.seed(question)
    }

    /// Waits for the next event and merges it. Returns `None` once the hub
    /// is gone, otherwise whether the view changed.
    pub async fn next(&mut self) -> Option<bool> {
        let event = self.subscription.recv().await?;
        Some(self.view.apply(&event))
    }

    /// Merges every event already queued without waiting. Returns how many
    /// of them changed the view.
    pub fn drain(&mut self) -> Result<usize, SubscriptionError> {
        let mut changed = 0;
        while let Some(event) = self.subscription.try_recv()? {
            if self.view.apply(&event) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Tears the view down, releasing its subscription.
    pub fn close(self) -> QuestionView {
        debug!(qid = %self.view.qid, "view session closed");
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qa_core::hub::BroadcastHub;
    use qa_core::models::{Answer, Comment};
    use qa_core::votes::VoteSets;

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            title: "t".into(),
            text: "x".into(),
            asked_by: "alice".into(),
            ask_date_time: Utc::now(),
            views: 0,
            answers: vec![answer("A1")],
            comments: vec![],
            up_votes: vec![],
            down_votes: vec![],
        }
    }

    fn answer(id: &str) -> Answer {
        Answer {
            id: id.into(),
            text: "y".into(),
            ans_by: "bob".into(),
            ans_date_time: Utc::now(),
            comments: vec![],
        }
    }

    fn seeded(qid: &str, viewer: &str) -> QuestionView {
        let mut view = QuestionView::new(qid, Some(viewer.into()));
        assert!(view.seed(question(qid)));
        view
    }

    #[test]
    fn answer_update_for_other_question_is_ignored() {
        let mut view = seeded("Q1", "alice");
        let before = view.question().cloned();
        let event = HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q2".into(), answer: answer("A9") });
        assert!(!view.apply(&event));
        assert_eq!(view.question().cloned(), before);
    }

    #[test]
    fn answer_update_appends_once() {
        let mut view = seeded("Q1", "alice");
        let event = HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q1".into(), answer: answer("A2") });
        assert!(view.apply(&event));
        assert!(!view.apply(&event));
        let ids: Vec<_> = view.question().unwrap().answers.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2"]);
    }

    #[test]
    fn events_before_seed_are_dropped() {
        let mut view = QuestionView::new("Q1", None);
        let event = HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q1".into(), answer: answer("A2") });
        assert!(!view.apply(&event));
        assert!(view.question().is_none());
        assert_eq!(view.tally(), VoteTally::default());
    }

    #[test]
    fn comment_on_answer_splices_by_id() {
        let mut view = seeded("Q1", "alice");
        let mut updated = answer("A1");
        updated.comments.push(Comment {
            id: "C1".into(),
            text: "+1".into(),
            comment_by: "carol".into(),
            comment_date_time: Utc::now(),
        });
        assert!(view.apply(&HubEvent::CommentUpdate(CommentUpdate::Answer(updated.clone()))));
        assert_eq!(view.question().unwrap().answers, vec![updated]);

        let foreign = answer("A77");
        assert!(!view.apply(&HubEvent::CommentUpdate(CommentUpdate::Answer(foreign))));
    }

    #[test]
    fn views_update_replaces_only_matching_question() {
        let mut view = seeded("Q1", "alice");
        let mut fresh = question("Q1");
        fresh.views = 7;
        fresh.up_votes = vec!["alice".into()];
        assert!(view.apply(&HubEvent::ViewsUpdate(fresh)));
        assert_eq!(view.question().unwrap().views, 7);
        assert_eq!(view.tally(), VoteTally { count: 1, voted: 1 });

        assert!(!view.apply(&HubEvent::ViewsUpdate(question("Q2"))));
        assert_eq!(view.question().unwrap().views, 7);
    }

    #[test]
    fn vote_update_rederives_tally() {
        let mut view = seeded("Q1", "alice");
        let update = VoteUpdate::new(
            "Q1",
            VoteSets::new(vec!["bob".into()], vec!["alice".into(), "carol".into()]),
        );
        assert!(view.apply(&HubEvent::VoteUpdate(update)));
        assert_eq!(view.tally(), VoteTally { count: -1, voted: -1 });

        let other = VoteUpdate::new("Q2", VoteSets::new(vec!["alice".into()], vec![]));
        assert!(!view.apply(&HubEvent::VoteUpdate(other)));
        assert_eq!(view.tally(), VoteTally { count: -1, voted: -1 });
    }

    #[tokio::test]
    async fn session_applies_hub_events() {
        let hub = BroadcastHub::new();
        let mut session = ViewSession::open(&hub, "Q1", Some("alice".into()));
        session.seed(question("Q1"));

        hub.publish(HubEvent::VoteUpdate(VoteUpdate::new(
            "Q1",
            VoteSets::new(vec!["alice".into()], vec![]),
        )));
        assert_eq!(session.next().await, Some(true));
        assert_eq!(session.view().tally(), VoteTally { count: 1, voted: 1 });
    }

    #[tokio::test]
    async fn closing_session_releases_subscription() {
        let hub = BroadcastHub::new();
        let session = ViewSession::open(&hub, "Q1", None);
        assert_eq!(hub.subscriber_count(), 1);
        let _view = session.close();
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn drain_counts_changes() {
        let hub = BroadcastHub::new();
        let mut session = ViewSession::open(&hub, "Q1", None);
        session.seed(question("Q1"));
        hub.publish(HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q1".into(), answer: answer("A2") }));
        hub.publish(HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q2".into(), answer: answer("A3") }));
        assert_eq!(session.drain(), Ok(1));
    }
}
