//! # Hub Events
//!
//! The outbound events published after every successful write. Field names
//! and nesting are the client/server wire contract; a frame on the socket is
//! `{ "event": <topic>, "data": <payload> }`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Answer, Question, TargetType};
use crate::votes::VoteSets;

/// A named channel on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "answerUpdate")]
    AnswerUpdate,
    #[serde(rename = "commentUpdate")]
    CommentUpdate,
    #[serde(rename = "voteUpdate")]
    VoteUpdate,
    #[serde(rename = "viewsUpdate")]
    ViewsUpdate,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::AnswerUpdate,
        Topic::CommentUpdate,
        Topic::VoteUpdate,
        Topic::ViewsUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::AnswerUpdate => "answerUpdate",
            Topic::CommentUpdate => "commentUpdate",
            Topic::VoteUpdate => "voteUpdate",
            Topic::ViewsUpdate => "viewsUpdate",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `answerUpdate { qid, answer }`: only the appended answer travels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerUpdate {
    pub qid: String,
    pub answer: Answer,
}

/// `commentUpdate { result, type }`. With `type: "question"` the result is
/// the populated Question; with `type: "answer"` it is the populated Answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "result", rename_all = "lowercase")]
pub enum CommentUpdate {
    Question(Question),
    Answer(Answer),
}

impl CommentUpdate {
    pub fn target_type(&self) -> TargetType {
        match self {
            CommentUpdate::Question(_) => TargetType::Question,
            CommentUpdate::Answer(_) => TargetType::Answer,
        }
    }
}

/// `voteUpdate { qid, upVotes, downVotes }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    pub qid: String,
    pub up_votes: Vec<String>,
    pub down_votes: Vec<String>,
}

impl VoteUpdate {
    pub fn new(qid: impl Into<String>, sets: VoteSets) -> Self {
        Self {
            qid: qid.into(),
            up_votes: sets.up_votes,
            down_votes: sets.down_votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum HubEvent {
    #[serde(rename = "answerUpdate")]
    AnswerUpdate(AnswerUpdate),
    #[serde(rename = "commentUpdate")]
    CommentUpdate(CommentUpdate),
    #[serde(rename = "voteUpdate")]
    VoteUpdate(VoteUpdate),
    /// The populated Question, pushed whenever its view counter moves.
    #[serde(rename = "viewsUpdate")]
    ViewsUpdate(Question),
}

impl HubEvent {
    pub fn topic(&self) -> Topic {
        match self {
            HubEvent::AnswerUpdate(_) => Topic::AnswerUpdate,
            HubEvent::CommentUpdate(_) => Topic::CommentUpdate,
            HubEvent::VoteUpdate(_) => Topic::VoteUpdate,
            HubEvent::ViewsUpdate(_) => Topic::ViewsUpdate,
        }
    }
}

/// The set of topics a subscription listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    topics: Vec<Topic>,
}

impl TopicFilter {
    pub fn all() -> Self {
        Self { topics: Topic::ALL.to_vec() }
    }

    pub fn topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut list: Vec<Topic> = Vec::new();
        for topic in topics {
            if !list.contains(&topic) {
                list.push(topic);
            }
        }
        Self { topics: list }
    }

    pub fn matches(&self, event: &HubEvent) -> bool {
        self.topics.contains(&event.topic())
    }

    pub fn as_slice(&self) -> &[Topic] {
        &self.topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn answer() -> Answer {
        Answer {
            id: "A1".into(),
            text: "use a Mutex".into(),
            ans_by: "bob".into(),
            ans_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            comments: vec![],
        }
    }

    #[test]
    fn comment_update_on_answer_matches_wire_contract() {
        let event = HubEvent::CommentUpdate(CommentUpdate::Answer(answer()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "commentUpdate");
        assert_eq!(json["data"]["type"], "answer");
        assert_eq!(json["data"]["result"]["_id"], "A1");
        assert_eq!(json["data"]["result"]["ansBy"], "bob");
    }

    #[test]
    fn vote_update_matches_wire_contract() {
        let event = HubEvent::VoteUpdate(VoteUpdate::new(
            "Q1",
            VoteSets::new(vec!["alice".into()], vec![]),
        ));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "voteUpdate",
                "data": { "qid": "Q1", "upVotes": ["alice"], "downVotes": [] }
            })
        );
    }

    #[test]
    fn answer_update_decodes_from_wire() {
        let frame = json!({
            "event": "answerUpdate",
            "data": {
                "qid": "Q1",
                "answer": {
                    "_id": "A1",
                    "text": "use a Mutex",
                    "ansBy": "bob",
                    "ansDateTime": "2024-05-01T12:00:00Z"
                }
            }
        });
        let event: HubEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(
            event,
            HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q1".into(), answer: answer() })
        );
        assert_eq!(event.topic(), Topic::AnswerUpdate);
    }

    #[test]
    fn filter_matches_by_topic_only() {
        let filter = TopicFilter::topics([Topic::VoteUpdate, Topic::VoteUpdate]);
        assert_eq!(filter.as_slice(), &[Topic::VoteUpdate]);
        let vote = HubEvent::VoteUpdate(VoteUpdate::new("Q9", VoteSets::default()));
        let ans = HubEvent::AnswerUpdate(AnswerUpdate { qid: "Q9".into(), answer: answer() });
        assert!(filter.matches(&vote));
        assert!(!filter.matches(&ans));
        assert!(TopicFilter::all().matches(&ans));
    }
}
