//! # Votes
//!
//! The two username sets stored on a Question, and the tally projected from
//! them. The tally is recomputed on every read and never persisted.

use serde::{Deserialize, Serialize};

use crate::models::{Question, VoteDirection};

/// Upvoter and downvoter sets. A username appears in at most one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSets {
    pub up_votes: Vec<String>,
    pub down_votes: Vec<String>,
}

impl VoteSets {
    pub fn new(up_votes: Vec<String>, down_votes: Vec<String>) -> Self {
        Self { up_votes, down_votes }
    }

    pub fn of(question: &Question) -> Self {
        Self::new(question.up_votes.clone(), question.down_votes.clone())
    }

    /// Removes `username` from whichever set holds it, then adds it to the
    /// set for `direction`. Casting the same direction twice is a no-op.
    pub fn cast(&mut self, username: &str, direction: VoteDirection) {
        self.up_votes.retain(|u| u != username);
        self.down_votes.retain(|u| u != username);
        match direction {
            VoteDirection::Up => self.up_votes.push(username.to_string()),
            VoteDirection::Down => self.down_votes.push(username.to_string()),
        }
    }

    pub fn tally_for(&self, viewer: Option<&str>) -> VoteTally {
        VoteTally::derive(&self.up_votes, &self.down_votes, viewer)
    }
}

/// Signed net count plus the viewer's own direction (`1`, `-1` or `0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub count: i64,
    pub voted: i8,
}

impl VoteTally {
    pub fn derive(up_votes: &[String], down_votes: &[String], viewer: Option<&str>) -> Self {
        let count = up_votes.len() as i64 - down_votes.len() as i64;
        let voted = match viewer {
            Some(name) if up_votes.iter().any(|u| u == name) => 1,
            Some(name) if down_votes.iter().any(|u| u == name) => -1,
            _ => 0,
        };
        Self { count, voted }
    }

    pub fn of(question: &Question, viewer: Option<&str>) -> Self {
        Self::derive(&question.up_votes, &question.down_votes, viewer)
    }
}

/// Response body of a vote command: the sets as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub msg: String,
    pub up_votes: Vec<String>,
    pub down_votes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_vote_moves_user_between_sets() {
        let mut sets = VoteSets::default();
        sets.cast("alice", VoteDirection::Up);
        sets.cast("alice", VoteDirection::Down);
        assert!(sets.up_votes.is_empty());
        assert_eq!(sets.down_votes, vec!["alice".to_string()]);

        sets.cast("alice", VoteDirection::Up);
        assert_eq!(sets.up_votes, vec!["alice".to_string()]);
        assert!(sets.down_votes.is_empty());
    }

    #[test]
    fn repeated_vote_is_idempotent() {
        for direction in [VoteDirection::Up, VoteDirection::Down] {
            let mut once = VoteSets::new(vec!["bob".into()], vec!["carol".into()]);
            once.cast("alice", direction);
            let mut twice = once.clone();
            twice.cast("alice", direction);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn tally_counts_and_viewer_direction() {
        let sets = VoteSets::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["d".into()],
        );
        assert_eq!(sets.tally_for(Some("b")), VoteTally { count: 2, voted: 1 });
        assert_eq!(sets.tally_for(Some("d")), VoteTally { count: 2, voted: -1 });
        assert_eq!(sets.tally_for(Some("z")), VoteTally { count: 2, voted: 0 });
        assert_eq!(sets.tally_for(None).voted, 0);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(VoteSets::new(vec!["a".into()], vec![])).unwrap();
        assert_eq!(json, serde_json::json!({ "upVotes": ["a"], "downVotes": [] }));
    }
}
