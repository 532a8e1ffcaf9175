use serde::{Deserialize, Serialize};

use crate::core::models::vote::{votes_from_wire, VoteRecord, VoterProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub text: String,
    #[serde(default, deserialize_with = "votes_from_wire")]
    pub votes: Vec<VoteRecord>,
    #[serde(default)]
    pub voters: Vec<VoterProfile>,
}

impl PollOption {
    pub fn vote_count(&self) -> u32 {
        self.votes.len() as u32
    }

    /// True if the user shows up in either the vote list or the
    /// denormalized voter list. The two can disagree; either counts.
    pub fn has_vote_from(&self, user_id: &str) -> bool {
        self.votes.iter().any(|v| v.user_id == user_id) || self.voters.iter().any(|v| v.user_id == user_id)
    }

    /// Strips the user from both lists, returning how many vote records
    /// were removed (voter-list entries do not count toward tallies).
    pub fn remove_votes_from(&mut self, user_id: &str) -> u32 {
        let before = self.votes.len();
        self.votes.retain(|v| v.user_id != user_id);
        self.voters.retain(|v| v.user_id != user_id);
        (before - self.votes.len()) as u32
    }
}
