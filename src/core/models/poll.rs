use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::option::PollOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Draft,
    Active,
    Closed,
    Archived,
}

impl PollStatus {
    /// Closed and archived polls never reopen.
    pub fn is_terminal(self) -> bool {
        matches!(self, PollStatus::Closed | PollStatus::Archived)
    }
}

/// `ranked` and `weighted` are accepted on the wire but the service has
/// no slot for rank or weight payloads, so they collapse onto the
/// single/multiple voting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollType {
    Single,
    Multiple,
    Ranked,
    Weighted,
}

impl PollType {
    pub fn is_multi_select(self) -> bool {
        matches!(self, PollType::Multiple | PollType::Weighted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowResults {
    Always,
    AfterVote,
    AfterDeadline,
    CreatorOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    #[serde(alias = "allowMultipleVotes")]
    pub allow_multiple_votes: bool,
    #[serde(alias = "allowVoteChange")]
    pub allow_vote_change: bool,
    #[serde(alias = "showResults", skip_serializing_if = "Option::is_none")]
    pub show_results: Option<ShowResults>,
    pub anonymous: bool,
    #[serde(alias = "maxSelections", skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    #[serde(alias = "spaceId")]
    pub space_id: String,
    pub question: String,
    #[serde(rename = "type", alias = "poll_type")]
    pub poll_type: PollType,
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub settings: PollSettings,
    pub status: PollStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Redundant aggregate kept by the service; maintained optimistically
    /// here and reconciled only by fresh server state.
    #[serde(default)]
    pub total_votes: u32,
    #[serde(default)]
    pub unique_voters: u32,
    #[serde(alias = "createdBy")]
    pub created_by: String,
    /// Origin space ids when this record arrived via forwarding. Votes do
    /// not merge across forwarded copies.
    #[serde(default, alias = "forwardedFrom")]
    pub forwarded_from: Vec<String>,
}

impl Poll {
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn option_mut(&mut self, option_id: &str) -> Option<&mut PollOption> {
        self.options.iter_mut().find(|o| o.id == option_id)
    }

    /// Whether more than one option may hold the user's vote. The type is
    /// authoritative; `allow_multiple_votes` is the legacy settings
    /// spelling of the same intent and is honored when set.
    pub fn allows_multiple(&self) -> bool {
        self.poll_type.is_multi_select() || self.settings.allow_multiple_votes
    }

    /// Selection cap; only meaningful on multi-select polls.
    pub fn max_selections(&self) -> Option<usize> {
        if self.allows_multiple() {
            self.settings.max_selections
        } else {
            Some(1)
        }
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Derived, never stored: the user id appearing in any option's vote
    /// or voter list counts as a vote.
    pub fn has_voted(&self, user_id: &str) -> bool {
        self.options.iter().any(|o| o.has_vote_from(user_id))
    }

    pub fn voted_option_ids(&self, user_id: &str) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.has_vote_from(user_id))
            .map(|o| o.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn poll_json(status: &str, deadline: Option<&str>) -> String {
        let deadline = deadline.map(|d| format!(r#""deadline": "{}","#, d)).unwrap_or_default();
        format!(
            r#"{{
                "id": "poll-1",
                "spaceId": "space-1",
                "question": "Lunch?",
                "type": "single",
                "options": [
                    {{"id": "opt-a", "text": "Tacos", "votes": ["u-1"]}},
                    {{"id": "opt-b", "text": "Pizza"}}
                ],
                "settings": {{"allowVoteChange": true, "showResults": "after_vote"}},
                "status": "{}",
                {}
                "total_votes": 1,
                "unique_voters": 1,
                "createdBy": "u-9"
            }}"#,
            status, deadline
        )
    }

    #[test]
    fn test_deserializes_mixed_spellings() {
        let poll: Poll = serde_json::from_str(&poll_json("active", None)).unwrap();
        assert_eq!(poll.space_id, "space-1");
        assert_eq!(poll.created_by, "u-9");
        assert_eq!(poll.poll_type, PollType::Single);
        assert!(poll.settings.allow_vote_change);
        assert_eq!(poll.settings.show_results, Some(ShowResults::AfterVote));
        assert!(poll.forwarded_from.is_empty());
    }

    #[test]
    fn test_has_voted_and_voted_options() {
        let poll: Poll = serde_json::from_str(&poll_json("active", None)).unwrap();
        assert!(poll.has_voted("u-1"));
        assert!(!poll.has_voted("u-2"));
        assert_eq!(poll.voted_option_ids("u-1"), ["opt-a"]);
    }

    #[test]
    fn test_deadline_passed_is_independent_of_status() {
        let poll: Poll = serde_json::from_str(&poll_json("active", Some("2024-01-01T00:00:00Z"))).unwrap();
        let before = chrono::Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        let after = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert!(!poll.deadline_passed(before));
        assert!(poll.deadline_passed(after));
        assert_eq!(poll.status, PollStatus::Active);
        assert!(!poll.status.is_terminal());
    }

    #[test]
    fn test_single_select_caps_at_one() {
        let poll: Poll = serde_json::from_str(&poll_json("active", None)).unwrap();
        assert!(!poll.allows_multiple());
        assert_eq!(poll.max_selections(), Some(1));
    }
}
