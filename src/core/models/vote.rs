use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A vote as the service actually sends it. Older endpoints emit a bare
/// user id, newer ones an object with either `user_id` or `userId`.
/// Nothing outside this module should ever see these shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawVote {
    Record {
        #[serde(alias = "userId")]
        user_id: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default, alias = "votedAt")]
        voted_at: Option<DateTime<Utc>>,
    },
    UserId(String),
}

/// Canonical vote shape used everywhere past the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_at: Option<DateTime<Utc>>,
}

impl VoteRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            voted_at: None,
        }
    }

    /// A locally fabricated record standing in for the server-assigned one
    /// while an optimistic vote is in flight.
    pub fn synthetic(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            user_id: user_id.into(),
            voted_at: Some(now),
        }
    }
}

impl From<RawVote> for VoteRecord {
    fn from(raw: RawVote) -> Self {
        match raw {
            RawVote::UserId(user_id) => VoteRecord::new(user_id),
            RawVote::Record { user_id, id, voted_at } => VoteRecord { id, user_id, voted_at },
        }
    }
}

/// Deserializes a shape-polymorphic vote list into canonical records.
pub(crate) fn votes_from_wire<'de, D>(deserializer: D) -> Result<Vec<VoteRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawVote>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(VoteRecord::from).collect())
}

/// Denormalized "who voted" entry kept by the service for display.
/// May lag behind `votes`; membership checks consult both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterProfile {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct VoteList {
        #[serde(deserialize_with = "votes_from_wire")]
        votes: Vec<VoteRecord>,
    }

    #[test]
    fn test_every_wire_shape_normalizes() {
        let list: VoteList = serde_json::from_str(
            r#"{"votes": [
                "u-1",
                {"user_id": "u-2", "id": "v-9"},
                {"userId": "u-3", "votedAt": "2024-05-01T12:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = list.votes.iter().map(|v| v.user_id.as_str()).collect();
        assert_eq!(ids, ["u-1", "u-2", "u-3"]);
        assert_eq!(list.votes[1].id.as_deref(), Some("v-9"));
        assert!(list.votes[2].voted_at.is_some());
        assert!(list.votes[0].id.is_none());
    }

    #[test]
    fn test_voter_profile_accepts_camel_case() {
        let voter: VoterProfile = serde_json::from_str(r#"{"userId": "u-7", "name": "Ana"}"#).unwrap();
        assert_eq!(voter.user_id, "u-7");
        assert_eq!(voter.name, "Ana");
        assert!(voter.avatar.is_none());
    }
}
