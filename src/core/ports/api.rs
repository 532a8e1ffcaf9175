use serde::{Deserialize, Serialize};

use crate::core::models::{OutgoingMessage, Space};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletedBy {
    Creator,
    Moderator,
}

/// Result of a poll deletion. A creator's delete cascades to every
/// forwarded copy and reports how many were removed; a moderator's
/// delete only removes the copy in their own space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_by: DeletedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_copies_deleted: Option<u32>,
}

/// The remote collaboration service, as the poll engine sees it. One
/// implementation speaks HTTP (`client::HttpCollaborationApi`); tests use
/// an in-memory fake. Sessions stay generic over this trait so the state
/// machine never reaches for a global client.
pub trait CollaborationApi {
    /// Records the full set of the user's chosen options in one request.
    /// The service replaces any prior vote rather than appending.
    async fn vote_on_poll(&self, space_id: &str, poll_id: &str, option_ids: &[String]) -> Result<(), Error>;

    async fn close_poll(&self, space_id: &str, poll_id: &str) -> Result<(), Error>;

    async fn delete_poll(&self, space_id: &str, poll_id: &str) -> Result<DeleteOutcome, Error>;

    /// Copies the poll reference into each target space. Tallies never
    /// merge across the copies.
    async fn forward_poll(&self, poll_id: &str, target_space_ids: &[String]) -> Result<(), Error>;

    /// Posts a human-readable notification into the space's chat history.
    async fn send_message(&self, space_id: &str, message: &OutgoingMessage) -> Result<(), Error>;

    /// Spaces the user belongs to; feeds the forward-target picker.
    async fn fetch_user_spaces(&self, user_id: &str) -> Result<Vec<Space>, Error>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_delete_outcome_wire_shapes() {
        let cascade: DeleteOutcome =
            serde_json::from_str(r#"{"deleted_by": "creator", "total_copies_deleted": 2}"#).unwrap();
        assert_eq!(cascade.deleted_by, DeletedBy::Creator);
        assert_eq!(cascade.total_copies_deleted, Some(2));

        let local: DeleteOutcome = serde_json::from_str(r#"{"deleted_by": "moderator"}"#).unwrap();
        assert_eq!(local.deleted_by, DeletedBy::Moderator);
        assert_eq!(local.total_copies_deleted, None);
    }
}
