use serde_json::json;

use crate::core::models::message::{MessageType, OutgoingMessage};
use crate::core::models::poll::Poll;
use crate::core::ports::api::DeleteOutcome;
use crate::core::services::results;

/// Posted into the poll's space after a successful close, carrying the
/// final results line.
pub fn poll_closed(poll: &Poll) -> OutgoingMessage {
    OutgoingMessage {
        content: format!("Poll closed. {}", results::summary(poll)),
        message_type: MessageType::PollNotification,
        metadata: json!({
            "poll_id": poll.id,
            "event": "poll_closed",
        }),
    }
}

/// Posted after a successful delete. Mentions the cascade count only when
/// the service reported one (creator deletes).
pub fn poll_deleted(poll: &Poll, outcome: &DeleteOutcome) -> OutgoingMessage {
    let content = match outcome.total_copies_deleted {
        Some(copies) if copies > 0 => format!(
            "Poll \"{}\" was deleted along with {} forwarded {}.",
            poll.question,
            copies,
            if copies == 1 { "copy" } else { "copies" }
        ),
        _ => format!("Poll \"{}\" was deleted.", poll.question),
    };
    OutgoingMessage {
        content,
        message_type: MessageType::PollNotification,
        metadata: json!({
            "poll_id": poll.id,
            "event": "poll_deleted",
        }),
    }
}
