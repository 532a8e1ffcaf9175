use chrono::{DateTime, Utc};

use crate::core::models::poll::{Poll, PollStatus, ShowResults};
use crate::core::models::space::SpaceRole;

/// The user looking at a poll, with their role in the poll's space.
/// Constructing a `Viewer` asserts space membership; non-members never
/// get this far (the service rejects them upstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub name: String,
    pub role: SpaceRole,
}

impl Viewer {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, role: SpaceRole) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_creator(&self, poll: &Poll) -> bool {
        poll.created_by == self.user_id
    }
}

/// `status` and `deadline` are independent signals: a deadline passing
/// never flips `status` locally (only the server closes a poll), yet
/// either alone disables voting. This is the only place both are
/// consulted, so every caller agrees.
pub fn voting_closed(poll: &Poll, now: DateTime<Utc>) -> bool {
    poll.status.is_terminal() || poll.deadline_passed(now)
}

pub fn can_vote(poll: &Poll, viewer: &Viewer, now: DateTime<Utc>) -> bool {
    if poll.status == PollStatus::Draft || voting_closed(poll, now) {
        return false;
    }
    !poll.has_voted(&viewer.user_id) || poll.settings.allow_vote_change
}

/// Result visibility never depends on `status` alone. When the setting is
/// absent from the record, the caller's explicit reveal toggle decides.
pub fn can_view_results(poll: &Poll, viewer: &Viewer, now: DateTime<Utc>, reveal_requested: bool) -> bool {
    match poll.settings.show_results {
        Some(ShowResults::Always) => true,
        Some(ShowResults::AfterVote) => poll.has_voted(&viewer.user_id),
        Some(ShowResults::CreatorOnly) => viewer.is_creator(poll),
        Some(ShowResults::AfterDeadline) => poll.deadline_passed(now),
        None => reveal_requested,
    }
}

/// Closing is for the creator or a space moderator/owner, and only while
/// the poll still reads `active`. There is no reopen.
pub fn can_close(poll: &Poll, viewer: &Viewer) -> bool {
    (viewer.is_creator(poll) || viewer.role.can_moderate()) && poll.status == PollStatus::Active
}

pub fn can_delete(poll: &Poll, viewer: &Viewer) -> bool {
    viewer.is_creator(poll) || viewer.role.can_moderate()
}

/// Forwarding is a share, not a mutation: any member may forward a poll
/// that has been published.
pub fn can_forward(poll: &Poll, _viewer: &Viewer) -> bool {
    poll.status != PollStatus::Draft
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::option::PollOption;
    use crate::core::models::poll::{PollSettings, PollType};
    use crate::core::models::vote::VoteRecord;
    use chrono::TimeZone;

    fn base_poll() -> Poll {
        Poll {
            id: "poll-1".into(),
            space_id: "space-1".into(),
            question: "Lunch?".into(),
            poll_type: PollType::Single,
            options: vec![
                PollOption {
                    id: "opt-a".into(),
                    text: "Tacos".into(),
                    votes: vec![],
                    voters: vec![],
                },
                PollOption {
                    id: "opt-b".into(),
                    text: "Pizza".into(),
                    votes: vec![],
                    voters: vec![],
                },
            ],
            settings: PollSettings::default(),
            status: PollStatus::Active,
            deadline: None,
            total_votes: 0,
            unique_voters: 0,
            created_by: "creator".into(),
            forwarded_from: vec![],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn member() -> Viewer {
        Viewer::new("u-1", "Ana", SpaceRole::Member)
    }

    #[test]
    fn test_deadline_blocks_voting_even_while_active() {
        let mut poll = base_poll();
        poll.deadline = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(poll.status, PollStatus::Active);
        assert!(voting_closed(&poll, now()));
        assert!(!can_vote(&poll, &member(), now()));
    }

    #[test]
    fn test_terminal_status_blocks_voting() {
        let mut poll = base_poll();
        poll.status = PollStatus::Closed;
        assert!(voting_closed(&poll, now()));
        poll.status = PollStatus::Archived;
        assert!(voting_closed(&poll, now()));
    }

    #[test]
    fn test_vote_change_gated_by_setting() {
        let mut poll = base_poll();
        poll.options[0].votes.push(VoteRecord::new("u-1"));
        assert!(!can_vote(&poll, &member(), now()));
        poll.settings.allow_vote_change = true;
        assert!(can_vote(&poll, &member(), now()));
    }

    #[test]
    fn test_show_results_always_ignores_has_voted() {
        let mut poll = base_poll();
        poll.settings.show_results = Some(ShowResults::Always);
        assert!(can_view_results(&poll, &member(), now(), false));
    }

    #[test]
    fn test_show_results_after_vote_requires_vote() {
        let mut poll = base_poll();
        poll.settings.show_results = Some(ShowResults::AfterVote);
        assert!(!can_view_results(&poll, &member(), now(), true));
        poll.options[1].votes.push(VoteRecord::new("u-1"));
        assert!(can_view_results(&poll, &member(), now(), false));
    }

    #[test]
    fn test_show_results_creator_only() {
        let mut poll = base_poll();
        poll.settings.show_results = Some(ShowResults::CreatorOnly);
        assert!(!can_view_results(&poll, &member(), now(), true));
        let creator = Viewer::new("creator", "Max", SpaceRole::Member);
        assert!(can_view_results(&poll, &creator, now(), false));
    }

    #[test]
    fn test_show_results_after_deadline() {
        let mut poll = base_poll();
        poll.settings.show_results = Some(ShowResults::AfterDeadline);
        assert!(!can_view_results(&poll, &member(), now(), true));
        poll.deadline = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert!(can_view_results(&poll, &member(), now(), false));
    }

    #[test]
    fn test_show_results_unset_falls_back_to_toggle() {
        let poll = base_poll();
        assert!(!can_view_results(&poll, &member(), now(), false));
        assert!(can_view_results(&poll, &member(), now(), true));
    }

    #[test]
    fn test_close_is_creator_or_moderator_while_active() {
        let poll = base_poll();
        assert!(!can_close(&poll, &member()));
        assert!(can_close(&poll, &Viewer::new("creator", "Max", SpaceRole::Member)));
        assert!(can_close(&poll, &Viewer::new("u-2", "Mod", SpaceRole::Moderator)));
        assert!(can_close(&poll, &Viewer::new("u-3", "Own", SpaceRole::Owner)));

        let mut closed = base_poll();
        closed.status = PollStatus::Closed;
        assert!(!can_close(&closed, &Viewer::new("creator", "Max", SpaceRole::Member)));
    }

    #[test]
    fn test_delete_allows_moderator_regardless_of_status() {
        let mut poll = base_poll();
        poll.status = PollStatus::Closed;
        assert!(!can_delete(&poll, &member()));
        assert!(can_delete(&poll, &Viewer::new("u-2", "Mod", SpaceRole::Moderator)));
        assert!(can_delete(&poll, &Viewer::new("creator", "Max", SpaceRole::Member)));
    }

    #[test]
    fn test_forward_excludes_drafts_only() {
        let mut poll = base_poll();
        assert!(can_forward(&poll, &member()));
        poll.status = PollStatus::Closed;
        assert!(can_forward(&poll, &member()));
        poll.status = PollStatus::Draft;
        assert!(!can_forward(&poll, &member()));
    }
}
