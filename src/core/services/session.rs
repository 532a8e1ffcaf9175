use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::core::models::poll::{Poll, PollStatus};
use crate::core::models::space::Space;
use crate::core::models::vote::{VoteRecord, VoterProfile};
use crate::core::ports::api::{CollaborationApi, DeleteOutcome};
use crate::core::services::capabilities::{self, Viewer};
use crate::core::services::notify;
use crate::error::Error;

/// Local mirror of the poll record. While a mutation is pending the
/// snapshot to restore on failure travels with the modified copy, so a
/// rollback is a plain state transition instead of an ad hoc restore.
#[derive(Debug, Clone, PartialEq)]
pub enum Replica {
    Confirmed(Poll),
    Optimistic { current: Poll, rollback_to: Poll },
}

impl Replica {
    pub fn poll(&self) -> &Poll {
        match self {
            Replica::Confirmed(poll) => poll,
            Replica::Optimistic { current, .. } => current,
        }
    }

    fn poll_mut(&mut self) -> &mut Poll {
        match self {
            Replica::Confirmed(poll) => poll,
            Replica::Optimistic { current, .. } => current,
        }
    }

    fn begin(&mut self) {
        if let Replica::Confirmed(poll) = self {
            let rollback_to = poll.clone();
            *self = Replica::Optimistic {
                current: rollback_to.clone(),
                rollback_to,
            };
        }
    }

    fn commit(&mut self) {
        if let Replica::Optimistic { current, .. } = self {
            *self = Replica::Confirmed(current.clone());
        }
    }

    fn abort(&mut self) {
        if let Replica::Optimistic { rollback_to, .. } = self {
            *self = Replica::Confirmed(rollback_to.clone());
        }
    }
}

/// Observable voting state for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    NotVoted,
    PendingSelection,
    Voted,
    Closed,
}

/// One poll as one user sees and mutates it. All remote mutations go
/// through the injected [`CollaborationApi`]; local state is updated
/// optimistically and rolled back when the request fails. A single
/// in-flight request is allowed at a time; there is no cancellation and
/// no automatic retry.
pub struct PollSession<A> {
    api: A,
    viewer: Viewer,
    replica: Replica,
    selection: Vec<String>,
    reveal_results: bool,
    in_flight: bool,
}

impl<A> PollSession<A>
where
    A: CollaborationApi,
{
    pub fn new(api: A, viewer: Viewer, poll: Poll) -> Self {
        Self {
            api,
            viewer,
            replica: Replica::Confirmed(poll),
            selection: Vec::new(),
            reveal_results: false,
            in_flight: false,
        }
    }

    pub fn poll(&self) -> &Poll {
        self.replica.poll()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_reveal_results(&mut self, reveal: bool) {
        self.reveal_results = reveal;
    }

    pub fn state(&self, now: DateTime<Utc>) -> VoteState {
        let poll = self.replica.poll();
        if capabilities::voting_closed(poll, now) {
            VoteState::Closed
        } else if poll.has_voted(&self.viewer.user_id) {
            VoteState::Voted
        } else if !self.selection.is_empty() {
            VoteState::PendingSelection
        } else {
            VoteState::NotVoted
        }
    }

    pub fn can_vote(&self, now: DateTime<Utc>) -> bool {
        capabilities::can_vote(self.replica.poll(), &self.viewer, now)
    }

    pub fn can_view_results(&self, now: DateTime<Utc>) -> bool {
        capabilities::can_view_results(self.replica.poll(), &self.viewer, now, self.reveal_results)
    }

    pub fn can_close(&self) -> bool {
        capabilities::can_close(self.replica.poll(), &self.viewer)
    }

    pub fn can_delete(&self) -> bool {
        capabilities::can_delete(self.replica.poll(), &self.viewer)
    }

    pub fn can_forward(&self) -> bool {
        capabilities::can_forward(self.replica.poll(), &self.viewer)
    }

    /// Adds or removes an option from the pending multi-select selection.
    /// Growing past `max_selections` is rejected and leaves the selection
    /// unchanged.
    pub fn toggle(&mut self, option_id: &str, now: DateTime<Utc>) -> Result<(), Error> {
        if self.in_flight {
            return Err(Error::Business("a request is already in flight".into()));
        }
        let poll = self.replica.poll();
        if !poll.allows_multiple() {
            return Err(Error::Business("this poll takes a single selection".into()));
        }
        if capabilities::voting_closed(poll, now) {
            return Err(Error::Business("voting is closed".into()));
        }
        if poll.option(option_id).is_none() {
            return Err(Error::Business(format!("unknown option: {}", option_id)));
        }
        if let Some(position) = self.selection.iter().position(|id| id == option_id) {
            self.selection.remove(position);
            return Ok(());
        }
        if let Some(max) = poll.max_selections() {
            if self.selection.len() >= max {
                return Err(Error::Business(format!("you can select at most {} options", max)));
            }
        }
        self.selection.push(option_id.to_string());
        Ok(())
    }

    /// Single-choice path: selecting an option submits it immediately.
    pub async fn vote(&mut self, option_id: &str, now: DateTime<Utc>) -> Result<(), Error> {
        self.submit_votes(vec![option_id.to_string()], now).await
    }

    /// Multi-choice path: submits the accumulated selection as one request.
    pub async fn submit(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        let selection = self.selection.clone();
        self.submit_votes(selection, now).await
    }

    async fn submit_votes(&mut self, option_ids: Vec<String>, now: DateTime<Utc>) -> Result<(), Error> {
        if self.in_flight {
            return Err(Error::Business("a vote submission is already in flight".into()));
        }
        if option_ids.is_empty() {
            return Err(Error::Business("select at least one option".into()));
        }
        if !option_ids.iter().all_unique() {
            return Err(Error::Business("duplicate options in selection".into()));
        }
        let poll = self.replica.poll();
        if poll.status == PollStatus::Draft {
            return Err(Error::Business("this poll is not open for voting".into()));
        }
        if capabilities::voting_closed(poll, now) {
            return Err(Error::Business("voting is closed".into()));
        }
        for id in &option_ids {
            if poll.option(id).is_none() {
                return Err(Error::Business(format!("unknown option: {}", id)));
            }
        }
        if poll.has_voted(&self.viewer.user_id) && !poll.settings.allow_vote_change {
            return Err(Error::Business("this poll does not allow changing your vote".into()));
        }
        if let Some(max) = poll.max_selections() {
            if option_ids.len() > max {
                return Err(Error::Business(format!("you can select at most {} options", max)));
            }
        }

        let space_id = poll.space_id.clone();
        let poll_id = poll.id.clone();

        self.replica.begin();
        apply_vote(self.replica.poll_mut(), &self.viewer, &option_ids, now);
        let prior_selection = std::mem::replace(&mut self.selection, option_ids.clone());

        self.in_flight = true;
        let result = self.api.vote_on_poll(&space_id, &poll_id, &option_ids).await;
        self.in_flight = false;

        match result {
            Ok(()) => {
                self.replica.commit();
                info!("vote recorded on poll {} ({} option(s))", poll_id, option_ids.len());
                Ok(())
            }
            Err(err) => {
                self.replica.abort();
                self.selection = prior_selection;
                warn!("vote on poll {} failed, rolled back: {}", poll_id, err);
                Err(err)
            }
        }
    }

    /// Closes the poll and posts a results notification into the space.
    /// The notification is best-effort; a failure to post never fails the
    /// close itself.
    pub async fn close(&mut self) -> Result<(), Error> {
        if self.in_flight {
            return Err(Error::Business("a request is already in flight".into()));
        }
        let poll = self.replica.poll();
        if !capabilities::can_close(poll, &self.viewer) {
            return Err(Error::Permission(
                "only the creator or a space moderator can close an active poll".into(),
            ));
        }
        let space_id = poll.space_id.clone();
        let poll_id = poll.id.clone();

        self.replica.begin();
        self.replica.poll_mut().status = PollStatus::Closed;

        self.in_flight = true;
        let result = self.api.close_poll(&space_id, &poll_id).await;
        self.in_flight = false;

        match result {
            Ok(()) => {
                self.replica.commit();
                info!("poll {} closed", poll_id);
                let message = notify::poll_closed(self.replica.poll());
                if let Err(err) = self.api.send_message(&space_id, &message).await {
                    warn!("failed to post close notification for poll {}: {}", poll_id, err);
                }
                Ok(())
            }
            Err(err) => {
                self.replica.abort();
                warn!("closing poll {} failed, rolled back: {}", poll_id, err);
                Err(err)
            }
        }
    }

    /// Deletes the poll. The service decides the blast radius: a creator's
    /// delete cascades to forwarded copies, a moderator's removes only the
    /// local copy. The caller should drop the session once this succeeds.
    pub async fn delete(&mut self) -> Result<DeleteOutcome, Error> {
        if self.in_flight {
            return Err(Error::Business("a request is already in flight".into()));
        }
        let poll = self.replica.poll();
        if !capabilities::can_delete(poll, &self.viewer) {
            return Err(Error::Permission(
                "only the creator or a space moderator can delete this poll".into(),
            ));
        }
        let space_id = poll.space_id.clone();
        let poll_id = poll.id.clone();

        self.in_flight = true;
        let result = self.api.delete_poll(&space_id, &poll_id).await;
        self.in_flight = false;
        let outcome = result?;

        info!(
            "poll {} deleted by {:?} (copies removed: {:?})",
            poll_id, outcome.deleted_by, outcome.total_copies_deleted
        );
        let message = notify::poll_deleted(self.replica.poll(), &outcome);
        if let Err(err) = self.api.send_message(&space_id, &message).await {
            warn!("failed to post delete notification for poll {}: {}", poll_id, err);
        }
        Ok(outcome)
    }

    /// Copies the poll reference into other spaces. No local state
    /// changes; the copies live in the target spaces.
    pub async fn forward(&mut self, target_space_ids: &[String]) -> Result<(), Error> {
        if self.in_flight {
            return Err(Error::Business("a request is already in flight".into()));
        }
        if target_space_ids.is_empty() {
            return Err(Error::Business("select at least one space to forward to".into()));
        }
        let poll = self.replica.poll();
        if !capabilities::can_forward(poll, &self.viewer) {
            return Err(Error::Permission("this poll cannot be forwarded".into()));
        }
        let poll_id = poll.id.clone();

        self.in_flight = true;
        let result = self.api.forward_poll(&poll_id, target_space_ids).await;
        self.in_flight = false;
        result?;

        info!("poll {} forwarded to {} space(s)", poll_id, target_space_ids.len());
        Ok(())
    }

    /// Candidate spaces for the forward picker: every space the user
    /// belongs to except the poll's own space and the spaces it already
    /// came from.
    pub async fn forward_targets(&self) -> Result<Vec<Space>, Error> {
        let spaces = self.api.fetch_user_spaces(&self.viewer.user_id).await?;
        let poll = self.replica.poll();
        Ok(spaces
            .into_iter()
            .filter(|space| space.id != poll.space_id && !poll.forwarded_from.contains(&space.id))
            .collect())
    }

    /// Adopts fresh server state as the confirmed replica. Selection
    /// entries pointing at options that no longer exist are dropped.
    pub fn refresh(&mut self, poll: Poll) {
        debug!("adopting fresh state for poll {}", poll.id);
        self.selection.retain(|id| poll.option(id).is_some());
        self.replica = Replica::Confirmed(poll);
    }
}

/// The optimistic local mutation for a vote submission: the user's prior
/// entries are stripped from every option first, so plain votes and vote
/// changes take the same path, then one synthetic record lands per chosen
/// option. Counters follow the entries; `unique_voters` moves only on a
/// first vote.
fn apply_vote(poll: &mut Poll, viewer: &Viewer, option_ids: &[String], now: DateTime<Utc>) {
    let had_voted = poll.has_voted(&viewer.user_id);
    let mut removed = 0;
    for option in &mut poll.options {
        removed += option.remove_votes_from(&viewer.user_id);
    }
    poll.total_votes = poll.total_votes.saturating_sub(removed);
    for id in option_ids {
        if let Some(option) = poll.option_mut(id) {
            option.votes.push(VoteRecord::synthetic(viewer.user_id.as_str(), now));
            option.voters.push(VoterProfile {
                user_id: viewer.user_id.clone(),
                name: viewer.name.clone(),
                avatar: None,
            });
            poll.total_votes += 1;
        }
    }
    if !had_voted {
        poll.unique_voters += 1;
    }
}
