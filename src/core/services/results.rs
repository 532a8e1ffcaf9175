use itertools::Itertools;

use crate::core::models::poll::Poll;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    pub option_id: String,
    pub text: String,
    pub count: u32,
    pub percentage: u32,
}

/// Display-only quorum information; nothing gates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumProgress {
    pub required: u32,
    pub reached: u32,
    pub met: bool,
}

/// Total used for percentages. Derived from the option vote lists rather
/// than the poll's redundant `total_votes` counter, which can drift under
/// optimistic updates.
fn counted_total(poll: &Poll) -> u32 {
    poll.options.iter().map(|o| o.vote_count()).sum()
}

fn percentage(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(count) / f64::from(total) * 100.0).round() as u32
}

/// Per-option counts and percentages, in display (insertion) order.
pub fn tally(poll: &Poll) -> Vec<OptionTally> {
    let total = counted_total(poll);
    poll.options
        .iter()
        .map(|o| OptionTally {
            option_id: o.id.clone(),
            text: o.text.clone(),
            count: o.vote_count(),
            percentage: percentage(o.vote_count(), total),
        })
        .collect()
}

/// Results order for the voters view: descending by count, ties keep the
/// original option order.
pub fn ranked(poll: &Poll) -> Vec<OptionTally> {
    tally(poll)
        .into_iter()
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .collect()
}

pub fn quorum_progress(poll: &Poll) -> Option<QuorumProgress> {
    let required = poll.settings.quorum?;
    let reached = poll.unique_voters;
    Some(QuorumProgress {
        required,
        reached,
        met: reached >= required,
    })
}

/// One-line human-readable outcome, used in closed-poll notifications.
pub fn summary(poll: &Poll) -> String {
    let ranked = ranked(poll);
    let Some(top) = ranked.first() else {
        return format!("\"{}\" closed with no options", poll.question);
    };
    if top.count == 0 {
        return format!("\"{}\" closed with no votes", poll.question);
    }
    let leaders: Vec<&OptionTally> = ranked.iter().filter(|t| t.count == top.count).collect();
    if leaders.len() > 1 {
        let names = leaders.iter().map(|t| t.text.as_str()).join(", ");
        format!(
            "\"{}\" closed in a tie between {} ({} votes each)",
            poll.question, names, top.count
        )
    } else {
        format!(
            "\"{}\" closed: {} won with {} votes ({}%)",
            poll.question, top.text, top.count, top.percentage
        )
    }
}
