//! Change detection between polls.
//!
//! A pull request is "newly visible" when its id was not part of the last
//! successful poll. The very first poll has nothing to compare against and
//! reports nothing, otherwise every pre-existing review request would be
//! announced at startup.

use std::collections::HashSet;

use nag_github::PullRequestRef;

/// Entries of `current` whose id is not in `previous_ids`.
///
/// Always empty when `is_first_poll` is true.
#[must_use]
pub fn compute_newly_visible(
    current: &[PullRequestRef],
    previous_ids: &HashSet<u64>,
    is_first_poll: bool,
) -> Vec<PullRequestRef> {
    if is_first_poll {
        return Vec::new();
    }

    current
        .iter()
        .filter(|pr| !previous_ids.contains(&pr.id))
        .cloned()
        .collect()
}

/// Ids seen on the previous successful poll.
///
/// `None` until the first successful poll. An empty set after a poll is a
/// different state: "nothing awaiting review last time".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSnapshot {
    ids: Option<HashSet<u64>>,
}

impl PollSnapshot {
    /// A snapshot that has never been populated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no poll has succeeded since creation or the last [`clear`](Self::clear).
    #[must_use]
    pub const fn is_first_poll(&self) -> bool {
        self.ids.is_none()
    }

    /// Diff `current` against this snapshot.
    #[must_use]
    pub fn newly_visible(&self, current: &[PullRequestRef]) -> Vec<PullRequestRef> {
        match &self.ids {
            Some(ids) => compute_newly_visible(current, ids, false),
            None => Vec::new(),
        }
    }

    /// Replace the snapshot with the ids of `current`.
    pub fn replace(&mut self, current: &[PullRequestRef]) {
        self.ids = Some(current.iter().map(|pr| pr.id).collect());
    }

    /// Forget everything; the next poll counts as the first again.
    pub fn clear(&mut self) {
        self.ids = None;
    }
}
