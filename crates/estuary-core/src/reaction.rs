//! Optimistic like/reaction counters.
//!
//! A toggle flips local state immediately; the authoritative value from the
//! next live event for that id overwrites the optimistic guess wholesale:
//! last-authoritative-write-wins, never a merge.

use std::collections::{HashMap, HashSet};

use crate::types::{Message, MessageId};

/// Reaction state for a single message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Total likes across all users.
    pub total_likes: u32,
    /// The current user has liked this message.
    pub user_liked: bool,
}

/// Per-room reaction state, seeded once per room-session and then updated
/// in place by live toggle events.
#[derive(Debug, Clone, Default)]
pub struct ReactionState {
    reactions: HashMap<MessageId, Reaction>,
    /// Ids whose total is already more current than the message snapshot:
    /// seeded, locally toggled, or overwritten by a live update.
    seeded: HashSet<MessageId>,
}

impl ReactionState {
    /// Create empty reaction state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy like totals from messages on first sight.
    ///
    /// Totals come from the message-level snapshot. The liked-set fetch
    /// may have landed first and created the entry knowing only
    /// `user_liked`; the snapshot total is still merged into it, floored
    /// at 1 to keep the liked invariant. Ids that were toggled or updated
    /// authoritatively before the snapshot arrived keep their state, since
    /// the snapshot is the older data.
    pub fn seed_totals(&mut self, messages: &[Message]) {
        for message in messages {
            if !self.seeded.insert(message.id) {
                continue;
            }
            let reaction = self.reactions.entry(message.id).or_default();
            reaction.total_likes = message.like_count.max(u32::from(reaction.user_liked));
        }
    }

    /// Mark the given ids as liked by the current user.
    ///
    /// The total is raised to at least 1 to keep the `user_liked` implies
    /// `total_likes >= 1` invariant when the snapshot lagged. Does not
    /// count as seeding: a snapshot total arriving later still applies.
    pub fn initialize(&mut self, liked: &HashSet<MessageId>) {
        for id in liked {
            let reaction = self.reactions.entry(*id).or_default();
            reaction.user_liked = true;
            reaction.total_likes = reaction.total_likes.max(1);
        }
    }

    /// Reaction state for `id`. Unknown ids read as zero/unliked.
    pub fn get(&self, id: MessageId) -> Reaction {
        self.reactions.get(&id).copied().unwrap_or_default()
    }

    /// Optimistically flip the current user's like for `id`.
    ///
    /// Returns the new local state. The next authoritative update for this
    /// id overwrites whatever this guessed.
    pub fn toggle(&mut self, id: MessageId) -> Reaction {
        self.seeded.insert(id);
        let reaction = self.reactions.entry(id).or_default();
        if reaction.user_liked {
            reaction.user_liked = false;
            reaction.total_likes = reaction.total_likes.saturating_sub(1);
        } else {
            reaction.user_liked = true;
            reaction.total_likes = reaction.total_likes.saturating_add(1);
        }
        *reaction
    }

    /// Overwrite with the server-asserted pair for `id`.
    pub fn apply_authoritative(&mut self, id: MessageId, total_likes: u32, user_liked: bool) {
        self.seeded.insert(id);
        self.reactions.insert(id, Reaction { total_likes, user_liked });
    }
}
