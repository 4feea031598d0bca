//! Mention detection over reconciliation passes.
//!
//! A mention fires only when a message first enters the view; a re-render
//! of already-seen data never re-triggers. The session-lifetime
//! [`MentionRecord`] turns per-pass detection into an at-most-once
//! notification guarantee, even if a stale previous view is replayed.

use std::collections::HashSet;

use crate::types::{Message, MessageId, UserId};

/// Scan a fresh reconciled view for messages that newly mention the user.
///
/// A message qualifies iff all of:
/// - its id was absent from `previous_ids` (first appearance this pass),
/// - its sender is not the current user,
/// - its text contains the display name as a whole-word, case-insensitive
///   token (word-boundary match, not a substring match).
///
/// Detection evaluates each message only at the moment it first enters the
/// view, so a display-name change never re-scans old messages.
pub fn detect_new_mentions(
    previous_ids: &HashSet<MessageId>,
    new_view: &[Message],
    current_user: &UserId,
    current_name: &str,
) -> Vec<MessageId> {
    new_view
        .iter()
        .filter(|m| !previous_ids.contains(&m.id))
        .filter(|m| &m.sender_id != current_user)
        .filter(|m| contains_word(&m.text, current_name))
        .map(|m| m.id)
        .collect()
}

/// Whole-word, case-insensitive containment check.
///
/// A match must be delimited by non-alphanumeric characters (or the ends of
/// the text) on both sides, so "Al" does not fire inside "Alice".
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();

    for (start, _) in haystack.match_indices(&needle) {
        let before_ok =
            haystack[..start].chars().next_back().is_none_or(|c| !c.is_alphanumeric());
        let after_ok =
            haystack[start + needle.len()..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// Message ids already notified for this session.
///
/// Write-once per id and never removed, guaranteeing at-most-one
/// notification per message for the session lifetime, including across
/// room switches, which is why this outlives the per-room state.
#[derive(Debug, Clone, Default)]
pub struct MentionRecord {
    notified: HashSet<MessageId>,
}

impl MentionRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as notified. Returns `true` only on first notice.
    pub fn first_notice(&mut self, id: MessageId) -> bool {
        self.notified.insert(id)
    }

    /// Whether `id` has already triggered a notification.
    pub fn seen(&self, id: MessageId) -> bool {
        self.notified.contains(&id)
    }
}
