//! One-shot mention notification routing.
//!
//! Owns the session-lifetime [`MentionRecord`]: mention detection runs per
//! reconciliation pass, but the record persists across room switches, so a
//! message id produces at most one [`SessionAction::Notify`] for the whole
//! session, even if the user revisits a room and its view is rebuilt from
//! scratch. Firing the notification is the driver's job; a failure there
//! comes back as an event that is logged and dropped, never replayed.

use estuary_core::{MentionRecord, Message, MessageId};

use crate::SessionAction;

/// Routes newly-detected mentions into notification actions, at most once
/// per message id per session.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    record: MentionRecord,
}

impl Notifier {
    /// Create a notifier with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce one [`SessionAction::Notify`] per first-time mention.
    ///
    /// Ids already in the record are dropped silently; this is what makes
    /// a replayed or stale reconciliation pass harmless.
    pub fn process(&mut self, mention_ids: &[MessageId], view: &[Message]) -> Vec<SessionAction> {
        mention_ids
            .iter()
            .filter(|id| self.record.first_notice(**id))
            .filter_map(|id| view.iter().find(|m| m.id == *id))
            .map(|m| SessionAction::Notify {
                message_id: m.id,
                sender_name: m.sender_name.clone(),
                body: m.text.clone(),
            })
            .collect()
    }

    /// Whether `id` has already been notified this session.
    pub fn already_notified(&self, id: MessageId) -> bool {
        self.record.seen(id)
    }
}
