//! Session input events.
//!
//! [`SessionEvent`] is the complete set of inputs that drive the
//! [`crate::Session`] state machine. Events originate from three sources:
//! user intent (room selection, sending, liking, scrolling, language
//! changes), collaborator completions (history pages, metadata, liked
//! sets, translation results), and the live stream (messages, deletions,
//! like updates, presence, connection transitions).
//!
//! Completions are delivered as later, independent events and may arrive
//! out of order with respect to each other; room-id and generation tags on
//! the relevant events are what let the session drop results whose context
//! has since changed.
//!
//! Generic over `I` (instant type) to support both production
//! (`std::time::Instant`) and virtual time in simulation.

use std::collections::HashSet;

use estuary_core::{ConnectionStatus, MessageId, RawMessage, RoomId, RoomInfo, ScrollMetrics};

/// Events processed by the Session state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = std::time::Instant> {
    /// User switched to a room.
    SelectRoom {
        /// Room to activate.
        room_id: RoomId,
    },

    /// Live-stream connection state changed.
    ConnectionChanged {
        /// New connection status.
        status: ConnectionStatus,
    },

    /// Historical snapshot arrived for a room.
    HistoryFetched {
        /// Room the page was fetched for.
        room_id: RoomId,
        /// Wire-shaped records; malformed ones are excluded on intake.
        messages: Vec<RawMessage>,
    },

    /// Room metadata arrived.
    RoomInfoFetched {
        /// Room the metadata belongs to.
        room_id: RoomId,
        /// Name, description, admin-only flag.
        info: RoomInfo,
    },

    /// The current user's previously-liked id set arrived.
    LikedSetFetched {
        /// Room the set was fetched for.
        room_id: RoomId,
        /// Ids the user had already liked.
        ids: HashSet<MessageId>,
    },

    /// Online-participant count update.
    OnlineCount {
        /// Room the count belongs to.
        room_id: RoomId,
        /// Current online participants.
        count: u32,
    },

    /// New or updated message from the live stream.
    LiveMessage {
        /// Wire-shaped record; its own `room_id` field is the room tag.
        message: RawMessage,
    },

    /// Deletion of a message id from the live stream.
    MessageDeleted {
        /// Room the deletion applies to.
        room_id: RoomId,
        /// Id to tombstone.
        message_id: MessageId,
    },

    /// Authoritative like-toggle result from the live stream.
    LikeUpdate {
        /// Room the update applies to.
        room_id: RoomId,
        /// Message the update is for.
        message_id: MessageId,
        /// Server-asserted like total.
        total_likes: u32,
        /// Server-asserted liked-by-us flag.
        user_liked: bool,
    },

    /// User wants to send a message to the active room.
    SendMessage {
        /// Message text.
        text: String,
        /// Message being replied to, if any.
        reply_to: Option<MessageId>,
        /// User ids explicitly mentioned in the message.
        mentions: Vec<String>,
    },

    /// User toggled their like on a message.
    ToggleLike {
        /// Message to toggle.
        message_id: MessageId,
    },

    /// User switched the target translation language.
    SetLanguage {
        /// New language tag.
        language: String,
    },

    /// User explicitly asked for a translation of one message.
    RequestTranslation {
        /// Message to translate.
        message_id: MessageId,
    },

    /// Translation backend completion.
    TranslationResolved {
        /// Message the text is for.
        message_id: MessageId,
        /// Generation active when the request was issued.
        generation: u64,
        /// Translated text.
        text: String,
    },

    /// User scrolled the message list.
    Scrolled {
        /// Viewport geometry after the scroll.
        metrics: ScrollMetrics,
        /// Current time from the environment.
        now: I,
    },

    /// Periodic tick for timer processing.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// The platform failed to deliver a notification.
    NotifyFailed {
        /// Failure description.
        reason: String,
    },
}
