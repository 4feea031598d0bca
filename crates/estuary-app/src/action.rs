//! Session side-effects and intents.
//!
//! [`SessionAction`] is the set of instructions the [`crate::Session`]
//! state machine produces for the runtime to execute. Collaborator actions
//! (fetches, joins, sends, translation requests) complete asynchronously
//! and come back as later [`crate::SessionEvent`]s; presentation actions
//! (render, scroll, affordance, notify) are fire-and-forget side effects
//! whose failures never feed back into session state.

use estuary_core::{MessageId, RoomId, TranslationRequest};

/// Actions produced by the Session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Fetch the historical message snapshot for a room.
    FetchHistory {
        /// Room to fetch.
        room_id: RoomId,
    },

    /// Fetch room metadata (name, description, admin-only flag).
    FetchRoomInfo {
        /// Room to fetch.
        room_id: RoomId,
    },

    /// Fetch the current user's previously-liked message id set.
    FetchLikedSet {
        /// Room to fetch.
        room_id: RoomId,
    },

    /// Fetch the current online-participant count for a room.
    FetchOnlineCount {
        /// Room to fetch.
        room_id: RoomId,
    },

    /// Join a room on the live stream. Idempotent; re-issued on every
    /// reconnect and on every room change.
    Join {
        /// Room to join.
        room_id: RoomId,
    },

    /// Emit a new message on the live stream.
    Send {
        /// Target room.
        room_id: RoomId,
        /// Message text.
        text: String,
        /// Message being replied to, if any.
        reply_to: Option<MessageId>,
        /// User ids explicitly mentioned in the message.
        mentions: Vec<String>,
    },

    /// Emit a like toggle on the live stream.
    SendLikeToggle {
        /// Target room.
        room_id: RoomId,
        /// Message to toggle.
        message_id: MessageId,
    },

    /// Run a translation request against the backend.
    Translate(TranslationRequest),

    /// Fire a one-shot mention notification: audio cue plus, if permitted,
    /// a system notification carrying sender name and message text.
    Notify {
        /// Message that triggered the mention.
        message_id: MessageId,
        /// Sender display name for the notification.
        sender_name: String,
        /// Message text for the notification body.
        body: String,
    },

    /// Scroll the viewport to the latest message.
    ScrollToLatest,

    /// Surface the "jump to latest" affordance instead of forcing the view.
    ShowJumpToLatest,

    /// Render the presentation layer from current session state.
    Render,
}
