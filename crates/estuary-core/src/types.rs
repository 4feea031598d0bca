//! Core data types for the reconciliation engine.
//!
//! [`RawMessage`] is the wire-shaped record as the historical and live
//! collaborators deliver it (fields may be missing); [`Message`] is the
//! validated form the engine works with. [`MessageView`] is the per-message
//! projection exposed to the presentation layer.

use serde::{Deserialize, Serialize};

/// Stable, monotonically-issued message identifier from the source of
/// record.
pub type MessageId = u64;

/// Opaque room identifier scoping all other entities.
pub type RoomId = u64;

/// Opaque sender identifier. Treated as a token, never parsed.
pub type UserId = String;

/// A chat message, validated and immutable.
///
/// Messages are only ever added or tombstoned client-side, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: MessageId,
    /// Room this message belongs to.
    pub room_id: RoomId,
    /// Opaque sender id.
    pub sender_id: UserId,
    /// Sender display name at send time.
    pub sender_name: String,
    /// Original (untranslated) message text.
    pub text: String,
    /// Milliseconds since the Unix epoch. `0` when the source omitted it.
    pub timestamp_ms: u64,
    /// Message this one replies to, if any.
    pub reply_to: Option<MessageId>,
    /// Like total from the message-level snapshot.
    pub like_count: u32,
}

impl Message {
    /// Validate a wire record into a [`Message`].
    ///
    /// Returns `None` when the record has no id: dedup and ordering are
    /// keyed by id, so an id-less message cannot enter reconciliation. A
    /// missing timestamp defaults to the epoch so it sorts first.
    pub fn from_raw(raw: RawMessage) -> Option<Self> {
        let id = raw.id?;
        Some(Self {
            id,
            room_id: raw.room_id,
            sender_id: raw.sender_id,
            sender_name: raw.sender_name,
            text: raw.text,
            timestamp_ms: raw.timestamp_ms.unwrap_or(0),
            reply_to: raw.reply_to,
            like_count: raw.like_count,
        })
    }
}

/// A message as delivered by the historical or live collaborator.
///
/// The source of record can omit fields; validation into [`Message`]
/// happens at the reconciliation boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Message id. Records without one are excluded from reconciliation.
    #[serde(default)]
    pub id: Option<MessageId>,
    /// Room this message belongs to.
    #[serde(default)]
    pub room_id: RoomId,
    /// Opaque sender id.
    #[serde(default)]
    pub sender_id: UserId,
    /// Sender display name.
    #[serde(default)]
    pub sender_name: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Milliseconds since the Unix epoch, if the source supplied one.
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    /// Reply target, if any.
    #[serde(default)]
    pub reply_to: Option<MessageId>,
    /// Like total at snapshot time.
    #[serde(default)]
    pub like_count: u32,
}

/// Room metadata snapshot from the historical collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Human-readable room name.
    pub name: String,
    /// Room description.
    #[serde(default)]
    pub description: String,
    /// Only admins may post.
    #[serde(default)]
    pub admin_only: bool,
}

/// Live-stream connection state as exposed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Connected and receiving live events.
    Connected,
    /// Connection lost, transport is retrying.
    Reconnecting,
    /// Not connected.
    #[default]
    Disconnected,
}

/// Per-message projection for rendering.
///
/// Bundles the reconciled message with every derived flag the presentation
/// layer needs, so renderers never reach into engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// The reconciled message.
    pub message: Message,
    /// Authored by the current user.
    pub is_own: bool,
    /// Mentions the current user (detected at first appearance).
    pub is_mentioned: bool,
    /// Translated text for the active language, if resolved.
    pub translation: Option<String>,
    /// Current reaction state for this message.
    pub reaction: crate::Reaction,
}
