//! Estuary core
//!
//! Message reconciliation and derived-state engine for a real-time chat
//! client. Two independent sources of truth about a conversation (a
//! paginated historical snapshot and a continuous live stream) are merged
//! into one ordered, deduplicated, tombstone-aware view per room, with
//! derived state layered on top.
//!
//! # Components
//!
//! - [`reconcile`]: pure merge of historical + live messages into a view
//! - [`detect_new_mentions`] / [`MentionRecord`]: mention detection with an
//!   at-most-once notification guarantee
//! - [`TranslationCache`]: per-message translations, invalidated wholesale
//!   on language change via a generation counter
//! - [`ReactionState`]: optimistic like counters, overwritten by
//!   authoritative live updates
//! - [`ViewportController`]: debounced scroll-intent tracking and the
//!   autoscroll-vs-affordance policy
//!
//! Everything here is sans-IO: no network, no timers, no clocks. Time is
//! passed in as an instant value, and asynchronous completions arrive as
//! plain function calls, so the same code runs in production and in
//! deterministic simulation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod mention;
mod reaction;
mod reconcile;
mod translation;
mod types;
mod viewport;

pub use mention::{MentionRecord, detect_new_mentions};
pub use reaction::{Reaction, ReactionState};
pub use reconcile::{TIE_WINDOW_MS, reconcile};
pub use translation::{Priority, TranslationCache, TranslationRequest};
pub use types::{
    ConnectionStatus, Message, MessageId, MessageView, RawMessage, RoomId, RoomInfo, UserId,
};
pub use viewport::{
    FollowPolicy, NEAR_BOTTOM_THRESHOLD_PX, SCROLL_QUIET_PERIOD, ScrollMetrics,
    ViewportController,
};
