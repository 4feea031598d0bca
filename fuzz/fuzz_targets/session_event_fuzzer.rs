//! Fuzz target for the Session state machine
//!
//! Ensure arbitrary event sequences never corrupt derived state
//!
//! # Strategy
//!
//! - Interleaved sources: history pages, live messages, deletions, likes
//! - Stale tags: events carrying non-active room ids and old generations
//! - Malformed records: missing ids and timestamps
//! - User intent: room switches, sends, toggles, scrolls, language changes
//!
//! # Invariants
//!
//! - handle never panics
//! - The view never contains duplicate or tombstoned-in-this-room ids
//! - No message id produces more than one Notify for the session
//! - liked implies a non-zero like total for locally-derived state

#![no_main]

use std::collections::HashSet;
use std::ops::Add;
use std::time::Duration;

use arbitrary::Arbitrary;
use estuary_app::{Session, SessionAction, SessionEvent};
use estuary_core::{ConnectionStatus, MessageId, RawMessage, ScrollMetrics};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Tick(u64);

impl Add<Duration> for Tick {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct SessionScenario {
    ops: Vec<SessionOp>,
}

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    SelectRoom { room_id: u8 },
    Connection { up: bool },
    History { room_id: u8, messages: Vec<FuzzedRaw> },
    Live { message: FuzzedRaw },
    Delete { room_id: u8, message_id: u8 },
    LikeUpdate { room_id: u8, message_id: u8, total: u8, liked: bool },
    ToggleLike { message_id: u8 },
    Send { text_seed: u8 },
    SetLanguage { lang_seed: u8 },
    TranslationResolved { message_id: u8, generation: u8 },
    Scroll { top: u16, now: u32 },
    Tick { now: u32 },
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzedRaw {
    id: Option<u8>,
    room_id: u8,
    from_self: bool,
    timestamp: Option<u32>,
    text_seed: u8,
}

fuzz_target!(|scenario: SessionScenario| {
    let mut session: Session<Tick> = Session::new("alice-id", "Alice", "en");
    let mut notified: HashSet<MessageId> = HashSet::new();
    let mut active_room: Option<u64> = None;
    let mut tombstoned: HashSet<MessageId> = HashSet::new();

    for op in scenario.ops {
        if let SessionOp::SelectRoom { room_id } = &op {
            active_room = Some(u64::from(*room_id));
            tombstoned.clear();
        }
        if let SessionOp::Delete { room_id, message_id } = &op {
            if active_room == Some(u64::from(*room_id)) {
                tombstoned.insert(u64::from(*message_id));
            }
        }

        let Ok(actions) = session.handle(build_event(op)) else {
            continue;
        };

        for action in actions {
            if let SessionAction::Notify { message_id, .. } = action {
                assert!(notified.insert(message_id), "id notified twice: {message_id}");
            }
        }

        let view = session.view();
        let ids: HashSet<MessageId> = view.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), view.len(), "duplicate id in view");
        for message in view {
            assert!(!tombstoned.contains(&message.id), "tombstoned id in view");
        }
    }
});

fn build_event(op: SessionOp) -> SessionEvent<Tick> {
    match op {
        SessionOp::SelectRoom { room_id } => {
            SessionEvent::SelectRoom { room_id: u64::from(room_id) }
        },
        SessionOp::Connection { up } => SessionEvent::ConnectionChanged {
            status: if up { ConnectionStatus::Connected } else { ConnectionStatus::Reconnecting },
        },
        SessionOp::History { room_id, messages } => SessionEvent::HistoryFetched {
            room_id: u64::from(room_id),
            messages: messages.iter().map(build_raw).collect(),
        },
        SessionOp::Live { message } => SessionEvent::LiveMessage { message: build_raw(&message) },
        SessionOp::Delete { room_id, message_id } => SessionEvent::MessageDeleted {
            room_id: u64::from(room_id),
            message_id: u64::from(message_id),
        },
        SessionOp::LikeUpdate { room_id, message_id, total, liked } => SessionEvent::LikeUpdate {
            room_id: u64::from(room_id),
            message_id: u64::from(message_id),
            total_likes: u32::from(total),
            user_liked: liked,
        },
        SessionOp::ToggleLike { message_id } => {
            SessionEvent::ToggleLike { message_id: u64::from(message_id) }
        },
        SessionOp::Send { text_seed } => SessionEvent::SendMessage {
            text: format!("message {text_seed}"),
            reply_to: None,
            mentions: vec![],
        },
        SessionOp::SetLanguage { lang_seed } => {
            SessionEvent::SetLanguage { language: format!("lang-{}", lang_seed % 4) }
        },
        SessionOp::TranslationResolved { message_id, generation } => {
            SessionEvent::TranslationResolved {
                message_id: u64::from(message_id),
                generation: u64::from(generation),
                text: "translated".into(),
            }
        },
        SessionOp::Scroll { top, now } => SessionEvent::Scrolled {
            metrics: ScrollMetrics {
                scroll_top: f64::from(top),
                viewport_height: 100.0,
                scroll_height: 2_000.0,
            },
            now: Tick(u64::from(now)),
        },
        SessionOp::Tick { now } => SessionEvent::Tick { now: Tick(u64::from(now)) },
    }
}

fn build_raw(fuzzed: &FuzzedRaw) -> RawMessage {
    RawMessage {
        id: fuzzed.id.map(u64::from),
        room_id: u64::from(fuzzed.room_id),
        sender_id: if fuzzed.from_self { "alice-id".into() } else { "bob-id".into() },
        sender_name: if fuzzed.from_self { "Alice".into() } else { "Bob".into() },
        text: format!("message {}", fuzzed.text_seed),
        timestamp_ms: fuzzed.timestamp.map(u64::from),
        reply_to: None,
        like_count: 0,
    }
}
