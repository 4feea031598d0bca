//! Fuzz target for the reconcile merge
//!
//! Ensure the reconciled view is well formed for any input sets
//!
//! # Strategy
//!
//! - Overlapping ids: historical and live sets share ids freely
//! - Degenerate timestamps: zero, duplicates, u64::MAX
//! - Tombstones and translated sets over arbitrary ids
//!
//! # Invariants
//!
//! - Never panics (the ordering must be a total order for any input)
//! - Output ids are unique
//! - Tombstoned ids never appear
//! - Every output id comes from an input message
//! - Output timestamps never decrease outside the near-tie window
//! - Same inputs produce the same output

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use estuary_core::{reconcile, Message, MessageId, TIE_WINDOW_MS};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct ReconcileScenario {
    historical: Vec<FuzzedMessage>,
    live: Vec<FuzzedMessage>,
    tombstones: Vec<MessageId>,
    translated: Vec<MessageId>,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzedMessage {
    id: MessageId,
    timestamp: TimestampChoice,
    text_seed: u8,
}

#[derive(Debug, Clone, Arbitrary)]
enum TimestampChoice {
    Zero,
    Small(u16),
    Large(u64),
    MaxU64,
}

fuzz_target!(|scenario: ReconcileScenario| {
    let historical: Vec<Message> = scenario.historical.iter().map(build_message).collect();
    let live: Vec<Message> = scenario.live.iter().map(build_message).collect();
    let tombstones: HashSet<MessageId> = scenario.tombstones.iter().copied().collect();
    let translated: HashSet<MessageId> = scenario.translated.iter().copied().collect();

    let view = reconcile(&historical, &live, &tombstones, &translated);

    let ids: HashSet<MessageId> = view.iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), view.len(), "duplicate id in reconciled view");

    let input_ids: HashSet<MessageId> =
        historical.iter().chain(&live).map(|m| m.id).collect();
    for message in &view {
        assert!(!tombstones.contains(&message.id), "tombstoned id survived");
        assert!(input_ids.contains(&message.id), "id invented by reconcile");
    }

    for pair in view.windows(2) {
        if pair[1].timestamp_ms.abs_diff(pair[0].timestamp_ms) > TIE_WINDOW_MS {
            assert!(
                pair[0].timestamp_ms <= pair[1].timestamp_ms,
                "view out of order beyond the tie window"
            );
        }
    }

    let again = reconcile(&historical, &live, &tombstones, &translated);
    assert_eq!(view, again, "reconcile is not deterministic");
});

fn build_message(fuzzed: &FuzzedMessage) -> Message {
    let timestamp_ms = match fuzzed.timestamp {
        TimestampChoice::Zero => 0,
        TimestampChoice::Small(v) => u64::from(v),
        TimestampChoice::Large(v) => v,
        TimestampChoice::MaxU64 => u64::MAX,
    };
    Message {
        id: fuzzed.id,
        room_id: 1,
        sender_id: format!("user-{}", fuzzed.text_seed % 4),
        sender_name: format!("User{}", fuzzed.text_seed % 4),
        text: format!("message {}", fuzzed.text_seed),
        timestamp_ms,
        reply_to: None,
        like_count: u32::from(fuzzed.text_seed),
    }
}
