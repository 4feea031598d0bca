//! Reconciliation of historical and live message sets.
//!
//! [`reconcile`] is a pure function of its inputs: no hidden state, so it
//! can be re-run on every update (new history page, live event, tombstone,
//! room switch) without drift, and identical inputs always produce
//! identical output, including order.

use std::collections::{HashMap, HashSet};

use crate::types::{Message, MessageId};

/// Two messages within this window of each other are ordering near-ties.
pub const TIE_WINDOW_MS: u64 = 1_000;

/// Merge historical and live messages into the reconciled per-room view.
///
/// Both inputs are keyed by id; historical messages are inserted first and
/// live messages overwrite on conflict, since live data reflects the
/// freshest state. Ids present in `tombstones` never appear in the output,
/// regardless of source, so a stale historical page cannot reintroduce a
/// deleted message.
///
/// Output is sorted by timestamp ascending, id as the final tie-break.
/// Within a near-tie cluster (consecutive timestamps chained within
/// [`TIE_WINDOW_MS`]), messages whose id appears in `translated` sort
/// after those without a cached translation, keeping freshly-arrived
/// untranslated messages visually stable relative to ones whose
/// translation already resolved. The translated-id set is an explicit
/// input so the ordering stays a pure function.
pub fn reconcile(
    historical: &[Message],
    live: &[Message],
    tombstones: &HashSet<MessageId>,
    translated: &HashSet<MessageId>,
) -> Vec<Message> {
    let mut by_id: HashMap<MessageId, &Message> = HashMap::new();
    for msg in historical.iter().chain(live) {
        by_id.insert(msg.id, msg);
    }

    let mut merged: Vec<&Message> =
        by_id.into_values().filter(|m| !tombstones.contains(&m.id)).collect();
    merged.sort_by_key(|m| (m.timestamp_ms, m.id));

    let mut out: Vec<Message> = Vec::with_capacity(merged.len());
    let mut start = 0;
    while start < merged.len() {
        let mut end = start + 1;
        while end < merged.len()
            && merged[end].timestamp_ms - merged[end - 1].timestamp_ms <= TIE_WINDOW_MS
        {
            end += 1;
        }

        let cluster = &merged[start..end];
        out.extend(cluster.iter().filter(|m| !translated.contains(&m.id)).map(|m| (*m).clone()));
        out.extend(cluster.iter().filter(|m| translated.contains(&m.id)).map(|m| (*m).clone()));

        start = end;
    }

    out
}
