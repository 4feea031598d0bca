//! Integration tests for the Runtime orchestration loop.
//!
//! A channel-backed simulation driver stands in for the collaborators:
//! events are fed through one channel, dispatched actions are collected on
//! another, and the loop ends when the event source closes.

use std::{fmt, ops::Add, time::Duration};

use estuary_app::{Driver, Runtime, Session, SessionAction, SessionEvent};
use estuary_core::RawMessage;
use tokio::sync::mpsc;

// Virtual clock: millisecond ticks as instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MsTick(u64);

impl Add<Duration> for MsTick {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.as_millis() as u64)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SimError(&'static str);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "simulated failure: {}", self.0)
    }
}

impl std::error::Error for SimError {}

/// Channel-backed driver: no real I/O, deterministic time.
struct SimDriver {
    events: mpsc::UnboundedReceiver<SessionEvent<MsTick>>,
    dispatched: mpsc::UnboundedSender<SessionAction>,
    fail_notifications: bool,
    renders: mpsc::UnboundedSender<usize>,
}

impl Driver for SimDriver {
    type Error = SimError;
    type Instant = MsTick;

    async fn poll_event(&mut self) -> Result<Option<SessionEvent<MsTick>>, SimError> {
        Ok(self.events.recv().await)
    }

    async fn dispatch(&mut self, action: SessionAction) -> Result<(), SimError> {
        if self.fail_notifications && matches!(action, SessionAction::Notify { .. }) {
            return Err(SimError("notification permission denied"));
        }
        let _ = self.dispatched.send(action);
        Ok(())
    }

    fn render(&mut self, session: &Session<MsTick>) -> Result<(), SimError> {
        let _ = self.renders.send(session.view().len());
        Ok(())
    }

    fn now(&self) -> MsTick {
        MsTick(0)
    }
}

struct Sim {
    events: mpsc::UnboundedSender<SessionEvent<MsTick>>,
    actions: mpsc::UnboundedReceiver<SessionAction>,
    runtime: Runtime<SimDriver>,
}

fn sim(fail_notifications: bool) -> Sim {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (render_tx, _render_rx) = mpsc::unbounded_channel();

    let driver = SimDriver {
        events: event_rx,
        dispatched: action_tx,
        fail_notifications,
        renders: render_tx,
    };
    let session = Session::new("alice-id", "Alice", "en");

    Sim { events: event_tx, actions: action_rx, runtime: Runtime::new(driver, session) }
}

fn raw(id: u64, sender: &str, text: &str) -> RawMessage {
    RawMessage {
        id: Some(id),
        room_id: 1,
        sender_id: sender.into(),
        sender_name: sender.into(),
        text: text.into(),
        timestamp_ms: Some(id * 1_000),
        reply_to: None,
        like_count: 0,
    }
}

fn drain(actions: &mut mpsc::UnboundedReceiver<SessionAction>) -> Vec<SessionAction> {
    let mut collected = Vec::new();
    while let Ok(action) = actions.try_recv() {
        collected.push(action);
    }
    collected
}

#[tokio::test]
async fn room_selection_flows_through_to_collaborator_fetches() {
    let mut sim = sim(false);
    let _ = sim.events.send(SessionEvent::SelectRoom { room_id: 3 });
    drop(sim.events);

    let result = sim.runtime.run().await;
    assert_eq!(result, Ok(()));

    let actions = drain(&mut sim.actions);
    assert!(actions.iter().any(|a| matches!(a, SessionAction::FetchHistory { room_id: 3 })));
    assert!(actions.iter().any(|a| matches!(a, SessionAction::FetchLikedSet { room_id: 3 })));
    assert!(actions.iter().any(|a| matches!(a, SessionAction::Join { room_id: 3 })));
}

#[tokio::test]
async fn live_mention_dispatches_one_notification() {
    let mut sim = sim(false);
    let _ = sim.events.send(SessionEvent::SelectRoom { room_id: 1 });
    let _ = sim.events.send(SessionEvent::LiveMessage { message: raw(1, "bob-id", "hi Alice") });
    let _ = sim.events.send(SessionEvent::LiveMessage { message: raw(1, "bob-id", "hi Alice") });
    drop(sim.events);

    let result = sim.runtime.run().await;
    assert_eq!(result, Ok(()));

    let notifications = drain(&mut sim.actions)
        .into_iter()
        .filter(|a| matches!(a, SessionAction::Notify { .. }))
        .count();
    assert_eq!(notifications, 1);
}

#[tokio::test]
async fn failed_notification_is_swallowed() {
    let mut sim = sim(true);
    let _ = sim.events.send(SessionEvent::SelectRoom { room_id: 1 });
    let _ = sim.events.send(SessionEvent::SetLanguage { language: "fr".into() });
    let _ = sim.events.send(SessionEvent::LiveMessage { message: raw(1, "bob-id", "hi Alice") });
    let _ = sim.events.send(SessionEvent::LiveMessage { message: raw(2, "bob-id", "still here") });
    drop(sim.events);

    // The notification dispatch fails, but the loop keeps running and the
    // later message still produces its translation request.
    let result = sim.runtime.run().await;
    assert_eq!(result, Ok(()));

    let actions = drain(&mut sim.actions);
    let translated: Vec<_> = actions
        .iter()
        .filter_map(|a| match a {
            SessionAction::Translate(req) => Some(req.message_id),
            _ => None,
        })
        .collect();
    assert!(translated.contains(&2));
}

#[tokio::test]
async fn rejected_event_does_not_stop_the_loop() {
    let mut sim = sim(false);
    // Sending with no active room is a session error; the loop continues.
    let _ = sim.events.send(SessionEvent::SendMessage {
        text: "early".into(),
        reply_to: None,
        mentions: vec![],
    });
    let _ = sim.events.send(SessionEvent::SelectRoom { room_id: 1 });
    drop(sim.events);

    let result = sim.runtime.run().await;
    assert_eq!(result, Ok(()));

    let actions = drain(&mut sim.actions);
    assert!(actions.iter().any(|a| matches!(a, SessionAction::Join { room_id: 1 })));
    assert!(!actions.iter().any(|a| matches!(a, SessionAction::Send { .. })));
}
