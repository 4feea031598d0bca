//! Per-room session state machine.
//!
//! [`Session`] reconciles the two sources of truth about the active room
//! (the historical snapshot and the live stream) and layers the derived
//! state on top: mention notifications, translations, reactions, and the
//! autoscroll policy. It is a pure state machine: it consumes
//! [`SessionEvent`] inputs and produces [`SessionAction`] instructions for
//! the runtime to execute. No I/O dependencies, so it is fully testable
//! in simulation.
//!
//! # Staleness policy
//!
//! Switching rooms or languages never cancels outstanding requests; it
//! invalidates their effect. Collaborator results tagged with a room other
//! than the active one are dropped with a debug log, and translation
//! results tagged with an old generation are discarded by the cache. A
//! transient disconnect never clears the rendered view; only the exposed
//! connection status changes.

use std::{collections::HashSet, ops::Add, time::Duration};

use estuary_core::{
    ConnectionStatus, FollowPolicy, Message, MessageId, MessageView, Priority, RawMessage,
    ReactionState, RoomId, RoomInfo, TranslationCache, ViewportController, detect_new_mentions,
    reconcile,
};

use crate::{Notifier, SessionAction, SessionError, SessionEvent};

/// State scoped to one room visit. Discarded wholesale on room switch;
/// only the notification record (owned by the session) survives.
#[derive(Debug, Clone)]
struct RoomSession {
    room_id: RoomId,
    /// Last historical snapshot, as fetched.
    historical: Vec<Message>,
    /// Messages accumulated from the live stream.
    live: Vec<Message>,
    /// Deleted ids, authoritative over both sources.
    tombstones: HashSet<MessageId>,
    /// Reconciled view from the latest pass.
    view: Vec<Message>,
    /// Ids present in the previous pass, for new-arrival detection.
    previous_ids: HashSet<MessageId>,
    /// Ids that mentioned the user when they first entered the view.
    mentioned: HashSet<MessageId>,
    info: Option<RoomInfo>,
    online_count: u32,
    translations: TranslationCache,
    reactions: ReactionState,
}

impl RoomSession {
    fn new(room_id: RoomId, language: &str) -> Self {
        Self {
            room_id,
            historical: Vec::new(),
            live: Vec::new(),
            tombstones: HashSet::new(),
            view: Vec::new(),
            previous_ids: HashSet::new(),
            mentioned: HashSet::new(),
            info: None,
            online_count: 0,
            translations: TranslationCache::new(language),
            reactions: ReactionState::new(),
        }
    }
}

/// Session state machine for the active room.
///
/// Generic over the instant type `I` so viewport timers run under real or
/// virtual time.
#[derive(Debug, Clone)]
pub struct Session<I = std::time::Instant> {
    user_id: String,
    user_name: String,
    language: String,
    /// Construction-time language. Bulk background translation runs only
    /// while the active language differs from it.
    default_language: String,
    connection: ConnectionStatus,
    notifier: Notifier,
    viewport: ViewportController<I>,
    room: Option<RoomSession>,
    jump_affordance: bool,
}

impl<I> Session<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a session for the given user identity and target language.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let language = language.into();
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            default_language: language.clone(),
            language,
            connection: ConnectionStatus::Disconnected,
            notifier: Notifier::new(),
            viewport: ViewportController::new(),
            room: None,
            jump_affordance: false,
        }
    }

    /// Process an event and return actions for the runtime to execute.
    pub fn handle(&mut self, event: SessionEvent<I>) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::SelectRoom { room_id } => Ok(self.select_room(room_id)),
            SessionEvent::ConnectionChanged { status } => {
                self.connection = status;
                let mut actions = Vec::new();
                // Join is idempotent and must be re-issued on reconnect.
                if status == ConnectionStatus::Connected
                    && let Some(room) = &self.room
                {
                    actions.push(SessionAction::Join { room_id: room.room_id });
                }
                actions.push(SessionAction::Render);
                Ok(actions)
            },
            SessionEvent::HistoryFetched { room_id, messages } => {
                let Some(room) = self.active_room_mut(room_id, "history page") else {
                    return Ok(vec![]);
                };
                room.historical = intake(messages);
                Ok(self.reconciliation_pass())
            },
            SessionEvent::RoomInfoFetched { room_id, info } => {
                let Some(room) = self.active_room_mut(room_id, "room metadata") else {
                    return Ok(vec![]);
                };
                room.info = Some(info);
                Ok(vec![SessionAction::Render])
            },
            SessionEvent::LikedSetFetched { room_id, ids } => {
                let Some(room) = self.active_room_mut(room_id, "liked set") else {
                    return Ok(vec![]);
                };
                room.reactions.initialize(&ids);
                Ok(vec![SessionAction::Render])
            },
            SessionEvent::OnlineCount { room_id, count } => {
                let Some(room) = self.active_room_mut(room_id, "online count") else {
                    return Ok(vec![]);
                };
                room.online_count = count;
                Ok(vec![SessionAction::Render])
            },
            SessionEvent::LiveMessage { message } => {
                let Some(message) = Message::from_raw(message) else {
                    tracing::debug!("excluding malformed live message without id");
                    return Ok(vec![]);
                };
                let Some(room) = self.active_room_mut(message.room_id, "live message") else {
                    return Ok(vec![]);
                };
                // Re-deliveries and edits replace in place; the buffer
                // holds one entry per id.
                if let Some(existing) = room.live.iter_mut().find(|m| m.id == message.id) {
                    *existing = message;
                } else {
                    room.live.push(message);
                }
                Ok(self.reconciliation_pass())
            },
            SessionEvent::MessageDeleted { room_id, message_id } => {
                let Some(room) = self.active_room_mut(room_id, "deletion") else {
                    return Ok(vec![]);
                };
                room.tombstones.insert(message_id);
                Ok(self.reconciliation_pass())
            },
            SessionEvent::LikeUpdate { room_id, message_id, total_likes, user_liked } => {
                let Some(room) = self.active_room_mut(room_id, "like update") else {
                    return Ok(vec![]);
                };
                room.reactions.apply_authoritative(message_id, total_likes, user_liked);
                Ok(vec![SessionAction::Render])
            },
            SessionEvent::SendMessage { text, reply_to, mentions } => {
                self.send_message(text, reply_to, mentions)
            },
            SessionEvent::ToggleLike { message_id } => {
                let Some(room) = &mut self.room else {
                    return Err(SessionError::NoActiveRoom { operation: "toggle like" });
                };
                let _ = room.reactions.toggle(message_id);
                Ok(vec![
                    SessionAction::SendLikeToggle { room_id: room.room_id, message_id },
                    SessionAction::Render,
                ])
            },
            SessionEvent::SetLanguage { language } => {
                self.language = language;
                if let Some(room) = &mut self.room {
                    // Hard reset: stale-generation results will be dropped
                    // on arrival, and the next pass re-requests in bulk.
                    room.translations.set_language(self.language.clone());
                    return Ok(self.reconciliation_pass());
                }
                Ok(vec![])
            },
            SessionEvent::RequestTranslation { message_id } => {
                let Some(room) = &mut self.room else {
                    return Err(SessionError::NoActiveRoom { operation: "request translation" });
                };
                let request = room
                    .view
                    .iter()
                    .find(|m| m.id == message_id)
                    .and_then(|m| room.translations.request(m, Priority::High));
                Ok(request.map(SessionAction::Translate).into_iter().collect())
            },
            SessionEvent::TranslationResolved { message_id, generation, text } => {
                let Some(room) = &mut self.room else {
                    return Ok(vec![]);
                };
                if room.translations.complete(message_id, generation, text) {
                    // A resolved translation can shift near-tie ordering.
                    return Ok(self.reconciliation_pass());
                }
                Ok(vec![])
            },
            SessionEvent::Scrolled { metrics, now } => {
                self.viewport.on_scroll(metrics, now);
                if self.viewport.is_near_bottom() {
                    self.jump_affordance = false;
                }
                Ok(vec![SessionAction::Render])
            },
            SessionEvent::Tick { now } => {
                self.viewport.tick(now);
                Ok(vec![])
            },
            SessionEvent::NotifyFailed { reason } => {
                // Side-effect failure: logged and swallowed, never touches
                // reconciliation state.
                tracing::warn!(%reason, "notification delivery failed");
                Ok(vec![])
            },
        }
    }

    /// Activate a room: discard per-room state, refetch everything.
    ///
    /// The notification record survives on purpose: revisiting a room must
    /// not replay old mention notifications.
    fn select_room(&mut self, room_id: RoomId) -> Vec<SessionAction> {
        self.room = Some(RoomSession::new(room_id, &self.language));
        self.viewport = ViewportController::new();
        self.jump_affordance = false;
        vec![
            SessionAction::FetchHistory { room_id },
            SessionAction::FetchRoomInfo { room_id },
            SessionAction::FetchLikedSet { room_id },
            SessionAction::FetchOnlineCount { room_id },
            SessionAction::Join { room_id },
            SessionAction::Render,
        ]
    }

    fn send_message(
        &mut self,
        text: String,
        reply_to: Option<MessageId>,
        mentions: Vec<String>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Some(room) = &self.room else {
            return Err(SessionError::NoActiveRoom { operation: "send message" });
        };
        if self.connection != ConnectionStatus::Connected {
            return Err(SessionError::NotConnected { operation: "send message" });
        }
        self.jump_affordance = false;
        Ok(vec![
            SessionAction::Send { room_id: room.room_id, text, reply_to, mentions },
            // Explicit user intent overrides the passive scroll heuristics.
            SessionAction::ScrollToLatest,
            SessionAction::Render,
        ])
    }

    /// One reconciliation pass: rebuild the view from current inputs and
    /// derive mentions, translations, and the viewport policy from the
    /// delta against the previous pass.
    fn reconciliation_pass(&mut self) -> Vec<SessionAction> {
        let Some(room) = &mut self.room else {
            return vec![];
        };

        let view = reconcile(
            &room.historical,
            &room.live,
            &room.tombstones,
            room.translations.translated_ids(),
        );
        room.reactions.seed_totals(&view);

        let mut actions = Vec::new();

        // Background translation for every message not authored by us that
        // the cache has neither resolved nor queued. Only while viewing in
        // a non-default language; explicit per-message requests are not
        // gated.
        if self.language != self.default_language {
            for message in &view {
                if message.sender_id != self.user_id
                    && let Some(request) = room.translations.request(message, Priority::Normal)
                {
                    actions.push(SessionAction::Translate(request));
                }
            }
        }

        let new_mentions =
            detect_new_mentions(&room.previous_ids, &view, &self.user_id, &self.user_name);
        room.mentioned.extend(new_mentions.iter().copied());
        actions.extend(self.notifier.process(&new_mentions, &view));

        let foreign_arrival = view
            .iter()
            .any(|m| !room.previous_ids.contains(&m.id) && m.sender_id != self.user_id);

        room.previous_ids = view.iter().map(|m| m.id).collect();
        room.view = view;

        if foreign_arrival {
            match self.viewport.on_new_message() {
                FollowPolicy::AutoScroll => {
                    self.jump_affordance = false;
                    actions.push(SessionAction::ScrollToLatest);
                },
                FollowPolicy::JumpAffordance => {
                    self.jump_affordance = true;
                    actions.push(SessionAction::ShowJumpToLatest);
                },
            }
        }

        actions.push(SessionAction::Render);
        actions
    }

    /// The active room's state when `room_id` matches it; otherwise a
    /// debug-logged drop of a stale result.
    fn active_room_mut(&mut self, room_id: RoomId, what: &'static str) -> Option<&mut RoomSession> {
        match &mut self.room {
            Some(room) if room.room_id == room_id => Some(room),
            _ => {
                tracing::debug!(room_id, what, "dropping result for non-active room");
                None
            },
        }
    }

    /// Currently active room id. `None` before the first room selection.
    pub fn active_room(&self) -> Option<RoomId> {
        self.room.as_ref().map(|r| r.room_id)
    }

    /// The reconciled, ordered, deduplicated message sequence.
    pub fn view(&self) -> &[Message] {
        self.room.as_ref().map_or(&[], |r| r.view.as_slice())
    }

    /// Per-message presentation projections with all derived flags.
    pub fn message_views(&self) -> Vec<MessageView> {
        let Some(room) = &self.room else {
            return Vec::new();
        };
        room.view
            .iter()
            .map(|m| MessageView {
                is_own: m.sender_id == self.user_id,
                is_mentioned: room.mentioned.contains(&m.id),
                translation: room.translations.get(m.id).map(String::from),
                reaction: room.reactions.get(m.id),
                message: m.clone(),
            })
            .collect()
    }

    /// Live-stream connection status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection
    }

    /// Metadata for the active room, once fetched.
    pub fn room_info(&self) -> Option<&RoomInfo> {
        self.room.as_ref().and_then(|r| r.info.as_ref())
    }

    /// Online-participant count for the active room.
    pub fn online_count(&self) -> u32 {
        self.room.as_ref().map_or(0, |r| r.online_count)
    }

    /// Whether the "jump to latest" affordance should be shown.
    pub fn jump_affordance(&self) -> bool {
        self.jump_affordance
    }

    /// Active target language tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Current user's display name.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

/// Validate wire records, excluding malformed ones with a debug log.
fn intake(raws: Vec<RawMessage>) -> Vec<Message> {
    let total = raws.len();
    let messages: Vec<Message> = raws.into_iter().filter_map(Message::from_raw).collect();
    if messages.len() < total {
        tracing::debug!(excluded = total - messages.len(), "excluded malformed history records");
    }
    messages
}
