//! Per-message translation cache with generation-guarded invalidation.
//!
//! A language switch is modeled as a hard reset: the generation counter is
//! bumped and every entry is cleared, because partial mixed-language state
//! is worse than a brief visible delay. Outstanding backend requests are
//! never cancelled; each carries the generation active when it was issued,
//! and a completion whose generation no longer matches is discarded on
//! arrival. That tag is the entire cancellation mechanism.

use std::collections::{HashMap, HashSet};

use crate::types::{Message, MessageId};

/// Advisory scheduling priority for the translation backend.
///
/// Affects backend ordering only, never cache semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// The user explicitly asked for this translation.
    High,
    /// Background/bulk translation.
    Normal,
}

/// A translation task for the driver to run against the backend.
///
/// Identified by `(message_id, generation)`; the completion must carry the
/// same pair back into [`TranslationCache::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Message to translate.
    pub message_id: MessageId,
    /// Original text to translate.
    pub text: String,
    /// Target language tag.
    pub language: String,
    /// Generation active when the request was issued.
    pub generation: u64,
    /// Advisory backend scheduling priority.
    pub priority: Priority,
}

/// Message id → translated text for the active target language.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    language: String,
    generation: u64,
    entries: HashMap<MessageId, String>,
    translated_ids: HashSet<MessageId>,
    pending: HashSet<MessageId>,
}

impl TranslationCache {
    /// Create a cache for the given target language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            generation: 0,
            entries: HashMap::new(),
            translated_ids: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    /// Active target language tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch target language: bump the generation and drop everything.
    ///
    /// In-flight backend requests keep their old generation tag and will be
    /// discarded by [`Self::complete`] when they land.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        self.generation += 1;
        self.entries.clear();
        self.translated_ids.clear();
        self.pending.clear();
    }

    /// Translated text for `id`, if resolved and still valid.
    pub fn get(&self, id: MessageId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Ids with a resolved translation, as reconciliation tie-break input.
    pub fn translated_ids(&self) -> &HashSet<MessageId> {
        &self.translated_ids
    }

    /// Build a backend request for `message`, tagged with the current
    /// generation.
    ///
    /// Returns `None` when the message is already cached or already in
    /// flight, since re-requesting a still-valid entry is a no-op.
    pub fn request(&mut self, message: &Message, priority: Priority) -> Option<TranslationRequest> {
        if self.entries.contains_key(&message.id) || self.pending.contains(&message.id) {
            return None;
        }
        self.pending.insert(message.id);
        Some(TranslationRequest {
            message_id: message.id,
            text: message.text.clone(),
            language: self.language.clone(),
            generation: self.generation,
            priority,
        })
    }

    /// Merge a backend completion into the cache.
    ///
    /// Returns `false` (and leaves the cache untouched) when `generation`
    /// no longer matches: the result raced a language switch and belongs
    /// to a context that no longer exists.
    pub fn complete(&mut self, id: MessageId, generation: u64, text: String) -> bool {
        if generation != self.generation {
            tracing::debug!(message_id = id, generation, current = self.generation,
                "discarding stale translation result");
            return false;
        }
        self.pending.remove(&id);
        self.translated_ids.insert(id);
        self.entries.insert(id, text);
        true
    }
}
