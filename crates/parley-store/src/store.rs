//! The [`ConversationStore`] struct and its read-side views.

use std::collections::HashMap;

use parley_shared::models::Conversation;
use parley_shared::types::ConversationId;
use serde::Serialize;

/// Conversation registry with an active-room pointer.
#[derive(Debug, Default)]
pub struct ConversationStore {
    /// Every known conversation, keyed by id.
    pub(crate) by_id: HashMap<ConversationId, Conversation>,
    /// Insertion order of `by_id`.
    pub(crate) order: Vec<ConversationId>,
    /// Currently focused conversation. Only ever points at a stored id.
    pub(crate) active_room: Option<ConversationId>,
}

/// Serializable copy of the store, as handed to the display layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub conversations: Vec<Conversation>,
    pub channels: Vec<Conversation>,
    pub private_conversations: Vec<Conversation>,
    pub active_room: Option<ConversationId>,
    pub unread_messages: u32,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// All conversations, in insertion order.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Conversations of type `open`.
    pub fn channels(&self) -> impl Iterator<Item = &Conversation> + '_ {
        self.conversations().filter(|c| c.is_channel())
    }

    /// Conversations of type `confidential`.
    pub fn private_conversations(&self) -> impl Iterator<Item = &Conversation> + '_ {
        self.conversations().filter(|c| c.is_confidential())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.by_id.contains_key(id)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn find_conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.by_id.get(id)
    }

    /// First conversation, in insertion order, matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<&Conversation>
    where
        P: Fn(&Conversation) -> bool,
    {
        self.conversations().find(|c| predicate(*c))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            conversations: self.conversations().cloned().collect(),
            channels: self.channels().cloned().collect(),
            private_conversations: self.private_conversations().cloned().collect(),
            active_room: self.active_room.clone(),
            unread_messages: self.get_number_of_unreaded_messages(),
        }
    }

    // ------------------------------------------------------------------
    // Internal mutation helpers
    // ------------------------------------------------------------------

    pub(crate) fn get_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        self.by_id.get_mut(id)
    }

    pub(crate) fn insert(&mut self, conversation: Conversation) -> bool {
        if self.by_id.contains_key(&conversation.id) {
            return false;
        }
        self.order.push(conversation.id.clone());
        self.by_id.insert(conversation.id.clone(), conversation);
        true
    }

    pub(crate) fn remove(&mut self, id: &ConversationId) -> Option<Conversation> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        if self.active_room.as_ref() == Some(id) {
            self.active_room = None;
        }
        Some(removed)
    }
}
