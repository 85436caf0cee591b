//! Conversation lifecycle operations on [`ConversationStore`].

use parley_shared::models::{Conversation, ConversationPatch, Topic, UserRef};
use parley_shared::types::MemberStatus;
use tracing::{debug, trace};

use crate::store::ConversationStore;

impl ConversationStore {
    // ------------------------------------------------------------------
    // Insert
    // ------------------------------------------------------------------

    /// Add a conversation unless one with the same id is already stored.
    /// Returns `true` when the conversation was inserted.
    pub fn add_conversation(&mut self, conversation: Conversation) -> bool {
        let id = conversation.id.clone();
        let inserted = self.insert(conversation);
        if inserted {
            debug!(conversation = %id, "conversation added");
        } else {
            trace!(conversation = %id, "conversation already stored");
        }
        inserted
    }

    /// Add every conversation of `list`, keeping its order. An empty input
    /// leaves the store untouched.
    pub fn add_conversations<I>(&mut self, list: I)
    where
        I: IntoIterator<Item = Conversation>,
    {
        for conversation in list {
            self.add_conversation(conversation);
        }
    }

    /// Mark the conversation as joined and store it.
    pub fn join_conversation(&mut self, conversation: Option<Conversation>) {
        let Some(mut conversation) = conversation else {
            return;
        };
        conversation.member_status = Some(MemberStatus::Member);
        self.add_conversation(conversation);
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace the members of the stored conversation, or store
    /// `conversation` with those members when it is unknown.
    pub fn add_members(&mut self, mut conversation: Conversation, members: Vec<UserRef>) {
        if let Some(existing) = self.get_mut(&conversation.id) {
            existing.members = members;
            return;
        }
        conversation.members = members;
        self.add_conversation(conversation);
    }

    /// Merge `patch` into the stored conversation, or store it as a new
    /// conversation when its id is unknown.
    pub fn update_conversation(&mut self, patch: ConversationPatch) {
        match self.get_mut(&patch.id) {
            Some(existing) => {
                debug!(conversation = %patch.id, "conversation updated");
                patch.apply(existing);
            }
            None => {
                self.add_conversation(patch.into_conversation());
            }
        }
    }

    /// Set the topic of the stored conversation, or store `conversation`
    /// with that topic when it is unknown.
    pub fn update_topic(&mut self, mut conversation: Conversation, topic: Topic) {
        if let Some(existing) = self.get_mut(&conversation.id) {
            existing.topic = Some(topic);
            return;
        }
        conversation.topic = Some(topic);
        self.add_conversation(conversation);
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    pub fn delete_conversation(&mut self, conversation: &Conversation) {
        if self.remove(&conversation.id).is_some() {
            debug!(conversation = %conversation.id, "conversation removed");
        }
    }

    pub fn leave_conversation(&mut self, conversation: &Conversation) {
        self.delete_conversation(conversation);
    }
}
