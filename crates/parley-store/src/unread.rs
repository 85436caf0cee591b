//! Active room tracking and unread/mention counters.

use parley_shared::models::Conversation;
use parley_shared::types::ConversationId;
use tracing::{debug, trace};

use crate::store::ConversationStore;

impl ConversationStore {
    pub fn active_room(&self) -> Option<&Conversation> {
        self.active_room.as_ref().and_then(|id| self.by_id.get(id))
    }

    pub fn active_room_id(&self) -> Option<&ConversationId> {
        self.active_room.as_ref()
    }

    pub fn is_active_room(&self, id: Option<&ConversationId>) -> bool {
        match (self.active_room.as_ref(), id) {
            (Some(active), Some(id)) => active == id,
            _ => false,
        }
    }

    /// Focus the conversation `id` and reset its counters. Returns `false`
    /// and leaves the active room unchanged when `id` is unknown.
    pub fn set_active(&mut self, id: &ConversationId) -> bool {
        let Some(conversation) = self.by_id.get_mut(id) else {
            trace!(conversation = %id, "cannot activate unknown conversation");
            return false;
        };
        conversation.unread_message_count = 0;
        conversation.mention_count = 0;
        self.active_room = Some(id.clone());
        debug!(conversation = %id, "active room set");
        true
    }

    pub fn unset_active(&mut self) {
        if let Some(id) = self.active_room.take() {
            debug!(conversation = %id, "active room cleared");
        }
    }

    pub fn mark_all_messages_as_read(&mut self, conversation: &Conversation) {
        if let Some(existing) = self.get_mut(&conversation.id) {
            existing.unread_message_count = 0;
        }
    }

    /// Sum of unread messages across every stored conversation.
    pub fn get_number_of_unreaded_messages(&self) -> u32 {
        self.conversations().map(|c| c.unread_message_count).sum()
    }

    pub fn total_mentions(&self) -> u32 {
        self.conversations().map(|c| c.mention_count).sum()
    }

    /// Count a message that arrived in `id`. Messages for the active room
    /// are considered read. Returns `true` when a counter changed.
    pub fn record_incoming_message(&mut self, id: &ConversationId, mentions_me: bool) -> bool {
        if self.is_active_room(Some(id)) {
            return false;
        }
        let Some(conversation) = self.get_mut(id) else {
            return false;
        };
        conversation.unread_message_count += 1;
        if mentions_me {
            conversation.mention_count += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use parley_shared::types::ConversationType;

    use super::*;

    fn with_counts(id: &str, unread: u32, mentions: u32) -> Conversation {
        let mut c = Conversation::new(id);
        c.unread_message_count = unread;
        c.mention_count = mentions;
        c
    }

    #[test]
    fn unread_sum_over_all_conversations() {
        let mut store = ConversationStore::new();
        store.add_conversations(vec![
            with_counts("0", 2, 0),
            with_counts("1", 3, 0).with_kind(ConversationType::Open),
            Conversation::new("2").with_kind(ConversationType::Confidential),
        ]);
        assert_eq!(store.get_number_of_unreaded_messages(), 5);

        store.delete_conversation(&Conversation::new("1"));
        assert_eq!(store.get_number_of_unreaded_messages(), 2);
    }

    #[test]
    fn is_active_room_without_id_is_false() {
        let store = ConversationStore::new();
        assert!(!store.is_active_room(None));
    }

    #[test]
    fn is_active_room_compares_ids() {
        let mut store = ConversationStore::new();
        store.add_conversations(vec![Conversation::new("0"), Conversation::new("1")]);
        assert!(store.set_active(&"1".into()));

        assert!(store.is_active_room(Some(&"1".into())));
        assert!(!store.is_active_room(Some(&"0".into())));
    }

    #[test]
    fn set_active_unknown_conversation() {
        let mut store = ConversationStore::new();
        store.add_conversation(Conversation::new("1"));
        store.set_active(&"1".into());

        assert!(!store.set_active(&"0".into()));
        assert_eq!(store.active_room_id(), Some(&ConversationId::new("1")));
    }

    #[test]
    fn set_active_resets_counters() {
        let mut store = ConversationStore::new();
        store.add_conversations(vec![with_counts("0", 3, 10), Conversation::new("1")]);

        assert!(store.set_active(&"0".into()));
        let active = store.active_room().unwrap();
        assert_eq!(active.id, ConversationId::new("0"));
        assert_eq!(active.unread_message_count, 0);
        assert_eq!(active.mention_count, 0);
    }

    #[test]
    fn mark_all_messages_as_read_targets_one_conversation() {
        let mut store = ConversationStore::new();
        store.add_conversations(vec![
            with_counts("0", 2, 0),
            Conversation::new("1").with_kind(ConversationType::Open),
            with_counts("2", 3, 0).with_kind(ConversationType::Confidential),
        ]);
        store.mark_all_messages_as_read(&Conversation::new("0"));

        assert_eq!(store.find_conversation(&"0".into()).unwrap().unread_message_count, 0);
        assert_eq!(store.find_conversation(&"2".into()).unwrap().unread_message_count, 3);
    }

    #[test]
    fn incoming_messages_count_outside_active_room() {
        let mut store = ConversationStore::new();
        store.add_conversations(vec![Conversation::new("0"), Conversation::new("1")]);
        store.set_active(&"0".into());

        assert!(!store.record_incoming_message(&"0".into(), true));
        assert!(store.record_incoming_message(&"1".into(), false));
        assert!(store.record_incoming_message(&"1".into(), true));
        assert!(!store.record_incoming_message(&"9".into(), true));

        assert_eq!(store.get_number_of_unreaded_messages(), 2);
        assert_eq!(store.total_mentions(), 1);
    }

    #[test]
    fn deleting_active_room_clears_pointer() {
        let mut store = ConversationStore::new();
        store.add_conversation(Conversation::new("0"));
        store.set_active(&"0".into());
        store.delete_conversation(&Conversation::new("0"));

        assert!(store.active_room().is_none());
        assert!(!store.is_active_room(Some(&"0".into())));
    }

    #[test]
    fn unset_active_clears_pointer() {
        let mut store = ConversationStore::new();
        store.add_conversation(Conversation::new("0"));
        store.set_active(&"0".into());
        store.unset_active();

        assert!(store.active_room_id().is_none());
    }
}
