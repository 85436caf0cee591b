//! Ordered message timeline of one conversation.
//!
//! Messages are kept oldest-first. Each entry carries a `same_user` flag
//! telling the display layer to fold it into the previous sender block:
//! it is set when both messages share a creator and were created less
//! than the grouping timespan apart. The first entry is never folded.

use std::collections::HashSet;

use parley_shared::models::Message;
use parley_shared::types::MessageId;
use serde::Serialize;

/// A message as displayed in the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(rename = "_uniqId")]
    pub uniq_id: String,
    #[serde(rename = "sameUser")]
    pub same_user: bool,
}

impl StreamMessage {
    fn new(message: Message) -> Self {
        Self {
            uniq_id: message.uniq_id(),
            message,
            same_user: false,
        }
    }

    pub fn created_at(&self) -> i64 {
        self.message.created_at()
    }
}

#[derive(Debug, Clone)]
pub struct MessageStream {
    messages: Vec<StreamMessage>,
    keys: HashSet<String>,
    group_timespan_ms: i64,
}

impl MessageStream {
    pub fn new(group_timespan_ms: i64) -> Self {
        Self {
            messages: Vec::new(),
            keys: HashSet::new(),
            group_timespan_ms,
        }
    }

    pub fn messages(&self) -> &[StreamMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.keys.clear();
    }

    /// Backend id of the oldest held message, used as the pagination cursor.
    pub fn oldest_message_id(&self) -> Option<&MessageId> {
        self.messages.first().and_then(|m| m.message.id.as_ref())
    }

    pub fn contains(&self, message: &Message) -> bool {
        self.keys.contains(&message.uniq_id())
    }

    pub fn is_same_user(&self, previous: &Message, next: &Message) -> bool {
        previous.creator.id == next.creator.id
            && (next.created_at() - previous.created_at()).abs() < self.group_timespan_ms
    }

    /// Wrap a batch in display order, flagging each entry against its
    /// predecessor within the batch.
    pub fn tag_same_user(&self, batch: Vec<Message>) -> Vec<StreamMessage> {
        let mut tagged: Vec<StreamMessage> = Vec::with_capacity(batch.len());
        for message in batch {
            let mut entry = StreamMessage::new(message);
            entry.same_user = tagged
                .last()
                .is_some_and(|prev| self.is_same_user(&prev.message, &entry.message));
            tagged.push(entry);
        }
        tagged
    }

    /// Insert a message at its chronological position. The scan starts from
    /// the newest end since incoming messages are usually the most recent.
    /// Returns the insertion index, or `None` for an already held message.
    pub fn new_message(&mut self, message: Message) -> Option<usize> {
        let entry = StreamMessage::new(message);
        if !self.keys.insert(entry.uniq_id.clone()) {
            return None;
        }

        let index = self
            .messages
            .iter()
            .rposition(|held| held.created_at() < entry.created_at())
            .map_or(0, |i| i + 1);

        self.messages.insert(index, entry);
        self.refresh_same_user(index);
        self.refresh_same_user(index + 1);
        Some(index)
    }

    /// Merge the first page of a conversation. Returns the number of
    /// messages added.
    pub fn append_page(&mut self, batch: Vec<Message>) -> usize {
        if !self.messages.is_empty() {
            return batch
                .into_iter()
                .filter_map(|m| self.new_message(m))
                .count();
        }

        let fresh = self.dedup(batch);
        let tagged = self.tag_same_user(fresh);
        let added = tagged.len();
        self.messages.extend(tagged);
        added
    }

    /// Put a page of older history in front of the held messages. The page
    /// comes newest-first, as the backend serves `before` queries. Returns
    /// the number of messages added.
    pub fn prepend_page(&mut self, mut batch: Vec<Message>) -> usize {
        batch.reverse();
        let fresh = self.dedup(batch);
        let tagged = self.tag_same_user(fresh);
        let added = tagged.len();
        if added == 0 {
            return 0;
        }

        self.messages.splice(0..0, tagged);
        self.refresh_same_user(added);
        added
    }

    fn dedup(&mut self, batch: Vec<Message>) -> Vec<Message> {
        batch
            .into_iter()
            .filter(|m| self.keys.insert(m.uniq_id()))
            .collect()
    }

    fn refresh_same_user(&mut self, index: usize) {
        if index >= self.messages.len() {
            return;
        }
        let same_user = index > 0
            && self.is_same_user(&self.messages[index - 1].message, &self.messages[index].message);
        self.messages[index].same_user = same_user;
    }
}
