use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::models::{Conversation, ConversationPatch, Message, Topic, UserRef};
use crate::types::ConversationId;

/// Real-time events pushed by the chat backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Text message posted in a conversation
    TextMessage(Message),

    /// File shared in a conversation
    FileMessage(Message),

    /// The current user joined a conversation
    ConversationJoined(Conversation),

    /// The current user left a conversation
    ConversationLeft(Conversation),

    /// Conversation attributes changed (name, members, avatar, ...)
    ConversationUpdated(ConversationPatch),

    /// Conversation removed on the backend
    ConversationDeleted(Conversation),

    /// Members list replaced
    MembersAdded(MembersAdded),

    /// Topic changed
    TopicUpdated(TopicUpdated),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MembersAdded {
    pub conversation: Conversation,
    pub members: Vec<UserRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicUpdated {
    pub conversation: Conversation,
    pub topic: Topic,
}

impl ChatEvent {
    /// Message carried by the event, if it is a message event.
    pub fn message(&self) -> Option<&Message> {
        match self {
            ChatEvent::TextMessage(m) | ChatEvent::FileMessage(m) => Some(m),
            _ => None,
        }
    }

    /// Conversation the event targets.
    pub fn conversation_id(&self) -> Option<&ConversationId> {
        match self {
            ChatEvent::TextMessage(m) | ChatEvent::FileMessage(m) => m.channel.as_ref(),
            ChatEvent::ConversationJoined(c)
            | ChatEvent::ConversationLeft(c)
            | ChatEvent::ConversationDeleted(c) => Some(&c.id),
            ChatEvent::ConversationUpdated(p) => Some(&p.id),
            ChatEvent::MembersAdded(e) => Some(&e.conversation.id),
            ChatEvent::TopicUpdated(e) => Some(&e.conversation.id),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(data)?;
        if let Some(kind) = value.get("type").and_then(|t| t.as_str()) {
            if !KNOWN_EVENTS.contains(&kind) {
                return Err(ProtocolError::Unsupported(kind.to_string()));
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

const KNOWN_EVENTS: &[&str] = &[
    "text_message",
    "file_message",
    "conversation_joined",
    "conversation_left",
    "conversation_updated",
    "conversation_deleted",
    "members_added",
    "topic_updated",
];
