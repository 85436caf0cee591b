//! Domain models exchanged with the chat backend.
//!
//! Field names follow the backend's JSON documents (`_id`,
//! `unreadMessageCount`, `member_status`, ...) so the structs can be
//! deserialized straight from REST responses and real-time events.

use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, ConversationType, MemberStatus, MessageId, UserId};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A reference to a user as embedded in conversations and messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl UserRef {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Name shown in the UI, falling back to the raw id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Topic attached to a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserId>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_set: Option<i64>,
}

impl Topic {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// A channel, private group or direct conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    #[serde(rename = "_id", alias = "id")]
    pub id: ConversationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConversationType>,
    #[serde(default)]
    pub members: Vec<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(rename = "unreadMessageCount", default)]
    pub unread_message_count: u32,
    #[serde(rename = "mentionCount", default)]
    pub mention_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_status: Option<MemberStatus>,
}

impl Conversation {
    pub fn new(id: impl Into<ConversationId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: ConversationType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_channel(&self) -> bool {
        self.kind == Some(ConversationType::Open)
    }

    pub fn is_confidential(&self) -> bool {
        self.kind == Some(ConversationType::Confidential)
    }
}

/// Partial update of a conversation. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationPatch {
    #[serde(rename = "_id", alias = "id")]
    pub id: ConversationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConversationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<UserRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(
        rename = "unreadMessageCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unread_message_count: Option<u32>,
    #[serde(
        rename = "mentionCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mention_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_status: Option<MemberStatus>,
}

impl ConversationPatch {
    pub fn new(id: impl Into<ConversationId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Overwrite every field of `target` that this patch carries.
    pub fn apply(self, target: &mut Conversation) {
        if let Some(name) = self.name {
            target.name = Some(name);
        }
        if let Some(kind) = self.kind {
            target.kind = Some(kind);
        }
        if let Some(members) = self.members {
            target.members = members;
        }
        if let Some(avatar) = self.avatar {
            target.avatar = Some(avatar);
        }
        if let Some(topic) = self.topic {
            target.topic = Some(topic);
        }
        if let Some(count) = self.unread_message_count {
            target.unread_message_count = count;
        }
        if let Some(count) = self.mention_count {
            target.mention_count = count;
        }
        if let Some(status) = self.member_status {
            target.member_status = Some(status);
        }
    }

    /// Build a conversation from this patch alone.
    pub fn into_conversation(self) -> Conversation {
        let mut conversation = Conversation::new(self.id.clone());
        self.apply(&mut conversation);
        conversation
    }
}

impl From<Conversation> for ConversationPatch {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            name: c.name,
            kind: c.kind,
            members: Some(c.members),
            avatar: c.avatar,
            topic: c.topic,
            unread_message_count: Some(c.unread_message_count),
            mention_count: Some(c.mention_count),
            member_status: c.member_status,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamps {
    /// Milliseconds since the Unix epoch.
    pub creation: i64,
}

/// A chat message. `id` is absent for messages not yet persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<MessageId>,
    pub creator: UserRef,
    #[serde(default)]
    pub text: String,
    pub timestamps: Timestamps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ConversationId>,
    #[serde(default)]
    pub user_mentions: Vec<UserRef>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Message {
    pub fn new(creator: impl Into<UserId>, text: impl Into<String>, creation: i64) -> Self {
        Self {
            creator: UserRef::new(creator),
            text: text.into(),
            timestamps: Timestamps { creation },
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn in_channel(mut self, channel: impl Into<ConversationId>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn created_at(&self) -> i64 {
        self.timestamps.creation
    }

    /// Key combining sender, creation time and text. Stable for optimistic
    /// messages that have no backend id yet.
    pub fn uniq_id(&self) -> String {
        format!("{}:{}{}", self.creator.id, self.timestamps.creation, self.text)
    }

    pub fn mentions(&self, user: &UserId) -> bool {
        self.user_mentions.iter().any(|u| &u.id == user)
    }
}
