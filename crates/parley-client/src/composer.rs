//! Unsent drafts, kept per conversation while the user navigates away.

use std::collections::HashMap;

use parley_shared::types::ConversationId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ComposerState {
    drafts: HashMap<ConversationId, Draft>,
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `draft` for `conversation`. An empty draft forgets it.
    pub fn save_message(&mut self, conversation: &ConversationId, draft: Draft) {
        if draft.text.trim().is_empty() {
            self.drafts.remove(conversation);
        } else {
            self.drafts.insert(conversation.clone(), draft);
        }
    }

    pub fn get_message(&self, conversation: &ConversationId) -> Option<&Draft> {
        self.drafts.get(conversation)
    }

    pub fn clear(&mut self, conversation: &ConversationId) -> Option<Draft> {
        self.drafts.remove(conversation)
    }
}
