//! Conversation listing backing the channel endpoint.

use std::future::Future;
use std::path::Path;

use parley_shared::models::Conversation;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ServerError;

/// Restricts a channel listing. The default filter returns everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

pub trait ConversationLister: Send + Sync + 'static {
    fn list_channels(
        &self,
        filter: &ChannelFilter,
    ) -> impl Future<Output = Result<Vec<Conversation>, ServerError>> + Send;
}

/// Conversations held in memory, optionally seeded from a JSON file.
#[derive(Debug, Default)]
pub struct InMemoryConversations {
    conversations: RwLock<Vec<Conversation>>,
}

impl InMemoryConversations {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations: RwLock::new(conversations),
        }
    }

    /// Load a JSON array of conversations.
    pub async fn from_seed_file(path: &Path) -> Result<Self, ServerError> {
        let data = tokio::fs::read(path).await?;
        let conversations: Vec<Conversation> = serde_json::from_slice(&data)?;
        info!(
            path = %path.display(),
            count = conversations.len(),
            "Loaded conversation seed"
        );
        Ok(Self::new(conversations))
    }
}

impl ConversationLister for InMemoryConversations {
    async fn list_channels(&self, filter: &ChannelFilter) -> Result<Vec<Conversation>, ServerError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .iter()
            .filter(|c| c.is_channel())
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
