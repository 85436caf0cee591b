//! Picks the conversation to open when navigating to the chat.

use std::future::Future;

use parley_shared::types::ConversationId;
use parley_store::ConversationStore;
use tracing::{debug, warn};

use crate::error::Result;

/// Remembers the conversation the user looked at last.
pub trait LastConversationService {
    fn last_conversation(&self) -> impl Future<Output = Result<Option<ConversationId>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub conversation_id: ConversationId,
    /// The id was not requested explicitly; the caller should navigate to it.
    pub redirected: bool,
}

/// Resolve the conversation to display.
///
/// An explicitly requested id wins. Otherwise the last visited
/// conversation is used, falling back to the first channel of the store
/// when there is none or it cannot be retrieved.
pub async fn resolve_conversation<L>(
    requested: Option<ConversationId>,
    last: &L,
    store: &ConversationStore,
) -> Option<Resolution>
where
    L: LastConversationService,
{
    if let Some(conversation_id) = requested {
        return Some(Resolution {
            conversation_id,
            redirected: false,
        });
    }

    let remembered = match last.last_conversation().await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Failed to get last conversation, using default channel");
            None
        }
    };

    let conversation_id = remembered.or_else(|| store.channels().next().map(|c| c.id.clone()))?;
    debug!(conversation = %conversation_id, "Conversation resolved");

    Some(Resolution {
        conversation_id,
        redirected: true,
    })
}
