//! Transport boundary between the client and the chat backend.

use std::future::Future;

use parley_shared::models::{Conversation, Message};
use parley_shared::types::{ConversationId, MessageId};
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Options of a history page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOptions {
    pub limit: usize,
    /// Only return messages older than this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<MessageId>,
}

/// One page of a message search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub search: String,
    pub offset: usize,
    pub limit: usize,
}

/// Backend operations the client depends on.
///
/// A first history page (no `before` cursor) is returned oldest-first.
/// Pages of older history (`before` set) are returned newest-first.
pub trait ChatApi {
    fn fetch_messages(
        &self,
        conversation: &ConversationId,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;

    fn search_messages(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;

    fn list_channels(&self) -> impl Future<Output = Result<Vec<Conversation>>> + Send;
}

/// [`ChatApi`] over the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.server_url.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "GET");

        let resp = self.client.get(&url).query(query).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }
        Ok(resp.json().await?)
    }
}

impl ChatApi for HttpChatApi {
    async fn fetch_messages(
        &self,
        conversation: &ConversationId,
        options: &FetchOptions,
    ) -> Result<Vec<Message>> {
        self.get_json(&format!("conversations/{conversation}/messages"), options)
            .await
    }

    async fn search_messages(&self, query: &SearchQuery) -> Result<Vec<Message>> {
        self.get_json("messages", query).await
    }

    async fn list_channels(&self) -> Result<Vec<Conversation>> {
        self.get_json("channels", &[] as &[(&str, &str)]).await
    }
}
