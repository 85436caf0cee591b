//! Paginated message search.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parley_shared::constants::{DEFAULT_FETCH_SIZE, SEARCH_RESULT_TYPE};
use parley_shared::models::Message;
use serde::Serialize;
use tracing::debug;

use crate::api::{ChatApi, SearchQuery};
use crate::error::Result;
use crate::format::{MentionOptions, MessageFormatter};

/// A search hit ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub message: Message,
    /// Creation time of the message (ms since the Unix epoch).
    pub date: i64,
}

impl SearchResult {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date)
    }
}

/// Forward-only cursor over the results of one search term.
pub struct MessageSearchFetcher<A, F> {
    api: Arc<A>,
    formatter: F,
    query: String,
    offset: usize,
    limit: usize,
}

impl<A: ChatApi, F: MessageFormatter> MessageSearchFetcher<A, F> {
    pub fn new(api: Arc<A>, formatter: F, query: impl Into<String>) -> Self {
        Self {
            api,
            formatter,
            query: query.into(),
            offset: 0,
            limit: DEFAULT_FETCH_SIZE,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fetch the next page. The cursor only moves when the request succeeds.
    pub async fn fetch_next(&mut self) -> Result<Vec<SearchResult>> {
        let request = SearchQuery {
            search: self.query.clone(),
            offset: self.offset,
            limit: self.limit,
        };
        let batch = self.api.search_messages(&request).await?;
        self.offset += batch.len();

        debug!(
            query = %self.query,
            results = batch.len(),
            offset = self.offset,
            "Search page fetched"
        );

        Ok(batch.into_iter().map(|m| self.to_result(m)).collect())
    }

    fn to_result(&self, mut message: Message) -> SearchResult {
        message.text = self.formatter.render(
            &message.text,
            &message.user_mentions,
            MentionOptions { skip_link: true },
        );
        message.kind = Some(SEARCH_RESULT_TYPE.to_string());

        SearchResult {
            date: message.created_at(),
            message,
        }
    }
}
