/// Application name
pub const APP_NAME: &str = "Parley";

/// Page size used for history fetches and search queries
pub const DEFAULT_FETCH_SIZE: usize = 20;

/// Maximum gap between two messages of one sender that still renders them
/// as a single visual block (milliseconds)
pub const MESSAGE_GROUP_TIMESPAN_MS: i64 = 60_000;

/// Type tag stamped on every message search result
pub const SEARCH_RESULT_TYPE: &str = "chat.message";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
