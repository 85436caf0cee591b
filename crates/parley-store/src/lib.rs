//! # parley-store
//!
//! In-memory registry of the conversations known to the chat client.
//!
//! The store keeps one id-indexed map as the single source of truth.
//! Channels and private conversations are computed views over it, so an
//! update made through any operation is observed by every view. All
//! operations are synchronous and never fail: a missing target turns the
//! call into a no-op, since the store only mirrors eventually-consistent
//! backend state.

pub mod conversations;
pub mod store;
pub mod unread;

pub use store::{ConversationStore, StoreSnapshot};
