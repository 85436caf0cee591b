//! Client state shared by every chat screen.
//!
//! [`ChatClient`] owns the conversation store, the conversation view and
//! the composer drafts, and routes real-time events between them.

use std::sync::Arc;

use parley_shared::protocol::ChatEvent;
use parley_shared::types::{ConversationId, UserId};
use parley_store::ConversationStore;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::api::ChatApi;
use crate::composer::ComposerState;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::{EffectReceiver, EffectSender};
use crate::format::HtmlFormatter;
use crate::resolver::{resolve_conversation, LastConversationService, Resolution};
use crate::search::MessageSearchFetcher;
use crate::view::{ConversationView, LoadOutcome};

pub struct ChatClient<A> {
    api: Arc<A>,

    /// Every conversation the user can see.
    pub store: ConversationStore,

    /// The conversation screen.
    pub view: ConversationView,

    /// Unsent text per conversation.
    pub composer: ComposerState,

    /// The signed-in user, used to detect mentions.
    /// `None` until the host hands the session over.
    pub current_user: Option<UserId>,

    config: ClientConfig,
}

impl<A: ChatApi> ChatClient<A> {
    /// Create a client and the receiving end of its view effects.
    pub fn new(api: Arc<A>, config: ClientConfig) -> (Self, EffectReceiver) {
        let (effects, rx) = EffectSender::channel();
        let client = Self {
            api,
            store: ConversationStore::new(),
            view: ConversationView::new(&config, effects),
            composer: ComposerState::new(),
            current_user: None,
            config,
        };
        (client, rx)
    }

    pub fn with_current_user(mut self, user: impl Into<UserId>) -> Self {
        self.current_user = Some(user.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Load the channel list into the store. Returns the number of channels
    /// the backend reported.
    pub async fn refresh_channels(&mut self) -> Result<usize> {
        let channels = self.api.list_channels().await?;
        let count = channels.len();
        self.store.add_conversations(channels);
        debug!(count, "Channels loaded");
        Ok(count)
    }

    /// Resolve and open a conversation, then load its first page.
    ///
    /// `draft_text` is the unsent text of the conversation being left, if
    /// any; it is saved before the switch.
    pub async fn open_conversation<L>(
        &mut self,
        requested: Option<ConversationId>,
        last: &L,
        draft_text: &str,
    ) -> Result<Option<Resolution>>
    where
        L: LastConversationService,
    {
        let Some(resolution) = resolve_conversation(requested, last, &self.store).await else {
            debug!("No conversation to open");
            return Ok(None);
        };

        self.close_conversation(draft_text);

        if let Some(request) = self
            .view
            .open(&mut self.store, resolution.conversation_id.clone())
        {
            self.view.fetch_page(self.api.as_ref(), request).await?;
        }
        Ok(Some(resolution))
    }

    pub async fn load_previous_messages(&mut self) -> Result<LoadOutcome> {
        self.view
            .load_previous_messages(self.api.as_ref(), false)
            .await
    }

    pub fn close_conversation(&mut self, draft_text: &str) {
        self.view
            .close(&mut self.store, draft_text, &mut self.composer);
    }

    pub fn search(&self, query: impl Into<String>) -> MessageSearchFetcher<A, HtmlFormatter> {
        MessageSearchFetcher::new(self.api.clone(), HtmlFormatter, query)
            .with_limit(self.config.fetch_size)
    }

    /// Apply one real-time event.
    pub fn handle_event(&mut self, event: ChatEvent) {
        trace!(conversation = ?event.conversation_id(), "Handling chat event");

        if self.view.on_event(&event) {
            return;
        }

        match event {
            ChatEvent::TextMessage(message) | ChatEvent::FileMessage(message) => {
                let Some(channel) = message.channel.as_ref() else {
                    return;
                };
                let mentions_me = self
                    .current_user
                    .as_ref()
                    .is_some_and(|me| message.mentions(me));
                self.store.record_incoming_message(channel, mentions_me);
            }
            ChatEvent::ConversationJoined(conversation) => {
                self.store.join_conversation(Some(conversation));
            }
            ChatEvent::ConversationLeft(conversation) => {
                self.store.leave_conversation(&conversation);
            }
            ChatEvent::ConversationUpdated(patch) => {
                self.store.update_conversation(patch);
            }
            ChatEvent::ConversationDeleted(conversation) => {
                self.store.delete_conversation(&conversation);
            }
            ChatEvent::MembersAdded(e) => {
                self.store.add_members(e.conversation, e.members);
            }
            ChatEvent::TopicUpdated(e) => {
                self.store.update_topic(e.conversation, e.topic);
            }
        }
    }

    /// Decode and apply an event received as JSON.
    pub fn handle_raw_event(&mut self, data: &str) -> Result<()> {
        let event = ChatEvent::from_json(data)?;
        self.handle_event(event);
        Ok(())
    }

    /// Apply events until every sender is dropped.
    pub async fn pump(&mut self, events: &mut mpsc::Receiver<ChatEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("Event source closed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use parley_shared::models::{Conversation, ConversationPatch, Message, Topic, UserRef};
    use parley_shared::protocol::{MembersAdded, TopicUpdated};
    use parley_shared::types::{ConversationType, MemberStatus};

    use super::*;
    use crate::api::{FetchOptions, SearchQuery};
    use crate::events::ViewEffect;

    struct FakeBackend {
        channels: Vec<Conversation>,
        history: Mutex<Vec<Message>>,
    }

    impl ChatApi for FakeBackend {
        async fn fetch_messages(
            &self,
            _conversation: &ConversationId,
            _options: &FetchOptions,
        ) -> Result<Vec<Message>> {
            Ok(std::mem::take(&mut *self.history.lock().unwrap()))
        }

        async fn search_messages(&self, _query: &SearchQuery) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn list_channels(&self) -> Result<Vec<Conversation>> {
            Ok(self.channels.clone())
        }
    }

    struct NoLast;

    impl LastConversationService for NoLast {
        async fn last_conversation(&self) -> Result<Option<ConversationId>> {
            Ok(None)
        }
    }

    fn client() -> (ChatClient<FakeBackend>, EffectReceiver) {
        let backend = FakeBackend {
            channels: vec![
                Conversation::new("general").with_kind(ConversationType::Open),
                Conversation::new("random").with_kind(ConversationType::Open),
            ],
            history: Mutex::new(vec![
                Message::new("u2", "first", 10).with_id("m1").in_channel("general"),
                Message::new("u2", "second", 20).with_id("m2").in_channel("general"),
            ]),
        };
        let (client, rx) = ChatClient::new(Arc::new(backend), ClientConfig::default());
        (client.with_current_user("me"), rx)
    }

    #[tokio::test]
    async fn opens_default_channel_with_history() {
        let (mut client, mut rx) = client();
        assert_eq!(client.refresh_channels().await.unwrap(), 2);

        let resolution = client.open_conversation(None, &NoLast, "").await.unwrap().unwrap();

        assert_eq!(resolution.conversation_id, ConversationId::new("general"));
        assert!(resolution.redirected);
        assert_eq!(client.view.messages().len(), 2);
        assert!(client.store.is_active_room(Some(&"general".into())));

        let mut effects = Vec::new();
        while let Ok(effect) = rx.try_recv() {
            effects.push(effect);
        }
        assert!(effects.contains(&ViewEffect::ScrollDown));
    }

    #[tokio::test]
    async fn messages_elsewhere_bump_counters() {
        let (mut client, _rx) = client();
        client.refresh_channels().await.unwrap();
        client
            .open_conversation(Some("general".into()), &NoLast, "")
            .await
            .unwrap();

        let mut mention = Message::new("u2", "@me look", 30).in_channel("random");
        mention.user_mentions.push(UserRef::new("me"));
        client.handle_event(ChatEvent::TextMessage(mention));
        client.handle_event(ChatEvent::TextMessage(
            Message::new("u2", "live", 40).in_channel("general"),
        ));

        assert_eq!(client.store.get_number_of_unreaded_messages(), 1);
        assert_eq!(client.store.total_mentions(), 1);
        assert_eq!(client.view.messages().last().unwrap().message.text, "live");
    }

    #[tokio::test]
    async fn pump_applies_lifecycle_events() {
        let (mut client, _rx) = client();
        let (tx, mut events) = mpsc::channel(8);

        let mut patch = ConversationPatch::new("ops");
        patch.name = Some("Ops".into());
        let events_to_send = vec![
            ChatEvent::ConversationJoined(
                Conversation::new("ops").with_kind(ConversationType::Confidential),
            ),
            ChatEvent::ConversationUpdated(patch),
            ChatEvent::MembersAdded(MembersAdded {
                conversation: Conversation::new("ops"),
                members: vec![UserRef::new("me"), UserRef::new("u2")],
            }),
            ChatEvent::TopicUpdated(TopicUpdated {
                conversation: Conversation::new("ops"),
                topic: Topic::new("incidents"),
            }),
            ChatEvent::ConversationJoined(Conversation::new("tmp")),
            ChatEvent::ConversationLeft(Conversation::new("tmp")),
        ];
        for event in events_to_send {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        client.pump(&mut events).await;

        let ops = client.store.private_conversations().next().unwrap();
        assert_eq!(ops.name.as_deref(), Some("Ops"));
        assert_eq!(ops.members.len(), 2);
        assert_eq!(ops.topic, Some(Topic::new("incidents")));
        assert_eq!(ops.member_status, Some(MemberStatus::Member));
        assert_eq!(client.store.len(), 1);
    }

    #[tokio::test]
    async fn close_keeps_draft() {
        let (mut client, _rx) = client();
        client.refresh_channels().await.unwrap();
        client
            .open_conversation(Some("random".into()), &NoLast, "")
            .await
            .unwrap();

        client.close_conversation("see you");

        assert!(client.store.active_room().is_none());
        assert_eq!(
            client.composer.get_message(&"random".into()).unwrap().text,
            "see you"
        );
    }

    #[tokio::test]
    async fn switching_conversations_keeps_outgoing_draft() {
        let (mut client, _rx) = client();
        client.refresh_channels().await.unwrap();
        client
            .open_conversation(Some("general".into()), &NoLast, "")
            .await
            .unwrap();

        client
            .open_conversation(Some("random".into()), &NoLast, "still typing")
            .await
            .unwrap();

        assert_eq!(client.view.conversation_id(), Some(&ConversationId::new("random")));
        assert!(client.store.is_active_room(Some(&"random".into())));
        assert_eq!(
            client.composer.get_message(&"general".into()).unwrap().text,
            "still typing"
        );
        assert!(client.composer.get_message(&"random".into()).is_none());
    }

    #[test]
    fn raw_events_are_decoded() {
        let (mut client, _rx) = client();
        client
            .handle_raw_event(r#"{"type":"conversation_deleted","data":{"_id":"nope"}}"#)
            .unwrap();
        assert!(client.handle_raw_event("{").is_err());
    }
}
