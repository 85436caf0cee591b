//! Logic behind the conversation screen.
//!
//! A [`ConversationView`] is either inactive or focused on one conversation.
//! While active it owns the [`MessageStream`] of that conversation, pages
//! older history in, and merges real-time messages.
//!
//! History loading is split in two steps so the fetch can run anywhere:
//! [`ConversationView::begin_load`] hands out a [`PageRequest`] and
//! [`ConversationView::complete_load`] applies its result. Only one request
//! may be in flight per view; a request issued before the view changed
//! conversation is discarded when it completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parley_shared::models::{Conversation, Message, Topic};
use parley_shared::protocol::ChatEvent;
use parley_shared::types::ConversationId;
use parley_store::ConversationStore;
use tracing::{debug, warn};

use crate::api::{ChatApi, FetchOptions};
use crate::composer::{ComposerState, Draft};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::{EffectSender, SpinnerGuard, ViewEffect};
use crate::stream::{MessageStream, StreamMessage};

pub const SPINNER_KEY: &str = "conversation-spinner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Inactive,
    Active(ConversationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was merged; carries the number of new messages.
    Applied(usize),
    /// The view moved to another conversation before the page arrived.
    Discarded,
    /// Another page request was still in flight, or the view is inactive.
    Skipped,
}

/// Clears the view's in-flight flag when the request is dropped, whether it
/// completed or its future was cancelled.
#[derive(Debug)]
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A history page to fetch for the view.
#[derive(Debug)]
pub struct PageRequest {
    pub conversation_id: ConversationId,
    pub options: FetchOptions,
    pub is_first_load: bool,
    generation: u64,
    _in_flight: InFlight,
}

pub struct ConversationView {
    phase: Phase,
    stream: MessageStream,
    fetch_size: usize,
    generation: u64,
    in_flight: Arc<AtomicBool>,
    effects: EffectSender,
}

impl ConversationView {
    pub fn new(config: &ClientConfig, effects: EffectSender) -> Self {
        Self {
            phase: Phase::Inactive,
            stream: MessageStream::new(config.group_timespan_ms),
            fetch_size: config.fetch_size,
            generation: 0,
            in_flight: Arc::new(AtomicBool::new(false)),
            effects,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        match &self.phase {
            Phase::Active(id) => Some(id),
            Phase::Inactive => None,
        }
    }

    pub fn messages(&self) -> &[StreamMessage] {
        self.stream.messages()
    }

    pub fn stream(&self) -> &MessageStream {
        &self.stream
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Focus `conversation_id` and return the request for its first page.
    ///
    /// The view must be inactive: leaving a conversation goes through
    /// [`ConversationView::close`] so its draft is kept. Returns `None`
    /// while another conversation is open.
    pub fn open(
        &mut self,
        store: &mut ConversationStore,
        conversation_id: ConversationId,
    ) -> Option<PageRequest> {
        if let Phase::Active(current) = &self.phase {
            warn!(
                current = %current,
                requested = %conversation_id,
                "Conversation still open, close it first"
            );
            return None;
        }
        if !store.set_active(&conversation_id) {
            warn!(conversation = %conversation_id, "Opening a conversation the store does not know");
        }
        self.reset(Phase::Active(conversation_id));
        self.begin_load(true)
    }

    /// Leave the active conversation, keeping `draft_text` for later.
    pub fn close(
        &mut self,
        store: &mut ConversationStore,
        draft_text: &str,
        composer: &mut ComposerState,
    ) {
        let Phase::Active(id) = &self.phase else {
            return;
        };
        composer.save_message(
            id,
            Draft {
                text: draft_text.to_string(),
            },
        );
        if store.is_active_room(Some(id)) {
            store.unset_active();
        }
        debug!(conversation = %id, "Conversation closed");
        self.reset(Phase::Inactive);
    }

    fn reset(&mut self, phase: Phase) {
        self.phase = phase;
        self.generation += 1;
        self.in_flight = Arc::new(AtomicBool::new(false));
        self.stream.clear();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Reserve the next history page. Returns `None` when inactive or when a
    /// request is already in flight.
    pub fn begin_load(&mut self, is_first_load: bool) -> Option<PageRequest> {
        let conversation_id = self.conversation_id()?.clone();

        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!(conversation = %conversation_id, "History page already in flight");
            return None;
        }

        let before = if is_first_load {
            None
        } else {
            self.stream.oldest_message_id().cloned()
        };

        Some(PageRequest {
            conversation_id,
            options: FetchOptions {
                limit: self.fetch_size,
                before,
            },
            is_first_load,
            generation: self.generation,
            _in_flight: InFlight(self.in_flight.clone()),
        })
    }

    /// Merge the outcome of `request` into the stream.
    pub fn complete_load(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Message>>,
    ) -> Result<LoadOutcome> {
        if request.generation != self.generation
            || self.conversation_id() != Some(&request.conversation_id)
        {
            debug!(conversation = %request.conversation_id, "Discarding stale history page");
            return Ok(LoadOutcome::Discarded);
        }

        let batch = result?;
        let added = if request.is_first_load {
            self.stream.append_page(batch)
        } else {
            self.stream.prepend_page(batch)
        };

        debug!(
            conversation = %request.conversation_id,
            added,
            first_load = request.is_first_load,
            "History page merged"
        );

        if request.is_first_load {
            self.effects.emit(ViewEffect::ScrollDown);
        }
        Ok(LoadOutcome::Applied(added))
    }

    /// Fetch `request` through `api`, keeping the loading indicator up for
    /// the duration of the call.
    pub async fn fetch_page<A: ChatApi>(
        &mut self,
        api: &A,
        request: PageRequest,
    ) -> Result<LoadOutcome> {
        let _spinner = SpinnerGuard::spin(SPINNER_KEY, &self.effects);
        let result = api
            .fetch_messages(&request.conversation_id, &request.options)
            .await;
        self.complete_load(request, result)
    }

    pub async fn load_previous_messages<A: ChatApi>(
        &mut self,
        api: &A,
        is_first_load: bool,
    ) -> Result<LoadOutcome> {
        match self.begin_load(is_first_load) {
            Some(request) => self.fetch_page(api, request).await,
            None => Ok(LoadOutcome::Skipped),
        }
    }

    // ------------------------------------------------------------------
    // Real-time
    // ------------------------------------------------------------------

    /// Take a message event addressed to the active conversation. Returns
    /// `false` when the event is not for this view.
    pub fn on_event(&mut self, event: &ChatEvent) -> bool {
        let Some(message) = event.message() else {
            return false;
        };
        let Some(active) = self.conversation_id() else {
            return false;
        };
        if message.channel.as_ref() != Some(active) {
            return false;
        }

        self.stream.new_message(message.clone());
        self.effects.emit(ViewEffect::ScrollDown);
        true
    }

    pub fn update_topic(&self, store: &mut ConversationStore, topic: Topic) {
        if let Some(id) = self.conversation_id() {
            store.update_topic(Conversation::new(id.clone()), topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use parley_shared::types::MessageId;

    use super::*;
    use crate::api::SearchQuery;
    use crate::error::ClientError;
    use crate::events::EffectReceiver;

    #[derive(Default)]
    struct FakeHistory {
        pages: Mutex<Vec<Result<Vec<Message>>>>,
        requests: Mutex<Vec<(ConversationId, FetchOptions)>>,
    }

    impl FakeHistory {
        fn with_pages(pages: Vec<Result<Vec<Message>>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatApi for FakeHistory {
        async fn fetch_messages(
            &self,
            conversation: &ConversationId,
            options: &FetchOptions,
        ) -> Result<Vec<Message>> {
            self.requests
                .lock()
                .unwrap()
                .push((conversation.clone(), options.clone()));
            self.pages.lock().unwrap().pop().unwrap_or(Ok(Vec::new()))
        }

        async fn search_messages(&self, _query: &SearchQuery) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn list_channels(&self) -> Result<Vec<Conversation>> {
            Ok(Vec::new())
        }
    }

    fn config() -> ClientConfig {
        ClientConfig {
            fetch_size: 2,
            group_timespan_ms: 300,
            ..ClientConfig::default()
        }
    }

    fn setup() -> (ConversationView, ConversationStore, EffectReceiver) {
        let (effects, rx) = EffectSender::channel();
        let mut store = ConversationStore::new();
        store.add_conversations(vec![Conversation::new("c1"), Conversation::new("c2")]);
        (ConversationView::new(&config(), effects), store, rx)
    }

    fn drain(rx: &mut EffectReceiver) -> Vec<ViewEffect> {
        let mut effects = Vec::new();
        while let Ok(effect) = rx.try_recv() {
            effects.push(effect);
        }
        effects
    }

    fn msg(id: &str, creator: &str, creation: i64) -> Message {
        Message::new(creator, id, creation).with_id(id).in_channel("c1")
    }

    #[tokio::test]
    async fn first_load_appends_and_scrolls() {
        let (mut view, mut store, mut rx) = setup();
        let api = FakeHistory::with_pages(vec![Ok(vec![msg("m3", "u1", 300), msg("m4", "u1", 400)])]);

        let request = view.open(&mut store, "c1".into()).unwrap();
        assert!(request.is_first_load);
        assert_eq!(request.options, FetchOptions { limit: 2, before: None });

        let outcome = view.fetch_page(&api, request).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied(2));
        assert_eq!(view.messages().len(), 2);
        assert!(view.messages()[1].same_user);
        assert!(store.is_active_room(Some(&"c1".into())));
        assert_eq!(
            drain(&mut rx),
            vec![
                ViewEffect::SpinnerStarted { key: SPINNER_KEY },
                ViewEffect::ScrollDown,
                ViewEffect::SpinnerStopped { key: SPINNER_KEY },
            ]
        );
    }

    #[tokio::test]
    async fn older_pages_use_cursor_and_prepend() {
        let (mut view, mut store, _rx) = setup();
        let api = FakeHistory::with_pages(vec![
            Ok(vec![msg("m3", "u1", 1000), msg("m4", "u2", 1100)]),
            Ok(vec![msg("m2", "u1", 900), msg("m1", "u2", 500)]),
        ]);

        let request = view.open(&mut store, "c1".into()).unwrap();
        view.fetch_page(&api, request).await.unwrap();
        let outcome = view.load_previous_messages(&api, false).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied(2));
        let requests = api.requests.lock().unwrap();
        assert_eq!(requests[1].1.before, Some(MessageId::new("m3")));
        let ids: Vec<_> = view
            .messages()
            .iter()
            .map(|m| m.message.id.clone().unwrap().0)
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m3", "m4"]);
        assert!(view.messages()[2].same_user);
        assert_eq!(view.stream().oldest_message_id(), Some(&MessageId::new("m1")));
    }

    #[tokio::test]
    async fn spinner_released_on_failure() {
        let (mut view, mut store, mut rx) = setup();
        let api = FakeHistory::with_pages(vec![Err(ClientError::Status {
            status: 502,
            url: "x".into(),
        })]);

        let request = view.open(&mut store, "c1".into()).unwrap();
        assert!(view.fetch_page(&api, request).await.is_err());

        assert!(!view.is_loading());
        assert_eq!(
            drain(&mut rx),
            vec![
                ViewEffect::SpinnerStarted { key: SPINNER_KEY },
                ViewEffect::SpinnerStopped { key: SPINNER_KEY },
            ]
        );
    }

    #[test]
    fn overlapping_requests_are_refused() {
        let (mut view, mut store, _rx) = setup();
        let first = view.open(&mut store, "c1".into()).unwrap();

        assert!(view.is_loading());
        assert!(view.begin_load(false).is_none());

        drop(first);
        assert!(!view.is_loading());
        assert!(view.begin_load(false).is_some());
    }

    #[test]
    fn stale_page_is_discarded_after_navigation() {
        let (mut view, mut store, _rx) = setup();
        let mut composer = ComposerState::new();
        let stale = view.open(&mut store, "c1".into()).unwrap();
        view.close(&mut store, "", &mut composer);
        let fresh = view.open(&mut store, "c2".into()).unwrap();

        let outcome = view
            .complete_load(stale, Ok(vec![msg("m1", "u1", 1)]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(view.messages().is_empty());
        assert!(view.is_loading());

        let outcome = view.complete_load(fresh, Ok(Vec::new())).unwrap();
        assert_eq!(outcome, LoadOutcome::Applied(0));
        assert!(!view.is_loading());
    }

    #[test]
    fn inactive_view_has_nothing_to_load() {
        let (mut view, _store, _rx) = setup();
        assert!(view.begin_load(true).is_none());
    }

    #[test]
    fn events_for_active_conversation_only() {
        let (mut view, mut store, mut rx) = setup();
        drop(view.open(&mut store, "c1".into()));
        drain(&mut rx);

        let other = Message::new("u1", "elsewhere", 10).in_channel("c2");
        assert!(!view.on_event(&ChatEvent::TextMessage(other)));
        assert!(!view.on_event(&ChatEvent::TextMessage(Message::new("u1", "nowhere", 10))));

        let here = Message::new("u1", "here", 20).in_channel("c1");
        assert!(view.on_event(&ChatEvent::FileMessage(here)));

        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].message.text, "here");
        assert_eq!(drain(&mut rx), vec![ViewEffect::ScrollDown]);
    }

    #[test]
    fn close_saves_draft_and_releases_active_room() {
        let (mut view, mut store, _rx) = setup();
        let mut composer = ComposerState::new();
        drop(view.open(&mut store, "c1".into()));
        view.on_event(&ChatEvent::TextMessage(
            Message::new("u1", "hi", 1).in_channel("c1"),
        ));

        view.close(&mut store, "unsent words", &mut composer);

        assert_eq!(view.phase(), &Phase::Inactive);
        assert!(view.messages().is_empty());
        assert!(store.active_room().is_none());
        assert_eq!(
            composer.get_message(&"c1".into()).unwrap().text,
            "unsent words"
        );
    }

    #[test]
    fn open_refuses_while_another_conversation_is_active() {
        let (mut view, mut store, _rx) = setup();
        drop(view.open(&mut store, "c1".into()));

        assert!(view.open(&mut store, "c2".into()).is_none());
        assert_eq!(view.conversation_id(), Some(&ConversationId::new("c1")));
        assert!(store.is_active_room(Some(&"c1".into())));
    }

    #[test]
    fn update_topic_targets_active_conversation() {
        let (mut view, mut store, _rx) = setup();
        drop(view.open(&mut store, "c2".into()));

        view.update_topic(&mut store, Topic::new("release day"));

        let topic = store.find_conversation(&"c2".into()).unwrap().topic.clone();
        assert_eq!(topic, Some(Topic::new("release day")));
    }
}
