#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use uuid::Uuid;

use vocab_bot_rust::domain::{Dictionary, DictionaryMode, LearningWord, UserId, WordPreview};
use vocab_bot_rust::services::learning_session::LearningSessionService;
use vocab_bot_rust::state::AppState;
use vocab_bot_rust::store::{
    DictionaryCatalog, MemoryStore, NewDictionary, NewWord, StoreError, SubscriptionStore,
    UserDirectory,
};

pub const TEST_TIMEOUT: Duration = Duration::from_millis(200);

pub fn create_test_app(store: Arc<MemoryStore>) -> Router {
    vocab_bot_rust::create_app(AppState::memory(store, TEST_TIMEOUT))
}

pub fn learning_service(store: &Arc<MemoryStore>) -> LearningSessionService {
    LearningSessionService::new(store.clone(), store.clone(), store.clone(), store.clone())
        .with_store_timeout(TEST_TIMEOUT)
}

/// Same store everywhere except the catalog port.
pub fn learning_service_with_catalog(
    store: &Arc<MemoryStore>,
    catalog: Arc<dyn DictionaryCatalog>,
) -> LearningSessionService {
    LearningSessionService::new(store.clone(), catalog, store.clone(), store.clone())
        .with_store_timeout(TEST_TIMEOUT)
}

/// Same store everywhere except the user and subscription ports.
pub fn learning_service_with_ports(
    store: &Arc<MemoryStore>,
    users: Arc<dyn UserDirectory>,
    subscriptions: Arc<dyn SubscriptionStore>,
) -> LearningSessionService {
    LearningSessionService::new(users, store.clone(), subscriptions, store.clone())
        .with_store_timeout(TEST_TIMEOUT)
}

pub fn new_dictionary(title: &str) -> NewDictionary {
    NewDictionary {
        title: title.to_string(),
        description: format!("{title} words"),
        mode: DictionaryMode::RandomPool,
        author: "tests".to_string(),
    }
}

pub fn seed_dictionary(
    store: &MemoryStore,
    title: &str,
    word_count: usize,
) -> (Dictionary, Vec<LearningWord>) {
    let dictionary = store.insert_dictionary(new_dictionary(title));
    let words = (0..word_count)
        .filter_map(|index| {
            store.insert_word(
                dictionary.id,
                NewWord {
                    spelling: format!("{title}-word-{index}"),
                    transcription: String::new(),
                    audio: String::new(),
                    ru_translation: format!("перевод-{index}"),
                },
            )
        })
        .collect();
    (dictionary, words)
}

/// Subscribes so that `dictionary_ids[0]` gets ordinal 1, `[1]` ordinal 2
/// and so on. The newest subscription lists first.
pub async fn subscribe_in_order(store: &MemoryStore, user_id: UserId, dictionary_ids: &[Uuid]) {
    store.create_user(user_id).await.unwrap();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let count = dictionary_ids.len() as i64;
    for (index, dictionary_id) in dictionary_ids.iter().enumerate() {
        let at = base + chrono::Duration::minutes(count - index as i64);
        assert!(store.subscribe_at(user_id, *dictionary_id, at).unwrap());
    }
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (u16, serde_json::Value) {
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Catalog whose next-word pick can be switched to fail.
pub struct FlakyCatalog {
    inner: Arc<MemoryStore>,
    fail_picks: AtomicBool,
    picks: AtomicUsize,
}

impl FlakyCatalog {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_picks: AtomicBool::new(false),
            picks: AtomicUsize::new(0),
        }
    }

    pub fn fail_picks(&self, fail: bool) {
        self.fail_picks.store(fail, Ordering::SeqCst);
    }

    pub fn picks(&self) -> usize {
        self.picks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionaryCatalog for FlakyCatalog {
    async fn exists(&self, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.inner.exists(dictionary_id).await
    }

    async fn get(&self, dictionary_id: Uuid) -> Result<Option<Dictionary>, StoreError> {
        self.inner.get(dictionary_id).await
    }

    async fn list_public(&self) -> Result<Vec<Dictionary>, StoreError> {
        self.inner.list_public().await
    }

    async fn random_preview_words(
        &self,
        dictionary_id: Uuid,
        limit: usize,
    ) -> Result<Vec<WordPreview>, StoreError> {
        self.inner.random_preview_words(dictionary_id, limit).await
    }

    async fn pick_random_untracked_word(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<Option<LearningWord>, StoreError> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        if self.fail_picks.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("pick failed".to_string()));
        }
        self.inner
            .pick_random_untracked_word(user_id, dictionary_id)
            .await
    }
}

/// Catalog that stalls every next-word pick.
pub struct SlowCatalog {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

impl SlowCatalog {
    pub fn new(inner: Arc<MemoryStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl DictionaryCatalog for SlowCatalog {
    async fn exists(&self, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.inner.exists(dictionary_id).await
    }

    async fn get(&self, dictionary_id: Uuid) -> Result<Option<Dictionary>, StoreError> {
        self.inner.get(dictionary_id).await
    }

    async fn list_public(&self) -> Result<Vec<Dictionary>, StoreError> {
        self.inner.list_public().await
    }

    async fn random_preview_words(
        &self,
        dictionary_id: Uuid,
        limit: usize,
    ) -> Result<Vec<WordPreview>, StoreError> {
        self.inner.random_preview_words(dictionary_id, limit).await
    }

    async fn pick_random_untracked_word(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<Option<LearningWord>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner
            .pick_random_untracked_word(user_id, dictionary_id)
            .await
    }
}

/// User directory whose active-dictionary writes can be switched to fail.
pub struct FlakyUsers {
    inner: Arc<MemoryStore>,
    fail_active_writes: AtomicBool,
}

impl FlakyUsers {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_active_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_active_writes(&self, fail: bool) {
        self.fail_active_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for FlakyUsers {
    async fn create_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.inner.create_user(user_id).await
    }

    async fn delete_user(&self, user_id: UserId) -> Result<bool, StoreError> {
        self.inner.delete_user(user_id).await
    }

    async fn set_active_dictionary(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<(), StoreError> {
        if self.fail_active_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("active pointer write failed".to_string()));
        }
        self.inner.set_active_dictionary(user_id, dictionary_id).await
    }

    async fn active_dictionary(&self, user_id: UserId) -> Result<Option<Uuid>, StoreError> {
        self.inner.active_dictionary(user_id).await
    }

    async fn clear_active_dictionary(&self, user_id: UserId) -> Result<(), StoreError> {
        self.inner.clear_active_dictionary(user_id).await
    }
}

/// Subscription store that can report the row gone when learning is marked
/// started, as if the user unsubscribed in between.
pub struct FlakySubscriptions {
    inner: Arc<MemoryStore>,
    lose_marks: AtomicBool,
}

impl FlakySubscriptions {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            lose_marks: AtomicBool::new(false),
        }
    }

    pub fn lose_marks(&self, lose: bool) {
        self.lose_marks.store(lose, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionStore for FlakySubscriptions {
    async fn subscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.inner.subscribe(user_id, dictionary_id).await
    }

    async fn unsubscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.inner.unsubscribe(user_id, dictionary_id).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Dictionary>, StoreError> {
        self.inner.list_by_user(user_id).await
    }

    async fn is_subscribed(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.inner.is_subscribed(user_id, dictionary_id).await
    }

    async fn mark_learning_started(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<bool, StoreError> {
        if self.lose_marks.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.mark_learning_started(user_id, dictionary_id).await
    }
}
