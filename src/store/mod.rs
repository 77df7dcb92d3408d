//! Collaborator ports consumed by the use-case services.
//!
//! `PgStore` (see [`crate::db`]) and [`MemoryStore`] implement all four.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Dictionary, DictionaryMode, LearningWord, UserId, WordPreview, WordStatus};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("inconsistent data: {0}")]
    Data(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Idempotent.
    async fn create_user(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Returns `false` when there was no such user.
    async fn delete_user(&self, user_id: UserId) -> Result<bool, StoreError>;

    async fn set_active_dictionary(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<(), StoreError>;

    async fn active_dictionary(&self, user_id: UserId) -> Result<Option<Uuid>, StoreError>;

    async fn clear_active_dictionary(&self, user_id: UserId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait DictionaryCatalog: Send + Sync {
    async fn exists(&self, dictionary_id: Uuid) -> Result<bool, StoreError>;

    async fn get(&self, dictionary_id: Uuid) -> Result<Option<Dictionary>, StoreError>;

    /// Ordered by creation time descending, then title.
    async fn list_public(&self) -> Result<Vec<Dictionary>, StoreError>;

    async fn random_preview_words(
        &self,
        dictionary_id: Uuid,
        limit: usize,
    ) -> Result<Vec<WordPreview>, StoreError>;

    /// Uniformly random word of the dictionary that has no progress row for
    /// the user.
    async fn pick_random_untracked_word(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<Option<LearningWord>, StoreError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Returns `false` when the subscription already existed.
    async fn subscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError>;

    /// Removes the subscription together with the user's progress on the
    /// dictionary's words. Returns `false` when there was nothing to remove.
    async fn unsubscribe(&self, user_id: UserId, dictionary_id: Uuid)
        -> Result<bool, StoreError>;

    /// Ordered by subscription time descending, then title ascending.
    /// Ordinal references into the list depend on this order.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Dictionary>, StoreError>;

    async fn is_subscribed(&self, user_id: UserId, dictionary_id: Uuid)
        -> Result<bool, StoreError>;

    /// Sets the learning-started marker if unset. Returns `false` when the
    /// subscription does not exist.
    async fn mark_learning_started(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait WordProgressStore: Send + Sync {
    async fn upsert_status(
        &self,
        user_id: UserId,
        word_id: Uuid,
        status: WordStatus,
    ) -> Result<(), StoreError>;
}

/// Dictionary payload used by seeding.
#[derive(Debug, Clone)]
pub struct NewDictionary {
    pub title: String,
    pub description: String,
    pub mode: DictionaryMode,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct NewWord {
    pub spelling: String,
    pub transcription: String,
    pub audio: String,
    pub ru_translation: String,
}
