pub mod config;
pub mod operations;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::config::{DbConfig, DbConfigError};
use crate::domain::{Dictionary, LearningWord, UserId, WordPreview, WordStatus};
use crate::store::{
    DictionaryCatalog, StoreError, SubscriptionStore, UserDirectory, WordProgressStore,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed implementation of every store port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        let store = Self { pool };
        if config.run_migrations {
            store.migrate().await?;
        }

        Ok(store)
    }

    pub async fn from_env() -> Result<Self, DbInitError> {
        let config = DbConfig::from_env()?;
        Self::connect(&config).await
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), DbInitError> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] DbConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn create_user(&self, user_id: UserId) -> Result<(), StoreError> {
        Ok(operations::users::create_user(&self.pool, user_id).await?)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(operations::users::delete_user(&self.pool, user_id).await?)
    }

    async fn set_active_dictionary(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<(), StoreError> {
        Ok(operations::users::set_active_dictionary(&self.pool, user_id, dictionary_id).await?)
    }

    async fn active_dictionary(&self, user_id: UserId) -> Result<Option<Uuid>, StoreError> {
        Ok(operations::users::get_active_dictionary(&self.pool, user_id).await?)
    }

    async fn clear_active_dictionary(&self, user_id: UserId) -> Result<(), StoreError> {
        Ok(operations::users::clear_active_dictionary(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl DictionaryCatalog for PgStore {
    async fn exists(&self, dictionary_id: Uuid) -> Result<bool, StoreError> {
        Ok(operations::dictionaries::dictionary_exists(&self.pool, dictionary_id).await?)
    }

    async fn get(&self, dictionary_id: Uuid) -> Result<Option<Dictionary>, StoreError> {
        operations::dictionaries::get_dictionary(&self.pool, dictionary_id).await
    }

    async fn list_public(&self) -> Result<Vec<Dictionary>, StoreError> {
        operations::dictionaries::list_public_dictionaries(&self.pool).await
    }

    async fn random_preview_words(
        &self,
        dictionary_id: Uuid,
        limit: usize,
    ) -> Result<Vec<WordPreview>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(operations::dictionaries::list_random_preview_words(&self.pool, dictionary_id, limit).await?)
    }

    async fn pick_random_untracked_word(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<Option<LearningWord>, StoreError> {
        Ok(
            operations::dictionaries::pick_random_untracked_word(&self.pool, user_id, dictionary_id)
                .await?,
        )
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn subscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        Ok(operations::subscriptions::subscribe(&self.pool, user_id, dictionary_id).await?)
    }

    async fn unsubscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        Ok(operations::subscriptions::unsubscribe(&self.pool, user_id, dictionary_id).await?)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Dictionary>, StoreError> {
        operations::subscriptions::list_by_user(&self.pool, user_id).await
    }

    async fn is_subscribed(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        Ok(operations::subscriptions::is_subscribed(&self.pool, user_id, dictionary_id).await?)
    }

    async fn mark_learning_started(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(
            operations::subscriptions::mark_learning_started(&self.pool, user_id, dictionary_id)
                .await?,
        )
    }
}

#[async_trait]
impl WordProgressStore for PgStore {
    async fn upsert_status(
        &self,
        user_id: UserId,
        word_id: Uuid,
        status: WordStatus,
    ) -> Result<(), StoreError> {
        Ok(operations::word_states::upsert_status(&self.pool, user_id, word_id, status).await?)
    }
}
