use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Dictionary, DictionaryDetails, UserId};
use crate::store::{DictionaryCatalog, StoreError, SubscriptionStore};

pub const PREVIEW_WORDS_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("dictionary not found")]
    DictionaryNotFound,
    #[error("{op} failed")]
    Internal {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Read-only browsing of dictionaries.
pub struct CatalogService {
    catalog: Arc<dyn DictionaryCatalog>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn DictionaryCatalog>, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            catalog,
            subscriptions,
        }
    }

    pub async fn public_dictionaries(&self) -> Result<Vec<Dictionary>, CatalogError> {
        const OP: &str = "public_dictionaries";

        let dictionaries = self.catalog.list_public().await.map_err(internal(OP))?;
        tracing::debug!(count = dictionaries.len(), "{OP} succeeded");

        Ok(dictionaries)
    }

    /// Same order that learning ordinals refer to.
    pub async fn user_dictionaries(&self, user_id: UserId) -> Result<Vec<Dictionary>, CatalogError> {
        const OP: &str = "user_dictionaries";

        let dictionaries = self
            .subscriptions
            .list_by_user(user_id)
            .await
            .map_err(internal(OP))?;
        tracing::debug!(user_id, count = dictionaries.len(), "{OP} succeeded");

        Ok(dictionaries)
    }

    pub async fn dictionary_details(&self, dictionary_id: Uuid) -> Result<DictionaryDetails, CatalogError> {
        const OP: &str = "dictionary_details";

        let dictionary = self
            .catalog
            .get(dictionary_id)
            .await
            .map_err(internal(OP))?
            .ok_or(CatalogError::DictionaryNotFound)?;
        let words = self
            .catalog
            .random_preview_words(dictionary_id, PREVIEW_WORDS_LIMIT)
            .await
            .map_err(internal(OP))?;

        tracing::debug!(
            dictionary_id = %dictionary_id,
            words_count = words.len(),
            "{OP} succeeded"
        );

        Ok(DictionaryDetails { dictionary, words })
    }
}

fn internal(op: &'static str) -> impl Fn(StoreError) -> CatalogError {
    move |source| CatalogError::Internal { op, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DictionaryMode;
    use crate::store::{MemoryStore, NewDictionary, NewWord};

    fn service(store: &Arc<MemoryStore>) -> CatalogService {
        CatalogService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn details_carry_at_most_five_preview_words() {
        let store = Arc::new(MemoryStore::new());
        let dict = store.insert_dictionary(NewDictionary {
            title: "Basics".to_string(),
            description: "first words".to_string(),
            mode: DictionaryMode::RandomPool,
            author: "tests".to_string(),
        });
        for n in 0..8 {
            store.insert_word(
                dict.id,
                NewWord {
                    spelling: format!("word{n}"),
                    transcription: String::new(),
                    audio: String::new(),
                    ru_translation: format!("slovo{n}"),
                },
            );
        }

        let details = service(&store).dictionary_details(dict.id).await.unwrap();
        assert_eq!(details.dictionary, dict);
        assert_eq!(details.words.len(), PREVIEW_WORDS_LIMIT);
    }

    #[tokio::test]
    async fn details_of_missing_dictionary() {
        let store = Arc::new(MemoryStore::new());
        let err = service(&store)
            .dictionary_details(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DictionaryNotFound));
    }

    #[tokio::test]
    async fn store_failures_are_internal() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let err = service(&store).public_dictionaries().await.unwrap_err();
        assert!(matches!(err, CatalogError::Internal { op: "public_dictionaries", .. }));
    }
}
