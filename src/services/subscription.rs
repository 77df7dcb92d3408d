use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::UserId;
use crate::store::{DictionaryCatalog, StoreError, SubscriptionStore, UserDirectory};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("dictionary not found")]
    DictionaryNotFound,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("already subscribed")]
    AlreadySubscribed,
    #[error("{op} failed")]
    Internal {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

pub struct SubscriptionService {
    users: Arc<dyn UserDirectory>,
    catalog: Arc<dyn DictionaryCatalog>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn DictionaryCatalog>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            users,
            catalog,
            subscriptions,
        }
    }

    pub async fn subscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<(), SubscriptionError> {
        const OP: &str = "subscribe";

        // the user may have removed themselves earlier
        self.users
            .create_user(user_id)
            .await
            .map_err(internal(OP))?;
        self.ensure_dictionary(OP, dictionary_id).await?;

        let inserted = self
            .subscriptions
            .subscribe(user_id, dictionary_id)
            .await
            .map_err(internal(OP))?;
        if !inserted {
            return Err(SubscriptionError::AlreadySubscribed);
        }

        tracing::debug!(user_id, dictionary_id = %dictionary_id, "{OP} succeeded");

        Ok(())
    }

    /// Also forgets the user's progress on the dictionary's words.
    pub async fn unsubscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<(), SubscriptionError> {
        const OP: &str = "unsubscribe";

        self.ensure_dictionary(OP, dictionary_id).await?;

        let removed = self
            .subscriptions
            .unsubscribe(user_id, dictionary_id)
            .await
            .map_err(internal(OP))?;
        if !removed {
            return Err(SubscriptionError::SubscriptionNotFound);
        }

        tracing::debug!(user_id, dictionary_id = %dictionary_id, "{OP} succeeded");

        Ok(())
    }

    pub async fn ensure_subscribed(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<(), SubscriptionError> {
        const OP: &str = "ensure_subscribed";

        self.ensure_dictionary(OP, dictionary_id).await?;

        let subscribed = self
            .subscriptions
            .is_subscribed(user_id, dictionary_id)
            .await
            .map_err(internal(OP))?;
        if !subscribed {
            return Err(SubscriptionError::SubscriptionNotFound);
        }

        Ok(())
    }

    async fn ensure_dictionary(&self, op: &'static str, dictionary_id: Uuid) -> Result<(), SubscriptionError> {
        let exists = self
            .catalog
            .exists(dictionary_id)
            .await
            .map_err(internal(op))?;
        if !exists {
            return Err(SubscriptionError::DictionaryNotFound);
        }
        Ok(())
    }
}

fn internal(op: &'static str) -> impl Fn(StoreError) -> SubscriptionError {
    move |source| SubscriptionError::Internal { op, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DictionaryMode;
    use crate::store::{MemoryStore, NewDictionary};

    fn setup() -> (Arc<MemoryStore>, SubscriptionService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let dict = store.insert_dictionary(NewDictionary {
            title: "Basics".to_string(),
            description: String::new(),
            mode: DictionaryMode::RandomPool,
            author: "tests".to_string(),
        });
        let service = SubscriptionService::new(store.clone(), store.clone(), store.clone());
        (store, service, dict.id)
    }

    #[tokio::test]
    async fn subscribe_creates_missing_user() {
        let (store, service, dict) = setup();
        service.subscribe(5, dict).await.unwrap();
        assert!(store.user_exists(5));
        service.ensure_subscribed(5, dict).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_subscription_is_rejected() {
        let (_store, service, dict) = setup();
        service.subscribe(5, dict).await.unwrap();
        let err = service.subscribe(5, dict).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::AlreadySubscribed));
    }

    #[tokio::test]
    async fn unknown_dictionary_is_reported_before_membership() {
        let (_store, service, _dict) = setup();
        let missing = Uuid::new_v4();
        assert!(matches!(
            service.subscribe(5, missing).await,
            Err(SubscriptionError::DictionaryNotFound)
        ));
        assert!(matches!(
            service.unsubscribe(5, missing).await,
            Err(SubscriptionError::DictionaryNotFound)
        ));
        assert!(matches!(
            service.ensure_subscribed(5, missing).await,
            Err(SubscriptionError::DictionaryNotFound)
        ));
    }

    #[tokio::test]
    async fn unsubscribe_twice() {
        let (_store, service, dict) = setup();
        service.subscribe(5, dict).await.unwrap();
        service.unsubscribe(5, dict).await.unwrap();
        assert!(matches!(
            service.unsubscribe(5, dict).await,
            Err(SubscriptionError::SubscriptionNotFound)
        ));
        assert!(matches!(
            service.ensure_subscribed(5, dict).await,
            Err(SubscriptionError::SubscriptionNotFound)
        ));
    }
}
