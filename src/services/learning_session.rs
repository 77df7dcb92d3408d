use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{LearningWord, UserId, WordStatus};
use crate::services::pending_words::{PendingWord, PendingWords, SessionGates};
use crate::store::{
    DictionaryCatalog, StoreError, SubscriptionStore, UserDirectory, WordProgressStore,
};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("invalid dictionary reference")]
    InvalidReference,
    #[error("dictionary not found")]
    DictionaryNotFound,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("no words for learning in dictionary {dictionary_id}")]
    NoWordsForLearning { dictionary_id: Uuid },
    #[error("learning not started")]
    LearningNotStarted,
    #[error("{op} failed")]
    Internal {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LearningError {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Add,
    Block,
}

impl Decision {
    pub const fn status(self) -> WordStatus {
        match self {
            Self::Add => WordStatus::Learning,
            Self::Block => WordStatus::Blocked,
        }
    }
}

/// Result of a start by ordinal: the resolved dictionary and its first word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedLearning {
    pub dictionary_id: Uuid,
    pub word: LearningWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Presenting(PendingWord),
}

/// Learning-session engine.
///
/// Per user: `Idle` until a start succeeds, `Presenting` while a word awaits
/// a decision, back to `Idle` on exit or when the dictionary runs out of
/// untracked words. Operations of one user are serialized through a
/// per-user gate; the pending table itself is only locked for map access.
pub struct LearningSessionService {
    users: Arc<dyn UserDirectory>,
    catalog: Arc<dyn DictionaryCatalog>,
    subscriptions: Arc<dyn SubscriptionStore>,
    progress: Arc<dyn WordProgressStore>,
    pending: PendingWords,
    gates: SessionGates,
    store_timeout: Duration,
}

impl LearningSessionService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn DictionaryCatalog>,
        subscriptions: Arc<dyn SubscriptionStore>,
        progress: Arc<dyn WordProgressStore>,
    ) -> Self {
        Self {
            users,
            catalog,
            subscriptions,
            progress,
            pending: PendingWords::new(),
            gates: SessionGates::new(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// `ordinal` is 1-based into the user's subscription list, fetched fresh
    /// on every call.
    pub async fn start_by_ordinal(
        &self,
        user_id: UserId,
        ordinal: i64,
    ) -> Result<StartedLearning, LearningError> {
        const OP: &str = "start_by_ordinal";

        if ordinal <= 0 {
            return Err(LearningError::InvalidReference);
        }

        let _permit = self.gates.acquire(user_id).await;

        let dictionaries = self
            .call(OP, self.subscriptions.list_by_user(user_id))
            .await?;
        let index = usize::try_from(ordinal - 1).map_err(|_| LearningError::InvalidReference)?;
        let Some(dictionary) = dictionaries.get(index) else {
            return Err(LearningError::InvalidReference);
        };
        let dictionary_id = dictionary.id;

        let word = self.start(OP, user_id, dictionary_id).await?;

        tracing::debug!(
            user_id,
            ordinal,
            dictionary_id = %dictionary_id,
            word_id = %word.id,
            "{OP} succeeded"
        );

        Ok(StartedLearning {
            dictionary_id,
            word,
        })
    }

    pub async fn start_by_dictionary_id(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<LearningWord, LearningError> {
        const OP: &str = "start_by_dictionary_id";

        let _permit = self.gates.acquire(user_id).await;

        if !self.call(OP, self.catalog.exists(dictionary_id)).await? {
            return Err(LearningError::DictionaryNotFound);
        }
        if !self
            .call(OP, self.subscriptions.is_subscribed(user_id, dictionary_id))
            .await?
        {
            return Err(LearningError::SubscriptionNotFound);
        }

        let word = self.start(OP, user_id, dictionary_id).await?;

        tracing::debug!(
            user_id,
            dictionary_id = %dictionary_id,
            word_id = %word.id,
            "{OP} succeeded"
        );

        Ok(word)
    }

    /// Records the decision for the pending word and moves on to the next
    /// untracked word of the same dictionary.
    ///
    /// If the progress write succeeds but the next pick fails, the progress
    /// stays written and the pending word is left as it was.
    pub async fn decide(
        &self,
        user_id: UserId,
        decision: Decision,
    ) -> Result<LearningWord, LearningError> {
        const OP: &str = "decide";

        let _permit = self.gates.acquire(user_id).await;

        let Some(current) = self.pending.get(user_id) else {
            return Err(LearningError::LearningNotStarted);
        };

        self.call(
            OP,
            self.progress
                .upsert_status(user_id, current.word_id, decision.status()),
        )
        .await?;

        let next = self
            .call(
                OP,
                self.catalog
                    .pick_random_untracked_word(user_id, current.dictionary_id),
            )
            .await?;
        let Some(next) = next else {
            self.pending.clear(user_id);
            tracing::debug!(
                user_id,
                dictionary_id = %current.dictionary_id,
                decision = decision.status().as_str(),
                "dictionary exhausted"
            );
            return Err(LearningError::NoWordsForLearning {
                dictionary_id: current.dictionary_id,
            });
        };

        self.pending.set(
            user_id,
            PendingWord {
                dictionary_id: current.dictionary_id,
                word_id: next.id,
            },
        );

        tracing::debug!(
            user_id,
            dictionary_id = %current.dictionary_id,
            word_id = %next.id,
            decision = decision.status().as_str(),
            "{OP} succeeded"
        );

        Ok(next)
    }

    /// Reads the user's active-dictionary pointer, not the pending table.
    pub async fn current_dictionary(&self, user_id: UserId) -> Result<Option<Uuid>, LearningError> {
        self.call("current_dictionary", self.users.active_dictionary(user_id))
            .await
    }

    /// Ends the session. Safe to call without one.
    pub async fn exit(&self, user_id: UserId) -> Result<(), LearningError> {
        const OP: &str = "exit";

        let _permit = self.gates.acquire(user_id).await;

        self.pending.clear(user_id);
        self.call(OP, self.users.clear_active_dictionary(user_id))
            .await?;

        tracing::debug!(user_id, "{OP} succeeded");

        Ok(())
    }

    pub fn session_state(&self, user_id: UserId) -> SessionState {
        match self.pending.get(user_id) {
            Some(pending) => SessionState::Presenting(pending),
            None => SessionState::Idle,
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.pending.count()
    }

    async fn start(
        &self,
        op: &'static str,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<LearningWord, LearningError> {
        let word = self
            .call(
                op,
                self.catalog
                    .pick_random_untracked_word(user_id, dictionary_id),
            )
            .await?;
        let Some(word) = word else {
            self.pending.clear(user_id);
            return Err(LearningError::NoWordsForLearning { dictionary_id });
        };

        self.pending.set(
            user_id,
            PendingWord {
                dictionary_id,
                word_id: word.id,
            },
        );

        // no transaction across these writes; both are safe to repeat
        if !self
            .call(
                op,
                self.subscriptions
                    .mark_learning_started(user_id, dictionary_id),
            )
            .await?
        {
            return Err(LearningError::SubscriptionNotFound);
        }
        self.call(op, self.users.set_active_dictionary(user_id, dictionary_id))
            .await?;

        Ok(word)
    }

    async fn call<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, LearningError> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(LearningError::Internal { op, source }),
            Err(_) => Err(LearningError::Internal {
                op,
                source: StoreError::Timeout {
                    op,
                    after: self.store_timeout,
                },
            }),
        }
    }
}
