use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::domain::{Dictionary, LearningWord, UserId, WordPreview, WordStatus};
use crate::store::{
    DictionaryCatalog, NewDictionary, NewWord, StoreError, SubscriptionStore, UserDirectory,
    WordProgressStore,
};

#[derive(Debug, Default)]
struct UserRow {
    active_dictionary_id: Option<Uuid>,
}

#[derive(Debug)]
struct SubscriptionRow {
    subscribed_at: DateTime<Utc>,
    learning_started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserRow>,
    dictionaries: HashMap<Uuid, Dictionary>,
    words: HashMap<Uuid, Vec<LearningWord>>,
    subscriptions: HashMap<(UserId, Uuid), SubscriptionRow>,
    progress: HashMap<(UserId, Uuid), WordStatus>,
}

impl Tables {
    fn word_dictionary(&self, word_id: Uuid) -> Option<Uuid> {
        self.words
            .values()
            .flatten()
            .find(|word| word.id == word_id)
            .map(|word| word.dictionary_id)
    }
}

/// Process-local store with the same semantics as the Postgres schema:
/// user deletion cascades, subscriptions require an existing user, progress
/// is keyed by (user, word).
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every trait call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn insert_dictionary(&self, new: NewDictionary) -> Dictionary {
        self.insert_dictionary_at(new, Utc::now())
    }

    pub fn insert_dictionary_at(&self, new: NewDictionary, created_at: DateTime<Utc>) -> Dictionary {
        let dictionary = Dictionary {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            mode: new.mode,
            author: new.author,
            created_at,
        };
        let mut tables = self.tables.write();
        tables.dictionaries.insert(dictionary.id, dictionary.clone());
        tables.words.entry(dictionary.id).or_default();
        dictionary
    }

    /// Returns `None` when the dictionary does not exist.
    pub fn insert_word(&self, dictionary_id: Uuid, new: NewWord) -> Option<LearningWord> {
        let mut tables = self.tables.write();
        if !tables.dictionaries.contains_key(&dictionary_id) {
            return None;
        }
        let word = LearningWord {
            id: Uuid::new_v4(),
            dictionary_id,
            spelling: new.spelling,
            transcription: new.transcription,
            audio: new.audio,
            ru_translation: new.ru_translation,
        };
        tables
            .words
            .entry(dictionary_id)
            .or_default()
            .push(word.clone());
        Some(word)
    }

    /// Subscribes with an explicit subscription time.
    pub fn subscribe_at(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
        subscribed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Data(format!("user {user_id} does not exist")));
        }
        if !tables.dictionaries.contains_key(&dictionary_id) {
            return Err(StoreError::Data(format!(
                "dictionary {dictionary_id} does not exist"
            )));
        }
        if tables.subscriptions.contains_key(&(user_id, dictionary_id)) {
            return Ok(false);
        }
        tables.subscriptions.insert(
            (user_id, dictionary_id),
            SubscriptionRow {
                subscribed_at,
                learning_started_at: None,
            },
        );
        Ok(true)
    }

    pub fn learning_started_at(&self, user_id: UserId, dictionary_id: Uuid) -> Option<DateTime<Utc>> {
        self.tables
            .read()
            .subscriptions
            .get(&(user_id, dictionary_id))
            .and_then(|row| row.learning_started_at)
    }

    pub fn word_status(&self, user_id: UserId, word_id: Uuid) -> Option<WordStatus> {
        self.tables.read().progress.get(&(user_id, word_id)).copied()
    }

    pub fn progress_count(&self, user_id: UserId) -> usize {
        self.tables
            .read()
            .progress
            .keys()
            .filter(|(owner, _)| *owner == user_id)
            .count()
    }

    pub fn user_exists(&self, user_id: UserId) -> bool {
        self.tables.read().users.contains_key(&user_id)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn create_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().users.entry(user_id).or_default();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.users.remove(&user_id).is_none() {
            return Ok(false);
        }
        tables.subscriptions.retain(|(owner, _), _| *owner != user_id);
        tables.progress.retain(|(owner, _), _| *owner != user_id);
        Ok(true)
    }

    async fn set_active_dictionary(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(user) = self.tables.write().users.get_mut(&user_id) {
            user.active_dictionary_id = Some(dictionary_id);
        }
        Ok(())
    }

    async fn active_dictionary(&self, user_id: UserId) -> Result<Option<Uuid>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .users
            .get(&user_id)
            .and_then(|user| user.active_dictionary_id))
    }

    async fn clear_active_dictionary(&self, user_id: UserId) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(user) = self.tables.write().users.get_mut(&user_id) {
            user.active_dictionary_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl DictionaryCatalog for MemoryStore {
    async fn exists(&self, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().dictionaries.contains_key(&dictionary_id))
    }

    async fn get(&self, dictionary_id: Uuid) -> Result<Option<Dictionary>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().dictionaries.get(&dictionary_id).cloned())
    }

    async fn list_public(&self) -> Result<Vec<Dictionary>, StoreError> {
        self.check_available()?;
        let mut dictionaries: Vec<Dictionary> =
            self.tables.read().dictionaries.values().cloned().collect();
        dictionaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(dictionaries)
    }

    async fn random_preview_words(
        &self,
        dictionary_id: Uuid,
        limit: usize,
    ) -> Result<Vec<WordPreview>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let Some(words) = tables.words.get(&dictionary_id) else {
            return Ok(Vec::new());
        };
        Ok(words
            .choose_multiple(&mut rand::rng(), limit)
            .map(|word| WordPreview {
                spelling: word.spelling.clone(),
                ru_translation: word.ru_translation.clone(),
            })
            .collect())
    }

    async fn pick_random_untracked_word(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<Option<LearningWord>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let Some(words) = tables.words.get(&dictionary_id) else {
            return Ok(None);
        };
        let untracked: Vec<&LearningWord> = words
            .iter()
            .filter(|word| !tables.progress.contains_key(&(user_id, word.id)))
            .collect();
        Ok(untracked.choose(&mut rand::rng()).map(|word| (*word).clone()))
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn subscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        self.subscribe_at(user_id, dictionary_id, Utc::now())
    }

    async fn unsubscribe(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.subscriptions.remove(&(user_id, dictionary_id)).is_none() {
            return Ok(false);
        }
        let word_ids: Vec<Uuid> = tables
            .words
            .get(&dictionary_id)
            .map(|words| words.iter().map(|word| word.id).collect())
            .unwrap_or_default();
        for word_id in word_ids {
            tables.progress.remove(&(user_id, word_id));
        }
        Ok(true)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Dictionary>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mut rows: Vec<(DateTime<Utc>, &Dictionary)> = tables
            .subscriptions
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .filter_map(|((_, dictionary_id), row)| {
                tables
                    .dictionaries
                    .get(dictionary_id)
                    .map(|dictionary| (row.subscribed_at, dictionary))
            })
            .collect();
        rows.sort_by(|(a_at, a), (b_at, b)| b_at.cmp(a_at).then_with(|| a.title.cmp(&b.title)));
        Ok(rows.into_iter().map(|(_, dictionary)| dictionary.clone()).collect())
    }

    async fn is_subscribed(&self, user_id: UserId, dictionary_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .subscriptions
            .contains_key(&(user_id, dictionary_id)))
    }

    async fn mark_learning_started(
        &self,
        user_id: UserId,
        dictionary_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let Some(row) = tables.subscriptions.get_mut(&(user_id, dictionary_id)) else {
            return Ok(false);
        };
        row.learning_started_at.get_or_insert_with(Utc::now);
        Ok(true)
    }
}

#[async_trait]
impl WordProgressStore for MemoryStore {
    async fn upsert_status(
        &self,
        user_id: UserId,
        word_id: Uuid,
        status: WordStatus,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Data(format!("user {user_id} does not exist")));
        }
        if tables.word_dictionary(word_id).is_none() {
            return Err(StoreError::Data(format!("word {word_id} does not exist")));
        }
        tables.progress.insert((user_id, word_id), status);
        Ok(())
    }
}
