//! Dictionary seed files.
//!
//! ```json
//! {
//!   "dictionary": { "title": "...", "description": "...", "mode": "random_pool", "author": "..." },
//!   "words": [ { "spelling": "...", "transcription": "...", "audio": "...", "ru_translation": "..." } ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::operations::dictionaries;
use crate::domain::DictionaryMode;
use crate::store::{MemoryStore, NewDictionary, NewWord};

pub const DEFAULT_SEED_FILE: &str = "seeds/random_pool_a2_basic.json";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse seed json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid seed: {0}")]
    Invalid(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDictionary {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub mode: String,
    pub author: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedWord {
    pub spelling: String,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub audio: String,
    pub ru_translation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub dictionary: SeedDictionary,
    pub words: Vec<SeedWord>,
}

/// A seed that passed validation.
#[derive(Debug, Clone)]
pub struct Seed {
    pub dictionary: NewDictionary,
    pub words: Vec<NewWord>,
}

impl Seed {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let data: SeedData = serde_json::from_str(raw)?;
        Self::validate(data)
    }

    pub fn validate(data: SeedData) -> Result<Self, SeedError> {
        let SeedData { dictionary, words } = data;

        if dictionary.title.trim().is_empty() {
            return Err(SeedError::Invalid("dictionary.title is empty".to_string()));
        }
        if dictionary.author.trim().is_empty() {
            return Err(SeedError::Invalid("dictionary.author is empty".to_string()));
        }
        let mode = DictionaryMode::parse(dictionary.mode.trim()).ok_or_else(|| {
            SeedError::Invalid(format!("unsupported dictionary mode: {:?}", dictionary.mode))
        })?;
        if words.is_empty() {
            return Err(SeedError::Invalid("words list is empty".to_string()));
        }
        for (index, word) in words.iter().enumerate() {
            if word.spelling.trim().is_empty() {
                return Err(SeedError::Invalid(format!("words[{index}].spelling is empty")));
            }
            if word.ru_translation.trim().is_empty() {
                return Err(SeedError::Invalid(format!(
                    "words[{index}].ru_translation is empty"
                )));
            }
        }

        Ok(Self {
            dictionary: NewDictionary {
                title: dictionary.title.trim().to_string(),
                description: dictionary.description.trim().to_string(),
                mode,
                author: dictionary.author.trim().to_string(),
            },
            words: words
                .into_iter()
                .map(|word| NewWord {
                    spelling: word.spelling.trim().to_string(),
                    transcription: word.transcription.trim().to_string(),
                    audio: word.audio.trim().to_string(),
                    ru_translation: word.ru_translation.trim().to_string(),
                })
                .collect(),
        })
    }

    pub async fn apply(&self, pool: &PgPool) -> Result<Uuid, SeedError> {
        let id = dictionaries::insert_dictionary_with_words(pool, &self.dictionary, &self.words).await?;
        tracing::info!(
            dictionary = %self.dictionary.title,
            dictionary_id = %id,
            words = self.words.len(),
            "seed applied"
        );
        Ok(id)
    }

    pub async fn rollback(&self, pool: &PgPool) -> Result<u64, SeedError> {
        let removed = dictionaries::delete_dictionaries(
            pool,
            &self.dictionary.title,
            &self.dictionary.author,
            self.dictionary.mode,
        )
        .await?;
        tracing::info!(
            dictionary = %self.dictionary.title,
            rows_removed = removed,
            "seed rolled back"
        );
        Ok(removed)
    }

    pub fn apply_to_memory(&self, store: &MemoryStore) -> Uuid {
        let dictionary = store.insert_dictionary(self.dictionary.clone());
        for word in &self.words {
            store.insert_word(dictionary.id, word.clone());
        }
        tracing::info!(
            dictionary = %dictionary.title,
            dictionary_id = %dictionary.id,
            words = self.words.len(),
            "seed loaded into memory store"
        );
        dictionary.id
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::store::{DictionaryCatalog, SubscriptionStore, UserDirectory};

    const VALID: &str = r#"{
        "dictionary": { "title": " Basics ", "description": "A2", "mode": "random_pool", "author": "team" },
        "words": [
            { "spelling": "cat", "transcription": "kæt", "audio": "", "ru_translation": "кошка" },
            { "spelling": "dog", "ru_translation": "собака" }
        ]
    }"#;

    #[test]
    fn parses_and_trims_valid_seed() {
        let seed = Seed::from_json(VALID).unwrap();
        assert_eq!(seed.dictionary.title, "Basics");
        assert_eq!(seed.dictionary.mode, DictionaryMode::RandomPool);
        assert_eq!(seed.words.len(), 2);
        assert_eq!(seed.words[1].transcription, "");
    }

    #[test]
    fn rejects_unsupported_mode() {
        let raw = VALID.replace("random_pool", "spaced");
        let err = Seed::from_json(&raw).unwrap_err();
        assert!(matches!(err, SeedError::Invalid(msg) if msg.contains("spaced")));
    }

    #[test]
    fn rejects_blank_translation() {
        let raw = VALID.replace("собака", " ");
        let err = Seed::from_json(&raw).unwrap_err();
        assert!(matches!(err, SeedError::Invalid(msg) if msg == "words[1].ru_translation is empty"));
    }

    #[test]
    fn rejects_empty_word_list() {
        let raw = r#"{"dictionary":{"title":"T","mode":"on_schedule","author":"A"},"words":[]}"#;
        assert!(matches!(Seed::from_json(raw), Err(SeedError::Invalid(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Seed::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }

    #[tokio::test]
    async fn loads_file_into_memory_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let seed = Seed::load(file.path()).unwrap();
        let store = MemoryStore::new();
        let id = seed.apply_to_memory(&store);

        assert!(store.exists(id).await.unwrap());
        store.create_user(1).await.unwrap();
        store.subscribe(1, id).await.unwrap();
        assert!(store.pick_random_untracked_word(1, id).await.unwrap().is_some());
    }
}
