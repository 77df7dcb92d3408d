use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat-level user identifier. Stable and opaque to the bot.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryMode {
    RandomPool,
    OnSchedule,
}

impl DictionaryMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "random_pool" => Some(Self::RandomPool),
            "on_schedule" => Some(Self::OnSchedule),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RandomPool => "random_pool",
            Self::OnSchedule => "on_schedule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub mode: DictionaryMode,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPreview {
    pub spelling: String,
    pub ru_translation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryDetails {
    pub dictionary: Dictionary,
    pub words: Vec<WordPreview>,
}

/// A dictionary word as shown to a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningWord {
    pub id: Uuid,
    pub dictionary_id: Uuid,
    pub spelling: String,
    pub transcription: String,
    pub audio: String,
    pub ru_translation: String,
}

/// Per-(user, word) progress. One row per pair, last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    Learning,
    Blocked,
}

impl WordStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Blocked => "blocked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_mode_rejects_unknown_values() {
        assert_eq!(DictionaryMode::parse("random_pool"), Some(DictionaryMode::RandomPool));
        assert_eq!(DictionaryMode::parse("on_schedule"), Some(DictionaryMode::OnSchedule));
        assert_eq!(DictionaryMode::parse("RANDOM_POOL"), None);
        assert_eq!(DictionaryMode::parse(""), None);
    }

    #[test]
    fn word_status_strings_match_storage() {
        for status in [WordStatus::Learning, WordStatus::Blocked] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert_eq!(WordStatus::Blocked.as_str(), "blocked");
    }
}
