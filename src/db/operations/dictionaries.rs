use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{Dictionary, DictionaryMode, LearningWord, UserId, WordPreview};
use crate::store::{NewDictionary, NewWord, StoreError};

pub(crate) const DICTIONARY_COLUMNS: &str =
    "d.id, d.title, d.description, d.mode, d.author, d.created_at";

pub async fn dictionary_exists(pool: &PgPool, dictionary_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM dictionaries WHERE id = $1)"#)
        .bind(dictionary_id)
        .fetch_one(pool)
        .await
}

pub async fn get_dictionary(
    pool: &PgPool,
    dictionary_id: Uuid,
) -> Result<Option<Dictionary>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {DICTIONARY_COLUMNS} FROM dictionaries d WHERE d.id = $1"
    ))
    .bind(dictionary_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_dictionary).transpose()
}

pub async fn list_public_dictionaries(pool: &PgPool) -> Result<Vec<Dictionary>, StoreError> {
    let rows = sqlx::query(&format!(
        "SELECT {DICTIONARY_COLUMNS} FROM dictionaries d ORDER BY d.created_at DESC, d.title ASC"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_dictionary).collect()
}

pub async fn list_random_preview_words(
    pool: &PgPool,
    dictionary_id: Uuid,
    limit: i64,
) -> Result<Vec<WordPreview>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT spelling, ru_translation
        FROM dictionary_words
        WHERE dictionary_id = $1
        ORDER BY random()
        LIMIT $2
        "#,
    )
    .bind(dictionary_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(WordPreview {
                spelling: row.try_get("spelling")?,
                ru_translation: row.try_get("ru_translation")?,
            })
        })
        .collect()
}

pub async fn pick_random_untracked_word(
    pool: &PgPool,
    user_id: UserId,
    dictionary_id: Uuid,
) -> Result<Option<LearningWord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT dw.id, dw.dictionary_id, dw.spelling, dw.transcription, dw.audio, dw.ru_translation
        FROM dictionary_words dw
        LEFT JOIN user_words_state uws
            ON uws.dict_word_id = dw.id AND uws.user_id = $1
        WHERE dw.dictionary_id = $2
            AND uws.dict_word_id IS NULL
        ORDER BY random()
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_learning_word).transpose()
}

/// Inserts a dictionary with its words in one transaction.
pub async fn insert_dictionary_with_words(
    pool: &PgPool,
    dictionary: &NewDictionary,
    words: &[NewWord],
) -> Result<Uuid, sqlx::Error> {
    let dictionary_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO dictionaries (id, title, description, mode, author)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(dictionary_id)
    .bind(&dictionary.title)
    .bind(&dictionary.description)
    .bind(dictionary.mode.as_str())
    .bind(&dictionary.author)
    .execute(&mut *tx)
    .await?;

    for word in words {
        sqlx::query(
            r#"
            INSERT INTO dictionary_words (id, dictionary_id, spelling, transcription, audio, ru_translation)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(dictionary_id)
        .bind(&word.spelling)
        .bind(&word.transcription)
        .bind(&word.audio)
        .bind(&word.ru_translation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(dictionary_id)
}

/// Deletes dictionaries by their seed identity. Words and progress cascade.
pub async fn delete_dictionaries(
    pool: &PgPool,
    title: &str,
    author: &str,
    mode: DictionaryMode,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"DELETE FROM dictionaries WHERE title = $1 AND author = $2 AND mode = $3"#,
    )
    .bind(title)
    .bind(author)
    .bind(mode.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) fn map_dictionary(row: &PgRow) -> Result<Dictionary, StoreError> {
    let raw_mode: String = row.try_get("mode")?;
    let mode = DictionaryMode::parse(&raw_mode)
        .ok_or_else(|| StoreError::Data(format!("unsupported dictionary mode: {raw_mode:?}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Dictionary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        mode,
        author: row.try_get("author")?,
        created_at,
    })
}

fn map_learning_word(row: &PgRow) -> Result<LearningWord, sqlx::Error> {
    Ok(LearningWord {
        id: row.try_get("id")?,
        dictionary_id: row.try_get("dictionary_id")?,
        spelling: row.try_get("spelling")?,
        transcription: row.try_get("transcription")?,
        audio: row.try_get("audio")?,
        ru_translation: row.try_get("ru_translation")?,
    })
}
