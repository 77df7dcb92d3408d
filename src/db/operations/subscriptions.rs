use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::operations::dictionaries::{map_dictionary, DICTIONARY_COLUMNS};
use crate::domain::{Dictionary, UserId};
use crate::store::StoreError;

pub async fn subscribe(pool: &PgPool, user_id: UserId, dictionary_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_dictionaries (user_id, dictionary_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, dictionary_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drops the subscription and the user's progress on the dictionary's words
/// in one transaction.
pub async fn unsubscribe(pool: &PgPool, user_id: UserId, dictionary_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        r#"DELETE FROM user_dictionaries WHERE user_id = $1 AND dictionary_id = $2"#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if removed == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        DELETE FROM user_words_state uws
        USING dictionary_words dw
        WHERE uws.user_id = $1
            AND uws.dict_word_id = dw.id
            AND dw.dictionary_id = $2
        "#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

pub async fn list_by_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Dictionary>, StoreError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {DICTIONARY_COLUMNS}
        FROM user_dictionaries ud
        INNER JOIN dictionaries d ON d.id = ud.dictionary_id
        WHERE ud.user_id = $1
        ORDER BY ud.subscribed_at DESC, d.title ASC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_dictionary).collect()
}

pub async fn is_subscribed(pool: &PgPool, user_id: UserId, dictionary_id: Uuid) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM user_dictionaries WHERE user_id = $1 AND dictionary_id = $2
        ) AS subscribed
        "#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .fetch_one(pool)
    .await?;
    row.try_get("subscribed")
}

/// First write wins. Returns `false` when there is no such subscription.
pub async fn mark_learning_started(
    pool: &PgPool,
    user_id: UserId,
    dictionary_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_dictionaries
        SET start_learning_at = COALESCE(start_learning_at, now())
        WHERE user_id = $1 AND dictionary_id = $2
        "#,
    )
    .bind(user_id)
    .bind(dictionary_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
