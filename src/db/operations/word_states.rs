use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{UserId, WordStatus};

pub async fn upsert_status(
    pool: &PgPool,
    user_id: UserId,
    word_id: Uuid,
    status: WordStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_words_state (user_id, dict_word_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, dict_word_id) DO UPDATE
        SET status = EXCLUDED.status, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}
