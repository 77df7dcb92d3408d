use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::UserId;

pub async fn create_user(pool: &PgPool, user_id: UserId) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (tg_id)
        VALUES ($1)
        ON CONFLICT (tg_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Cascades to subscriptions and word states.
pub async fn delete_user(pool: &PgPool, user_id: UserId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM users WHERE tg_id = $1"#)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_active_dictionary(
    pool: &PgPool,
    user_id: UserId,
    dictionary_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE users SET active_dictionary_id = $2 WHERE tg_id = $1"#)
        .bind(user_id)
        .bind(dictionary_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_active_dictionary(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT active_dictionary_id FROM users WHERE tg_id = $1"#)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => row.try_get::<Option<Uuid>, _>("active_dictionary_id"),
        None => Ok(None),
    }
}

pub async fn clear_active_dictionary(pool: &PgPool, user_id: UserId) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE users SET active_dictionary_id = NULL WHERE tg_id = $1"#)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
