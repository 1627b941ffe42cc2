// src/db/otp_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::OtpChallenge};

#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Invalida códigos anteriores: no máximo um desafio não-usado por usuário
    pub async fn delete_unused_for_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM otp_challenges
            WHERE user_id = $1 AND NOT is_used
            "#,
        )
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn create_challenge<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpChallenge, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let challenge = sqlx::query_as::<_, OtpChallenge>(
            r#"
            INSERT INTO otp_challenges (user_id, code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, code, expires_at, is_used, created_at
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;

        Ok(challenge)
    }

    pub async fn find_by_user_and_code<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<OtpChallenge>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let challenge = sqlx::query_as::<_, OtpChallenge>(
            r#"
            SELECT id, user_id, code, expires_at, is_used, created_at
            FROM otp_challenges
            WHERE user_id = $1 AND code = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(executor)
        .await?;

        Ok(challenge)
    }

    /// Consumo atômico: só marca usado se ainda for válido AGORA.
    /// Retorna false se o código não existe, já foi usado ou expirou.
    pub async fn consume<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        code: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET is_used = TRUE
            WHERE user_id = $1
              AND code = $2
              AND NOT is_used
              AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .bind(code)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
