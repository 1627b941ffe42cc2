// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{Notification, NotificationKind, NotificationPriority},
};

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, related_to_type, \
     related_to_id, priority, is_read, should_send_email, email_sent, email_sent_at, \
     email_error, created_at";

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persistir a notificação faz parte da transação da transição.
    /// Falha aqui é fatal (`DispatchFailed`), diferente da entrega de e-mail.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
        related_to_type: Option<&str>,
        related_to_id: Option<Uuid>,
        priority: NotificationPriority,
        should_send_email: bool,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO notifications (
                user_id, kind, title, message, related_to_type, related_to_id,
                priority, should_send_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );

        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(kind)
            .bind(title)
            .bind(message)
            .bind(related_to_type)
            .bind(related_to_id)
            .bind(priority)
            .bind(should_send_email)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::DispatchFailed(e.to_string()))?;

        Ok(notification)
    }

    /// Grava o desfecho da tentativa de e-mail de volta no registro
    pub async fn record_email_result<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        sent: bool,
        error: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE notifications
            SET email_sent = $2,
                email_sent_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                email_error = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sent)
        .bind(error)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let sql = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 100
            "#
        );

        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotificationNotFound);
        }

        Ok(())
    }
}
