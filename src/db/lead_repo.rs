// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Lead, LeadChangeType, LeadHistoryEvent, LeadStatus},
};

const LEAD_COLUMNS: &str = "id, company_name, contact_name, email, phone, source, status, rating, \
     assigned_to, converted_to_customer_id, converted_date, is_active, created_by, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, lead_id, change_type, old_value, new_value, description, changed_by, created_at";

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_name: &str,
        contact_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        source: Option<&str>,
        assigned_to: Option<Uuid>,
        created_by: Uuid,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO leads (company_name, contact_name, email, phone, source, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(company_name)
            .bind(contact_name)
            .bind(email)
            .bind(phone)
            .bind(source)
            .bind(assigned_to)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(lead)
    }

    /// Leitura sempre com o predicado explícito de ativos (soft-delete)
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE id = $1 AND is_active
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE is_active
            ORDER BY created_at DESC
            "#
        );

        let leads = sqlx::query_as::<_, Lead>(&sql).fetch_all(&self.pool).await?;

        Ok(leads)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_status: LeadStatus,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING {LEAD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(new_status)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    pub async fn update_assignment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING {LEAD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(assigned_to)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    pub async fn update_rating<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        rating: i32,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET rating = $2, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING {LEAD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(rating)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    pub async fn update_details<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        company_name: &str,
        contact_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET company_name = $2, contact_name = $3, email = $4, phone = $5, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING {LEAD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(company_name)
            .bind(contact_name)
            .bind(email)
            .bind(phone)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    /// Marca a conversão com compare-and-swap no status.
    ///
    /// Dois callers concorrentes não conseguem ambos sair do mesmo estado:
    /// o segundo não encontra linha (status já terminal) e recebe None.
    pub async fn mark_converted<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        customer_id: Uuid,
        converted_date: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET status = 'CONVERTED',
                converted_to_customer_id = $2,
                converted_date = $3,
                updated_at = NOW()
            WHERE id = $1
              AND is_active
              AND status NOT IN ('CONVERTED', 'LOST')
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(customer_id)
            .bind(converted_date)
            .fetch_optional(executor)
            .await?;

        Ok(lead)
    }

    // =========================================================================
    //  AUDITORIA (append-only)
    // =========================================================================

    /// Grava um evento de auditoria. Chamado SEMPRE na mesma transação
    /// da mutação que ele documenta.
    pub async fn record_history<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        change_type: LeadChangeType,
        old_value: Option<&str>,
        new_value: Option<&str>,
        description: Option<&str>,
        changed_by: Uuid,
    ) -> Result<LeadHistoryEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO lead_history (lead_id, change_type, old_value, new_value, description, changed_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HISTORY_COLUMNS}
            "#
        );

        let event = sqlx::query_as::<_, LeadHistoryEvent>(&sql)
            .bind(lead_id)
            .bind(change_type)
            .bind(old_value)
            .bind(new_value)
            .bind(description)
            .bind(changed_by)
            .fetch_one(executor)
            .await?;

        Ok(event)
    }

    pub async fn list_history<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
    ) -> Result<Vec<LeadHistoryEvent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM lead_history
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#
        );

        let events = sqlx::query_as::<_, LeadHistoryEvent>(&sql)
            .bind(lead_id)
            .fetch_all(executor)
            .await?;

        Ok(events)
    }
}
