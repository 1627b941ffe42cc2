// src/db/subscription_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::sales::Subscription};

const SUBSCRIPTION_COLUMNS: &str = "id, subscription_number, order_id, customer_id, variant_id, \
     status, start_date, current_period_start, current_period_end, renewal_date, annual_fee, \
     auto_renew, created_at, updated_at";

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Incrementa o contador SUB do ano na transação corrente
    pub async fn next_sequence<'e, E>(&self, executor: E, year: i32) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let value: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (kind, year, last_value)
            VALUES ('SUB', $1, 1)
            ON CONFLICT (kind, year)
            DO UPDATE SET last_value = sequence_counters.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year)
        .fetch_one(executor)
        .await?;

        Ok(value)
    }

    /// Insere a assinatura do pedido confirmado.
    /// `order_id` é UNIQUE no banco: a segunda inserção para o mesmo
    /// pedido falha, mesmo que o guard do service seja burlado.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        subscription_number: &str,
        order_id: Uuid,
        customer_id: Uuid,
        variant_id: Uuid,
        start_date: NaiveDate,
        current_period_start: NaiveDate,
        current_period_end: NaiveDate,
        renewal_date: NaiveDate,
        annual_fee: Decimal,
    ) -> Result<Subscription, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO subscriptions (
                subscription_number, order_id, customer_id, variant_id,
                start_date, current_period_start, current_period_end, renewal_date,
                annual_fee
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );

        let subscription = sqlx::query_as::<_, Subscription>(&sql)
            .bind(subscription_number)
            .bind(order_id)
            .bind(customer_id)
            .bind(variant_id)
            .bind(start_date)
            .bind(current_period_start)
            .bind(current_period_end)
            .bind(renewal_date)
            .bind(annual_fee)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AlreadyConfirmed;
                    }
                }
                e.into()
            })?;

        Ok(subscription)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Subscription, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE id = $1
            "#
        );

        sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SubscriptionNotFound)
    }

    pub async fn find_by_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<Subscription>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE order_id = $1
            "#
        );

        let subscription = sqlx::query_as::<_, Subscription>(&sql)
            .bind(order_id)
            .fetch_optional(executor)
            .await?;

        Ok(subscription)
    }

    pub async fn list(&self) -> Result<Vec<Subscription>, AppError> {
        let sql = format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            ORDER BY created_at DESC
            "#
        );

        let subscriptions = sqlx::query_as::<_, Subscription>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(subscriptions)
    }
}
