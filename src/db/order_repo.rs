// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::LicenseType,
    models::sales::{Order, PriceBreakdown},
};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, variant_id, license_type, quantity, \
     status, base_price, base_amount, customization_amount, discount_percent, discount_amount, \
     sub_total, tax_percent, tax_amount, total_amount, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Incrementa o contador ORD do ano na transação corrente.
    /// O upsert serializa criações concorrentes: nunca sai número duplicado.
    pub async fn next_sequence<'e, E>(&self, executor: E, year: i32) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let value: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (kind, year, last_value)
            VALUES ('ORD', $1, 1)
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

    pub async fn create<'e, E>(
        &self,
        executor: E,
        order_number: &str,
        customer_id: Uuid,
        variant_id: Uuid,
        license_type: LicenseType,
        quantity: i32,
        breakdown: &PriceBreakdown,
        created_by: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO orders (
                order_number, customer_id, variant_id, license_type, quantity, status,
                base_price, base_amount, customization_amount, discount_percent,
                discount_amount, sub_total, tax_percent, tax_amount, total_amount,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_number)
            .bind(customer_id)
            .bind(variant_id)
            .bind(license_type)
            .bind(quantity)
            .bind(breakdown.base_price)
            .bind(breakdown.base_amount)
            .bind(breakdown.customization_amount)
            .bind(breakdown.discount_percent)
            .bind(breakdown.discount_amount)
            .bind(breakdown.sub_total)
            .bind(breakdown.tax_percent)
            .bind(breakdown.tax_amount)
            .bind(breakdown.total_amount)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(order)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    /// Compare-and-swap `PENDING -> CONFIRMED`.
    ///
    /// Retorna None quando o pedido não estava mais PENDING (ou não existe);
    /// o service reclassifica o motivo lendo o status atual. Os campos
    /// monetários NÃO são tocados: ficam congelados desde a criação.
    pub async fn confirm_pending<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = 'CONFIRMED', updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            ORDER BY created_at DESC
            "#
        );

        let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(&self.pool).await?;

        Ok(orders)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}
