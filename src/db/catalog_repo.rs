// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::catalog::ProductVariant};

const VARIANT_COLUMNS: &str = "id, name, base_price_single_user, base_price_multi_user, \
     annual_subscription_fee, is_active, created_at";

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_variant<'e, E>(
        &self,
        executor: E,
        name: &str,
        base_price_single_user: Decimal,
        base_price_multi_user: Decimal,
        annual_subscription_fee: Decimal,
    ) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO product_variants (
                name, base_price_single_user, base_price_multi_user, annual_subscription_fee
            )
            VALUES ($1, $2, $3, $4)
            RETURNING {VARIANT_COLUMNS}
            "#
        );

        let variant = sqlx::query_as::<_, ProductVariant>(&sql)
            .bind(name)
            .bind(base_price_single_user)
            .bind(base_price_multi_user)
            .bind(annual_subscription_fee)
            .fetch_one(executor)
            .await?;

        Ok(variant)
    }

    /// Busca sem filtro de ativo: pedidos pendentes ainda referenciam
    /// variantes que foram desativadas depois da criação.
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {VARIANT_COLUMNS}
            FROM product_variants
            WHERE id = $1
            "#
        );

        sqlx::query_as::<_, ProductVariant>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::VariantNotFound)
    }

    /// Variante inativa conta como inexistente para novos pedidos
    pub async fn find_active_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {VARIANT_COLUMNS}
            FROM product_variants
            WHERE id = $1 AND is_active
            "#
        );

        sqlx::query_as::<_, ProductVariant>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::VariantNotFound)
    }

    pub async fn list(&self) -> Result<Vec<ProductVariant>, AppError> {
        let sql = format!(
            r#"
            SELECT {VARIANT_COLUMNS}
            FROM product_variants
            WHERE is_active
            ORDER BY name ASC
            "#
        );

        let variants = sqlx::query_as::<_, ProductVariant>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(variants)
    }
}
