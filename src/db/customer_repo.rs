// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::crm::Customer};

const CUSTOMER_COLUMNS: &str = "id, company_name, contact_name, email, phone, billing_address, \
     shipping_address, tax_id, account_owner, source_lead_id, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria um cliente. `source_lead_id` é UNIQUE: uma segunda conversão
    /// do mesmo lead estoura aqui e vira `AlreadyConverted`.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_name: &str,
        contact_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        billing_address: Option<&str>,
        shipping_address: Option<&str>,
        tax_id: Option<&str>,
        account_owner: Option<Uuid>,
        source_lead_id: Option<Uuid>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO customers (
                company_name, contact_name, email, phone,
                billing_address, shipping_address, tax_id,
                account_owner, source_lead_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(company_name)
            .bind(contact_name)
            .bind(email)
            .bind(phone)
            .bind(billing_address)
            .bind(shipping_address)
            .bind(tax_id)
            .bind(account_owner)
            .bind(source_lead_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AlreadyConverted;
                    }
                }
                e.into()
            })?;

        Ok(customer)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE id = $1 AND is_active
            "#
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE is_active
            ORDER BY company_name ASC
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }
}
