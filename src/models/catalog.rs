// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Seletor de preço: usuário único ou multiusuário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "license_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseType {
    SingleUser,
    MultiUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,

    #[schema(example = "ERP Completo")]
    pub name: String,

    #[schema(example = "9000.00")]
    pub base_price_single_user: Decimal,

    #[schema(example = "25000.00")]
    pub base_price_multi_user: Decimal,

    // Tarifa anual copiada para a assinatura no momento da confirmação
    #[schema(example = "2000.00")]
    pub annual_subscription_fee: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
