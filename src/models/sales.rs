// src/models/sales.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::LicenseType;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Classifica a recusa quando o CAS `PENDING -> CONFIRMED` não encontrou linha.
    ///
    /// CONFIRMED/DELIVERED viram `AlreadyConfirmed` (o caller pode tratar como
    /// não-fatal); DRAFT/CANCELLED viram `InvalidTransition`.
    pub fn reject_confirmation(&self) -> AppError {
        match self {
            OrderStatus::Confirmed | OrderStatus::Delivered => AppError::AlreadyConfirmed,
            other => AppError::InvalidTransition(format!(
                "Pedido em status {} não pode ser confirmado.",
                other.as_str()
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    Suspended,
    PendingRenewal,
}

// --- PEDIDO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,

    #[schema(example = "ORD-2026-0001")]
    pub order_number: String,

    pub customer_id: Uuid,
    pub variant_id: Uuid,

    pub license_type: LicenseType,
    pub quantity: i32,

    pub status: OrderStatus,

    // Decomposição monetária: congelada na criação, nunca recalculada
    #[schema(example = "9000.00")]
    pub base_price: Decimal,
    #[schema(example = "9000.00")]
    pub base_amount: Decimal,
    #[schema(example = "0.00")]
    pub customization_amount: Decimal,
    #[schema(example = "10.00")]
    pub discount_percent: Decimal,
    #[schema(example = "900.00")]
    pub discount_amount: Decimal,
    #[schema(example = "8100.00")]
    pub sub_total: Decimal,
    #[schema(example = "18.00")]
    pub tax_percent: Decimal,
    #[schema(example = "1458.00")]
    pub tax_amount: Decimal,
    #[schema(example = "9558.00")]
    pub total_amount: Decimal,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decomposição monetária calculada pelo motor de preços.
/// Calculada UMA vez, no lado que persiste o pedido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: Decimal,
    pub base_amount: Decimal,
    pub customization_amount: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub sub_total: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

// --- ASSINATURA ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,

    #[schema(example = "SUB-2026-0001")]
    pub subscription_number: String,

    // 1:1 com o pedido confirmado (UNIQUE no banco)
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub variant_id: Uuid,

    pub status: SubscriptionStatus,

    #[schema(value_type = String, format = Date, example = "2026-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-03-01")]
    pub current_period_start: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2027-02-28")]
    pub current_period_end: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2027-03-01")]
    pub renewal_date: NaiveDate,

    // Snapshot da tarifa da variante no momento da confirmação
    #[schema(example = "2000.00")]
    pub annual_fee: Decimal,

    pub auto_renew: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmado_ou_entregue_vira_already_confirmed() {
        assert!(matches!(
            OrderStatus::Confirmed.reject_confirmation(),
            AppError::AlreadyConfirmed
        ));
        assert!(matches!(
            OrderStatus::Delivered.reject_confirmation(),
            AppError::AlreadyConfirmed
        ));
    }

    #[test]
    fn rascunho_e_cancelado_viram_invalid_transition() {
        assert!(matches!(
            OrderStatus::Draft.reject_confirmation(),
            AppError::InvalidTransition(_)
        ));
        assert!(matches!(
            OrderStatus::Cancelled.reject_confirmation(),
            AppError::InvalidTransition(_)
        ));
    }
}
