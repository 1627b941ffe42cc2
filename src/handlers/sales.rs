// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::catalog::{LicenseType, ProductVariant},
    models::sales::{Order, Subscription},
};

// =============================================================================
//  ÁREA 1: CATÁLOGO (VARIANTES DE PRODUTO)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "ERP Completo")]
    pub name: String,

    #[schema(example = "9000.00")]
    pub base_price_single_user: Decimal,

    #[schema(example = "25000.00")]
    pub base_price_multi_user: Decimal,

    #[schema(example = "2000.00")]
    pub annual_subscription_fee: Decimal,
}

// POST /api/sales/variants
#[utoipa::path(
    post,
    path = "/api/sales/variants",
    tag = "Sales",
    request_body = CreateVariantPayload,
    responses(
        (status = 201, description = "Variante criada", body = ProductVariant),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_variant(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateVariantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.base_price_single_user < Decimal::ZERO
        || payload.base_price_multi_user < Decimal::ZERO
        || payload.annual_subscription_fee < Decimal::ZERO
    {
        return Err(AppError::InvalidInput(
            "Preços não podem ser negativos.".to_string(),
        ));
    }

    let variant = app_state
        .catalog_repo
        .create_variant(
            &app_state.db_pool,
            &payload.name,
            payload.base_price_single_user,
            payload.base_price_multi_user,
            payload.annual_subscription_fee,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(variant)))
}

// GET /api/sales/variants
#[utoipa::path(
    get,
    path = "/api/sales/variants",
    tag = "Sales",
    responses(
        (status = 200, description = "Variantes ativas", body = [ProductVariant])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_variants(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProductVariant>>, AppError> {
    let variants = app_state.catalog_repo.list().await?;
    Ok(Json(variants))
}

// =============================================================================
//  ÁREA 2: PEDIDOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: Uuid,
    pub variant_id: Uuid,

    #[schema(example = "SINGLE_USER")]
    pub license_type: LicenseType,

    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1."))]
    #[schema(example = 1)]
    pub quantity: i32,

    // Todos opcionais: pedido sem ajuste nenhum é válido
    #[serde(default)]
    #[schema(example = "0.00")]
    pub customization_amount: Option<Decimal>,

    #[serde(default)]
    #[schema(example = "10.00")]
    pub discount_percent: Option<Decimal>,

    #[serde(default)]
    #[schema(example = "18.00")]
    pub tax_percent: Option<Decimal>,
}

// POST /api/sales/orders
#[utoipa::path(
    post,
    path = "/api/sales/orders",
    tag = "Sales",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado em PENDING com preço congelado", body = Order),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou variante não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state
        .order_service
        .create(
            &app_state.db_pool,
            payload.customer_id,
            payload.variant_id,
            payload.license_type,
            payload.quantity,
            payload.customization_amount.unwrap_or(Decimal::ZERO),
            payload.discount_percent.unwrap_or(Decimal::ZERO),
            payload.tax_percent.unwrap_or(Decimal::ZERO),
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

// POST /api/sales/orders/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/sales/orders/{id}/confirm",
    tag = "Sales",
    responses(
        (status = 201, description = "Pedido confirmado, assinatura provisionada", body = Subscription),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Pedido já confirmado ou em status inválido")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = app_state
        .order_service
        .confirm(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

// GET /api/sales/orders
#[utoipa::path(
    get,
    path = "/api/sales/orders",
    tag = "Sales",
    responses(
        (status = 200, description = "Todos os pedidos, mais recentes primeiro", body = [Order])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(State(app_state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = app_state.order_service.list().await?;
    Ok(Json(orders))
}

// GET /api/sales/orders/{id}
#[utoipa::path(
    get,
    path = "/api/sales/orders/{id}",
    tag = "Sales",
    responses(
        (status = 200, description = "Pedido", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = app_state.order_service.get(&app_state.db_pool, id).await?;
    Ok(Json(order))
}

// GET /api/crm/customers/{id}/orders
#[utoipa::path(
    get,
    path = "/api/crm/customers/{id}/orders",
    tag = "Sales",
    responses(
        (status = 200, description = "Pedidos do cliente", body = [Order])
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customer_orders(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = app_state.order_service.list_by_customer(id).await?;
    Ok(Json(orders))
}

// =============================================================================
//  ÁREA 3: ASSINATURAS
// =============================================================================

// GET /api/sales/subscriptions
#[utoipa::path(
    get,
    path = "/api/sales/subscriptions",
    tag = "Sales",
    responses(
        (status = 200, description = "Todas as assinaturas", body = [Subscription])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_subscriptions(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let subscriptions = app_state.subscription_repo.list().await?;
    Ok(Json(subscriptions))
}

// GET /api/sales/subscriptions/{id}
#[utoipa::path(
    get,
    path = "/api/sales/subscriptions/{id}",
    tag = "Sales",
    responses(
        (status = 200, description = "Assinatura", body = Subscription),
        (status = 404, description = "Assinatura não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Assinatura")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = app_state
        .subscription_repo
        .find_by_id(&app_state.db_pool, id)
        .await?;
    Ok(Json(subscription))
}
