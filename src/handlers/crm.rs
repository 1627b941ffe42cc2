// src/handlers/crm.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{Customer, Lead, LeadStatus, LeadWithHistory},
};

// =============================================================================
//  ÁREA 1: LEADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 2, message = "O nome da empresa deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Padaria Estrela Ltda")]
    pub company_name: String,

    #[validate(length(min = 2, message = "O nome do contato deve ter no mínimo 2 caracteres."))]
    #[schema(example = "João Carlos")]
    pub contact_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[schema(example = "indicacao")]
    pub source: Option<String>,

    pub assigned_to: Option<Uuid>,
}

// POST /api/crm/leads
#[utoipa::path(
    post,
    path = "/api/crm/leads",
    tag = "CRM",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .create(
            &app_state.db_pool,
            &payload.company_name,
            &payload.contact_name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.source.as_deref(),
            payload.assigned_to,
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/crm/leads
#[utoipa::path(
    get,
    path = "/api/crm/leads",
    tag = "CRM",
    responses(
        (status = 200, description = "Lista de leads ativos", body = [Lead])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = app_state.lead_service.list().await?;
    Ok(Json(leads))
}

// GET /api/crm/leads/{id}
#[utoipa::path(
    get,
    path = "/api/crm/leads/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Lead com histórico completo", body = LeadWithHistory),
        (status = 404, description = "Lead não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadWithHistory>, AppError> {
    let lead = app_state
        .lead_service
        .get_with_history(&app_state.db_pool, id)
        .await?;
    Ok(Json(lead))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddNotePayload {
    #[validate(length(min = 1, message = "A nota não pode ser vazia."))]
    #[schema(example = "Cliente pediu proposta para 5 usuários.")]
    pub text: String,
}

// POST /api/crm/leads/{id}/notes
#[utoipa::path(
    post,
    path = "/api/crm/leads/{id}/notes",
    tag = "CRM",
    request_body = AddNotePayload,
    responses(
        (status = 200, description = "Nota registrada no histórico", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em status terminal")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> Result<Json<Lead>, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .add_note(&app_state.db_pool, id, &payload.text, user.id)
        .await?;

    Ok(Json(lead))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(example = "DEMO")]
    pub status: LeadStatus,
}

// PATCH /api/crm/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/crm/leads/{id}/status",
    tag = "CRM",
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status alterado (ou no-op se igual)", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state
        .lead_service
        .change_status(&app_state.db_pool, id, payload.status, user.id)
        .await?;

    Ok(Json(lead))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAssignmentPayload {
    // null remove a atribuição
    pub assigned_to: Option<Uuid>,
}

// PATCH /api/crm/leads/{id}/assignment
#[utoipa::path(
    patch,
    path = "/api/crm/leads/{id}/assignment",
    tag = "CRM",
    request_body = ChangeAssignmentPayload,
    responses(
        (status = 200, description = "Responsável alterado", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em status terminal")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_assignment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeAssignmentPayload>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state
        .lead_service
        .change_assignment(&app_state.db_pool, id, payload.assigned_to, user.id)
        .await?;

    Ok(Json(lead))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeRatingPayload {
    #[validate(range(min = 1, max = 5, message = "A nota deve estar entre 1 e 5."))]
    #[schema(example = 4)]
    pub rating: i32,
}

// PATCH /api/crm/leads/{id}/rating
#[utoipa::path(
    patch,
    path = "/api/crm/leads/{id}/rating",
    tag = "CRM",
    request_body = ChangeRatingPayload,
    responses(
        (status = 200, description = "Nota alterada", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em status terminal")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_rating(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRatingPayload>,
) -> Result<Json<Lead>, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .change_rating(&app_state.db_pool, id, payload.rating, user.id)
        .await?;

    Ok(Json(lead))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadDetailsPayload {
    #[validate(length(min = 2, message = "O nome da empresa deve ter no mínimo 2 caracteres."))]
    pub company_name: String,

    #[validate(length(min = 2, message = "O nome do contato deve ter no mínimo 2 caracteres."))]
    pub contact_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
}

// PUT /api/crm/leads/{id}
#[utoipa::path(
    put,
    path = "/api/crm/leads/{id}",
    tag = "CRM",
    request_body = UpdateLeadDetailsPayload,
    responses(
        (status = 200, description = "Dados do lead atualizados", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em status terminal")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_details(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadDetailsPayload>,
) -> Result<Json<Lead>, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .update_details(
            &app_state.db_pool,
            id,
            &payload.company_name,
            &payload.contact_name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            user.id,
        )
        .await?;

    Ok(Json(lead))
}

// POST /api/crm/leads/{id}/convert
#[utoipa::path(
    post,
    path = "/api/crm/leads/{id}/convert",
    tag = "CRM",
    responses(
        (status = 201, description = "Lead convertido, cliente criado", body = Customer),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead já convertido ou perdido")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .lead_service
        .convert_to_customer(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// =============================================================================
//  ÁREA 2: CLIENTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 2, message = "O nome da empresa deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Mercado Bom Preço")]
    pub company_name: String,

    #[validate(length(min = 2, message = "O nome do contato deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Maria Silva")]
    pub contact_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub account_owner: Option<Uuid>,
}

// POST /api/crm/customers
#[utoipa::path(
    post,
    path = "/api/crm/customers",
    tag = "CRM",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Cliente direto, sem lead de origem
    let customer = app_state
        .customer_repo
        .create(
            &app_state.db_pool,
            &payload.company_name,
            &payload.contact_name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.billing_address.as_deref(),
            payload.shipping_address.as_deref(),
            payload.tax_id.as_deref(),
            payload.account_owner,
            None,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/crm/customers
#[utoipa::path(
    get,
    path = "/api/crm/customers",
    tag = "CRM",
    responses(
        (status = 200, description = "Lista de clientes ativos", body = [Customer])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = app_state.customer_repo.list().await?;
    Ok(Json(customers))
}

// GET /api/crm/customers/{id}
#[utoipa::path(
    get,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = app_state
        .customer_repo
        .find_by_id(&app_state.db_pool, id)
        .await?;
    Ok(Json(customer))
}
