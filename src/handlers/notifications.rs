// src/handlers/notifications.rs

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::Notification,
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificações do usuário autenticado, mais recentes primeiro", body = [Notification])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state.notification_service.list_for_user(user.id).await?;
    Ok(Json(notifications))
}

// PATCH /api/notifications/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificação marcada como lida"),
        (status = 404, description = "Notificação não encontrada ou de outro usuário")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Notificação")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    app_state.notification_service.mark_read(id, user.id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}
