// src/handlers/auth.rs

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ForgotPasswordPayload, LoginUserPayload, OtpIssuedResponse,
        RegisterUserPayload, ResetPasswordPayload, User, VerifyOtpPayload,
    },
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 200, description = "Usuário registrado, token emitido", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .register_user(&payload.full_name, &payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado, token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// POST /api/auth/forgot-password
//
// Resposta sempre igual, exista o e-mail ou não: enumeração de contas
// não passa por aqui. Só UserNotFound é mascarado; erro de banco propaga.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Se a conta existir, o código foi enviado", body = OtpIssuedResponse)
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<OtpIssuedResponse>, AppError> {
    payload.validate()?;

    match app_state.otp_service.issue(&app_state.db_pool, &payload.email).await {
        Ok(()) | Err(AppError::UserNotFound) => {}
        Err(e) => return Err(e),
    }

    Ok(Json(OtpIssuedResponse {
        message: "Se o e-mail estiver cadastrado, você receberá um código de verificação."
            .to_string(),
    }))
}

// POST /api/auth/verify-otp
#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "Código válido"),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;

    app_state
        .otp_service
        .verify(&app_state.db_pool, &payload.email, &payload.code)
        .await?;

    Ok(Json(serde_json::json!({ "valid": true })))
}

// POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida"),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;

    app_state
        .otp_service
        .reset_password(
            &app_state.db_pool,
            &payload.email,
            &payload.code,
            &payload.new_password,
        )
        .await?;

    Ok(Json(serde_json::json!({ "message": "Senha redefinida com sucesso." })))
}
