use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As variantes "fatais" abortam a transação e chegam ao caller;
// falha de entrega de e-mail NUNCA vira AppError (fica registrada no próprio registro).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Código OTP inválido ou expirado")]
    InvalidOtp,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Lead não encontrado")]
    LeadNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Variante de produto não encontrada")]
    VariantNotFound,

    #[error("Assinatura não encontrada")]
    SubscriptionNotFound,

    #[error("Notificação não encontrada")]
    NotificationNotFound,

    // Guardas de idempotência: o caller pode tratá-las como não-fatais
    #[error("Lead já convertido em cliente")]
    AlreadyConverted,

    #[error("Pedido já confirmado")]
    AlreadyConfirmed,

    #[error("Transição de status inválida: {0}")]
    InvalidTransition(String),

    // Persistir a notificação faz parte da transação; se falhar, propaga.
    #[error("Falha ao registrar notificação: {0}")]
    DispatchFailed(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidTransition(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "Código de verificação inválido ou expirado."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::LeadNotFound => (StatusCode::NOT_FOUND, "Lead não encontrado."),
            AppError::CustomerNotFound => (StatusCode::NOT_FOUND, "Cliente não encontrado."),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado."),
            AppError::VariantNotFound => (StatusCode::NOT_FOUND, "Variante de produto não encontrada."),
            AppError::SubscriptionNotFound => (StatusCode::NOT_FOUND, "Assinatura não encontrada."),
            AppError::NotificationNotFound => (StatusCode::NOT_FOUND, "Notificação não encontrada."),
            AppError::AlreadyConverted => (StatusCode::CONFLICT, "Este lead já foi convertido em cliente."),
            AppError::AlreadyConfirmed => (StatusCode::CONFLICT, "Este pedido já foi confirmado."),

            // Todos os outros erros (DatabaseError, DispatchFailed, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
