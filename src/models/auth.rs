// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Código de uso único para redefinição de senha.
/// Válido se `!is_used` e `now < expires_at`; no máximo um não-usado por usuário.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    // Regra de validade em um lugar só (o consumo no banco repete a mesma condição)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now < self.expires_at
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub full_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Fluxo "esqueci minha senha"
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(equal = 6, message = "O código deve ter 6 dígitos."))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(equal = 6, message = "O código deve ter 6 dígitos."))]
    pub code: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

// Resposta opaca: não revela se o e-mail existe
#[derive(Debug, Serialize, ToSchema)]
pub struct OtpIssuedResponse {
    pub message: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn challenge(is_used: bool, expires_in_min: i64, now: DateTime<Utc>) -> OtpChallenge {
        OtpChallenge {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            code: "123456".to_string(),
            expires_at: now + Duration::minutes(expires_in_min),
            is_used,
            created_at: now,
        }
    }

    #[test]
    fn codigo_novo_dentro_do_prazo_e_valido() {
        let now = Utc::now();
        assert!(challenge(false, 10, now).is_valid_at(now));
    }

    #[test]
    fn codigo_usado_nunca_e_valido() {
        let now = Utc::now();
        assert!(!challenge(true, 10, now).is_valid_at(now));
    }

    #[test]
    fn codigo_expirado_nunca_e_valido() {
        let now = Utc::now();
        assert!(!challenge(false, -1, now).is_valid_at(now));
    }

    #[test]
    fn expiracao_exata_nao_e_valida() {
        let now = Utc::now();
        let c = challenge(false, 0, now);
        // now == expires_at: a regra é estritamente "antes de expirar"
        assert!(!c.is_valid_at(now));
    }
}
