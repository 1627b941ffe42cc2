// src/services/otp_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    common::mailer::Mailer,
    db::{OtpRepository, UserRepository},
};

/// Validade do código de verificação
const OTP_TTL_MINUTES: i64 = 10;

/// Código numérico de 6 dígitos, sem zeros à esquerda suprimidos
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Fluxo de redefinição de senha por código de uso único.
#[derive(Clone)]
pub struct OtpService {
    user_repo: UserRepository,
    otp_repo: OtpRepository,
    mailer: Arc<dyn Mailer>,
}

impl OtpService {
    pub fn new(user_repo: UserRepository, otp_repo: OtpRepository, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            user_repo,
            otp_repo,
            mailer,
        }
    }

    /// Emite um novo código para o e-mail informado.
    ///
    /// Códigos anteriores não usados são invalidados na mesma transação:
    /// só o último código emitido funciona. O e-mail sai depois do commit
    /// e falha de envio não desfaz a emissão.
    pub async fn issue(&self, pool: &PgPool, email: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let mut tx = pool.begin().await?;
        self.otp_repo.delete_unused_for_user(&mut *tx, user.id).await?;
        self.otp_repo
            .create_challenge(&mut *tx, user.id, &code, expires_at)
            .await?;
        tx.commit().await?;

        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif;">
                <h2>Redefinição de senha</h2>
                <p>Olá, {}!</p>
                <p>Seu código de verificação é:</p>
                <h1 style="letter-spacing: 4px;">{}</h1>
                <p>Ele expira em {} minutos. Se você não pediu a redefinição, ignore este e-mail.</p>
            </div>"#,
            user.full_name, code, OTP_TTL_MINUTES
        );

        if let Err(e) = self
            .mailer
            .send_email(&user.email, "Seu código de verificação", &html_body)
            .await
        {
            tracing::warn!(user_id = %user.id, "Falha ao enviar e-mail de OTP: {}", e);
        }

        Ok(())
    }

    /// Verifica o código sem consumi-lo (pré-checagem do formulário).
    pub async fn verify(&self, pool: &PgPool, email: &str, code: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        let challenge = self
            .otp_repo
            .find_by_user_and_code(pool, user.id, code)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        if !challenge.is_valid_at(Utc::now()) {
            return Err(AppError::InvalidOtp);
        }

        Ok(())
    }

    /// Consome o código e troca a senha na mesma transação.
    ///
    /// O UPDATE condicional do consumo garante uso único mesmo com
    /// requisições simultâneas: só uma delas troca a senha.
    pub async fn reset_password(
        &self,
        pool: &PgPool,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        let password = new_password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = pool.begin().await?;

        let consumed = self.otp_repo.consume(&mut *tx, user.id, code).await?;
        if !consumed {
            return Err(AppError::InvalidOtp);
        }

        self.user_repo
            .update_password(&mut *tx, user.id, &password_hash)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "✅ Senha redefinida via OTP");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_sempre_com_seis_digitos() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }
}
