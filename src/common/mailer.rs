// src/common/mailer.rs

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::common::error::AppError;

/// Contrato do transporte de e-mail.
///
/// O domínio trata o envio como falível e fora da transação: quem chama
/// decide se a falha é registrada (notificações) ou apenas logada (OTP).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

/// Transporte SMTP real (lettre).
#[derive(Clone)]
pub struct SmtpMailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        let credentials = Credentials::new(smtp_username, smtp_password);
        Self {
            smtp_server,
            smtp_port,
            credentials,
            from_email,
            from_name,
        }
    }

    /// Monta o mailer a partir das variáveis SMTP_*.
    /// Retorna None se alguma estiver faltando (modo desenvolvimento).
    pub fn from_env() -> Option<Self> {
        let smtp_server = std::env::var("SMTP_SERVER").ok()?;
        let smtp_port = std::env::var("SMTP_PORT").ok()?.parse().ok()?;
        let smtp_username = std::env::var("SMTP_USERNAME").ok()?;
        let smtp_password = std::env::var("SMTP_PASSWORD").ok()?;
        let from_email = std::env::var("SMTP_FROM_EMAIL").ok()?;
        let from_name =
            std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "SalesFlow".to_string());

        Some(Self::new(
            smtp_server,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
        ))
    }

    // Cria um transporte novo por envio para não segurar conexão aberta
    fn build_transport(&self) -> Result<SmtpTransport, AppError> {
        let transport = SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| anyhow::anyhow!("Erro no relay SMTP: {}", e))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Remetente inválido: {}", e))?,
            )
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("Destinatário inválido: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| anyhow::anyhow!("Falha ao montar o e-mail: {}", e))?;

        let mailer = self.build_transport()?;

        // O envio do lettre é bloqueante; tiramos do runtime async
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| anyhow::anyhow!("Task de envio falhou: {}", e))?
            .map_err(|e| anyhow::anyhow!("Falha ao enviar o e-mail: {}", e))?;

        Ok(())
    }
}

/// Transporte de desenvolvimento: loga em vez de enviar.
/// Usado quando as variáveis SMTP_* não estão configuradas.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        tracing::info!(
            to = %to,
            subject = %subject,
            body_len = html_body.len(),
            "📧 E-mail (modo desenvolvimento, não enviado)"
        );
        Ok(())
    }
}
