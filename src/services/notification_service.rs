// src/services/notification_service.rs

use std::sync::Arc;

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::mailer::Mailer,
    db::{NotificationRepository, UserRepository},
    models::notification::{Notification, NotificationKind},
};

/// Despachante de notificações.
///
/// A gravação do registro acontece DENTRO da transação da transição
/// (falha aborta tudo); a entrega por e-mail acontece DEPOIS do commit
/// e nunca desfaz a transição que a originou.
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    user_repo: UserRepository,
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, user_repo: UserRepository, mailer: Arc<dyn Mailer>) -> Self {
        Self { repo, user_repo, mailer }
    }

    /// Registra a notificação na transação corrente.
    /// A prioridade é derivada do tipo, nunca escolhida pelo caller.
    pub async fn notify<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
        related_to: Option<(&str, Uuid)>,
        send_email: bool,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let priority = kind.priority();
        let (related_type, related_id) = match related_to {
            Some((t, id)) => (Some(t), Some(id)),
            None => (None, None),
        };

        self.repo
            .create(
                executor,
                user_id,
                kind,
                title,
                message,
                related_type,
                related_id,
                priority,
                send_email,
            )
            .await
    }

    /// Entrega best-effort, chamada após o commit da transição.
    ///
    /// Qualquer falha é gravada/logada no próprio registro e engolida:
    /// o usuário final só a enxerga pelo flag `email_sent`.
    pub async fn deliver(&self, pool: &PgPool, notifications: &[Notification]) {
        for notification in notifications {
            if !notification.should_send_email {
                continue;
            }

            let recipient = match self.user_repo.find_by_id(pool, notification.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::warn!(
                        notification_id = %notification.id,
                        "Destinatário inativo ou inexistente, e-mail não enviado"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(notification_id = %notification.id, "Falha ao resolver destinatário: {}", e);
                    continue;
                }
            };

            let html_body = format!(
                r#"<div style="font-family: Arial, sans-serif;">
                    <h2>{}</h2>
                    <p>{}</p>
                </div>"#,
                notification.title, notification.message
            );

            let outcome = self
                .mailer
                .send_email(&recipient.email, &notification.title, &html_body)
                .await;

            let result = match outcome {
                Ok(()) => {
                    self.repo
                        .record_email_result(pool, notification.id, true, None)
                        .await
                }
                Err(e) => {
                    tracing::warn!(notification_id = %notification.id, "Falha no envio de e-mail: {}", e);
                    self.repo
                        .record_email_result(pool, notification.id, false, Some(&e.to_string()))
                        .await
                }
            };

            if let Err(e) = result {
                // Nem a gravação do desfecho pode derrubar o fluxo
                tracing::warn!(notification_id = %notification.id, "Falha ao gravar desfecho do e-mail: {}", e);
            }
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.repo.mark_read(id, user_id).await
    }
}
