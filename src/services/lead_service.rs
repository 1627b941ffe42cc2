// src/services/lead_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, LeadRepository},
    models::crm::{Customer, Lead, LeadChangeType, LeadStatus, LeadWithHistory},
    models::notification::{Notification, NotificationKind},
    services::notification_service::NotificationService,
};

/// Máquina de estados do Lead.
///
/// Toda mutação roda em uma transação: estado novo + evento de auditoria
/// + registro de notificação, tudo ou nada. O e-mail sai depois do commit.
#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    customer_repo: CustomerRepository,
    notification_service: NotificationService,
}

impl LeadService {
    pub fn new(
        lead_repo: LeadRepository,
        customer_repo: CustomerRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            lead_repo,
            customer_repo,
            notification_service,
        }
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        company_name: &str,
        contact_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        source: Option<&str>,
        assigned_to: Option<Uuid>,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self
            .lead_repo
            .create(&mut *tx, company_name, contact_name, email, phone, source, assigned_to, actor)
            .await?;

        let mut pending = Vec::new();
        if let Some(assignee) = lead.assigned_to {
            let notification = self
                .notification_service
                .notify(
                    &mut *tx,
                    assignee,
                    NotificationKind::LeadAssigned,
                    "Novo lead atribuído a você",
                    &format!("O lead \"{}\" foi atribuído a você.", lead.company_name),
                    Some(("lead", lead.id)),
                    false,
                )
                .await?;
            pending.push(notification);
        }

        tx.commit().await?;

        self.notification_service.deliver(pool, &pending).await;

        Ok(lead)
    }

    pub async fn get_with_history(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
    ) -> Result<LeadWithHistory, AppError> {
        let lead = self.lead_repo.find_by_id(pool, lead_id).await?;
        let history = self.lead_repo.list_history(pool, lead_id).await?;

        Ok(LeadWithHistory { lead, history })
    }

    pub async fn list(&self) -> Result<Vec<Lead>, AppError> {
        self.lead_repo.list().await
    }

    /// Adiciona uma nota: permitido em qualquer estado não-terminal,
    /// não muda o status, gera exatamente um evento de auditoria.
    pub async fn add_note(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        text: &str,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        if lead.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Lead em status terminal {} não aceita notas.",
                lead.status.as_str()
            )));
        }

        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::NoteAdded,
                None,
                None,
                Some(text),
                actor,
            )
            .await?;

        tx.commit().await?;

        Ok(lead)
    }

    /// Troca direta de status. Destino igual ao atual é no-op (sem evento);
    /// CONVERTED como destino direto é rejeitado: a única porta é a conversão.
    pub async fn change_status(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        new_status: LeadStatus,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        let changed = lead.status.validate_change(new_status)?;
        if !changed {
            // No-op idempotente: nada a gravar
            return Ok(lead);
        }

        let updated = self.lead_repo.update_status(&mut *tx, lead_id, new_status).await?;

        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::StatusChanged,
                Some(lead.status.as_str()),
                Some(new_status.as_str()),
                None,
                actor,
            )
            .await?;

        let pending = self
            .notify_assignee(
                &mut tx,
                &updated,
                NotificationKind::LeadStatusChanged,
                "Status de lead alterado",
                &format!(
                    "O lead \"{}\" passou de {} para {}.",
                    updated.company_name,
                    lead.status.as_str(),
                    new_status.as_str()
                ),
            )
            .await?;

        tx.commit().await?;

        self.notification_service.deliver(pool, &pending).await;

        Ok(updated)
    }

    pub async fn change_assignment(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        new_assignee: Option<Uuid>,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        if lead.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Lead em status terminal {} não pode ser reatribuído.",
                lead.status.as_str()
            )));
        }

        let updated = self
            .lead_repo
            .update_assignment(&mut *tx, lead_id, new_assignee)
            .await?;

        let old_value = lead.assigned_to.map(|id| id.to_string());
        let new_value = new_assignee.map(|id| id.to_string());
        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::AssignmentChanged,
                old_value.as_deref(),
                new_value.as_deref(),
                None,
                actor,
            )
            .await?;

        let pending = self
            .notify_assignee(
                &mut tx,
                &updated,
                NotificationKind::LeadAssigned,
                "Lead atribuído a você",
                &format!("O lead \"{}\" foi atribuído a você.", updated.company_name),
            )
            .await?;

        tx.commit().await?;

        self.notification_service.deliver(pool, &pending).await;

        Ok(updated)
    }

    pub async fn change_rating(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        rating: i32,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::InvalidInput(
                "A nota deve estar entre 1 e 5.".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        if lead.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Lead em status terminal {} não pode ser avaliado.",
                lead.status.as_str()
            )));
        }

        let updated = self.lead_repo.update_rating(&mut *tx, lead_id, rating).await?;

        let old_value = lead.rating.map(|r| r.to_string());
        let new_value = rating.to_string();
        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::RatingChanged,
                old_value.as_deref(),
                Some(&new_value),
                None,
                actor,
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    pub async fn update_details(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        company_name: &str,
        contact_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        if lead.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Lead em status terminal {} não pode ser editado.",
                lead.status.as_str()
            )));
        }

        let updated = self
            .lead_repo
            .update_details(&mut *tx, lead_id, company_name, contact_name, email, phone)
            .await?;

        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::DetailsAdded,
                Some(&format!("{} / {}", lead.company_name, lead.contact_name)),
                Some(&format!("{} / {}", company_name, contact_name)),
                None,
                actor,
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Converte o lead em cliente: transição unidirecional.
    ///
    /// O Customer é criado ANTES de marcar o lead, na mesma transação;
    /// se a criação falhar, o rollback deixa o lead intocado. O CAS no
    /// status garante que dois callers concorrentes não convertam duas vezes:
    /// o segundo recebe `AlreadyConverted`.
    pub async fn convert_to_customer(
        &self,
        pool: &PgPool,
        lead_id: Uuid,
        actor: Uuid,
    ) -> Result<Customer, AppError> {
        let mut tx = pool.begin().await?;

        let lead = self.lead_repo.find_by_id(&mut *tx, lead_id).await?;
        lead.status.validate_conversion()?;

        let customer = self
            .customer_repo
            .create(
                &mut *tx,
                &lead.company_name,
                &lead.contact_name,
                lead.email.as_deref(),
                lead.phone.as_deref(),
                None,
                None,
                None,
                lead.assigned_to,
                Some(lead.id),
            )
            .await?;

        let converted = self
            .lead_repo
            .mark_converted(&mut *tx, lead_id, customer.id, Utc::now())
            .await?;

        let converted = match converted {
            Some(lead) => lead,
            None => {
                // Outro caller venceu a corrida: reclassifica pelo estado atual
                let fresh = self.lead_repo.find_by_id(pool, lead_id).await?;
                return Err(fresh
                    .status
                    .validate_conversion()
                    .err()
                    .unwrap_or(AppError::AlreadyConverted));
            }
        };

        self.lead_repo
            .record_history(
                &mut *tx,
                lead_id,
                LeadChangeType::ConvertedToCustomer,
                Some(lead.status.as_str()),
                Some(LeadStatus::Converted.as_str()),
                Some(&format!("Convertido no cliente {}", customer.id)),
                actor,
            )
            .await?;

        let pending = self
            .notify_assignee(
                &mut tx,
                &converted,
                NotificationKind::LeadConverted,
                "Lead convertido em cliente",
                &format!(
                    "O lead \"{}\" foi convertido no cliente \"{}\".",
                    converted.company_name, customer.company_name
                ),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(lead_id = %lead_id, customer_id = %customer.id, "Lead convertido em cliente");

        self.notification_service.deliver(pool, &pending).await;

        Ok(customer)
    }

    // Registra a notificação para o responsável, se houver
    async fn notify_assignee(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        lead: &Lead,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, AppError> {
        let mut pending = Vec::new();
        if let Some(assignee) = lead.assigned_to {
            let notification = self
                .notification_service
                .notify(&mut **tx, assignee, kind, title, message, Some(("lead", lead.id)), false)
                .await?;
            pending.push(notification);
        }
        Ok(pending)
    }
}
