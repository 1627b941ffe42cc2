// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    LeadStatusChanged,
    LeadAssigned,
    LeadConverted,
    OrderCreated,
    OrderConfirmed,
    SubscriptionCreated,
    SubscriptionRenewal,
    SubscriptionExpiry,
    PaymentOverdue,
    TaskAssigned,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
}

impl NotificationKind {
    // Prioridade é função determinística do tipo, nunca escolhida pelo caller
    pub fn priority(&self) -> NotificationPriority {
        match self {
            NotificationKind::SubscriptionRenewal
            | NotificationKind::SubscriptionExpiry
            | NotificationKind::OrderConfirmed
            | NotificationKind::PaymentOverdue => NotificationPriority::High,

            NotificationKind::LeadAssigned | NotificationKind::TaskAssigned => {
                NotificationPriority::Medium
            }

            _ => NotificationPriority::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,

    pub kind: NotificationKind,

    #[schema(example = "Pedido confirmado")]
    pub title: String,
    pub message: String,

    // Entidade de domínio que originou a notificação
    #[schema(example = "order")]
    pub related_to_type: Option<String>,
    pub related_to_id: Option<Uuid>,

    pub priority: NotificationPriority,
    pub is_read: bool,

    // Resultado da entrega por e-mail, gravado de volta neste registro
    pub should_send_email: bool,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub email_error: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prioridade_alta_para_eventos_financeiros_e_de_assinatura() {
        assert_eq!(NotificationKind::SubscriptionRenewal.priority(), NotificationPriority::High);
        assert_eq!(NotificationKind::SubscriptionExpiry.priority(), NotificationPriority::High);
        assert_eq!(NotificationKind::OrderConfirmed.priority(), NotificationPriority::High);
        assert_eq!(NotificationKind::PaymentOverdue.priority(), NotificationPriority::High);
    }

    #[test]
    fn prioridade_media_para_atribuicoes() {
        assert_eq!(NotificationKind::LeadAssigned.priority(), NotificationPriority::Medium);
        assert_eq!(NotificationKind::TaskAssigned.priority(), NotificationPriority::Medium);
    }

    #[test]
    fn demais_tipos_sao_baixa_prioridade() {
        assert_eq!(NotificationKind::LeadStatusChanged.priority(), NotificationPriority::Low);
        assert_eq!(NotificationKind::LeadConverted.priority(), NotificationPriority::Low);
        assert_eq!(NotificationKind::OrderCreated.priority(), NotificationPriority::Low);
        assert_eq!(NotificationKind::SubscriptionCreated.priority(), NotificationPriority::Low);
        assert_eq!(NotificationKind::General.priority(), NotificationPriority::Low);
    }
}
