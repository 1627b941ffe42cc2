// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Demo,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Demo => "DEMO",
            LeadStatus::Converted => "CONVERTED",
            LeadStatus::Lost => "LOST",
        }
    }

    // CONVERTED e LOST são terminais: nenhuma mutação é aceita depois
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Converted | LeadStatus::Lost)
    }

    /// Valida a troca direta de status.
    ///
    /// Retorna `Ok(false)` quando o destino é igual ao atual (no-op, sem evento).
    /// CONVERTED nunca é aceito como destino direto: a única porta de entrada
    /// é a conversão em cliente.
    pub fn validate_change(&self, new_status: LeadStatus) -> Result<bool, AppError> {
        if self.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Lead em status terminal {} não pode mudar de status.",
                self.as_str()
            )));
        }
        if new_status == LeadStatus::Converted {
            return Err(AppError::InvalidTransition(
                "Use a conversão em cliente para marcar um lead como CONVERTED.".to_string(),
            ));
        }
        Ok(new_status != *self)
    }

    // Guarda da conversão: distingue "já convertido" de "perdido"
    pub fn validate_conversion(&self) -> Result<(), AppError> {
        match self {
            LeadStatus::Converted => Err(AppError::AlreadyConverted),
            LeadStatus::Lost => Err(AppError::InvalidTransition(
                "Lead perdido não pode ser convertido em cliente.".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

// Mapeia o CREATE TYPE lead_change_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_change_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadChangeType {
    StatusChanged,
    NoteAdded,
    AssignmentChanged,
    DetailsAdded,
    RatingChanged,
    ConvertedToCustomer,
}

// --- LEAD ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    #[schema(example = "Padaria Estrela Ltda")]
    pub company_name: String,

    #[schema(example = "João Carlos")]
    pub contact_name: String,

    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(example = "indicacao")]
    pub source: Option<String>,

    pub status: LeadStatus,

    // Nota de 1 a 5 dada pelo vendedor
    pub rating: Option<i32>,

    pub assigned_to: Option<Uuid>,

    // Preenchidos apenas na conversão; imutáveis depois
    pub converted_to_customer_id: Option<Uuid>,
    pub converted_date: Option<DateTime<Utc>>,

    // Soft-delete: leads nunca são apagados de verdade
    pub is_active: bool,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro imutável de auditoria: um por mutação do lead.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadHistoryEvent {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub change_type: LeadChangeType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
    pub changed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// Lead + auditoria para a tela de detalhe
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadWithHistory {
    #[serde(flatten)]
    pub lead: Lead,
    pub history: Vec<LeadHistoryEvent>,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    pub company_name: String,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,

    pub account_owner: Option<Uuid>,

    // Lead de origem, quando criado por conversão (UNIQUE no banco)
    pub source_lead_id: Option<Uuid>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novo_pode_ir_para_demo_e_lost() {
        assert_eq!(LeadStatus::New.validate_change(LeadStatus::Demo).unwrap(), true);
        assert_eq!(LeadStatus::New.validate_change(LeadStatus::Lost).unwrap(), true);
        assert_eq!(LeadStatus::Demo.validate_change(LeadStatus::Lost).unwrap(), true);
    }

    #[test]
    fn mesmo_status_e_noop_sem_evento() {
        assert_eq!(LeadStatus::Demo.validate_change(LeadStatus::Demo).unwrap(), false);
    }

    #[test]
    fn status_terminal_rejeita_qualquer_troca() {
        assert!(matches!(
            LeadStatus::Converted.validate_change(LeadStatus::Demo),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            LeadStatus::Lost.validate_change(LeadStatus::New),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn converted_nao_e_destino_direto() {
        // A única porta para CONVERTED é convert_to_customer
        assert!(matches!(
            LeadStatus::Demo.validate_change(LeadStatus::Converted),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            LeadStatus::New.validate_change(LeadStatus::Converted),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn conversao_distingue_ja_convertido_de_perdido() {
        assert!(LeadStatus::New.validate_conversion().is_ok());
        assert!(LeadStatus::Demo.validate_conversion().is_ok());
        assert!(matches!(
            LeadStatus::Converted.validate_conversion(),
            Err(AppError::AlreadyConverted)
        ));
        assert!(matches!(
            LeadStatus::Lost.validate_conversion(),
            Err(AppError::InvalidTransition(_))
        ));
    }
}
