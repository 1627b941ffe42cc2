// src/services/subscription_service.rs

use chrono::{Datelike, Months, NaiveDate};
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::SubscriptionRepository,
    models::catalog::ProductVariant,
    models::sales::{Order, Subscription},
};

/// Agenda de cobrança anual derivada da data de início.
///
/// `renewal_date = início + 1 ano` e `current_period_end = renovação - 1 dia`.
/// Anos bissextos são acomodados pelo chrono (29/02 vira 28/02).
pub fn billing_schedule(start_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let renewal_date = start_date + Months::new(12);
    let current_period_end = renewal_date.pred_opt().unwrap_or(renewal_date);
    (current_period_end, renewal_date)
}

pub fn format_subscription_number(year: i32, sequence: i32) -> String {
    format!("SUB-{}-{:04}", year, sequence)
}

#[derive(Clone)]
pub struct SubscriptionService {
    repo: SubscriptionRepository,
}

impl SubscriptionService {
    pub fn new(repo: SubscriptionRepository) -> Self {
        Self { repo }
    }

    /// Provisiona a assinatura de um pedido recém-confirmado,
    /// na MESMA transação da confirmação.
    ///
    /// A tarifa anual é um snapshot da variante: reajustes futuros
    /// não afetam assinaturas existentes. O caller (OrderService) nunca
    /// chama isto duas vezes para o mesmo pedido; o UNIQUE de order_id
    /// segura o resto.
    pub async fn provision<'e, E>(
        &self,
        executor: E,
        order: &Order,
        variant: &ProductVariant,
        today: NaiveDate,
    ) -> Result<Subscription, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (current_period_end, renewal_date) = billing_schedule(today);

        let sequence = self.repo.next_sequence(&mut *tx, today.year()).await?;
        let subscription_number = format_subscription_number(today.year(), sequence);

        let subscription = self
            .repo
            .create(
                &mut *tx,
                &subscription_number,
                order.id,
                order.customer_id,
                order.variant_id,
                today,
                today,
                current_period_end,
                renewal_date,
                variant.annual_subscription_fee,
            )
            .await?;

        tx.commit().await?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renovacao_um_ano_depois_e_periodo_ate_a_vespera() {
        let (period_end, renewal) = billing_schedule(date(2026, 3, 1));
        assert_eq!(renewal, date(2027, 3, 1));
        assert_eq!(period_end, date(2027, 2, 28));
    }

    #[test]
    fn inicio_em_ano_bissexto_e_acomodado() {
        let (period_end, renewal) = billing_schedule(date(2024, 2, 29));
        assert_eq!(renewal, date(2025, 2, 28));
        assert_eq!(period_end, date(2025, 2, 27));
    }

    #[test]
    fn virada_de_ano() {
        let (period_end, renewal) = billing_schedule(date(2026, 1, 1));
        assert_eq!(renewal, date(2027, 1, 1));
        assert_eq!(period_end, date(2026, 12, 31));
    }

    #[test]
    fn numero_de_assinatura_com_quatro_digitos() {
        assert_eq!(format_subscription_number(2026, 1), "SUB-2026-0001");
        assert_eq!(format_subscription_number(2026, 123), "SUB-2026-0123");
        assert_eq!(format_subscription_number(2027, 10000), "SUB-2027-10000");
    }
}
