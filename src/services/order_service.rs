// src/services/order_service.rs

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CustomerRepository, OrderRepository},
    models::catalog::LicenseType,
    models::notification::NotificationKind,
    models::sales::{Order, Subscription},
    services::notification_service::NotificationService,
    services::pricing::{self, PricingInput},
    services::subscription_service::SubscriptionService,
};

pub fn format_order_number(year: i32, sequence: i32) -> String {
    format!("ORD-{}-{:04}", year, sequence)
}

/// Ciclo de vida do pedido: criação com preço congelado e
/// confirmação com provisionamento automático de assinatura.
#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    customer_repo: CustomerRepository,
    subscription_service: SubscriptionService,
    notification_service: NotificationService,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        catalog_repo: CatalogRepository,
        customer_repo: CustomerRepository,
        subscription_service: SubscriptionService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            order_repo,
            catalog_repo,
            customer_repo,
            subscription_service,
            notification_service,
        }
    }

    /// Cria o pedido em PENDING com todos os valores calculados e congelados.
    /// Mudanças de preço na variante depois disso não afetam este pedido.
    pub async fn create(
        &self,
        pool: &PgPool,
        customer_id: Uuid,
        variant_id: Uuid,
        license_type: LicenseType,
        quantity: i32,
        customization_amount: Decimal,
        discount_percent: Decimal,
        tax_percent: Decimal,
        actor: Uuid,
    ) -> Result<Order, AppError> {
        let mut tx = pool.begin().await?;

        let customer = self.customer_repo.find_by_id(&mut *tx, customer_id).await?;
        let variant = self.catalog_repo.find_active_by_id(&mut *tx, variant_id).await?;

        let input = PricingInput::from_variant(
            &variant,
            license_type,
            quantity,
            customization_amount,
            discount_percent,
            tax_percent,
        );
        let breakdown = pricing::compute(&input)?;

        let year = Utc::now().date_naive().year();
        let sequence = self.order_repo.next_sequence(&mut *tx, year).await?;
        let order_number = format_order_number(year, sequence);

        let order = self
            .order_repo
            .create(
                &mut *tx,
                &order_number,
                customer.id,
                variant.id,
                license_type,
                quantity,
                &breakdown,
                actor,
            )
            .await?;

        let mut pending = Vec::new();
        if let Some(owner) = customer.account_owner {
            let notification = self
                .notification_service
                .notify(
                    &mut *tx,
                    owner,
                    NotificationKind::OrderCreated,
                    "Novo pedido criado",
                    &format!(
                        "Pedido {} criado para o cliente \"{}\" no valor de R$ {}.",
                        order.order_number, customer.company_name, order.total_amount
                    ),
                    Some(("order", order.id)),
                    false,
                )
                .await?;
            pending.push(notification);
        }

        tx.commit().await?;

        tracing::info!(order_number = %order.order_number, "✅ Pedido criado");

        self.notification_service.deliver(pool, &pending).await;

        Ok(order)
    }

    /// Confirma um pedido PENDING e provisiona a assinatura anual,
    /// tudo em uma transação só.
    ///
    /// O CAS `PENDING -> CONFIRMED` garante que só um caller confirma;
    /// concorrentes recebem `AlreadyConfirmed`. Variante desativada depois
    /// da criação do pedido não bloqueia a confirmação.
    pub async fn confirm(
        &self,
        pool: &PgPool,
        order_id: Uuid,
        actor: Uuid,
    ) -> Result<Subscription, AppError> {
        let mut tx = pool.begin().await?;

        let order = match self.order_repo.confirm_pending(&mut *tx, order_id).await? {
            Some(order) => order,
            None => {
                // CAS falhou: decide entre inexistente e estado errado
                let current = self.order_repo.find_by_id(pool, order_id).await?;
                return match current {
                    Some(order) => Err(order.status.reject_confirmation()),
                    None => Err(AppError::OrderNotFound),
                };
            }
        };

        let variant = self.catalog_repo.find_by_id(&mut *tx, order.variant_id).await?;
        let customer = self.customer_repo.find_by_id(&mut *tx, order.customer_id).await?;

        let today = Utc::now().date_naive();
        let subscription = self
            .subscription_service
            .provision(&mut *tx, &order, &variant, today)
            .await?;

        let mut pending = Vec::new();
        if let Some(owner) = customer.account_owner {
            let confirmed = self
                .notification_service
                .notify(
                    &mut *tx,
                    owner,
                    NotificationKind::OrderConfirmed,
                    "Pedido confirmado",
                    &format!(
                        "O pedido {} do cliente \"{}\" foi confirmado. Total: R$ {}.",
                        order.order_number, customer.company_name, order.total_amount
                    ),
                    Some(("order", order.id)),
                    true,
                )
                .await?;
            pending.push(confirmed);

            let provisioned = self
                .notification_service
                .notify(
                    &mut *tx,
                    owner,
                    NotificationKind::SubscriptionCreated,
                    "Assinatura provisionada",
                    &format!(
                        "A assinatura {} foi criada para o pedido {}. Renovação em {}.",
                        subscription.subscription_number,
                        order.order_number,
                        subscription.renewal_date
                    ),
                    Some(("subscription", subscription.id)),
                    false,
                )
                .await?;
            pending.push(provisioned);
        }

        tx.commit().await?;

        tracing::info!(
            order_number = %order.order_number,
            subscription_number = %subscription.subscription_number,
            actor = %actor,
            "✅ Pedido confirmado e assinatura provisionada"
        );

        self.notification_service.deliver(pool, &pending).await;

        Ok(subscription)
    }

    pub async fn get(&self, pool: &PgPool, order_id: Uuid) -> Result<Order, AppError> {
        self.order_repo
            .find_by_id(pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        self.order_repo.list().await
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_by_customer(customer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numero_de_pedido_com_quatro_digitos() {
        assert_eq!(format_order_number(2026, 1), "ORD-2026-0001");
        assert_eq!(format_order_number(2026, 42), "ORD-2026-0042");
        assert_eq!(format_order_number(2027, 12345), "ORD-2027-12345");
    }
}
