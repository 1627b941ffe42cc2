// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    common::mailer::{ConsoleMailer, Mailer, SmtpMailer},
    db::{
        CatalogRepository, CustomerRepository, LeadRepository, NotificationRepository,
        OrderRepository, OtpRepository, SubscriptionRepository, UserRepository,
    },
    services::{
        auth::AuthService, lead_service::LeadService, notification_service::NotificationService,
        order_service::OrderService, otp_service::OtpService,
        subscription_service::SubscriptionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub otp_service: OtpService,
    pub lead_service: LeadService,
    pub order_service: OrderService,
    pub subscription_service: SubscriptionService,
    pub notification_service: NotificationService,
    pub catalog_repo: CatalogRepository,
    pub customer_repo: CustomerRepository,
    pub subscription_repo: SubscriptionRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // SMTP configurado -> envia de verdade; senão, loga no console (dev)
        let mailer: Arc<dyn Mailer> = match SmtpMailer::from_env() {
            Some(smtp) => {
                tracing::info!("📧 Mailer SMTP configurado");
                Arc::new(smtp)
            }
            None => {
                tracing::warn!("📧 SMTP não configurado, e-mails serão apenas logados");
                Arc::new(ConsoleMailer)
            }
        };

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let otp_repo = OtpRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let subscription_repo = SubscriptionRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let notification_service = NotificationService::new(
            notification_repo,
            user_repo.clone(),
            mailer.clone(),
        );
        let subscription_service = SubscriptionService::new(subscription_repo.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let otp_service = OtpService::new(user_repo, otp_repo, mailer);
        let lead_service = LeadService::new(
            lead_repo,
            customer_repo.clone(),
            notification_service.clone(),
        );
        let order_service = OrderService::new(
            order_repo,
            catalog_repo.clone(),
            customer_repo.clone(),
            subscription_service.clone(),
            notification_service.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            otp_service,
            lead_service,
            order_service,
            subscription_service,
            notification_service,
            catalog_repo,
            customer_repo,
            subscription_repo,
        })
    }
}
