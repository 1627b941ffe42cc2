// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::forgot_password,
        handlers::auth::verify_otp,
        handlers::auth::reset_password,

        // --- CRM ---
        handlers::crm::create_lead,
        handlers::crm::list_leads,
        handlers::crm::get_lead,
        handlers::crm::add_note,
        handlers::crm::change_status,
        handlers::crm::change_assignment,
        handlers::crm::change_rating,
        handlers::crm::update_lead_details,
        handlers::crm::convert_lead,
        handlers::crm::create_customer,
        handlers::crm::list_customers,
        handlers::crm::get_customer,

        // --- Sales ---
        handlers::sales::create_variant,
        handlers::sales::list_variants,
        handlers::sales::create_order,
        handlers::sales::confirm_order,
        handlers::sales::list_orders,
        handlers::sales::get_order,
        handlers::sales::list_customer_orders,
        handlers::sales::list_subscriptions,
        handlers::sales::get_subscription,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ForgotPasswordPayload,
            models::auth::VerifyOtpPayload,
            models::auth::ResetPasswordPayload,
            models::auth::OtpIssuedResponse,

            // --- CRM ---
            models::crm::LeadStatus,
            models::crm::LeadChangeType,
            models::crm::Lead,
            models::crm::LeadHistoryEvent,
            models::crm::LeadWithHistory,
            models::crm::Customer,
            handlers::crm::CreateLeadPayload,
            handlers::crm::AddNotePayload,
            handlers::crm::ChangeStatusPayload,
            handlers::crm::ChangeAssignmentPayload,
            handlers::crm::ChangeRatingPayload,
            handlers::crm::UpdateLeadDetailsPayload,
            handlers::crm::CreateCustomerPayload,

            // --- Catálogo ---
            models::catalog::LicenseType,
            models::catalog::ProductVariant,
            handlers::sales::CreateVariantPayload,

            // --- Sales ---
            models::sales::OrderStatus,
            models::sales::Order,
            models::sales::PriceBreakdown,
            models::sales::SubscriptionStatus,
            models::sales::Subscription,
            handlers::sales::CreateOrderPayload,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::NotificationPriority,
            models::notification::Notification,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, Registro e Redefinição de Senha"),
        (name = "CRM", description = "Gestão de Leads e Clientes"),
        (name = "Sales", description = "Catálogo, Pedidos e Assinaturas"),
        (name = "Notifications", description = "Notificações do Usuário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
