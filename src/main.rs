//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/verify-otp", post(handlers::auth::verify_otp))
        .route("/reset-password", post(handlers::auth::reset_password));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let crm_routes = Router::new()
        // Leads
        .route(
            "/leads",
            post(handlers::crm::create_lead).get(handlers::crm::list_leads),
        )
        .route(
            "/leads/{id}",
            get(handlers::crm::get_lead).put(handlers::crm::update_lead_details),
        )
        .route("/leads/{id}/notes", post(handlers::crm::add_note))
        .route("/leads/{id}/status", patch(handlers::crm::change_status))
        .route(
            "/leads/{id}/assignment",
            patch(handlers::crm::change_assignment),
        )
        .route("/leads/{id}/rating", patch(handlers::crm::change_rating))
        .route("/leads/{id}/convert", post(handlers::crm::convert_lead))
        // Clientes
        .route(
            "/customers",
            post(handlers::crm::create_customer).get(handlers::crm::list_customers),
        )
        .route("/customers/{id}", get(handlers::crm::get_customer))
        .route(
            "/customers/{id}/orders",
            get(handlers::sales::list_customer_orders),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let sales_routes = Router::new()
        .route(
            "/variants",
            post(handlers::sales::create_variant).get(handlers::sales::list_variants),
        )
        .route(
            "/orders",
            post(handlers::sales::create_order).get(handlers::sales::list_orders),
        )
        .route("/orders/{id}", get(handlers::sales::get_order))
        .route("/orders/{id}/confirm", post(handlers::sales::confirm_order))
        .route(
            "/subscriptions",
            get(handlers::sales::list_subscriptions),
        )
        .route(
            "/subscriptions/{id}",
            get(handlers::sales::get_subscription),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route(
            "/{id}/read",
            patch(handlers::notifications::mark_notification_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/crm", crm_routes)
        .nest("/api/sales", sales_routes)
        .nest("/api/notifications", notification_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
