use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use momo_gateway::adapters::http::{payment_router, PaymentAppState};
use momo_gateway::adapters::{MomoProviderClient, PostgresOrderRepository, PostgresTransactionStore};
use momo_gateway::application::PaymentGateway;
use momo_gateway::config::AppConfig;

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("Failed to load configuration");

    let production = config.is_production();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(tracing_subscriber::fmt::layer))
        .init();

    config.validate().expect("Invalid configuration");

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to PostgreSQL");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        tracing::info!("Database migrations applied");
    }

    let momo_config = config.provider.momo_config();
    let merchant = momo_config.merchant();
    let codec = momo_config.codec();
    let provider =
        MomoProviderClient::new(momo_config).expect("Failed to build MoMo HTTP client");

    let gateway = PaymentGateway::new(
        Arc::new(PostgresOrderRepository::new(pool.clone())),
        Arc::new(PostgresTransactionStore::new(pool)),
        Arc::new(provider),
        merchant,
        codec,
        config
            .checkout
            .gateway_settings(config.provider.refunds_supported),
    );

    let app = payment_router()
        .with_state(PaymentAppState::new(Arc::new(gateway)))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr = config
        .server
        .socket_addr()
        .expect("Invalid server address");
    tracing::info!(
        %addr,
        provider_base_url = config.provider.base_url(),
        refunds_supported = config.provider.refunds_supported,
        "Starting MoMo gateway"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
