use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_leads_api::api::{handlers::AppState, router};
use company_leads_api::config::Config;
use company_leads_api::db::Database;
use company_leads_api::integrations::{
    db_storage::PgLeadRepository,
    mail::{LocalMailService, MailService},
    mail_client::WebhookMailService,
    repository::{InMemoryLeadRepository, LeadRepository},
};

/// Main entry point for the application.
///
/// Initializes logging, configuration, lead storage, the mail sender, and the
/// HTTP routes and middleware, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let leads: Arc<dyn LeadRepository> = match &config.database_url {
        Some(url) => {
            let db = Database::new(url, config.db_max_connections).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgLeadRepository::new(db.pool))
        }
        None => {
            tracing::info!("Using in-memory lead storage");
            Arc::new(InMemoryLeadRepository::new())
        }
    };

    let mailer: Arc<dyn MailService> = match &config.mail_webhook_url {
        Some(url) => Arc::new(
            WebhookMailService::new(url.clone(), config.mail_from_address.clone())?,
        ),
        None => Arc::new(LocalMailService::new(config.mail_from_address.clone())),
    };

    let app_state = Arc::new(AppState {
        config: config.clone(),
        leads,
        mailer,
    });

    // Rate limiting per client IP; the health check bypasses it
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    let api = router::api_routes(&config).layer(ServiceBuilder::new().layer(GovernorLayer {
        config: governor_conf,
    }));
    let app = router::build_app(app_state, api);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
