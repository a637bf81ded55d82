use loan_decision_api::audit_client::AuditorClient;
use loan_decision_api::config::Config;
use loan_decision_api::handlers::{self, AppState};
use loan_decision_api::ledger::Ledger;
use loan_decision_api::scoring::ScoringPolicy;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the loan inference service.
///
/// Initializes tracing, configuration, the decision ledger and the auditor
/// client, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_decision_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Open the decision ledger
    let ledger = Ledger::connect(&config.database_url).await?;
    tracing::info!("Decision ledger ready: {}", config.database_url);

    // Initialize the remote auditor client
    let auditor = AuditorClient::new(config.auditor_base_url.clone(), config.audit_timeout())?;
    tracing::info!("Auditor client initialized: {}", config.auditor_base_url);

    // Build application state and router
    let state = Arc::new(AppState {
        ledger,
        scoring: ScoringPolicy::new(),
        auditor,
    });
    let app = handlers::router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
