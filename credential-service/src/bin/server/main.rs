use std::sync::Arc;

use credential_service::config::Config;
use credential_service::domain::user::service::CredentialService;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::repositories::InMemoryUserDirectory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl = %config.auth.access_token_ttl,
        refresh_token_ttl = %config.auth.refresh_token_ttl,
        request_rate_limit_per_minute = config.auth.request_rate_limit_per_minute,
        "Configuration loaded"
    );

    let user_directory = Arc::new(InMemoryUserDirectory::new());
    tracing::info!(storage = "in-memory", "User directory created");

    let credential_service = Arc::new(CredentialService::new(user_directory, &config.auth)?);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(credential_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
