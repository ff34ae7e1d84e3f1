use std::env;

use log::{info, warn};
use tokio::signal;
use tower_oidc_tenant_gate::{config::AzureAdSettings, server::OidcTenantGate};

mod app;

const SETTINGS_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/appsettings.yaml");
const WWWROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/wwwroot");

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "Development".to_owned());
    let is_development = environment.eq_ignore_ascii_case("Development");
    info!("Hosting environment: {}", environment);

    let settings = AzureAdSettings::load(SETTINGS_FILE).expect("Failed to load AzureAd settings");
    if settings.accepted_tenant_ids.is_empty() {
        warn!("AcceptedTenantIds is empty, every sign-in will be rejected");
    }

    let gate = <OidcTenantGate>::builder()
        .provider(
            settings
                .provider_configuration()
                .await
                .expect("Failed to build provider configuration"),
        )
        .build()
        .await
        .expect("Failed to build OidcTenantGate");

    let app = app::app(
        &gate,
        settings.sign_in_url.as_deref(),
        is_development,
        WWWROOT,
    )
    .expect("Invalid SignInUrl");

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Running axum on port: 3000");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
