//! # Role Bridge
//!
//! Opens Stripe subscription checkouts and upgrades the paying user's role on
//! the user platform once Stripe confirms payment.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export FRONTEND_SUCCESS_URL=https://app.example.com/success
//! export FRONTEND_CANCEL_URL=https://app.example.com/cancel
//! export BASE44_API_BASE=https://app.base44.com/api/apps/<app id>
//! export BASE44_API_KEY=...
//!
//! # Run the server
//! role-bridge
//! ```

use bridge_api::{routes, state::AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Initialize application state
    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.payments.provider_name());
    info!("Role platform: {}", state.platform.platform_name());

    let tasks = state.tasks.clone();

    // Create router
    let app = routes::create_router(state);

    info!("Role bridge starting on http://{}", addr);

    if !is_prod {
        info!("Checkout: POST http://{}/create-checkout-session", addr);
        info!("Webhook: POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight role upgrades finish before exiting
    tasks.close();
    if !tasks.is_empty() {
        info!("Waiting for {} in-flight role upgrade(s)", tasks.len());
    }
    tasks.wait().await;

    info!("Role bridge stopped");
    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
