//! # Storefront Orders RS
//!
//! Order placement and payment reconciliation service.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server
//! storefront-orders
//! ```

use order_api::{routes, state::AppState};
use order_core::PaymentGateway as _;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Storefront orders starting on http://{}", addr);

    if !is_prod {
        info!("COD orders: POST http://{}/order/cod", addr);
        info!("Checkout: POST http://{}/order/stripe", addr);
        info!("Webhook: POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
