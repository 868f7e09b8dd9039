//! # Application State
//!
//! Shared state for the axum application: stores, payment gateway,
//! reconciler, query service, and configuration. Every collaborator is an
//! explicitly constructed, injected handle so tests can substitute doubles.

use order_core::{
    AddressStore, CatalogProductStore, MemoryAddressStore, MemoryOrderStore, MemoryUserStore,
    OrderQueryService, OrderStore, ProductCatalog, ProductStore, Reconciler,
    SharedPaymentGateway, UserStore,
};
use order_stripe::StripeGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront base URL, fallback for checkout redirects when the
    /// request carries no Origin header
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Order persistence
    pub orders: Arc<dyn OrderStore>,
    /// Authoritative product prices
    pub products: Arc<dyn ProductStore>,
    /// User profiles (cart state)
    pub users: Arc<dyn UserStore>,
    /// Stored shipping addresses
    pub addresses: Arc<dyn AddressStore>,
    /// Payment provider adapter
    pub gateway: SharedPaymentGateway,
    /// Webhook reconciler
    pub reconciler: Arc<Reconciler>,
    /// Read-side listing service
    pub queries: Arc<OrderQueryService>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment: in-memory stores, the catalog
    /// from `config/products.toml`, and a Stripe gateway.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let catalog = load_product_catalog()?;
        let products: Arc<dyn ProductStore> = Arc::new(CatalogProductStore::new(catalog));

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::with_components(
            Arc::new(MemoryOrderStore::new()),
            products,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryAddressStore::new()),
            Arc::new(gateway),
            config,
        ))
    }

    /// Assemble state from explicit components (tests inject doubles here)
    pub fn with_components(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        addresses: Arc<dyn AddressStore>,
        gateway: SharedPaymentGateway,
        config: AppConfig,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            orders.clone(),
            users.clone(),
            gateway.clone(),
        ));
        let queries = Arc::new(OrderQueryService::new(
            orders.clone(),
            products.clone(),
            addresses.clone(),
        ));

        Self {
            orders,
            products,
            users,
            addresses,
            gateway,
            reconciler,
            queries,
            config,
        }
    }
}

/// Load product catalog from config file
fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ProductCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} products from {}", catalog.products.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, using empty catalog");
    Ok(ProductCatalog::new())
}
