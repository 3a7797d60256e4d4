//! JSON REST surface over the services.

pub mod handlers;
pub mod params;
pub mod response;

use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::core::services::{ManagedEntity, ServiceResult};
use crate::domain::{Company, Customer, Driver, FoodCategory};
use crate::storage::DocumentStore;

use handlers::{billing, calculations, entities, orders};
use response::ApiError;

/// Report defaults used when a request omits or garbles a numeric override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportDefaults {
    pub tax_rate: f64,
    pub cost_per_meal: f64,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ReportDefaults {
    fn from(config: &Config) -> Self {
        Self {
            tax_rate: config.default_tax_rate,
            cost_per_meal: config.default_cost_per_meal,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    pub defaults: ReportDefaults,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, defaults: ReportDefaults) -> Self {
        Self { store, defaults }
    }

    /// Runs a store-bound job on the blocking pool; stores do synchronous I/O
    /// and hold std mutexes.
    pub async fn run<T, F>(&self, job: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn DocumentStore) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || job(store.as_ref()))
            .await
            .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?;
        Ok(outcome?)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(entity_routes::<Driver>("/api/drivers"))
        .merge(entity_routes::<Customer>("/api/customers"))
        .merge(entity_routes::<Company>("/api/companies"))
        .merge(entity_routes::<FoodCategory>("/api/categories"))
        .route("/api/customers/{id}/statement", get(billing::statement))
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/validate-bag", post(orders::validate_bag))
        .route(
            "/api/orders/{id}",
            get(orders::fetch).put(orders::update).delete(orders::remove),
        )
        .route("/api/invoices", get(billing::list_invoices))
        .route("/api/invoices/generate", post(billing::generate_invoice))
        .route(
            "/api/invoices/{id}",
            get(billing::fetch_invoice).delete(billing::remove_invoice),
        )
        .route(
            "/api/payments",
            get(billing::list_payments).post(billing::record_payment),
        )
        .route("/api/payments/{id}", delete(billing::remove_payment))
        .route("/api/calculations/daily", get(calculations::daily))
        .route("/api/calculations/range", get(calculations::range))
        .route("/api/calculations/monthly", get(calculations::monthly))
        .route("/api/calculations/profit", get(calculations::profit))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

fn entity_routes<T: ManagedEntity>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(entities::list::<T>).post(entities::create::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(entities::fetch::<T>)
                .put(entities::update::<T>)
                .delete(entities::remove::<T>),
        )
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    let status = response.status();
    if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), "request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), "handled request");
    }
    response
}

/// Binds `config.bind_address` and serves until ctrl-c.
pub async fn serve(config: &Config, store: Arc<dyn DocumentStore>) -> std::io::Result<()> {
    let state = AppState::new(store, ReportDefaults::from(config));
    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "catering server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
