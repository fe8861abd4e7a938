//! # catalog: Product Catalog Service
//!
//! `catalog` is a REST service over a three-level product catalog: categories contain
//! subcategories, and subcategories contain products. Each product carries one image, uploaded
//! together with the product and served back by name.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for persistence. Images are stored as flat files under a configured
//! directory.
//!
//! ### Request Flow
//!
//! Every request under `/api` reaches a handler in [`api::handlers`]. The handler parses its path
//! segment (a numeric segment is an id, anything else a name), deserializes and validates the
//! body into a typed request, borrows a connection from the pool for the duration of the call,
//! and runs the work through a repository from [`db::handlers`]. Failures come back as
//! [`errors::Error`], which picks the status code and writes a plain-text body.
//!
//! Product creation is the one multi-step flow: the multipart form is read and validated, the
//! subcategory is resolved by name, the image is written under a generated name, and then the row
//! is inserted. If the insert fails the image is removed again.
//!
//! ### Core Components
//!
//! - [`api`]: handlers and request/response models
//! - [`db`]: repositories, database models, error mapping and the liveness check
//! - [`media`]: image storage and name generation
//! - [`config`]: layered configuration (YAML file, environment, CLI)
//! - [`telemetry`]: tracing subscriber setup
//!
//! ## Lifecycle
//!
//! [`Application::new`] connects the pool, runs the embedded migrations, prepares the media
//! directory and starts the background liveness check. [`Application::serve`] binds the listener
//! and runs until the shutdown future resolves, then gives in-flight requests a bounded grace
//! period, stops background tasks and closes the pool.
//!
//! ## Configuration
//!
//! See [`config::Config`]. Values come from `config.yaml` (or the file named by `-f` /
//! `CATALOG_CONFIG`), then `CATALOG_`-prefixed environment variables, then the flat `DB_*`,
//! `PORT` and `DATABASE_URL` variables.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod media;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::db::liveness;
use crate::media::MediaStore;
use crate::openapi::ApiDoc;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CategoryId, ProductId, SubcategoryId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .media(media)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub media: Arc<dyn MediaStore>,
}

/// Get the catalog database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Zero disables the timeout
fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Connect the pool and bring the schema up to date.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool_settings = &config.database.pool;
    let connect_options = config.connect_options()?;

    info!(
        max_connections = pool_settings.max_connections,
        min_connections = pool_settings.min_connections,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.acquire_timeout_secs))
        .idle_timeout(optional_secs(pool_settings.idle_timeout_secs))
        .max_lifetime(optional_secs(pool_settings.max_lifetime_secs))
        .connect_with(connect_options)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // A wildcard anywhere in the list admits every origin; `AllowOrigin::list` rejects `*`
    let allow_origin = if config.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match liveness::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

/// Build the application router with all endpoints and middleware.
///
/// - `/healthz` and `/readyz` probes
/// - the catalog API under `/api`
/// - the OpenAPI document at `/api/openapi.json` and its rendering at `/api/docs`
/// - CORS and request tracing on everything
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.media.max_upload_size;

    let api_routes = Router::new()
        // Categories
        .route(
            "/categories",
            get(api::handlers::categories::list_categories).post(api::handlers::categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(api::handlers::categories::get_category)
                .put(api::handlers::categories::update_category)
                .delete(api::handlers::categories::delete_category),
        )
        // Subcategories
        .route(
            "/subcategories",
            get(api::handlers::subcategories::list_subcategories).post(api::handlers::subcategories::create_subcategory),
        )
        .route(
            "/subcategories/{id}",
            get(api::handlers::subcategories::get_subcategory)
                .put(api::handlers::subcategories::update_subcategory)
                .delete(api::handlers::subcategories::delete_subcategory),
        )
        .route(
            "/subcategories/category/{id}",
            get(api::handlers::subcategories::list_subcategories_by_category),
        )
        // Products
        .route(
            "/products",
            get(api::handlers::products::list_products)
                .merge(post(api::handlers::products::create_product).layer(DefaultBodyLimit::max(upload_limit))),
        )
        .route(
            "/products/{id}",
            get(api::handlers::products::get_product)
                .put(api::handlers::products::update_product)
                .delete(api::handlers::products::delete_product),
        )
        .route(
            "/products/category/{category}",
            get(api::handlers::products::list_products_by_category),
        )
        .route(
            "/products/subcategory/{id}",
            get(api::handlers::products::list_products_by_subcategory),
        )
        // Images
        .route("/images/{name}", get(api::handlers::images::get_image))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/readyz", get(readiness))
        .with_state(state.clone())
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for background tasks and their lifecycle management.
///
/// The only task today is the database liveness check. When dropped, the `drop_guard` cancels
/// the shutdown token so tasks never outlive their owner.
pub struct BackgroundServices {
    background_tasks: tokio::task::JoinSet<anyhow::Result<()>>,
    shutdown_token: CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<DropGuard>,
}

impl BackgroundServices {
    fn start(pool: PgPool, config: &Config, shutdown_token: CancellationToken) -> Self {
        let drop_guard = shutdown_token.clone().drop_guard();
        let mut background_tasks = tokio::task::JoinSet::new();

        background_tasks.spawn(liveness::run_liveness_check(
            pool,
            config.liveness_interval,
            shutdown_token.clone(),
        ));

        Self {
            background_tasks,
            shutdown_token,
            drop_guard: Some(drop_guard),
        }
    }

    /// Gracefully shutdown all background tasks
    pub async fn shutdown(mut self) {
        self.shutdown_token.cancel();

        while let Some(result) = self.background_tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Background task failed: {:#}", e),
                Err(e) => warn!("Background task panicked or was aborted: {}", e),
            }
        }
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations, prepares the media
///    directory and starts background services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests get the configured
///    grace period, then background services stop and the pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting catalog with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Build the application around an existing, migrated pool
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let media = media::create_media_store(&config.media).await?;
        info!(root = %config.media.root.display(), "Media store ready");

        let shutdown_token = CancellationToken::new();
        let bg_services = BackgroundServices::start(pool.clone(), &config, shutdown_token);

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .media(media)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Catalog listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // The grace period starts once the shutdown future resolves
        let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown = async move {
            shutdown.await;
            let _ = signalled_tx.send(());
        };

        let server = axum::serve(listener, self.router.into_make_service()).with_graceful_shutdown(shutdown);
        let mut server = tokio::spawn(async move { server.await });

        let grace_period = self.config.shutdown_grace_period;
        tokio::select! {
            result = &mut server => result??,
            Ok(()) = signalled_rx => {
                info!(grace_period = ?grace_period, "Shutdown signal received, draining in-flight requests");
                match tokio::time::timeout(grace_period, &mut server).await {
                    Ok(result) => result??,
                    Err(_) => {
                        // Aborting the accept loop does not cancel per-connection tasks, which can
                        // keep their pooled connections until they finish
                        warn!(
                            "Grace period elapsed with requests still in flight; aborting the listener, \
                             open connections may outlive it"
                        );
                        server.abort();
                    }
                }
            }
        }

        // Shutdown background services and wait for tasks to complete
        self.bg_services.shutdown().await;

        close_pool(&self.pool, grace_period).await;

        Ok(())
    }
}

/// Close the pool, giving up after `limit` when connections are still checked out.
///
/// Returns whether every connection was released in time.
async fn close_pool(pool: &PgPool, limit: Duration) -> bool {
    info!("Closing database connections...");
    match tokio::time::timeout(limit, pool.close()).await {
        Ok(()) => true,
        Err(_) => {
            warn!(
                limit = ?limit,
                in_use = (pool.size() as usize).saturating_sub(pool.num_idle()),
                "Database connections still in use, exiting without waiting for them"
            );
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AppState, Application, build_router};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_application_integration(pool: PgPool) {
        let media = tempfile::tempdir().unwrap();
        let mut config = create_test_config();
        config.media.root = media.path().join("uploads");

        let app = Application::new_with_pool(config, pool).await;
        assert!(app.is_ok(), "Application::new_with_pool should succeed");
        assert!(media.path().join("uploads").is_dir());

        let (server, bg_services) = app.unwrap().into_test_server();

        let health_response = server.get("/healthz").await;
        health_response.assert_status_ok();
        assert_eq!(health_response.text(), "OK");

        server.get("/readyz").await.assert_status_ok();

        let api_response = server.get("/api/categories").await;
        api_response.assert_status_ok();
        assert_eq!(api_response.text(), "[]");

        bg_services.shutdown().await;
    }

    #[sqlx::test]
    async fn test_readiness_fails_on_closed_pool(pool: PgPool) {
        let (app, _media) = create_test_app(pool.clone()).await;
        pool.close().await;

        app.get("/readyz").await.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[sqlx::test]
    async fn test_openapi_document_served(pool: PgPool) {
        let (app, _media) = create_test_app(pool).await;

        let response = app.get("/api/openapi.json").await;
        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert_eq!(doc["info"]["title"], "Catalog API");
        assert!(doc["paths"]["/products/{id}"].is_object());

        app.get("/api/docs").await.assert_status_ok();
    }

    #[sqlx::test]
    async fn test_cors_preflight(pool: PgPool) {
        let media = tempfile::tempdir().unwrap();
        let mut config = create_test_config();
        config.media.root = media.path().to_path_buf();
        config.cors.allowed_origins = vec![crate::config::CorsOrigin::Url("https://shop.example.com".parse().unwrap())];

        let state = AppState::builder()
            .db(pool)
            .config(config.clone())
            .media(crate::media::create_media_store(&config.media).await.unwrap())
            .build();
        let server = axum_test::TestServer::new(build_router(&state).unwrap()).unwrap();

        let response = server
            .method(axum::http::Method::OPTIONS, "/api/products")
            .add_header("origin", "https://shop.example.com")
            .add_header("access-control-request-method", "PUT")
            .await;
        assert_eq!(
            response.header("access-control-allow-origin"),
            "https://shop.example.com"
        );
        let methods = response.header("access-control-allow-methods");
        assert!(methods.to_str().unwrap().contains("PUT"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_close_pool_is_bounded_by_checked_out_connections(pool: PgPool) {
        let idle = sqlx::postgres::PgPoolOptions::new()
            .connect_with((*pool.connect_options()).clone())
            .await
            .unwrap();
        assert!(super::close_pool(&idle, std::time::Duration::from_secs(5)).await);
        assert!(idle.is_closed());

        let busy = sqlx::postgres::PgPoolOptions::new()
            .connect_with((*pool.connect_options()).clone())
            .await
            .unwrap();
        let held = busy.acquire().await.unwrap();
        let started = std::time::Instant::now();
        assert!(!super::close_pool(&busy, std::time::Duration::from_millis(200)).await);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        drop(held);
    }

    #[test]
    fn test_optional_secs() {
        assert_eq!(super::optional_secs(0), None);
        assert_eq!(super::optional_secs(30), Some(std::time::Duration::from_secs(30)));
    }
}
