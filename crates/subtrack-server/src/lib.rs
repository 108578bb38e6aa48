//! Subtrack Web Server
//!
//! Axum-based REST API for the Subtrack bill and subscription tracker.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security response headers
//! - Sanitized error responses (storage details are logged, never returned)

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection, StringRejection},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use subtrack_core::db::Database;

mod handlers;

/// Environment variable listing allowed CORS origins (comma-separated)
pub const ALLOWED_ORIGINS_ENV: &str = "SUBTRACK_ALLOWED_ORIGINS";

/// Environment variable overriding the default due-soon window
pub const DUE_SOON_DAYS_ENV: &str = "SUBTRACK_DUE_SOON_DAYS";

/// Window used by `/due/soon` and the dashboard when none is given
pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Default window for due-soon queries and the dashboard
    pub due_soon_days: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl ServerConfig {
    /// Read deployment settings from the environment
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = std::env::var(ALLOWED_ORIGINS_ENV) {
            config.allowed_origins = parse_origins(&origins);
        }

        if let Ok(raw) = std::env::var(DUE_SOON_DAYS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(days) => config.due_soon_days = days,
                Err(_) => warn!(
                    "Ignoring invalid {}={:?}, using {} days",
                    DUE_SOON_DAYS_ENV, raw, DEFAULT_DUE_SOON_DAYS
                ),
            }
        }

        config
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Calendar date requests are evaluated against
///
/// `as_of` lets clients (and tests) pin "today"; otherwise the server's local
/// date is used.
pub(crate) fn resolve_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
}

/// GET / - Service name and version
async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "subtrack",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health - Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Subscriptions
        .route(
            "/subscriptions",
            get(handlers::list_subscriptions).post(handlers::create_subscription),
        )
        .route("/subscriptions/due/today", get(handlers::due_today))
        .route("/subscriptions/due/soon", get(handlers::due_soon))
        .route(
            "/subscriptions/summary/monthly",
            get(handlers::monthly_summary),
        )
        .route(
            "/subscriptions/summary/categories",
            get(handlers::category_summary),
        )
        .route(
            "/subscriptions/:id",
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .patch(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
        .route(
            "/subscriptions/:id/paid",
            post(handlers::mark_subscription_paid),
        )
        // Insights
        .route("/insights", get(handlers::list_insights))
        .route("/insights/:id", get(handlers::get_subscription_insight))
        // Export / import
        .route("/export/subscriptions", get(handlers::export_subscriptions))
        .route("/import/subscriptions", post(handlers::import_subscriptions));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ));

    // Serve the dashboard build if a directory was provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    match db.count_subscriptions() {
        Ok(count) => info!("Serving {} subscription(s) from {}", count, db.path()),
        Err(e) => warn!("Could not count subscriptions at startup: {}", e),
    }

    if config.allowed_origins.is_empty() {
        info!("CORS: same-origin only (set {} to allow others)", ALLOWED_ORIGINS_ENV);
    } else {
        info!("CORS: allowing {:?}", config.allowed_origins);
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
///
/// The body is `{"error": <message>, "kind": <kind>}` so clients can tell a
/// missing record from bad input from an unavailable store.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn validation(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Backing store unavailable or failing
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            kind: "storage",
            message: "Subscription store is unavailable".to_string(),
            internal: Some(err.into()),
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: "An internal error occurred".to_string(),
            internal: Some(anyhow::anyhow!(msg.to_string())),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, kind = self.kind, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl From<subtrack_core::Error> for AppError {
    fn from(err: subtrack_core::Error) -> Self {
        match err {
            subtrack_core::Error::Validation(msg) => Self::validation(&msg),
            subtrack_core::Error::NotFound(msg) => Self::not_found(&msg),
            other => Self::storage(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(&rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(&rejection.body_text())
    }
}

impl From<StringRejection> for AppError {
    fn from(rejection: StringRejection) -> Self {
        Self::validation(&rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(&rejection.body_text())
    }
}
